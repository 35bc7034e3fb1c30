//! TouchReact: Main Entry Point
//!
//! Hexagonal architecture around a single-threaded poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MemoryProxy   VideoProxy   SpeechProxy   MotionProxy          │
//! │  (EventSource) (Imaging)    (Speech)      (Locomotion)         │
//! │  PngFrameStore LogEventSink JsonConfigFile                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            TouchDispatcher (pure logic)                │    │
//! │  │  RuleTable · Armed state · Actuators                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Session (TCP, framed JSON) · SIGINT flag                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use touchreact::adapters::bridge::proxies::{MemoryProxy, MotionProxy, SpeechProxy, VideoProxy};
use touchreact::adapters::bridge::session::{Session, SharedSession};
use touchreact::adapters::bridge::transport::{TcpTransport, Transport};
use touchreact::adapters::config_file::JsonConfigFile;
use touchreact::adapters::log_sink::LogEventSink;
use touchreact::adapters::png_store::PngFrameStore;
use touchreact::app::actions::{ActionExecutor, ActionSettings, Actuators};
use touchreact::app::dispatcher::{Subscription, TouchDispatcher};
use touchreact::app::ports::{ConfigPort, EventSink};
use touchreact::app::rules::RuleTable;
use touchreact::config::DispatcherConfig;
use touchreact::error::SessionError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONFIG_PATH: &str = "touchreact.json";

/// React to touches on the robot's head, arms and feet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Robot IP address or hostname
    #[arg(long, default_value = "nao.local")]
    ip: String,

    /// Robot port number
    #[arg(long, default_value_t = 9559)]
    port: u16,

    /// JSON configuration file (defaults apply if it does not exist)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    write_config: bool,

    /// Log filter when RUST_LOG is unset (e.g. "debug", "touchreact=trace")
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Open each captured image with the configured viewer
    #[arg(long)]
    show_image: bool,

    /// Viewer program used with --show-image
    #[arg(long)]
    viewer: Option<String>,

    /// Where captured images are written
    #[arg(long)]
    output: Option<PathBuf>,
}

// ── Bootstrap helpers ─────────────────────────────────────────

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // The fmt subscriber also installs the `log` bridge, so `log::info!`
    // records from the library land here.
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(args: &Args) -> Result<DispatcherConfig> {
    let store = JsonConfigFile::new(
        args.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
    );
    let mut config = store
        .load()
        .with_context(|| format!("loading config from {}", store.path().display()))?;

    if let Some(output) = &args.output {
        config.capture_path.clone_from(output);
    }
    if args.viewer.is_some() {
        config.viewer_command.clone_from(&args.viewer);
    }
    if args.show_image {
        config.show_image = true;
    }
    config.validate().context("invalid configuration")?;

    if args.write_config {
        store
            .save(&config)
            .with_context(|| format!("writing config to {}", store.path().display()))?;
        info!("Config written to {}", store.path().display());
    }
    Ok(config)
}

fn install_interrupt_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&flag))
            .with_context(|| format!("registering handler for signal {sig}"))?;
    }
    Ok(flag)
}

// ── Event loop ────────────────────────────────────────────────

fn run<T, X>(
    session: &SharedSession<T>,
    dispatcher: &mut TouchDispatcher<MemoryProxy<T>, X>,
    sink: &mut impl EventSink,
    event_name: &str,
    interrupted: &AtomicBool,
) -> Result<()>
where
    T: Transport,
    X: ActionExecutor,
{
    while !interrupted.load(Ordering::Relaxed) {
        dispatcher.ensure_armed(sink);

        let next = session.borrow_mut().poll_event();
        match next {
            Ok(Some(ev)) if ev.name == event_name => {
                let outcome = dispatcher.handle_payload(&ev.value, sink);
                debug!("Touch handled: {:?}", outcome);
            }
            Ok(Some(ev)) => debug!("Ignoring event '{}'", ev.name),
            Ok(None) => {}
            Err(SessionError::Closed) => bail!("robot closed the session"),
            Err(e) => return Err(e).context("polling robot events"),
        }
    }
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("TouchReact v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let config = load_config(&args)?;
    let interrupted = install_interrupt_flag()?;

    // ── 2. Join the robot session ─────────────────────────────
    let poll = Duration::from_millis(u64::from(config.poll_interval_ms));
    let transport = TcpTransport::connect(&args.ip, args.port, CONNECT_TIMEOUT, poll)
        .map_err(SessionError::Connect)
        .with_context(|| format!("joining robot session at {}:{}", args.ip, args.port))?;
    let session = Session::new(transport, Duration::from_millis(u64::from(config.call_timeout_ms)))
        .into_shared();

    // ── 3. Construct adapters + dispatcher ────────────────────
    let frames = PngFrameStore::new(config.capture_path.clone()).with_viewer(config.viewer_command.clone());
    let actuators = Actuators::new(
        VideoProxy::new(Rc::clone(&session)),
        SpeechProxy::new(Rc::clone(&session)),
        MotionProxy::new(Rc::clone(&session)),
        frames,
        ActionSettings::from(&config),
    );
    let mut dispatcher = TouchDispatcher::new(
        MemoryProxy::new(Rc::clone(&session)),
        actuators,
        RuleTable::standard(),
        Subscription {
            event_name: config.event_name.clone(),
            module_name: config.module_name.clone(),
        },
    );
    let mut sink = LogEventSink::new();

    dispatcher
        .arm(&mut sink)
        .context("subscribing to touch events")?;
    info!("Ready. Waiting for touch events (Ctrl-C to quit).");

    // ── 4. Event loop ─────────────────────────────────────────
    let result = run(&session, &mut dispatcher, &mut sink, &config.event_name, &interrupted);

    // ── 5. Teardown ───────────────────────────────────────────
    if interrupted.load(Ordering::Relaxed) {
        println!();
        println!("Interrupted by user, shutting down");
    }
    if !session.borrow().is_closed() {
        if let Err(e) = dispatcher.shutdown(&mut sink) {
            warn!("Unsubscribe at shutdown failed: {}", e);
        }
        if let Err(e) = session.borrow_mut().close() {
            warn!("Session close failed: {}", e);
        }
    }

    let stats = dispatcher.stats();
    info!(
        "Handled {} events: {} actions, {} failed, {} ignored, {} malformed",
        stats.events, stats.performed, stats.failed, stats.ignored, stats.malformed
    );
    result
}
