//! In-memory robot peer for session-level tests.
//!
//! [`RobotBrain`] answers calls the way the robot services do; [`FakeRobot`]
//! wraps it in a [`Transport`] so a real [`Session`] and the real proxies
//! can run against it without a socket.
//!
//! [`Session`]: touchreact::adapters::bridge::session::Session

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, ErrorKind};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use touchreact::adapters::bridge::codec::{FrameDecoder, encode_frame};
use touchreact::adapters::bridge::message::{Inbound, Outbound};
use touchreact::adapters::bridge::transport::Transport;

/// One call as the robot saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct WireCall {
    pub service: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl WireCall {
    /// `"Service.method"`.
    pub fn target(&self) -> String {
        format!("{}.{}", self.service, self.method)
    }
}

/// Service-side behaviour, keyed by `"Service.method"`.
pub struct RobotBrain {
    pub calls: Vec<WireCall>,
    pub goodbye: bool,
    failing: HashSet<String>,
    silent: HashSet<String>,
    overrides: HashMap<String, Value>,
    image: Value,
}

#[allow(dead_code)]
impl RobotBrain {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            goodbye: false,
            failing: HashSet::new(),
            silent: HashSet::new(),
            overrides: HashMap::new(),
            image: Self::image(2, 2, 3),
        }
    }

    /// A `getImageRemote` reply body with a gradient fill.
    pub fn image(width: u32, height: u32, layers: u8) -> Value {
        let len = (width * height * u32::from(layers)) as usize;
        let pixels: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
        json!({
            "width": width,
            "height": height,
            "layers": layers,
            "data": BASE64.encode(pixels),
        })
    }

    pub fn set_image(&mut self, image: Value) {
        self.image = image;
    }

    /// Answer `target` with a remote failure.
    pub fn fail(&mut self, target: &str) {
        self.failing.insert(target.to_string());
    }

    /// Never answer `target`.
    pub fn ignore(&mut self, target: &str) {
        self.silent.insert(target.to_string());
    }

    /// Answer `target` with `value`.
    pub fn reply_with(&mut self, target: &str, value: Value) {
        self.overrides.insert(target.to_string(), value);
    }

    pub fn targets(&self) -> Vec<String> {
        self.calls.iter().map(WireCall::target).collect()
    }

    pub fn respond(&mut self, msg: Outbound) -> Option<Inbound> {
        let (id, call) = match msg {
            Outbound::Call {
                id,
                service,
                method,
                args,
            } => (id, WireCall { service, method, args }),
            Outbound::Goodbye => {
                self.goodbye = true;
                return None;
            }
        };
        let target = call.target();
        let first_arg = call.args.first().cloned().unwrap_or(Value::Null);
        self.calls.push(call);

        if self.silent.contains(&target) {
            return None;
        }
        if self.failing.contains(&target) {
            return Some(Inbound::Failure {
                id,
                message: format!("{target} raised"),
            });
        }
        let value = match self.overrides.get(&target) {
            Some(v) => v.clone(),
            None => match target.as_str() {
                "ALVideoDevice.subscribe" => json!(format!("{}_0", first_arg.as_str().unwrap_or("client"))),
                "ALVideoDevice.getImageRemote" => self.image.clone(),
                "ALRobotPosture.goToPosture" => json!(true),
                _ => Value::Null,
            },
        };
        Some(Inbound::Reply { id, value })
    }
}

pub fn frame(msg: &Inbound) -> Vec<u8> {
    encode_frame(&serde_json::to_vec(msg).unwrap()).unwrap()
}

// ── FakeRobot transport ───────────────────────────────────────

pub struct FakeRobot {
    pub brain: RobotBrain,
    incoming: VecDeque<Vec<u8>>,
    decoder: FrameDecoder,
    closed: bool,
}

#[allow(dead_code)]
impl FakeRobot {
    pub fn new() -> Self {
        Self {
            brain: RobotBrain::new(),
            incoming: VecDeque::new(),
            decoder: FrameDecoder::new(),
            closed: false,
        }
    }

    /// Queue an event delivery.
    pub fn push_event(&mut self, name: &str, value: Value) {
        self.incoming.push_back(frame(&Inbound::Event {
            name: name.to_string(),
            value,
        }));
    }

    /// Simulate the robot hanging up.
    pub fn hang_up(&mut self) {
        self.closed = true;
    }
}

impl Transport for FakeRobot {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.incoming.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None if self.closed => Err(io::Error::new(ErrorKind::UnexpectedEof, "robot hung up")),
            None => Ok(0),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        for payload in self.decoder.feed(data) {
            let msg: Outbound = serde_json::from_slice(&payload).unwrap();
            if let Some(reply) = self.brain.respond(msg) {
                self.incoming.push_back(frame(&reply));
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
