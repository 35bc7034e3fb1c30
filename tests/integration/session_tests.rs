//! Full stack: dispatcher → proxies → session → transport → robot peer.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use touchreact::adapters::bridge::codec::FrameDecoder;
use touchreact::adapters::bridge::message::{Inbound, Outbound};
use touchreact::adapters::bridge::proxies::{MemoryProxy, MotionProxy, SpeechProxy, VideoProxy};
use touchreact::adapters::bridge::session::{Session, SharedSession};
use touchreact::adapters::bridge::transport::{TcpTransport, Transport};
use touchreact::adapters::png_store::PngFrameStore;
use touchreact::app::actions::{ActionSettings, Actuators};
use touchreact::app::dispatcher::{DispatchOutcome, DispatcherState, Subscription, TouchDispatcher};
use touchreact::app::rules::{Action, RuleTable};
use touchreact::error::{Capability, SessionError};

use crate::fake_robot::{FakeRobot, RobotBrain, frame};
use crate::mock_robot::RecordingSink;

type Bridge<T> = TouchDispatcher<
    MemoryProxy<T>,
    Actuators<VideoProxy<T>, SpeechProxy<T>, MotionProxy<T>, PngFrameStore>,
>;

fn assemble<T: Transport>(session: &SharedSession<T>, capture: &Path) -> Bridge<T> {
    let actuators = Actuators::new(
        VideoProxy::new(Rc::clone(session)),
        SpeechProxy::new(Rc::clone(session)),
        MotionProxy::new(Rc::clone(session)),
        PngFrameStore::new(capture),
        ActionSettings::default(),
    );
    TouchDispatcher::new(
        MemoryProxy::new(Rc::clone(session)),
        actuators,
        RuleTable::standard(),
        Subscription {
            event_name: "TouchChanged".into(),
            module_name: "ReactToTouch".into(),
        },
    )
}

fn fake_session(robot: FakeRobot, timeout: Duration) -> SharedSession<FakeRobot> {
    Session::new(robot, timeout).into_shared()
}

/// Deliver one event through the session and hand it to the dispatcher.
fn deliver(
    session: &SharedSession<FakeRobot>,
    dispatcher: &mut Bridge<FakeRobot>,
    value: Value,
) -> DispatchOutcome {
    session.borrow_mut().transport_mut().push_event("TouchChanged", value);
    let ev = session.borrow_mut().poll_event().unwrap().expect("event delivered");
    assert_eq!(ev.name, "TouchChanged");
    dispatcher.handle_payload(&ev.value, &mut RecordingSink::new())
}

fn targets(session: &SharedSession<FakeRobot>) -> Vec<String> {
    session.borrow().transport().brain.targets()
}

#[test]
fn arm_touch_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let session = fake_session(FakeRobot::new(), Duration::from_secs(1));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    d.arm(&mut RecordingSink::new()).unwrap();

    let out = deliver(&session, &mut d, json!([["RArm", true]]));

    assert_eq!(out, DispatchOutcome::Performed(Action::Speak));
    assert_eq!(
        targets(&session),
        vec![
            "ALMemory.subscribeToEvent",
            "ALMemory.unsubscribeToEvent",
            "ALTextToSpeech.say",
            "ALMemory.subscribeToEvent",
        ]
    );
    let s = session.borrow();
    let calls = &s.transport().brain.calls;
    assert_eq!(calls[0].args, vec![json!("TouchChanged"), json!("ReactToTouch"), json!("onTouched")]);
    assert_eq!(calls[1].args, vec![json!("TouchChanged"), json!("ReactToTouch")]);
    assert_eq!(calls[2].args, vec![json!("My arm has been touched")]);
}

#[test]
fn head_touch_writes_remote_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camImage.png");
    let mut robot = FakeRobot::new();
    robot.brain.set_image(RobotBrain::image(160, 120, 3));
    let session = fake_session(robot, Duration::from_secs(1));
    let mut d = assemble(&session, &path);
    d.arm(&mut RecordingSink::new()).unwrap();

    let out = deliver(&session, &mut d, json!([["Head", true]]));

    assert_eq!(out, DispatchOutcome::Performed(Action::Capture));
    assert_eq!(
        &targets(&session)[2..5],
        ["ALVideoDevice.subscribe", "ALVideoDevice.getImageRemote", "ALVideoDevice.unsubscribe"]
    );
    {
        let s = session.borrow();
        let calls = &s.transport().brain.calls;
        assert_eq!(calls[2].args, vec![json!("touchreact_GVM"), json!(0), json!(11), json!(5)]);
        assert_eq!(calls[3].args, vec![json!("touchreact_GVM_0")]);
        assert_eq!(calls[4].args, vec![json!("touchreact_GVM_0")]);
    }
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (160, 120));
}

#[test]
fn bumper_touch_walks_on_the_wire() {
    let dir = tempfile::tempdir().unwrap();
    let session = fake_session(FakeRobot::new(), Duration::from_secs(1));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    d.arm(&mut RecordingSink::new()).unwrap();

    let out = deliver(&session, &mut d, json!([["LFoot/Bumper/Right", true]]));

    assert_eq!(out, DispatchOutcome::Performed(Action::Walk));
    assert_eq!(
        &targets(&session)[2..6],
        [
            "ALMotion.wakeUp",
            "ALRobotPosture.goToPosture",
            "ALMotion.moveTo",
            "ALMotion.rest",
        ]
    );
    let s = session.borrow();
    let calls = &s.transport().brain.calls;
    assert_eq!(calls[3].args, vec![json!("StandInit"), json!(0.5)]);
    assert_eq!(calls[4].args, vec![json!(0.25), json!(0.0), json!(0.0)]);
}

#[test]
fn posture_not_reached_aborts_walk() {
    let dir = tempfile::tempdir().unwrap();
    let mut robot = FakeRobot::new();
    robot.brain.reply_with("ALRobotPosture.goToPosture", json!(false));
    let session = fake_session(robot, Duration::from_secs(1));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    d.arm(&mut RecordingSink::new()).unwrap();

    let out = deliver(&session, &mut d, json!([["RFoot/Bumper/Left", true]]));

    match out {
        DispatchOutcome::Failed(Action::Walk, e) => {
            assert_eq!(e.capability, Capability::Locomotion);
            assert_eq!(e.operation, "go_to_posture");
        }
        other => panic!("expected walk failure, got {other:?}"),
    }
    let t = targets(&session);
    assert!(!t.iter().any(|c| c == "ALMotion.moveTo"));
    assert_eq!(t.last().map(String::as_str), Some("ALMemory.subscribeToEvent"));
}

#[test]
fn remote_failure_is_contained() {
    let dir = tempfile::tempdir().unwrap();
    let mut robot = FakeRobot::new();
    robot.brain.fail("ALTextToSpeech.say");
    let session = fake_session(robot, Duration::from_secs(1));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    d.arm(&mut RecordingSink::new()).unwrap();

    let out = deliver(&session, &mut d, json!([["LArm", true]]));

    match out {
        DispatchOutcome::Failed(Action::Speak, e) => assert!(e.reason.contains("raised"), "{e}"),
        other => panic!("expected speech failure, got {other:?}"),
    }
    assert!(d.is_armed());
}

#[test]
fn unanswered_call_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut robot = FakeRobot::new();
    robot.brain.ignore("ALMotion.wakeUp");
    let session = fake_session(robot, Duration::from_millis(30));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    d.arm(&mut RecordingSink::new()).unwrap();

    let out = deliver(&session, &mut d, json!([["RFoot/Bumper/Right", true]]));

    match out {
        DispatchOutcome::Failed(Action::Walk, e) => assert_eq!(e.operation, "wake"),
        other => panic!("expected walk timeout, got {other:?}"),
    }
    assert!(d.is_armed());
}

#[test]
fn failed_subscription_leaves_dispatcher_disarmed() {
    let dir = tempfile::tempdir().unwrap();
    let mut robot = FakeRobot::new();
    robot.brain.fail("ALMemory.subscribeToEvent");
    let session = fake_session(robot, Duration::from_secs(1));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));

    assert!(d.arm(&mut RecordingSink::new()).is_err());
    assert_eq!(d.state(), DispatcherState::Disarmed);
}

#[test]
fn hang_up_is_reported_as_closed() {
    let session = fake_session(FakeRobot::new(), Duration::from_secs(1));
    session.borrow_mut().transport_mut().hang_up();

    assert!(matches!(session.borrow_mut().poll_event(), Err(SessionError::Closed)));
    assert!(session.borrow().is_closed());
}

#[test]
fn shutdown_unsubscribes_then_says_goodbye() {
    let dir = tempfile::tempdir().unwrap();
    let session = fake_session(FakeRobot::new(), Duration::from_secs(1));
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    let mut sink = RecordingSink::new();
    d.arm(&mut sink).unwrap();

    d.shutdown(&mut sink).unwrap();
    session.borrow_mut().close().unwrap();

    assert_eq!(
        targets(&session),
        vec!["ALMemory.subscribeToEvent", "ALMemory.unsubscribeToEvent"]
    );
    assert!(session.borrow().transport().brain.goodbye);
}

// ── Over a real socket ────────────────────────────────────────

/// Serve one connection: reply to calls, push one touch after the
/// subscription, stop at goodbye.  Returns the calls seen.
fn serve_once(listener: TcpListener, touch: Value) -> Vec<String> {
    let (mut stream, _) = listener.accept().unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut brain = RobotBrain::new();
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 4096];
    let mut pushed = false;

    while !brain.goodbye {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(e) => panic!("robot read failed: {e}"),
        };
        for payload in decoder.feed(&buf[..n]) {
            let msg: Outbound = serde_json::from_slice(&payload).unwrap();
            if let Some(reply) = brain.respond(msg) {
                stream.write_all(&frame(&reply)).unwrap();
            }
            if !pushed && brain.targets().last().map(String::as_str) == Some("ALMemory.subscribeToEvent") {
                pushed = true;
                let ev = Inbound::Event {
                    name: "TouchChanged".into(),
                    value: touch.clone(),
                };
                stream.write_all(&frame(&ev)).unwrap();
            }
        }
    }
    brain.targets()
}

#[test]
fn tcp_session_handles_one_touch() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let robot = thread::spawn(move || serve_once(listener, json!([["LArm", true]])));

    let transport = TcpTransport::connect(
        "127.0.0.1",
        port,
        Duration::from_secs(2),
        Duration::from_millis(20),
    )
    .unwrap();
    let session = Session::new(transport, Duration::from_secs(2)).into_shared();
    let dir = tempfile::tempdir().unwrap();
    let mut d = assemble(&session, &dir.path().join("camImage.png"));
    let mut sink = RecordingSink::new();
    d.arm(&mut sink).unwrap();

    let mut outcome = None;
    for _ in 0..100 {
        let next = session.borrow_mut().poll_event().unwrap();
        if let Some(ev) = next {
            outcome = Some(d.handle_payload(&ev.value, &mut sink));
            break;
        }
    }
    d.shutdown(&mut sink).unwrap();
    session.borrow_mut().close().unwrap();

    assert_eq!(outcome, Some(DispatchOutcome::Performed(Action::Speak)));
    assert_eq!(
        robot.join().unwrap(),
        vec![
            "ALMemory.subscribeToEvent",
            "ALMemory.unsubscribeToEvent",
            "ALTextToSpeech.say",
            "ALMemory.subscribeToEvent",
            "ALMemory.unsubscribeToEvent",
        ]
    );
}
