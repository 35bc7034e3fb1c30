//! Request/reply session over a framed transport.
//!
//! One session multiplexes two flows on the same channel:
//!
//! - **Calls**: [`Session::call`] sends a `call` frame and blocks until
//!   the reply with the same id arrives or the call timeout expires.
//! - **Events**: [`Session::poll_event`] returns the next `event` frame,
//!   or `None` if nothing arrived within one transport poll window.
//!
//! Events that arrive while a call is waiting for its reply are dropped.
//! The dispatcher unsubscribes before acting, so only stragglers land
//! there, and missed events are never replayed.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde_json::Value;

use crate::error::SessionError;

use super::codec::{FrameDecoder, encode_frame};
use super::message::{self, EventMessage, Inbound, Outbound};
use super::transport::Transport;

const READ_CHUNK: usize = 16 * 1024;

/// Session handle shared by the proxies.  The dispatcher runs on one
/// thread, so `Rc<RefCell<_>>` is enough.
pub type SharedSession<T> = Rc<RefCell<Session<T>>>;

pub struct Session<T> {
    transport: T,
    decoder: FrameDecoder,
    inbox: VecDeque<Inbound>,
    read_buf: Vec<u8>,
    next_id: u64,
    call_timeout: Duration,
    closed: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, call_timeout: Duration) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            inbox: VecDeque::new(),
            read_buf: vec![0; READ_CHUNK],
            next_id: 1,
            call_timeout,
            closed: false,
        }
    }

    /// Wrap into a [`SharedSession`].
    pub fn into_shared(self) -> SharedSession<T> {
        Rc::new(RefCell::new(self))
    }

    /// Invoke `service.method(args...)` and wait for its reply.
    pub fn call(&mut self, service: &str, method: &str, args: Vec<Value>) -> Result<Value, SessionError> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&Outbound::Call {
            id,
            service: service.to_string(),
            method: method.to_string(),
            args,
        })?;

        let deadline = Instant::now() + self.call_timeout;
        loop {
            match self.next_inbound()? {
                Some(Inbound::Reply { id: rid, value }) if rid == id => return Ok(value),
                Some(Inbound::Failure { id: rid, message }) if rid == id => {
                    return Err(SessionError::Remote(message));
                }
                Some(Inbound::Event { name, .. }) => {
                    debug!("Dropping '{}' delivered during {}.{}", name, service, method);
                }
                Some(stale) => debug!("Discarding stale message {:?}", stale),
                None => {}
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    service: service.to_string(),
                    method: method.to_string(),
                });
            }
        }
    }

    /// Next event delivery, or `None` if the poll window passed quietly.
    pub fn poll_event(&mut self) -> Result<Option<EventMessage>, SessionError> {
        loop {
            match self.next_inbound()? {
                Some(Inbound::Event { name, value }) => return Ok(Some(EventMessage { name, value })),
                Some(other) => debug!("Discarding unsolicited {:?}", other),
                None => return Ok(None),
            }
        }
    }

    /// Say goodbye and close the transport.  Idempotent.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        let goodbye = self.send(&Outbound::Goodbye);
        self.closed = true;
        self.inbox.clear();
        self.decoder.reset();
        self.transport.close()?;
        info!("Session closed");
        goodbye
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Internal ──────────────────────────────────────────────

    fn send(&mut self, msg: &Outbound) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        let payload = message::encode(msg)?;
        let frame = encode_frame(&payload)
            .ok_or_else(|| SessionError::Protocol(format!("{} byte message exceeds frame limit", payload.len())))?;
        self.transport.write_all(&frame)?;
        self.transport.flush()?;
        Ok(())
    }

    /// One decoded message, reading at most one transport chunk.
    fn next_inbound(&mut self) -> Result<Option<Inbound>, SessionError> {
        if let Some(msg) = self.inbox.pop_front() {
            return Ok(Some(msg));
        }
        if self.closed {
            return Err(SessionError::Closed);
        }

        let n = match self.transport.read(&mut self.read_buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.closed = true;
                return Err(SessionError::Closed);
            }
            Err(e) => return Err(SessionError::Io(e)),
        };
        if n == 0 {
            return Ok(None);
        }

        let rejected = self.decoder.rejected();
        for frame in self.decoder.feed(&self.read_buf[..n]) {
            match message::decode(&frame) {
                Ok(msg) => self.inbox.push_back(msg),
                Err(e) => warn!("Discarding undecodable frame: {}", e),
            }
        }
        if self.decoder.rejected() > rejected {
            warn!("Skipped {} invalid frame(s)", self.decoder.rejected() - rejected);
        }
        Ok(self.inbox.pop_front())
    }
}
