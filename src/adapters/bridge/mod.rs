//! Robot session bridge.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Bridge Stack                          │
//! │                                                            │
//! │  ┌───────────┐   ┌──────────┐   ┌───────────────────────┐  │
//! │  │ Transport │──▶│  Codec   │──▶│  Session              │  │
//! │  │ (trait)   │   │ (framing)│   │  call · poll_event    │  │
//! │  └───────────┘   └──────────┘   └───────────────────────┘  │
//! │                                            │               │
//! │                       ┌────────────────────┘               │
//! │                       ▼                                    │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │ Proxies: Memory · Video · Speech · Motion (ports)    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod message;
pub mod proxies;
pub mod session;
pub mod transport;
