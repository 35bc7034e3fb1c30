//! TouchReact library.
//!
//! Exposes the dispatcher core, its port traits, and the adapters that
//! connect it to a robot session, so integration tests and other binaries
//! can assemble the same pieces with mock adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod touch;
