//! Deterministic Distributed system RunTime.
//!
//! Plumbing for running a set of in-process nodes over a network that loses
//! and delays messages. Nothing here knows about any particular protocol:
//! [`Net`] schedules deliveries, [`NetConfig`] describes how unreliable the
//! network is, and [`latch`] gives a one-shot "done" signal many tasks can
//! wait on.

mod config;
mod latch;
mod net;

pub use self::config::*;
pub use self::latch::*;
pub use self::net::*;
