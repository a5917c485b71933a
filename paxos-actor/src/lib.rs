//! Single-decree Paxos between actix actors over a lossy in-process network.
//!
//! Wire a [`Network`] with some [`Proposer`]s, [`Acceptor`]s and
//! [`Learner`]s (each `start_node()` gives the [`Node`] to register), then
//! send [`Propose`] to a proposer. It answers once every learner has decided.

mod acceptor;
pub mod codec;
mod learner;
mod message;
mod messenger;
mod node;
mod number;
mod proposal;
mod proposer;
#[cfg(test)]
mod testing;

pub use self::acceptor::*;
pub use self::learner::*;
pub use self::message::*;
pub use self::messenger::*;
pub use self::node::*;
pub use self::number::*;
pub use self::proposal::*;
pub use self::proposer::*;
pub use ddrt::{ConfigError, NetConfig};
