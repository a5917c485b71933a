use super::acceptor::Acceptor;
use super::learner::Learner;
use super::message::*;
use super::proposer::Proposer;
use actix::Addr;
use ddrt::Waiter;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Proposer,
    Acceptor,
    Learner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Proposer => "proposer",
            Role::Acceptor => "acceptor",
            Role::Learner => "learner",
        };
        f.write_str(name)
    }
}

/// A running node, as the network sees it.
#[derive(Clone)]
pub enum Node {
    Proposer {
        id: String,
        addr: Addr<Proposer>,
    },
    Acceptor {
        id: String,
        addr: Addr<Acceptor>,
    },
    Learner {
        id: String,
        addr: Addr<Learner>,
        /// Fires once this learner has decided.
        decided: Waiter,
    },
}

impl Node {
    pub fn role(&self) -> Role {
        match self {
            Node::Proposer { .. } => Role::Proposer,
            Node::Acceptor { .. } => Role::Acceptor,
            Node::Learner { .. } => Role::Learner,
        }
    }

    pub fn node_id(&self) -> &str {
        match self {
            Node::Proposer { id, .. } | Node::Acceptor { id, .. } | Node::Learner { id, .. } => id,
        }
    }

    /// Hand `message` to the node's mailbox. Never blocks.
    pub fn receive(&self, from: String, message: Message) {
        let envelope = Envelope { from, message };
        match self {
            Node::Proposer { addr, .. } => addr.do_send(envelope),
            Node::Acceptor { addr, .. } => addr.do_send(envelope),
            Node::Learner { addr, .. } => addr.do_send(envelope),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}, {})", self.role(), self.node_id())
    }
}
