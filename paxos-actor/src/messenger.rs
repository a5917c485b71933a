use super::message::*;
use super::node::*;
use ddrt::{ConfigError, Net, NetConfig};
use futures::future::{BoxFuture, FutureExt};
use log::*;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// How nodes talk to each other. Only used for sending; receiving goes
/// through [`Node::receive`].
pub trait Messenger: Send + Sync {
    fn add_nodes(&self, nodes: Vec<Node>);
    fn broadcast_to_all_acceptors(&self, from: &str, message: Message);
    /// Send to the named acceptors only. Unknown ids are skipped.
    fn broadcast_to_acceptors(&self, from: &str, acceptors: &[String], message: Message);
    fn broadcast_to_learners(&self, from: &str, decide: Decide);
    fn unicast(&self, from: &str, to: &str, message: Message);
    /// Resolves once every registered learner has decided.
    fn query_finished(&self) -> BoxFuture<'static, ()>;
}

#[derive(Default)]
struct Registry {
    nodes: HashMap<String, Node>,
    acceptors: HashMap<String, Node>,
    learners: HashMap<String, Node>,
}

/// In-process [`Messenger`] that delays and drops messages per [`NetConfig`].
pub struct Network {
    net: Net,
    registry: RwLock<Registry>,
}

impl Network {
    pub fn new(config: NetConfig) -> Result<Self, ConfigError> {
        Ok(Network {
            net: Net::new(config)?,
            registry: RwLock::default(),
        })
    }

    fn deliver(&self, from: &str, node: &Node, message: Message) {
        let route = format!("{} -{}-> {}", from, message, node.node_id());
        let from = from.to_owned();
        let node = node.clone();
        self.net.dispatch(route, move || node.receive(from, message));
    }
}

impl Messenger for Network {
    fn add_nodes(&self, nodes: Vec<Node>) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        for node in nodes {
            let id = node.node_id().to_owned();
            debug!("network: registered {:?}", node);
            match node.role() {
                Role::Acceptor => {
                    registry.acceptors.insert(id.clone(), node.clone());
                }
                Role::Learner => {
                    registry.learners.insert(id.clone(), node.clone());
                }
                Role::Proposer => {}
            }
            registry.nodes.insert(id, node);
        }
    }

    fn broadcast_to_all_acceptors(&self, from: &str, message: Message) {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        for acceptor in registry.acceptors.values() {
            self.deliver(from, acceptor, message.clone());
        }
    }

    fn broadcast_to_acceptors(&self, from: &str, acceptors: &[String], message: Message) {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        for id in acceptors {
            match registry.acceptors.get(id) {
                Some(acceptor) => self.deliver(from, acceptor, message.clone()),
                None => warn!("network: {} is not an acceptor, {} not sent", id, message),
            }
        }
    }

    fn broadcast_to_learners(&self, from: &str, decide: Decide) {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let message = Message::from(decide);
        for learner in registry.learners.values() {
            self.deliver(from, learner, message.clone());
        }
    }

    fn unicast(&self, from: &str, to: &str, message: Message) {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        match registry.nodes.get(to) {
            Some(node) => self.deliver(from, node, message),
            None => warn!("network: unknown node {}, {} not sent", to, message),
        }
    }

    fn query_finished(&self) -> BoxFuture<'static, ()> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let waiters: Vec<_> = registry
            .learners
            .values()
            .filter_map(|node| match node {
                Node::Learner { decided, .. } => Some(decided.clone()),
                _ => None,
            })
            .collect();
        ddrt::wait_all(waiters).boxed()
    }
}
