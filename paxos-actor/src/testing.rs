//! Test helpers shared by the role modules.

use crate::message::*;
use crate::messenger::Messenger;
use crate::node::Node;
use actix::Recipient;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Mutex;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One call made on a [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    AllAcceptors { from: String, message: Message },
    Acceptors { from: String, to: Vec<String>, message: Message },
    Learners { from: String, decide: Decide },
    Unicast { from: String, to: String, message: Message },
}

/// Messenger that records sends instead of delivering them.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

impl Messenger for RecordingMessenger {
    fn add_nodes(&self, _nodes: Vec<Node>) {}

    fn broadcast_to_all_acceptors(&self, from: &str, message: Message) {
        self.record(Sent::AllAcceptors {
            from: from.to_owned(),
            message,
        });
    }

    fn broadcast_to_acceptors(&self, from: &str, acceptors: &[String], message: Message) {
        self.record(Sent::Acceptors {
            from: from.to_owned(),
            to: acceptors.to_vec(),
            message,
        });
    }

    fn broadcast_to_learners(&self, from: &str, decide: Decide) {
        self.record(Sent::Learners {
            from: from.to_owned(),
            decide,
        });
    }

    fn unicast(&self, from: &str, to: &str, message: Message) {
        self.record(Sent::Unicast {
            from: from.to_owned(),
            to: to.to_owned(),
            message,
        });
    }

    fn query_finished(&self) -> BoxFuture<'static, ()> {
        futures::future::pending().boxed()
    }
}

/// Deliver `message` and wait until the node has handled it.
pub async fn deliver(to: &Recipient<Envelope>, from: &str, message: impl Into<Message>) {
    to.send(Envelope::new(from, message))
        .await
        .expect("mailbox closed");
}
