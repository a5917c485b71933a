use super::message::*;
use super::messenger::Messenger;
use super::node::Node;
use super::proposal::*;
use actix::{Actor, Addr, Context, Handler, MessageResponse};
use log::*;
use std::fmt;
use std::sync::Arc;

pub struct Acceptor {
    id: String,
    messenger: Arc<dyn Messenger>,
    highest_promised: Option<ProposalNumber>,
    highest_accepted: Option<Proposal>,
}

impl Actor for Acceptor {
    type Context = Context<Self>;
}

impl fmt::Debug for Acceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Acceptor({})", self.id)
    }
}

impl Acceptor {
    pub fn new(id: impl Into<String>, messenger: Arc<dyn Messenger>) -> Self {
        Acceptor {
            id: id.into(),
            messenger,
            highest_promised: None,
            highest_accepted: None,
        }
    }

    /// Start the actor and return its address along with the [`Node`] to
    /// register on the network.
    pub fn start_node(self) -> (Addr<Self>, Node) {
        let id = self.id.clone();
        let addr = self.start();
        (addr.clone(), Node::Acceptor { id, addr })
    }

    fn on_prepare(&mut self, from: &str, msg: Prepare) {
        if matches!(self.highest_promised, Some(promised) if promised >= msg.number) {
            info!("{:?}: x- {} from {}", self, Message::from(msg), from);
            return;
        }
        info!("{:?}: <- {} from {}", self, Message::from(msg), from);
        self.highest_promised = Some(msg.number);
        let promise = Promise {
            number: msg.number,
            highest_accepted: self.highest_accepted.clone(),
        };
        self.messenger.unicast(&self.id, from, promise.into());
    }

    fn on_accept(&mut self, from: &str, msg: Accept) {
        // equal to the promise is fine
        if matches!(self.highest_promised, Some(promised) if promised > msg.number) {
            info!("{:?}: x- {} from {}", self, Message::from(msg), from);
            return;
        }
        info!("{:?}: <- {} from {}", self, Message::from(msg.clone()), from);
        self.highest_accepted = Some(Proposal::new(msg.number, msg.value.clone()));
        self.messenger.broadcast_to_learners(&self.id, msg.into());
    }
}

impl Handler<Envelope> for Acceptor {
    type Result = ();

    fn handle(&mut self, envelope: Envelope, _ctx: &mut Self::Context) {
        let Envelope { from, message } = envelope;
        match message {
            Message::Prepare(msg) => self.on_prepare(&from, msg),
            Message::Accept(msg) => self.on_accept(&from, msg),
            other => debug!("{:?}: ignoring {} from {}", self, other, from),
        }
        trace!(
            "{:?}: promised {:?}, accepted {:?}",
            self,
            self.highest_promised,
            self.highest_accepted
        );
    }
}

#[derive(actix::Message, Debug)]
#[rtype(result = "AcceptorState")]
pub struct GetAcceptorState;

#[derive(MessageResponse, Debug, Clone, PartialEq, Eq)]
pub struct AcceptorState {
    pub highest_promised: Option<ProposalNumber>,
    pub highest_accepted: Option<Proposal>,
}

impl Handler<GetAcceptorState> for Acceptor {
    type Result = AcceptorState;

    fn handle(&mut self, _msg: GetAcceptorState, _ctx: &mut Self::Context) -> Self::Result {
        AcceptorState {
            highest_promised: self.highest_promised,
            highest_accepted: self.highest_accepted.clone(),
        }
    }
}
