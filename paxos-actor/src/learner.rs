use super::message::*;
use super::node::Node;
use super::proposal::*;
use actix::{Actor, Addr, Context, Handler, MessageResponse, MessageResult};
use ddrt::{Trigger, Waiter};
use log::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Counts acceptor votes and decides once one number has a quorum.
pub struct Learner {
    id: String,
    quorum: usize,
    /// acceptor id -> the latest proposal it reported
    votes: HashMap<String, Proposal>,
    /// number -> acceptors whose latest vote is that number
    tally: BTreeMap<ProposalNumber, BTreeSet<String>>,
    result: Option<Proposal>,
    decided: Trigger,
    waiter: Waiter,
}

impl Actor for Learner {
    type Context = Context<Self>;
}

impl fmt::Debug for Learner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Learner({})", self.id)
    }
}

impl Learner {
    pub fn new(id: impl Into<String>, quorum: usize) -> Self {
        let (decided, waiter) = ddrt::latch();
        Learner {
            id: id.into(),
            quorum,
            votes: HashMap::new(),
            tally: BTreeMap::new(),
            result: None,
            decided,
            waiter,
        }
    }

    /// Fires once this learner has a result.
    pub fn decided(&self) -> Waiter {
        self.waiter.clone()
    }

    pub fn start_node(self) -> (Addr<Self>, Node) {
        let id = self.id.clone();
        let decided = self.decided();
        let addr = self.start();
        (
            addr.clone(),
            Node::Learner {
                id,
                addr,
                decided,
            },
        )
    }

    fn on_decide(&mut self, from: String, msg: Decide) {
        if self.result.is_some() {
            debug!("{:?}: finished, ignoring Decide({}) from {}", self, msg.number, from);
            return;
        }
        if let Some(previous) = self.votes.get(&from) {
            if previous.number >= msg.number {
                debug!("{:?}: x- Decide({}) from {}, has {}", self, msg.number, from, previous);
                return;
            }
            let previous = previous.number;
            if let Some(voters) = self.tally.get_mut(&previous) {
                voters.remove(&from);
                if voters.is_empty() {
                    self.tally.remove(&previous);
                }
            }
        }

        info!("{:?}: <- {} from {}", self, Message::from(msg.clone()), from);
        let proposal = Proposal::from(msg);
        self.votes.insert(from.clone(), proposal.clone());
        let voters = self.tally.entry(proposal.number).or_default();
        voters.insert(from);
        if voters.len() == self.quorum {
            self.finish(proposal);
        }
    }

    fn finish(&mut self, proposal: Proposal) {
        info!("{:?}: decided {}", self, proposal);
        self.result = Some(proposal);
        let fired = self.decided.fire();
        debug_assert!(fired, "{:?} signalled completion twice", self);
    }
}

impl Handler<Envelope> for Learner {
    type Result = ();

    fn handle(&mut self, envelope: Envelope, _ctx: &mut Self::Context) {
        let Envelope { from, message } = envelope;
        match message {
            Message::Decide(msg) => self.on_decide(from, msg),
            other => debug!("{:?}: ignoring {} from {}", self, other, from),
        }
    }
}

#[derive(actix::Message, Debug)]
#[rtype(result = "Option<Proposal>")]
pub struct GetDecision;

impl Handler<GetDecision> for Learner {
    type Result = MessageResult<GetDecision>;

    fn handle(&mut self, _msg: GetDecision, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.result.clone())
    }
}

#[derive(actix::Message, Debug)]
#[rtype(result = "LearnerState")]
pub struct GetLearnerState;

#[derive(MessageResponse, Debug, Clone, PartialEq, Eq)]
pub struct LearnerState {
    pub votes: HashMap<String, Proposal>,
    pub tally: BTreeMap<ProposalNumber, BTreeSet<String>>,
    pub result: Option<Proposal>,
}

impl LearnerState {
    pub fn finished(&self) -> bool {
        self.result.is_some()
    }
}

impl Handler<GetLearnerState> for Learner {
    type Result = LearnerState;

    fn handle(&mut self, _msg: GetLearnerState, _ctx: &mut Self::Context) -> Self::Result {
        LearnerState {
            votes: self.votes.clone(),
            tally: self.tally.clone(),
            result: self.result.clone(),
        }
    }
}
