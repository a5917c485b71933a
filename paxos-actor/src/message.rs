use super::proposal::*;
use std::fmt;

/// Proposer -> acceptor: ask for a promise on `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prepare {
    pub number: ProposalNumber,
}

/// Acceptor -> proposer: promised `number`, and here is what I accepted
/// before, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promise {
    pub number: ProposalNumber,
    pub highest_accepted: Option<Proposal>,
}

/// Proposer -> acceptor: please accept `value` at `number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accept {
    pub number: ProposalNumber,
    pub value: String,
}

/// Acceptor -> learner: I accepted `value` at `number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decide {
    pub number: ProposalNumber,
    pub value: String,
}

impl From<Accept> for Decide {
    fn from(accept: Accept) -> Self {
        Decide {
            number: accept.number,
            value: accept.value,
        }
    }
}

impl From<Decide> for Proposal {
    fn from(decide: Decide) -> Self {
        Proposal::new(decide.number, decide.value)
    }
}

/// Every message a node can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Prepare(Prepare),
    Promise(Promise),
    Accept(Accept),
    Decide(Decide),
}

impl Message {
    pub fn number(&self) -> ProposalNumber {
        match self {
            Message::Prepare(m) => m.number,
            Message::Promise(m) => m.number,
            Message::Accept(m) => m.number,
            Message::Decide(m) => m.number,
        }
    }
}

impl From<Prepare> for Message {
    fn from(m: Prepare) -> Self {
        Message::Prepare(m)
    }
}

impl From<Promise> for Message {
    fn from(m: Promise) -> Self {
        Message::Promise(m)
    }
}

impl From<Accept> for Message {
    fn from(m: Accept) -> Self {
        Message::Accept(m)
    }
}

impl From<Decide> for Message {
    fn from(m: Decide) -> Self {
        Message::Decide(m)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Prepare(m) => write!(f, "Prepare({})", m.number),
            Message::Promise(Promise {
                number,
                highest_accepted: None,
            }) => write!(f, "Promise({})", number),
            Message::Promise(Promise {
                number,
                highest_accepted: Some(p),
            }) => write!(f, "Promise({}, {})", number, p),
            Message::Accept(m) => write!(f, "Accept({}, {})", m.number, m.value),
            Message::Decide(m) => write!(f, "Decide({}, {})", m.number, m.value),
        }
    }
}

/// A message in flight to one node, tagged with the sender's id.
#[derive(actix::Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Envelope {
    pub from: String,
    pub message: Message,
}

impl Envelope {
    pub fn new(from: impl Into<String>, message: impl Into<Message>) -> Self {
        Envelope {
            from: from.into(),
            message: message.into(),
        }
    }
}
