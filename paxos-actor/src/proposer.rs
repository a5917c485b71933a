use super::message::*;
use super::messenger::Messenger;
use super::node::Node;
use super::number::ProposalNumbering;
use super::proposal::*;
use actix::prelude::{
    Actor, ActorFutureExt, Addr, AsyncContext, Context, Handler, ResponseActFuture, SpawnHandle,
    WrapFuture,
};
use actix::MessageResult;
use log::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// State of the round currently in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub number: ProposalNumber,
    /// Acceptors that promised `number`, in arrival order.
    pub promised: Vec<String>,
    /// Highest previously accepted proposal reported in those promises.
    pub highest_accepted: Option<Proposal>,
}

impl Round {
    fn new(number: ProposalNumber) -> Self {
        Round {
            number,
            promised: Vec::new(),
            highest_accepted: None,
        }
    }
}

pub struct Proposer {
    id: String,
    quorum: usize,
    messenger: Arc<dyn Messenger>,
    numbering: Box<dyn ProposalNumbering>,
    jitter: (Duration, Duration),
    rng: SmallRng,

    value: Option<String>,
    round_interval: Duration,
    proposing: bool,
    timer: Option<SpawnHandle>,
    round: Option<Round>,
}

impl Actor for Proposer {
    type Context = Context<Self>;
}

impl fmt::Debug for Proposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proposer({})", self.id)
    }
}

impl Proposer {
    pub fn new(
        id: impl Into<String>,
        quorum: usize,
        messenger: Arc<dyn Messenger>,
        numbering: impl ProposalNumbering + 'static,
    ) -> Proposer {
        Proposer {
            id: id.into(),
            quorum,
            messenger,
            numbering: Box::new(numbering),
            jitter: (Duration::from_millis(100), Duration::from_millis(200)),
            rng: SmallRng::from_entropy(),
            value: None,
            round_interval: Duration::ZERO,
            proposing: false,
            timer: None,
            round: None,
        }
    }

    /// Extra random wait before each round, to keep competing proposers
    /// from running in lockstep.
    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        self.jitter = (min.min(max), min.max(max));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn start_node(self) -> (Addr<Self>, Node) {
        let id = self.id.clone();
        let addr = self.start();
        (addr.clone(), Node::Proposer { id, addr })
    }

    fn schedule_round(&mut self, ctx: &mut Context<Self>) {
        if let Some(timer) = self.timer.take() {
            ctx.cancel_future(timer);
        }
        let (min, max) = self.jitter;
        let jitter = Duration::from_micros(
            self.rng
                .gen_range(min.as_micros() as u64..=max.as_micros() as u64),
        );
        self.timer = Some(ctx.notify_later(NewRound, self.round_interval + jitter));
    }

    fn start_round(&mut self) {
        let last = self.round.as_ref().map_or(0, |round| round.number);
        let number = self.numbering.next(last);
        self.round = Some(Round::new(number));
        let prepare = Message::from(Prepare { number });
        info!("{:?}: => {}", self, prepare);
        self.messenger.broadcast_to_all_acceptors(&self.id, prepare);
    }

    fn on_promise(&mut self, from: String, msg: Promise) {
        let round = match self.round.as_mut() {
            Some(round) if round.number == msg.number => round,
            _ => {
                debug!("Proposer({}): stale {} from {}", self.id, Message::from(msg), from);
                return;
            }
        };
        if round.promised.contains(&from) {
            return;
        }
        round.promised.push(from);
        if let Some(accepted) = msg.highest_accepted {
            let higher = round
                .highest_accepted
                .as_ref()
                .map_or(true, |seen| seen.number < accepted.number);
            if higher {
                round.highest_accepted = Some(accepted);
            }
        }
        if round.promised.len() != self.quorum {
            return;
        }

        // a value some acceptor may already have chosen takes precedence
        let value = match (&round.highest_accepted, &self.value) {
            (Some(accepted), _) => accepted.value.clone(),
            (None, Some(own)) => own.clone(),
            (None, None) => {
                warn!("Proposer({}): quorum for {} but nothing to propose", self.id, msg.number);
                return;
            }
        };
        let accept = Message::from(Accept {
            number: round.number,
            value,
        });
        let acceptors = round.promised.clone();
        info!("{:?}: => {} to {:?}", self, accept, acceptors);
        self.messenger
            .broadcast_to_acceptors(&self.id, &acceptors, accept);
    }

    fn finish(&mut self, ctx: &mut Context<Self>) {
        info!("{:?}: finished", self);
        self.proposing = false;
        if let Some(timer) = self.timer.take() {
            ctx.cancel_future(timer);
        }
    }
}

/// Propose `value`, retrying every `round_interval` (plus jitter) until
/// every learner has decided.
///
/// The response arrives only once the protocol run is over. A learner that
/// stops before deciding keeps it pending.
#[derive(actix::Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Propose {
    pub value: String,
    pub round_interval: Duration,
}

impl Propose {
    pub fn new(value: impl Into<String>, round_interval: Duration) -> Self {
        Propose {
            value: value.into(),
            round_interval,
        }
    }
}

impl Handler<Propose> for Proposer {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, msg: Propose, ctx: &mut Self::Context) -> Self::Result {
        info!(
            "{:?}: proposing {:?} every {:?}",
            self, msg.value, msg.round_interval
        );
        self.value = Some(msg.value);
        self.round_interval = msg.round_interval;
        self.proposing = true;
        self.schedule_round(ctx);

        let finished = self.messenger.query_finished();
        Box::pin(
            finished
                .into_actor(self)
                .map(|(), act, ctx| act.finish(ctx)),
        )
    }
}

/// Abandon the current round and start a new one. Sent by the round timer.
#[derive(actix::Message, Debug)]
#[rtype(result = "()")]
pub struct NewRound;

impl Handler<NewRound> for Proposer {
    type Result = ();

    fn handle(&mut self, _msg: NewRound, ctx: &mut Self::Context) {
        self.start_round();
        if self.proposing {
            self.schedule_round(ctx);
        }
    }
}

impl Handler<Envelope> for Proposer {
    type Result = ();

    fn handle(&mut self, envelope: Envelope, _ctx: &mut Self::Context) {
        let Envelope { from, message } = envelope;
        match message {
            Message::Promise(msg) => {
                info!("{:?}: <- {} from {}", self, Message::from(msg.clone()), from);
                self.on_promise(from, msg)
            }
            other => debug!("{:?}: ignoring {} from {}", self, other, from),
        }
    }
}

#[derive(actix::Message, Debug)]
#[rtype(result = "Option<Round>")]
pub struct GetRound;

impl Handler<GetRound> for Proposer {
    type Result = MessageResult<GetRound>;

    fn handle(&mut self, _msg: GetRound, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.round.clone())
    }
}
