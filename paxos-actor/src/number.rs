use super::proposal::ProposalNumber;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where a proposer gets the number for its next round.
pub trait ProposalNumbering: Send {
    /// `last` is the number of the previous round, 0 before the first one.
    fn next(&mut self, last: ProposalNumber) -> ProposalNumber;
}

/// Wall-clock milliseconds.
///
/// Not monotonic under clock skew, and two proposers asking in the same
/// millisecond get the same number.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampNumbering;

impl ProposalNumbering for TimestampNumbering {
    fn next(&mut self, _last: ProposalNumber) -> ProposalNumber {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as ProposalNumber)
            .unwrap_or_default()
    }
}

/// `start`, then `last + step` after that.
///
/// Proposer `i` of `k` using `start = i + 1, step = k` never collides with
/// the others.
#[derive(Debug, Clone, Copy)]
pub struct CounterNumbering {
    start: ProposalNumber,
    step: ProposalNumber,
}

impl CounterNumbering {
    pub fn new(start: ProposalNumber, step: ProposalNumber) -> Self {
        CounterNumbering {
            start,
            step: step.max(1),
        }
    }
}

impl Default for CounterNumbering {
    fn default() -> Self {
        CounterNumbering::new(1, 1)
    }
}

impl ProposalNumbering for CounterNumbering {
    fn next(&mut self, last: ProposalNumber) -> ProposalNumber {
        if last < self.start {
            self.start
        } else {
            last + self.step
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn timestamps_do_not_go_backwards() {
        let mut numbering = TimestampNumbering;
        let first = numbering.next(0);
        let second = numbering.next(first);
        assert!(first > 0);
        assert!(second >= first);
    }

    #[test]
    fn counters_are_disjoint_across_proposers() {
        let mut seen = HashSet::new();
        for i in 0..3 {
            let mut numbering = CounterNumbering::new(i + 1, 3);
            let mut last = 0;
            for _ in 0..10 {
                let next = numbering.next(last);
                assert!(next > last);
                assert!(seen.insert(next), "duplicate number {}", next);
                last = next;
            }
        }
    }

    #[test]
    fn counter_continues_from_last() {
        let mut numbering = CounterNumbering::default();
        assert_eq!(numbering.next(0), 1);
        assert_eq!(numbering.next(1), 2);
        assert_eq!(numbering.next(41), 42);
    }
}
