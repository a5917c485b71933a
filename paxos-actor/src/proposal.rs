use std::fmt;

/// Round number. Higher numbers win.
pub type ProposalNumber = i64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proposal {
    pub number: ProposalNumber,
    pub value: String,
}

impl Proposal {
    pub fn new(number: ProposalNumber, value: impl Into<String>) -> Self {
        Proposal {
            number,
            value: value.into(),
        }
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proposal({}, {})", self.number, self.value)
    }
}
