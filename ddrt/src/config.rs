use std::time::Duration;
use thiserror::Error;

/// Errors from validating a [`NetConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("drop probability {0} is outside [0, 1]")]
    DropProbability(f64),
    #[error("delay range {min:?}..={max:?} is empty")]
    DelayRange { min: Duration, max: Duration },
}

/// How unreliable the network is.
///
/// Every message independently waits a delay drawn uniformly from
/// `min_delay..=max_delay`, then is dropped with `drop_probability`.
#[derive(Debug, Clone, PartialEq)]
pub struct NetConfig {
    pub drop_probability: f64,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Seed for the delay/drop draws. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            drop_probability: 0.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::from_millis(99),
            seed: None,
        }
    }
}

impl NetConfig {
    /// No drops, no delay.
    pub fn reliable() -> Self {
        NetConfig {
            max_delay: Duration::ZERO,
            ..NetConfig::default()
        }
    }

    pub fn with_drop_probability(mut self, probability: f64) -> Self {
        self.drop_probability = probability;
        self
    }

    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // written this way round so NaN is rejected too
        if !(0.0..=1.0).contains(&self.drop_probability) {
            return Err(ConfigError::DropProbability(self.drop_probability));
        }
        if self.min_delay > self.max_delay {
            return Err(ConfigError::DelayRange {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(NetConfig::default().validate(), Ok(()));
        assert_eq!(NetConfig::reliable().validate(), Ok(()));
    }

    #[test]
    fn rejects_probability_out_of_range() {
        for p in [-0.1, 1.01, f64::NAN] {
            let err = NetConfig::default()
                .with_drop_probability(p)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ConfigError::DropProbability(_)), "{}", p);
        }
        assert!(NetConfig::default()
            .with_drop_probability(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_inverted_delay_range() {
        let config = NetConfig::default()
            .with_delay(Duration::from_millis(10), Duration::from_millis(5));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DelayRange {
                min: Duration::from_millis(10),
                max: Duration::from_millis(5),
            })
        );
    }
}
