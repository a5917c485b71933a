use super::config::{ConfigError, NetConfig};
use log::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// What happened to one dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped,
}

/// Fault-injecting delivery scheduler.
///
/// Each dispatch becomes its own tokio task, so the sender never waits and
/// two messages to the same destination may arrive in either order.
pub struct Net {
    config: NetConfig,
    rng: Mutex<SmallRng>,
}

impl Net {
    pub fn new(config: NetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Net {
            config,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Schedule `deliver` to run after a random delay, unless the message is
    /// dropped. `route` only shows up in logs.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch<F>(&self, route: String, deliver: F) -> JoinHandle<Delivery>
    where
        F: FnOnce() + Send + 'static,
    {
        // drawn here rather than in the task so a seeded run is reproducible
        let (delay, dropped) = self.roll();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if dropped {
                debug!("{}: dropped", route);
                return Delivery::Dropped;
            }
            trace!("{}: delivered after {:?}", route, delay);
            deliver();
            Delivery::Delivered
        })
    }

    fn roll(&self) -> (Duration, bool) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let min = self.config.min_delay.as_micros() as u64;
        let max = self.config.max_delay.as_micros() as u64;
        let delay = Duration::from_micros(rng.gen_range(min..=max));
        let dropped = rng.gen_bool(self.config.drop_probability);
        (delay, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let make = move || -> Box<dyn FnOnce() + Send> {
            let c = c.clone();
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, make)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = NetConfig::default().with_drop_probability(2.0);
        assert!(matches!(
            Net::new(config),
            Err(ConfigError::DropProbability(_))
        ));
    }

    #[test]
    fn same_seed_same_faults() {
        let config = NetConfig::default()
            .with_drop_probability(0.5)
            .with_seed(7);
        let a = Net::new(config.clone()).unwrap();
        let b = Net::new(config).unwrap();
        let rolls_a: Vec<_> = (0..32).map(|_| a.roll()).collect();
        let rolls_b: Vec<_> = (0..32).map(|_| b.roll()).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn delays_stay_within_range() {
        let min = Duration::from_millis(5);
        let max = Duration::from_millis(8);
        let net = Net::new(NetConfig::default().with_delay(min, max).with_seed(1)).unwrap();
        for _ in 0..200 {
            let (delay, dropped) = net.roll();
            assert!(delay >= min && delay <= max, "{:?}", delay);
            assert!(!dropped);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_after_delay() {
        let delay = Duration::from_millis(50);
        let net = Net::new(NetConfig::reliable().with_delay(delay, delay)).unwrap();
        let (count, make) = counter();

        let start = Instant::now();
        let outcome = net.dispatch("a -> b".into(), make()).await.unwrap();

        assert_eq!(outcome, Delivery::Delivered);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn drops_everything_at_probability_one() {
        let net = Net::new(NetConfig::default().with_drop_probability(1.0)).unwrap();
        let (count, make) = counter();

        let handles: Vec<_> = (0..10)
            .map(|i| net.dispatch(format!("msg {}", i), make()))
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Delivery::Dropped);
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_does_not_block_sender() {
        let delay = Duration::from_secs(1);
        let net = Net::new(NetConfig::reliable().with_delay(delay, delay)).unwrap();
        let (count, make) = counter();

        let handle = net.dispatch("slow".into(), make());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        handle.await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
