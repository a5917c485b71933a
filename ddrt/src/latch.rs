use async_channel::{Receiver, Sender};

/// Create a one-shot latch.
///
/// The latch is backed by a channel nobody ever sends on: firing closes it,
/// which wakes every waiter at once. Waiters hold a sender of their own, so
/// dropping the [`Trigger`] without firing leaves them waiting.
pub fn latch() -> (Trigger, Waiter) {
    let (tx, rx) = async_channel::bounded(1);
    let waiter = Waiter {
        rx,
        _open: tx.clone(),
    };
    (Trigger(tx), waiter)
}

/// The firing half of a [`latch`].
#[derive(Debug)]
pub struct Trigger(Sender<()>);

impl Trigger {
    /// Returns `true` only for the call that actually fired the latch.
    pub fn fire(&self) -> bool {
        self.0.close()
    }

    pub fn is_fired(&self) -> bool {
        self.0.is_closed()
    }
}

/// The waiting half of a [`latch`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Waiter {
    rx: Receiver<()>,
    _open: Sender<()>,
}

impl Waiter {
    pub async fn wait(&self) {
        // only ever returns Err(RecvError) once closed
        let _ = self.rx.recv().await;
    }

    pub fn is_fired(&self) -> bool {
        self.rx.is_closed()
    }
}

/// Resolves once every waiter has fired. Resolves immediately when empty.
pub async fn wait_all<I>(waiters: I)
where
    I: IntoIterator<Item = Waiter>,
{
    for waiter in waiters {
        waiter.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn fires_once() {
        let (trigger, waiter) = latch();
        assert!(!waiter.is_fired());
        assert!(trigger.fire());
        assert!(!trigger.fire());
        assert!(waiter.is_fired());
        waiter.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_trigger_does_not_fire() {
        let (trigger, waiter) = latch();
        drop(trigger);
        assert!(!waiter.is_fired());
        let pending = timeout(Duration::from_secs(1), waiter.wait()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn wakes_every_waiter() {
        let (trigger, waiter) = latch();
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let waiter = waiter.clone();
                tokio::spawn(async move { waiter.wait().await })
            })
            .collect();
        tokio::task::yield_now().await;
        trigger.fire();
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wait_all_needs_every_latch() {
        let (first, a) = latch();
        let (second, b) = latch();
        first.fire();

        let pending = timeout(Duration::from_millis(10), wait_all(vec![a.clone(), b.clone()])).await;
        assert!(pending.is_err());

        second.fire();
        wait_all(vec![a, b]).await;
    }

    #[tokio::test]
    async fn wait_all_of_nothing_is_ready() {
        wait_all(Vec::new()).await;
    }
}
