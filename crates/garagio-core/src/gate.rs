// ── Manual refresh gate ──
//
// Single-permit wake signal: a door command signals it to end the poll
// loop's current wait early. Built on `tokio::sync::Notify`, which
// stores at most one permit — exactly the buffered capacity-1 signal
// this needs, with idempotent arming for free.

use std::time::Duration;

use tokio::sync::Notify;

/// Lets one task wake the poll loop out of its interval wait.
///
/// Constructed armed: the first wait of a session returns immediately,
/// so the first poll happens at once instead of after a full interval.
#[derive(Debug)]
pub struct RefreshGate {
    notify: Notify,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        let notify = Notify::new();
        notify.notify_one();
        Self { notify }
    }

    /// Arm the gate. Idempotent: signaling an already-armed gate is a
    /// no-op, never an error. Two signals before a wait wake exactly one.
    pub fn signal(&self) {
        self.notify.notify_one();
    }

    /// Wait until the gate is signaled or `timeout` elapses, whichever
    /// comes first. A signal consumes the permit; a timeout does not, and
    /// is not an error.
    pub async fn wait_or_timeout(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    const LONG: Duration = Duration::from_secs(600);

    #[tokio::test(start_paused = true)]
    async fn starts_armed_so_first_wait_returns_immediately() {
        let gate = RefreshGate::new();

        let before = Instant::now();
        gate.wait_or_timeout(LONG).await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_before_wait_persists() {
        let gate = RefreshGate::new();
        gate.wait_or_timeout(LONG).await;

        gate.signal();
        let before = Instant::now();
        gate.wait_or_timeout(LONG).await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn double_signal_wakes_exactly_one_wait() {
        let gate = RefreshGate::new();
        gate.wait_or_timeout(LONG).await;

        gate.signal();
        gate.signal();

        let before = Instant::now();
        gate.wait_or_timeout(LONG).await;
        assert_eq!(Instant::now(), before);

        // the second wait has no permit left and must run out the clock
        let before = Instant::now();
        gate.wait_or_timeout(Duration::from_secs(5)).await;
        assert_eq!(Instant::now() - before, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_ends_the_wait_without_consuming_a_later_signal() {
        let gate = RefreshGate::new();
        gate.wait_or_timeout(LONG).await;

        let before = Instant::now();
        gate.wait_or_timeout(Duration::from_secs(30)).await;
        assert_eq!(Instant::now() - before, Duration::from_secs(30));

        gate.signal();
        let before = Instant::now();
        gate.wait_or_timeout(LONG).await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_mid_wait_ends_it_early() {
        let gate = std::sync::Arc::new(RefreshGate::new());
        gate.wait_or_timeout(LONG).await;

        let waiter = {
            let gate = std::sync::Arc::clone(&gate);
            tokio::spawn(async move {
                let before = Instant::now();
                gate.wait_or_timeout(LONG).await;
                Instant::now() - before
            })
        };

        tokio::time::sleep(Duration::from_secs(7)).await;
        gate.signal();

        let waited = waiter.await.expect("waiter task");
        assert_eq!(waited, Duration::from_secs(7));
    }
}
