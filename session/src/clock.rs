use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use crate::TurnPhase;

/// Proof that a delay was requested while `phase` was current.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerToken {
    epoch: u64,
    phase: TurnPhase,
}

impl TimerToken {
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerOutcome {
    Elapsed,
    /// The phase moved on or the clock was cancelled first.
    Stale,
}

impl TimerOutcome {
    pub const fn is_stale(self) -> bool {
        matches!(self, Self::Stale)
    }
}

#[derive(Debug, Default)]
struct ClockInner {
    epoch: AtomicU64,
    bumped: Notify,
}

/// Epoch counter shared between the machine and anyone allowed to cancel it.
///
/// Every phase entry and every `cancel` bumps the epoch, which invalidates all
/// tokens issued before.
#[derive(Clone, Debug, Default)]
pub struct PhaseClock {
    inner: Arc<ClockInner>,
}

impl PhaseClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, phase: TurnPhase) -> TimerToken {
        let epoch = self.bump();
        TimerToken { epoch, phase }
    }

    pub fn cancel(&self) {
        let epoch = self.bump();
        log::debug!("Phase clock cancelled at epoch {}", epoch);
    }

    pub fn is_current(&self, token: TimerToken) -> bool {
        self.inner.epoch.load(Ordering::Acquire) == token.epoch
    }

    fn bump(&self) -> u64 {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.bumped.notify_waiters();
        epoch
    }

    /// Resolves once `token` is no longer current.
    pub async fn invalidated(&self, token: TimerToken) {
        loop {
            let bumped = self.inner.bumped.notified();
            if !self.is_current(token) {
                return;
            }
            bumped.await;
        }
    }

    pub async fn delay(&self, token: TimerToken, duration: Duration) -> TimerOutcome {
        tokio::select! {
            biased;
            () = self.invalidated(token) => {
                log::warn!("Dropping stale {:?} timer", token.phase);
                TimerOutcome::Stale
            }
            () = tokio::time::sleep(duration) => {
                if self.is_current(token) {
                    TimerOutcome::Elapsed
                } else {
                    TimerOutcome::Stale
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn current_token_elapses() {
        let clock = PhaseClock::new();
        let token = clock.advance(TurnPhase::PlayerActionResolving);

        let outcome = clock.delay(token, Duration::from_millis(400)).await;

        assert_eq!(outcome, TimerOutcome::Elapsed);
        assert_eq!(token.phase(), TurnPhase::PlayerActionResolving);
    }

    #[tokio::test(start_paused = true)]
    async fn later_phase_invalidates_token() {
        let clock = PhaseClock::new();
        let old = clock.advance(TurnPhase::PlayerActionResolving);
        let new = clock.advance(TurnPhase::OpponentThinking);

        assert!(!clock.is_current(old));
        assert!(clock.is_current(new));
        assert_eq!(
            clock.delay(old, Duration::from_secs(1)).await,
            TimerOutcome::Stale
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_wakes_pending_delay() {
        let clock = PhaseClock::new();
        let token = clock.advance(TurnPhase::OpponentActionPendingReveal);
        let canceller = clock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let started = tokio::time::Instant::now();
        let outcome = clock.delay(token, Duration::from_secs(60)).await;

        assert!(outcome.is_stale());
        assert!(started.elapsed() < Duration::from_secs(60));
    }
}
