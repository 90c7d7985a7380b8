//! Periodic sweep closing out bookings nobody acted on.
//!
//! Each pass:
//! 1. completes active bookings whose window has ended and credits the
//!    partner and staff ledgers;
//! 2. retries credits still owed on completed, paid bookings;
//! 3. cancels waiting bookings whose payment deadline has passed.
//!
//! Rows are processed independently: a failure is logged and counted, and
//! the pass moves on. Every step is idempotent, so overlapping sweeps or a
//! sweep racing a manual action never double-credit.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{sync::watch, time::MissedTickBehavior};
use uuid::Uuid;

use crate::{Actor, Engine, EngineError, ResultEngine};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub completed: usize,
    pub credited: usize,
    pub expired: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    engine: Arc<Engine>,
    interval: Duration,
}

/// Lost races show up as `IllegalTransition`; someone else already did the work.
fn is_lost_race(err: &EngineError) -> bool {
    matches!(err, EngineError::IllegalTransition(_))
}

impl Reconciler {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            interval: DEFAULT_INTERVAL,
        }
    }

    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs one pass. Only a failure to list candidates is returned as an error.
    pub async fn sweep(&self) -> ResultEngine<SweepReport> {
        let mut report = SweepReport::default();
        let now = self.engine.local_now();

        for booking_id in self.engine.overdue_active_bookings(now).await? {
            match self.engine.complete_booking(booking_id, Actor::System).await {
                Ok(completion) => {
                    report.completed += 1;
                    report.credited += usize::from(completion.partner_credit.is_some())
                        + usize::from(completion.staff_credit.is_some());
                }
                Err(err) if is_lost_race(&err) => {
                    tracing::debug!(%booking_id, %err, "booking already closed");
                }
                Err(err) => self.record_failure(&mut report, booking_id, "complete", &err),
            }
        }

        for booking_id in self.engine.uncredited_completed_bookings().await? {
            match self.engine.credit_for_booking(booking_id).await {
                Ok(op) => report.credited += usize::from(op.is_some()),
                Err(err) => self.record_failure(&mut report, booking_id, "credit partner", &err),
            }
            match self.engine.credit_staff_for_booking(booking_id).await {
                Ok(op) => report.credited += usize::from(op.is_some()),
                Err(err) => self.record_failure(&mut report, booking_id, "credit staff", &err),
            }
        }

        for booking_id in self.engine.expired_unpaid_bookings(now).await? {
            match self.engine.cancel_booking(booking_id, Actor::System).await {
                Ok(()) => report.expired += 1,
                Err(err) if is_lost_race(&err) => {
                    tracing::debug!(%booking_id, %err, "booking left waiting state");
                }
                Err(err) => self.record_failure(&mut report, booking_id, "expire", &err),
            }
        }

        Ok(report)
    }

    fn record_failure(
        &self,
        report: &mut SweepReport,
        booking_id: Uuid,
        step: &str,
        err: &EngineError,
    ) {
        report.failed += 1;
        tracing::error!(%booking_id, step, %err, "reconciler step failed");
    }

    /// Sweeps every `interval` until `shutdown` flips to `true` or its sender drops.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.interval.as_secs(), "reconciler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => match self.sweep().await {
                    Ok(report) if report.is_empty() => tracing::debug!("sweep found nothing"),
                    Ok(report) => tracing::info!(
                        completed = report.completed,
                        credited = report.credited,
                        expired = report.expired,
                        failed = report.failed,
                        "sweep finished"
                    ),
                    Err(err) => tracing::error!(%err, "sweep failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("reconciler stopped");
    }
}
