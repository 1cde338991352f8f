//! Persistence adapter: debounced per-plan save and load-on-open.
//!
//! DESIGN
//! ======
//! Every scene change replaces the pending snapshot and pushes the deadline
//! out by the debounce window. Nothing is written until a deadline passes with
//! no further change, so a drag or a burst of keystrokes becomes one write.
//! Time is passed in by the caller (`tokio::time::Instant`), which keeps the
//! adapter a plain state machine; [`PersistenceAdapter::settle`] is the async
//! driver that sleeps until the deadline.
//!
//! A snapshot taken while a focus dim is on screen is not a settled scene.
//! The caller says so by scheduling it with [`PersistenceAdapter::schedule_during_effect`].
//! When such a snapshot comes due with any element below the transient
//! opacity threshold the write is skipped outright; the change that ends the
//! effect schedules the next save. Low opacity on its own is user styling and
//! is written like any other change.
//!
//! ERROR HANDLING
//! ==============
//! Load failures (I/O or undecodable JSON) are logged and reported as "no
//! data", so the plan opens empty instead of blocking the editor. Write
//! failures are logged and reported as [`SaveOutcome::Failed`]; the next
//! change retries.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::consts::{DEFAULT_NAMESPACE, SAVE_DEBOUNCE_MS, TRANSIENT_OPACITY_THRESHOLD};
use crate::scene::PersistedPlan;
use crate::storage::{PlanStorage, StorageError, load_json, plan_key, save_json};

/// Tuning for the persistence adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceConfig {
    /// Key namespace, as in `"<namespace>-floor-<planId>"`.
    pub namespace: String,
    /// Quiet period before a pending save is written.
    pub debounce: Duration,
    /// Snapshots with any element below this opacity are not written.
    pub transient_opacity: f64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            debounce: Duration::from_millis(SAVE_DEBOUNCE_MS),
            transient_opacity: TRANSIENT_OPACITY_THRESHOLD,
        }
    }
}

/// What a flush attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing was pending.
    Idle,
    /// A save is pending but its deadline has not passed.
    NotDue,
    /// The snapshot was written.
    Written,
    /// The snapshot was mid-effect and was dropped unwritten.
    Skipped,
    /// The storage write failed.
    Failed,
}

#[derive(Debug, Clone)]
struct PendingSave {
    plan_id: String,
    snapshot: PersistedPlan,
    deadline: Instant,
    /// Captured while a visual effect was on screen.
    during_effect: bool,
}

pub struct PersistenceAdapter<S> {
    storage: S,
    config: PersistenceConfig,
    pending: Option<PendingSave>,
}

impl<S: PlanStorage> PersistenceAdapter<S> {
    #[must_use]
    pub fn new(storage: S, config: PersistenceConfig) -> Self {
        Self { storage, config, pending: None }
    }

    #[must_use]
    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored record for `plan_id`, or `None` when absent or unreadable.
    #[must_use]
    pub fn load(&self, plan_id: &str) -> Option<PersistedPlan> {
        let key = plan_key(&self.config.namespace, plan_id);
        match load_json::<PersistedPlan, _>(&self.storage, &key) {
            Ok(Some(plan)) => {
                info!(plan_id, elements = plan.elements.len(), "plan loaded");
                Some(plan)
            }
            Ok(None) => {
                debug!(plan_id, "no stored plan; starting empty");
                None
            }
            Err(e) => {
                warn!(plan_id, error = %e, "stored plan unreadable; starting empty");
                None
            }
        }
    }

    /// Write `snapshot` for `plan_id` now, collaborators cleared.
    pub fn save(&mut self, plan_id: &str, snapshot: &PersistedPlan) -> Result<(), StorageError> {
        let key = plan_key(&self.config.namespace, plan_id);
        let record = PersistedPlan { app_state: snapshot.app_state.without_collaborators(), ..snapshot.clone() };
        save_json(&mut self.storage, &key, &record)?;
        debug!(plan_id, elements = record.elements.len(), "plan saved");
        Ok(())
    }

    /// Record a settled scene change. Replaces any pending snapshot and
    /// restarts the debounce window from `now`.
    pub fn schedule(&mut self, plan_id: &str, snapshot: PersistedPlan, now: Instant) {
        self.push(plan_id, snapshot, now, false);
    }

    /// Record a scene change made while a focus dim is on screen. Written only
    /// if the snapshot turns out not to be dimmed.
    pub fn schedule_during_effect(&mut self, plan_id: &str, snapshot: PersistedPlan, now: Instant) {
        self.push(plan_id, snapshot, now, true);
    }

    fn push(&mut self, plan_id: &str, snapshot: PersistedPlan, now: Instant, during_effect: bool) {
        if let Some(pending) = &self.pending {
            if pending.plan_id != plan_id {
                debug!(previous = %pending.plan_id, plan_id, "pending save for another plan replaced");
            }
        }
        self.pending = Some(PendingSave {
            plan_id: plan_id.to_owned(),
            snapshot,
            deadline: now + self.config.debounce,
            during_effect,
        });
    }

    /// Deadline of the pending save, if one is scheduled.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending save without writing. Returns whether one existed.
    pub fn cancel_pending(&mut self) -> bool {
        let cancelled = self.pending.take();
        if let Some(pending) = &cancelled {
            debug!(plan_id = %pending.plan_id, "pending save cancelled");
        }
        cancelled.is_some()
    }

    /// Write the pending snapshot if its deadline has passed at `now`.
    pub fn flush_due(&mut self, now: Instant) -> SaveOutcome {
        let Some(pending) = &self.pending else {
            return SaveOutcome::Idle;
        };
        if pending.deadline > now {
            return SaveOutcome::NotDue;
        }
        let Some(pending) = self.pending.take() else {
            return SaveOutcome::Idle;
        };

        if pending.during_effect && pending.snapshot.is_transient(self.config.transient_opacity) {
            debug!(
                plan_id = %pending.plan_id,
                min_opacity = pending.snapshot.min_opacity().unwrap_or_default(),
                "scene mid-transition; save skipped"
            );
            return SaveOutcome::Skipped;
        }

        match self.save(&pending.plan_id, &pending.snapshot) {
            Ok(()) => SaveOutcome::Written,
            Err(e) => {
                error!(plan_id = %pending.plan_id, error = %e, "plan save failed");
                SaveOutcome::Failed
            }
        }
    }

    /// Sleep until the pending deadline, then flush. Returns `Idle` at once when
    /// nothing is pending.
    pub async fn settle(&mut self) -> SaveOutcome {
        let Some(deadline) = self.deadline() else {
            return SaveOutcome::Idle;
        };
        tokio::time::sleep_until(deadline).await;
        self.flush_due(Instant::now())
    }
}
