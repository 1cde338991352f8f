//! Floor-plan session: the glue owning one active plan.
//!
//! The session holds the element store, the persistence adapter and the focus
//! controller, and hands the store to the other two on every call. None of
//! them reaches for a shared handle.
//!
//! Every commit that goes through the store is treated the way the whiteboard
//! treats a user edit: it schedules a debounced save. Commits made while a
//! focus session is active are flagged as effect snapshots; the adapter skips
//! those while the dim is on screen and the release that follows schedules the
//! settled scene.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::config::FloorPlanConfig;
use crate::focus::FocusController;
use crate::metadata::{BookingMetadata, BookingUnit, LinkOutcome, MetadataError, children_in, parents_in, units_in};
use crate::panel::{PropertyPanel, UnitSummary, property_panel, side_panel};
use crate::persistence::{PersistenceAdapter, SaveOutcome};
use crate::scene::{BinaryFiles, PersistedPlan, Shape, ShapeId, ViewState};
use crate::storage::PlanStorage;
use crate::store::ElementStore;
use crate::unit::UnitField;

pub struct FloorPlanSession<C, S> {
    store: ElementStore<C>,
    persistence: PersistenceAdapter<S>,
    focus: FocusController,
    plan_id: Option<String>,
    selected: Option<ShapeId>,
    view_mode: bool,
}

impl<C: Canvas, S: PlanStorage> FloorPlanSession<C, S> {
    #[must_use]
    pub fn new(storage: S, config: &FloorPlanConfig) -> Self {
        Self {
            store: ElementStore::new(),
            persistence: PersistenceAdapter::new(storage, config.persistence()),
            focus: FocusController::new(config.focus()),
            plan_id: None,
            selected: None,
            view_mode: config.view_mode,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ElementStore<C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ElementStore<C> {
        &mut self.store
    }

    #[must_use]
    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    #[must_use]
    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    #[must_use]
    pub fn plan_id(&self) -> Option<&str> {
        self.plan_id.as_deref()
    }

    /// Bookable shape currently shown in the property panel.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_view_mode(&self) -> bool {
        self.view_mode
    }

    // ── Plan lifecycle ──────────────────────────────────────────

    /// Switch to `plan_id` and return its stored record as initial data.
    ///
    /// A save still pending for the previous plan is dropped, any focus
    /// animation is stopped, and the previous canvas is unmounted. The store
    /// stays uninitialized until [`FloorPlanSession::attach_canvas`].
    ///
    /// Opening the plan that is already open changes nothing and returns the
    /// live scene, or the stored record if no canvas is mounted yet.
    pub fn open_plan(&mut self, plan_id: &str) -> Option<PersistedPlan> {
        if self.is_open(plan_id) {
            debug!(plan_id, "plan already open");
            return self.store.snapshot().or_else(|| self.persistence.load(plan_id));
        }
        self.persistence.cancel_pending();
        self.focus.cancel(&mut self.store);
        self.store.detach();
        self.selected = None;
        self.plan_id = Some(plan_id.to_owned());
        info!(plan_id, "plan opened");
        self.persistence.load(plan_id)
    }

    /// Mount the canvas for the open plan.
    pub fn attach_canvas(&mut self, canvas: C) {
        self.store.attach(canvas);
    }

    /// [`FloorPlanSession::open_plan`] then mount the canvas built from the
    /// stored record.
    pub fn open_plan_with<F>(&mut self, plan_id: &str, mount: F)
    where
        F: FnOnce(Option<PersistedPlan>) -> C,
    {
        if self.is_open(plan_id) && self.store.is_ready() {
            debug!(plan_id, "plan already mounted");
            return;
        }
        let initial = self.open_plan(plan_id);
        self.attach_canvas(mount(initial));
    }

    fn is_open(&self, plan_id: &str) -> bool {
        self.plan_id.as_deref() == Some(plan_id)
    }

    /// Canvas-originated change: schedule a save and follow the selection.
    pub fn on_change(&mut self, elements: Vec<Shape>, app_state: &ViewState, files: BinaryFiles, now: Instant) {
        self.selected = app_state
            .first_selected()
            .filter(|id| elements.iter().any(|shape| shape.id == *id && shape.kind.is_bookable()))
            .map(str::to_owned);
        self.enqueue(PersistedPlan::capture(elements, app_state, files), now);
    }

    // ── Booking metadata ────────────────────────────────────────

    pub fn set_field(&mut self, unit_id: &str, field: UnitField) -> Result<bool, MetadataError> {
        if self.view_mode {
            debug!(unit_id, key = field.key(), "view mode; edit ignored");
            return Ok(false);
        }
        let changed = BookingMetadata::new(&mut self.store).set_field(unit_id, field)?;
        if changed {
            self.schedule_save();
        }
        Ok(changed)
    }

    pub fn link_child(&mut self, parent_id: &str, child_id: &str) -> Result<LinkOutcome, MetadataError> {
        if self.view_mode {
            debug!(parent_id, child_id, "view mode; link ignored");
            return Ok(LinkOutcome::Unchanged);
        }
        let outcome = BookingMetadata::new(&mut self.store).link_child(parent_id, child_id)?;
        if outcome == LinkOutcome::Linked {
            self.schedule_save();
        }
        Ok(outcome)
    }

    pub fn unlink_child(&mut self, parent_id: &str, child_id: &str) -> bool {
        if self.view_mode {
            debug!(parent_id, child_id, "view mode; unlink ignored");
            return false;
        }
        let removed = BookingMetadata::new(&mut self.store).unlink_child(parent_id, child_id);
        if removed {
            self.schedule_save();
        }
        removed
    }

    #[must_use]
    pub fn list_units(&self) -> Vec<BookingUnit> {
        units_in(&self.store.get_all())
    }

    #[must_use]
    pub fn list_children(&self, unit_id: &str) -> Vec<BookingUnit> {
        children_in(&self.store.get_all(), unit_id)
    }

    #[must_use]
    pub fn list_parents(&self, unit_id: &str) -> Vec<BookingUnit> {
        parents_in(&self.store.get_all(), unit_id)
    }

    #[must_use]
    pub fn side_panel(&self, query: &str) -> Vec<UnitSummary> {
        side_panel(&self.store.get_all(), query)
    }

    /// Property panel for the current selection.
    #[must_use]
    pub fn property_panel(&self) -> Option<PropertyPanel> {
        let selected = self.selected.as_deref()?;
        property_panel(&self.store.get_all(), selected)
    }

    // ── Focus ───────────────────────────────────────────────────

    /// Pointer entered a unit's row or shape.
    pub fn hover(&mut self, unit_id: &str) {
        let before = self.store.revision();
        self.focus.focus(&mut self.store, unit_id);
        self.schedule_if_committed(before);
    }

    /// Pointer left: restore the pre-focus view.
    pub fn hover_end(&mut self) {
        let before = self.store.revision();
        self.focus.release(&mut self.store);
        self.schedule_if_committed(before);
    }

    /// Select a unit from the side panel and focus it. `None` clears both.
    pub fn select(&mut self, unit_id: Option<&str>) {
        match unit_id {
            Some(id) if self.store.find(id).is_some_and(|shape| shape.kind.is_bookable()) => {
                self.selected = Some(id.to_owned());
                self.hover(id);
            }
            _ => {
                self.selected = None;
                self.hover_end();
            }
        }
    }

    // ── Autosave ────────────────────────────────────────────────

    /// Write the pending save if its deadline has passed at `now`.
    pub fn poll_autosave(&mut self, now: Instant) -> SaveOutcome {
        self.persistence.flush_due(now)
    }

    /// Wait out the debounce window and write the pending save.
    pub async fn autosave(&mut self) -> SaveOutcome {
        self.persistence.settle().await
    }

    fn schedule_if_committed(&mut self, before: u64) {
        if self.store.revision() != before {
            self.schedule_save();
        }
    }

    fn schedule_save(&mut self) {
        if let Some(snapshot) = self.store.snapshot() {
            self.enqueue(snapshot, Instant::now());
        }
    }

    fn enqueue(&mut self, snapshot: PersistedPlan, now: Instant) {
        let Some(plan_id) = self.plan_id.as_deref() else {
            return;
        };
        if self.focus.is_focusing() {
            self.persistence.schedule_during_effect(plan_id, snapshot, now);
        } else {
            self.persistence.schedule(plan_id, snapshot, now);
        }
    }
}
