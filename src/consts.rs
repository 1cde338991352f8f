//! Shared numeric constants for the floor-plan layer.

// ── Persistence ─────────────────────────────────────────────────

/// Storage namespace used in `"<namespace>-floor-<planId>"` keys.
pub const DEFAULT_NAMESPACE: &str = "reserveo";

/// Quiet period after the last scene change before a save is written.
pub const SAVE_DEBOUNCE_MS: u64 = 800;

/// Shapes below this opacity mean a focus dim is on screen; saves are skipped.
pub const TRANSIENT_OPACITY_THRESHOLD: f64 = 30.0;

// ── Visual weight ───────────────────────────────────────────────

/// Whiteboard opacity scale runs 0..=100.
pub const FULL_OPACITY: f64 = 100.0;

/// Opacity applied to every non-target shape while focusing.
pub const FOCUS_DIM_OPACITY: f64 = 15.0;

// ── Camera ──────────────────────────────────────────────────────

/// Requested padding around a focused unit, in screen pixels.
pub const FOCUS_PADDING_PX: f64 = 100.0;

/// Lower bound on the padding actually used for a focus zoom.
pub const MIN_FOCUS_PADDING_PX: f64 = 24.0;

/// Upper bound on the padding actually used for a focus zoom.
pub const MAX_FOCUS_PADDING_PX: f64 = 240.0;

/// Duration of focus and restore camera animations.
pub const FOCUS_ANIMATION_MS: u64 = 400;

/// Smallest zoom the camera will settle on.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest zoom the camera will settle on.
pub const MAX_ZOOM: f64 = 10.0;

// ── Booking ─────────────────────────────────────────────────────

/// Weekday ids run 0 (Sunday) through 6 (Saturday).
pub const MAX_WEEKDAY: u8 = 6;

/// Currency label shown on price badges.
pub const CURRENCY_LABEL: &str = "Ar";

/// Length of the id prefix shown in the side panel.
pub const SHORT_ID_LEN: usize = 6;
