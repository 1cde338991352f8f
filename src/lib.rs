//! Booking annotation layer for whiteboard floor plans.
//!
//! A floor plan is drawn in an embedded whiteboard canvas. This crate layers a
//! booking model on top of the raw shapes: any bookable shape that carries a
//! name becomes a booking unit with a price, a pricing unit, working days and
//! an ordered list of linked child units. The child relation is kept acyclic,
//! the whole scene is persisted per plan with a debounced writer, and hovering
//! a unit drives a dim-and-zoom focus that restores the previous view on exit.
//!
//! The canvas itself (rendering, hit-testing, undo, pan/zoom primitives) sits
//! behind the [`canvas::Canvas`] trait. [`canvas::MemoryCanvas`] is a headless
//! implementation used by the binary and the tests.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Glue owning store, persistence and focus for the active plan |
//! | [`store`] | [`store::ElementStore`], the only reader/writer of raw shapes |
//! | [`metadata`] | Booking unit graph operations (fields, link, unlink, listing) |
//! | [`cycle`] | Reachability guard keeping the child relation acyclic |
//! | [`persistence`] | Debounced per-plan save and load-on-open |
//! | [`storage`] | Key-value plan storage backends |
//! | [`focus`] | Hover/selection focus state machine |
//! | [`panel`] | Side panel and property panel read models |
//! | [`scene`] | Shapes, view state and the persisted plan record |
//! | [`unit`] | Typed booking attributes carried by each shape |
//! | [`canvas`] | Whiteboard collaborator seam and the headless canvas |
//! | [`camera`] | Scroll/zoom camera, bounds and fit-to-content math |
//! | [`config`] | Environment-driven configuration |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod canvas;
pub mod config;
pub mod consts;
pub mod cycle;
pub mod focus;
pub mod metadata;
pub mod panel;
pub mod persistence;
pub mod scene;
pub mod session;
pub mod storage;
pub mod store;
pub mod unit;
