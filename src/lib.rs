//! Aggregations and chart dispatch over a Google Play Store app catalog.
//!
//! The library holds everything that is independent of the window: loading
//! and cleaning the catalog ([`data::loader`]), the derived tables
//! ([`data::aggregate`]) and the mapping from a menu selection to chart
//! instructions ([`dispatch`]). The `playstore-dash` binary draws those
//! instructions with egui.

pub mod data;
pub mod dispatch;
