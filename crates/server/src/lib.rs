//! HTTP surface of reelsync: sync control, status, catalog reads and metrics.

pub mod api;
pub mod metrics;
pub mod state;
