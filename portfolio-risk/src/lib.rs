//! Position sizing for tracked signals
//!
//! Turns the portfolio settings in force when a signal is logged into a
//! recommended unit size. The result is a point-in-time snapshot: callers
//! store it on the signal and never recompute it when settings change.

mod sizing;

pub use sizing::{position_size, PositionSizer, SizeRecommendation};
