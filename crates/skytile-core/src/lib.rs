//! Core data types and rollup logic for the Skytile weather panel
//!
//! This crate holds the pure parts of the appliance: position and weather
//! value types, great-circle distance gating, local calendar derivation
//! from provider UTC offsets, and the 3-day forecast aggregation. No I/O
//! lives here.

pub mod calendar;
pub mod forecast;
pub mod geo;
pub mod pipeline;
pub mod types;

pub use calendar::*;
pub use forecast::*;
pub use geo::*;
pub use pipeline::*;
pub use types::*;
