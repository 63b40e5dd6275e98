//! Controller layer: UI events, reducer-like state transitions, filtering,
//! and command orchestration.

pub mod events;
pub mod filter;
pub mod orchestration;
pub mod reducer;
