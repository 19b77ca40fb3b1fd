//! Application layer: the town controller, the per-area controllers and the
//! event emitter they publish through.

pub mod areas;
pub mod events;
pub mod town;
