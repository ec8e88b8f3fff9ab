//! Application module: the playback state machine (`Player`) and the
//! terminal-facing model that wraps it (`App`).

mod model;
mod player;

pub use model::*;
pub use player::*;

#[cfg(test)]
mod tests;
