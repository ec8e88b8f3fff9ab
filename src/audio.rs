//! Audio subsystem: the `MediaResource` seam, the rodio-backed player that
//! implements it on a dedicated thread, and the play-mode resolver.

mod mode;
mod player;
mod resource;
mod sink;
mod thread;
mod types;

pub use mode::resolve;
pub use player::AudioPlayer;
pub use resource::MediaResource;
pub use types::*;
