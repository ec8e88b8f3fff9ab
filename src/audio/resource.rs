use crate::library::Track;

/// A single playable media slot.
///
/// Commands are fire-and-forget; progress comes back as `MediaEvent`s tagged
/// with the generation passed to `set_source`. `current_time` and `duration`
/// report what the resource last observed, so a seek is not visible until
/// the backend has applied it.
pub trait MediaResource {
    /// Swap in a new source, paused at 0s. Invalidates the previous duration.
    fn set_source(&mut self, track: &Track, generation: u64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Length in seconds, once the source is ready.
    fn duration(&self) -> Option<f64>;
    /// Linear gain in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
}
