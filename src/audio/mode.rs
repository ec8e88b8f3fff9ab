use rand::Rng;

use super::types::{Direction, PlayMode, Resolution};

/// Which queue position plays after `index` when moving in `direction`.
///
/// Total for `queue_len > 0` and `index < queue_len`; an empty queue always
/// stops. Only `Sequential` + `Next` can stop on a non-empty queue. Shuffle
/// draws uniformly and may repeat the current index.
pub fn resolve<R: Rng + ?Sized>(
    direction: Direction,
    index: usize,
    mode: PlayMode,
    queue_len: usize,
    rng: &mut R,
) -> Resolution {
    if queue_len == 0 {
        return Resolution::Stop;
    }
    let last = queue_len - 1;

    match (mode, direction) {
        (PlayMode::SingleRepeat, _) => Resolution::Index(index.min(last)),
        (PlayMode::Shuffle, _) => Resolution::Index(rng.random_range(0..queue_len)),
        (PlayMode::Sequential, Direction::Next) => {
            if index >= last {
                Resolution::Stop
            } else {
                Resolution::Index(index + 1)
            }
        }
        (PlayMode::ListRepeat, Direction::Next) => {
            Resolution::Index(if index >= last { 0 } else { index + 1 })
        }
        (PlayMode::Sequential | PlayMode::ListRepeat, Direction::Previous) => {
            Resolution::Index(if index == 0 { last } else { (index - 1).min(last) })
        }
    }
}
