/// Game rules: pure functions over plain values, no world access.
///
/// Randomised rules take the RNG as a parameter.

use rand::Rng;

use super::entity::{Facing, Ladder};
use super::message::MessageKind;
use super::physics::Body;

/// Attempt count that triggers the "rent for another 4 years" message.
pub const FIRST_MESSAGE_AT: u32 = 5;
/// Every multiple of this (from the first multiple on) triggers the listings message.
pub const REPEAT_MESSAGE_EVERY: u32 = 10;

/// Ladder relocation bounds, as fractions of the viewport width.
pub const LADDER_MIN_FRACTION: f32 = 0.1;
pub const LADDER_MAX_FRACTION: f32 = 0.9;

/// Which humorous message, if any, follows the given attempt count.
///
/// Exactly `5` → message A. Any `n ≥ 10` divisible by 10 → message B.
pub fn humorous_message_for(attempts: u32) -> Option<MessageKind> {
    if attempts == FIRST_MESSAGE_AT {
        Some(MessageKind::RentAnotherFourYears)
    } else if attempts >= REPEAT_MESSAGE_EVERY && attempts % REPEAT_MESSAGE_EVERY == 0 {
        Some(MessageKind::UnaffordableListings)
    } else {
        None
    }
}

/// Horizontal gap between player and ladder centres.
#[inline]
pub fn horizontal_distance(player: &Body, ladder: &Ladder) -> f32 {
    (player.x - ladder.x).abs()
}

/// Does the player's position ask for a ladder-trigger sequence?
///
/// Close (strictly under `threshold`), in the air, and the ladder not
/// already on the move.
pub fn proximity_triggers(player: &Body, ladder: &Ladder, threshold: f32, ladder_moving: bool) -> bool {
    !ladder_moving && player.airborne() && horizontal_distance(player, ladder) < threshold
}

/// Velocity that pushes the player away from the ladder.
/// A player exactly on the ladder's centre line is pushed right.
pub fn repel_velocity(player_x: f32, ladder_x: f32, speed: f32) -> f32 {
    if player_x < ladder_x { -speed } else { speed }
}

/// Velocity for the held direction.
pub fn horizontal_velocity(dir: Option<Facing>, speed: f32) -> f32 {
    match dir {
        Some(Facing::Left) => -speed,
        Some(Facing::Right) => speed,
        None => 0.0,
    }
}

/// Inclusive range of allowed ladder x positions for a viewport width.
pub fn ladder_x_range(width: f32) -> (f32, f32) {
    let w = width.max(0.0);
    (w * LADDER_MIN_FRACTION, w * LADDER_MAX_FRACTION)
}

/// New ladder x, uniform over `ladder_x_range(width)`.
pub fn random_ladder_x<R: Rng + ?Sized>(width: f32, rng: &mut R) -> f32 {
    let (lo, hi) = ladder_x_range(width);
    if hi <= lo { return lo; }
    rng.random_range(lo..=hi)
}
