//! Power-meter throw model for the human player
//!
//! The meter runs 0..=100. Full power lands on the aim point; anything
//! less drops the dart below it, and a near-empty meter misses the board.

use glam::Vec2;
use rand::Rng;

use crate::consts::DART_BOARD_SIZE;

/// At or below this the dart misses the board entirely
pub const MISS_POWER: u8 = 5;
/// Drop below the aim point at zero power, in pixels
pub const MAX_DROP: f32 = 150.0;
/// Horizontal scatter width at zero power, in pixels
pub const MAX_SCATTER: f32 = 20.0;

/// Landing point for a throw at `aim` released with `power`
pub fn power_throw<R: Rng + ?Sized>(aim: Vec2, power: u8, rng: &mut R) -> Vec2 {
    let power = power.min(100);
    if power <= MISS_POWER {
        let dx = (rng.random::<f32>() - 0.5) * DART_BOARD_SIZE;
        return aim + Vec2::new(dx, DART_BOARD_SIZE * 0.8);
    }
    if power == 100 {
        return aim;
    }
    let slack = 1.0 - f32::from(power) / 100.0;
    let dx = (rng.random::<f32>() - 0.5) * slack * MAX_SCATTER;
    aim + Vec2::new(dx, slack * MAX_DROP)
}
