//! Distance-band positioning for ranged and elemental behaviors.
//!
//! ```text
//! distance   1      2     3     4     5     6     7   ...
//! score    -600    50   250   300   250    80    60   ... (floor -200)
//! ```
//!
//! Corners and reinforcement entry tiles cost a little extra, enough to
//! break near-ties without overriding the band.

use battle_core::RangeBand;

use super::strategy::{PositionContext, ScoringStrategy};

/// Adjacent without a kill-shot.
pub const ADJACENT_PENALTY: i64 = -600;
/// Value at the sweet spot.
pub const BAND_PEAK: i64 = 300;
/// Lost per tile away from the sweet spot inside the band.
pub const BAND_FALLOFF: i64 = 50;
/// Too close but not adjacent.
pub const INSIDE_BAND: i64 = 50;
/// Value just beyond the band.
pub const OUTSIDE_BASE: i64 = 100;
/// Lost per tile beyond the band.
pub const OUTSIDE_FALLOFF: i64 = 20;
pub const OUTSIDE_FLOOR: i64 = -200;
/// Standing in a corner or on an entry edge.
pub const EDGE_PENALTY: i64 = 25;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KitingStrategy;

impl KitingStrategy {
    /// Band value of `distance` before tile penalties.
    pub fn band_score(band: RangeBand, distance: u32, kill_shot: bool) -> i64 {
        if distance <= 1 {
            return if kill_shot { 0 } else { ADJACENT_PENALTY };
        }
        if band.contains(distance) {
            let off = i64::from(distance.abs_diff(band.sweet_spot));
            return BAND_PEAK - off * BAND_FALLOFF;
        }
        if distance < band.min {
            return INSIDE_BAND;
        }
        let beyond = i64::from(distance - band.max);
        (OUTSIDE_BASE - beyond * OUTSIDE_FALLOFF).max(OUTSIDE_FLOOR)
    }
}

impl ScoringStrategy for KitingStrategy {
    fn name(&self) -> &'static str {
        "kiting"
    }

    fn positioning(&self, ctx: &PositionContext<'_>) -> i64 {
        let mut value = Self::band_score(ctx.state.config.kiting_band, ctx.distance, ctx.kill_shot);
        let arena = &ctx.state.arena;
        if arena.grid.is_corner(ctx.destination) {
            value -= EDGE_PENALTY;
        }
        if arena.is_entry_edge(ctx.destination) {
            value -= EDGE_PENALTY;
        }
        value
    }

    fn exposure_factor(&self) -> i64 {
        2
    }
}
