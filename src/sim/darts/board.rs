//! Dart board geometry and hit scoring
//!
//! The board is a set of concentric ring bands over 20 equal wedges.
//! Positions are screen pixels (y grows downward) on a square board with
//! the centre at `(DART_BOARD_RADIUS, DART_BOARD_RADIUS)`. Regulation
//! millimetre radii are scaled so the double ring's outer edge meets the
//! board edge.
//!
//! Wedge `i` covers headings `[i * 18°, (i + 1) * 18°)` measured clockwise
//! from 12 o'clock, so the 20 starts at the top and runs to 18°.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{heading_from_top, normalize_angle, offset_from_heading};

/// Wedge values clockwise from 12 o'clock
pub const SECTOR_ORDER: [u8; 20] = [20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5];

/// Angular width of one wedge
pub const SECTOR_WIDTH: f32 = std::f32::consts::TAU / 20.0;

/// `sector` value reported for a miss
pub const MISS: u8 = 0;
/// `sector` value reported for the outer bull (25)
pub const OUTER_BULL: u8 = 25;
/// `sector` value reported for the inner bull (50)
pub const BULLSEYE: u8 = 50;

/// Where a dart landed, derived purely from its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// 0..=60
    pub score: u32,
    /// 1, 2 or 3
    pub multiplier: u8,
    /// 0 (miss), 1..=20, 25 or 50
    pub sector: u8,
}

impl Hit {
    pub const MISS: Hit = Hit {
        score: 0,
        multiplier: 1,
        sector: MISS,
    };

    pub fn is_miss(&self) -> bool {
        self.sector == MISS
    }

    pub fn is_double(&self) -> bool {
        self.multiplier == 2
    }
}

/// Scoring bands of a numbered wedge, from the centre outward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ring {
    InnerSingle,
    Triple,
    OuterSingle,
    Double,
}

impl Ring {
    pub fn multiplier(self) -> u8 {
        match self {
            Ring::Triple => 3,
            Ring::Double => 2,
            Ring::InnerSingle | Ring::OuterSingle => 1,
        }
    }
}

/// Band radii in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub center: Vec2,
    pub inner_bull: f32,
    pub outer_bull: f32,
    pub triple_inner: f32,
    pub triple_outer: f32,
    pub double_inner: f32,
    pub double_outer: f32,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        let scale = DART_BOARD_RADIUS / BOARD_RADIUS_MM;
        Self {
            center: Vec2::splat(DART_BOARD_RADIUS),
            inner_bull: INNER_BULL_RADIUS_MM * scale,
            outer_bull: OUTER_BULL_RADIUS_MM * scale,
            triple_inner: TRIPLE_RING_INNER_MM * scale,
            triple_outer: TRIPLE_RING_OUTER_MM * scale,
            double_inner: DOUBLE_RING_INNER_MM * scale,
            double_outer: DOUBLE_RING_OUTER_MM * scale,
        }
    }
}

impl BoardGeometry {
    /// Wedge value under a clockwise heading from 12 o'clock
    pub fn sector_at(heading: f32) -> u8 {
        let index = (normalize_angle(heading) / SECTOR_WIDTH).floor() as usize % 20;
        SECTOR_ORDER[index]
    }

    /// Heading of a wedge's centreline, `None` for values not on the board
    pub fn sector_heading(value: u8) -> Option<f32> {
        SECTOR_ORDER
            .iter()
            .position(|v| *v == value)
            .map(|i| (i as f32 + 0.5) * SECTOR_WIDTH)
    }

    fn ring_at(&self, d: f32) -> Ring {
        if (self.triple_inner..=self.triple_outer).contains(&d) {
            Ring::Triple
        } else if (self.double_inner..=self.double_outer).contains(&d) {
            Ring::Double
        } else if d < self.triple_inner {
            Ring::InnerSingle
        } else {
            Ring::OuterSingle
        }
    }

    fn ring_mid_radius(&self, ring: Ring) -> f32 {
        match ring {
            Ring::InnerSingle => (self.outer_bull + self.triple_inner) / 2.0,
            Ring::Triple => (self.triple_inner + self.triple_outer) / 2.0,
            Ring::OuterSingle => (self.triple_outer + self.double_inner) / 2.0,
            Ring::Double => (self.double_inner + self.double_outer) / 2.0,
        }
    }

    /// Score a landing position
    pub fn score_from_point(&self, point: Vec2) -> Hit {
        let offset = point - self.center;
        let d = offset.length();
        if !d.is_finite() {
            return Hit::MISS;
        }

        if d <= self.inner_bull {
            return Hit {
                score: 50,
                multiplier: 1,
                sector: BULLSEYE,
            };
        }
        if d <= self.outer_bull {
            return Hit {
                score: 25,
                multiplier: 1,
                sector: OUTER_BULL,
            };
        }
        if d > self.double_outer {
            return Hit::MISS;
        }

        let sector = Self::sector_at(heading_from_top(offset));
        let multiplier = self.ring_at(d).multiplier();
        Hit {
            score: u32::from(sector) * u32::from(multiplier),
            multiplier,
            sector,
        }
    }

    /// Middle of a wedge's band, `None` for values not on the board
    pub fn target(&self, sector: u8, ring: Ring) -> Option<Vec2> {
        let heading = Self::sector_heading(sector)?;
        Some(self.center + offset_from_heading(self.ring_mid_radius(ring), heading))
    }

    pub fn bullseye(&self) -> Vec2 {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_center_is_bullseye() {
        let board = BoardGeometry::default();
        assert_eq!(
            board.score_from_point(board.center),
            Hit {
                score: 50,
                multiplier: 1,
                sector: 50
            }
        );
    }

    #[test]
    fn test_outer_bull() {
        let board = BoardGeometry::default();
        let p = board.center + Vec2::new(board.outer_bull - 1.0, 0.0);
        assert_eq!(board.score_from_point(p).score, 25);
        assert_eq!(board.score_from_point(p).sector, OUTER_BULL);
    }

    fn sector_under(board: &BoardGeometry, degrees: f32) -> Hit {
        let mid_single = (board.triple_outer + board.double_inner) / 2.0;
        board.score_from_point(board.center + offset_from_heading(mid_single, degrees.to_radians()))
    }

    #[test]
    fn test_wedges_start_at_twelve_oclock() {
        let board = BoardGeometry::default();
        let hit = sector_under(&board, 12.0);
        assert_eq!(hit.sector, 20);
        assert_eq!(hit.multiplier, 1);
        assert_eq!(sector_under(&board, 20.0).sector, 1);
        assert_eq!(sector_under(&board, 99.0).sector, 6);
        assert_eq!(sector_under(&board, 189.0).sector, 3);
        // Last wedge before the top belongs to the 5
        assert_eq!(sector_under(&board, 351.0).sector, 5);
    }

    #[test]
    fn test_sector_at_boundaries() {
        assert_eq!(BoardGeometry::sector_at(0.0), 20);
        assert_eq!(BoardGeometry::sector_at(17.9_f32.to_radians()), 20);
        assert_eq!(BoardGeometry::sector_at(18.1_f32.to_radians()), 1);
        assert_eq!(BoardGeometry::sector_at(std::f32::consts::TAU - 0.001), 5);
    }

    #[test]
    fn test_non_finite_point_is_miss() {
        let board = BoardGeometry::default();
        assert_eq!(board.score_from_point(Vec2::new(f32::NAN, 10.0)), Hit::MISS);
        assert_eq!(board.score_from_point(Vec2::new(10.0, f32::INFINITY)), Hit::MISS);
        assert_eq!(board.score_from_point(Vec2::splat(f32::NEG_INFINITY)), Hit::MISS);
    }

    #[test]
    fn test_targets_land_in_their_beds() {
        let board = BoardGeometry::default();
        for value in SECTOR_ORDER {
            for ring in [Ring::InnerSingle, Ring::Triple, Ring::OuterSingle, Ring::Double] {
                let hit = board.score_from_point(board.target(value, ring).unwrap());
                assert_eq!(hit.sector, value);
                assert_eq!(hit.multiplier, ring.multiplier());
                assert_eq!(hit.score, u32::from(value) * u32::from(ring.multiplier()));
            }
        }
        assert_eq!(board.target(21, Ring::Double), None);
    }

    #[test]
    fn test_triple_twenty_scores_sixty() {
        let board = BoardGeometry::default();
        let hit = board.score_from_point(board.target(20, Ring::Triple).unwrap());
        assert_eq!(hit.score, 60);
    }

    proptest! {
        #[test]
        fn prop_off_board_is_miss(heading in 0.0f32..std::f32::consts::TAU, extra in 0.5f32..400.0) {
            let board = BoardGeometry::default();
            let p = board.center + offset_from_heading(board.double_outer + extra, heading);
            let hit = board.score_from_point(p);
            prop_assert_eq!(hit.score, 0);
            prop_assert_eq!(hit.sector, 0);
        }

        #[test]
        fn prop_score_is_value_times_multiplier(x in 0.0f32..500.0, y in 0.0f32..500.0) {
            let board = BoardGeometry::default();
            let hit = board.score_from_point(Vec2::new(x, y));
            prop_assert!(hit.score <= 60);
            if !matches!(hit.sector, MISS | OUTER_BULL | BULLSEYE) {
                prop_assert_eq!(hit.score, u32::from(hit.sector) * u32::from(hit.multiplier));
            }
        }
    }
}
