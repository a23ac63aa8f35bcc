//! Device placement around the anchor.
//!
//! Positions only feed the report. Nothing in the device models reads them.

use lorasim_types::Position;
use rand::Rng;
use std::f64::consts::TAU;

/// Draw `count` positions uniformly over a disc of `radius` metres
/// centred on the anchor.
///
/// Uses `r = R * sqrt(u)` so that density is uniform per unit area rather
/// than per unit radius.
pub fn uniform_disc<R: Rng>(count: u32, radius: f64, rng: &mut R) -> Vec<Position> {
    (0..count)
        .map(|_| {
            let r = radius * rng.gen::<f64>().sqrt();
            let theta = TAU * rng.gen::<f64>();
            Position::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_positions_stay_inside_disc() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let positions = uniform_disc(500, 810.0, &mut rng);
        assert_eq!(positions.len(), 500);
        assert!(positions.iter().all(|p| p.distance_from_anchor() <= 810.0));
    }

    #[test]
    fn test_zero_radius_collapses_to_anchor() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let positions = uniform_disc(3, 0.0, &mut rng);
        assert!(positions.iter().all(|p| p.distance_from_anchor() == 0.0));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = uniform_disc(10, 100.0, &mut ChaCha8Rng::seed_from_u64(5));
        let b = uniform_disc(10, 100.0, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
