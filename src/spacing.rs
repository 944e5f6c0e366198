//! Spacing policy
//!
//! Derives the minimum center-to-center distance two plants must keep from
//! their mutual compatibility and physical size. Antagonistic neighbors get
//! pushed apart, proven companions may sit close. Pure functions, no state.

use crate::domain::Plant;

/// Base separation in meters for hostile pairs (compatibility < -0.5).
const BASE_HOSTILE: f64 = 2.5;
/// Base separation for companion pairs (compatibility > 0.5).
const BASE_COMPANION: f64 = 1.0;
/// Base separation for everything in between.
const BASE_NEUTRAL: f64 = 1.5;

/// Minimum center-to-center distance between two plants.
///
/// `base + √size₁/2 + √size₂/2`: the base band comes from compatibility,
/// the radii terms keep large footprints from touching.
pub fn min_distance(a: &Plant, b: &Plant, compatibility: f64) -> f64 {
    let base = if compatibility < -0.5 {
        BASE_HOSTILE
    } else if compatibility > 0.5 {
        BASE_COMPANION
    } else {
        BASE_NEUTRAL
    };
    base + a.footprint_side() / 2.0 + b.footprint_side() / 2.0
}

/// Quadratic penalty for a pair closer than its minimum distance:
/// 0 at or beyond `min_distance`, rising to 1 as the centers coincide.
pub fn proximity_penalty(actual_distance: f64, min_distance: f64) -> f64 {
    if min_distance <= 0.0 || actual_distance >= min_distance {
        return 0.0;
    }
    let shortfall = 1.0 - actual_distance / min_distance;
    shortfall * shortfall
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlantCategory, SunRequirement};
    use approx::assert_relative_eq;

    fn plant(size: f64) -> Plant {
        Plant {
            id: 1,
            species: "Cilantro".into(),
            scientific_name: "Coriandrum sativum".into(),
            types: vec![PlantCategory::Aromatic],
            sun_requirement: SunRequirement::Medium,
            weekly_watering: 10.0,
            harvest_days: 45,
            soil_type: "franco".into(),
            water_per_kg: 20.0,
            benefits: vec![],
            size,
        }
    }

    #[test]
    fn hostile_pairs_need_the_widest_gap() {
        let a = plant(1.0);
        let b = plant(1.0);
        // radii: √1/2 = 0.5 each
        assert_relative_eq!(min_distance(&a, &b, -0.9), 3.5);
        assert_relative_eq!(min_distance(&a, &b, 0.9), 2.0);
        assert_relative_eq!(min_distance(&a, &b, 0.0), 2.5);
    }

    #[test]
    fn band_edges_are_neutral() {
        let a = plant(0.25);
        let b = plant(0.25);
        // -0.5 and 0.5 themselves fall in the neutral band
        assert_relative_eq!(min_distance(&a, &b, -0.5), 1.5 + 0.5);
        assert_relative_eq!(min_distance(&a, &b, 0.5), 1.5 + 0.5);
    }

    #[test]
    fn penalty_is_zero_at_or_beyond_minimum() {
        assert_eq!(proximity_penalty(2.0, 2.0), 0.0);
        assert_eq!(proximity_penalty(3.0, 2.0), 0.0);
    }

    #[test]
    fn penalty_grows_quadratically_toward_contact() {
        assert_relative_eq!(proximity_penalty(1.0, 2.0), 0.25);
        assert_relative_eq!(proximity_penalty(0.0, 2.0), 1.0);
    }
}
