//! CEE: species compatibility with distance weighting
//!
//! Every unordered instance pair contributes its compatibility score, weighted
//! by `exp(-d/2)` so near neighbors dominate. Hostile pairs planted close get
//! their penalty amplified; companion pairs planted close get a bonus boost.
//! The weighted mean is remapped from [-1, 1] to [0, 1].

use crate::compatibility::CompatibilityIndex;
use crate::domain::PlantInstance;

/// Penalty amplification for hostile pairs (< -0.5) within 1.5 m.
const PENALTY_FACTOR: f64 = 2.0;
/// Bonus amplification for companion pairs (> 0.5) within 1.0 m.
const BONUS_FACTOR: f64 = 1.5;

pub fn calculate_cee(instances: &[PlantInstance], index: &CompatibilityIndex) -> f64 {
    if instances.len() < 2 {
        return 1.0;
    }

    let mut contribution_sum = 0.0;
    let mut weight_sum = 0.0;

    for i in 0..instances.len() - 1 {
        for j in i + 1..instances.len() {
            let p = &instances[i];
            let q = &instances[j];
            let compat = index.lookup(&p.plant.species, &q.plant.species);
            let d = p.distance_to(q);
            let weight = (-d / 2.0).exp();

            let mut contribution = compat * weight;
            if compat < -0.5 && d < 1.5 {
                contribution *= PENALTY_FACTOR;
            } else if compat > 0.5 && d < 1.0 {
                contribution *= BONUS_FACTOR;
            }

            contribution_sum += contribution;
            weight_sum += weight;
        }
    }

    if weight_sum == 0.0 {
        return 1.0;
    }

    // Amplification can push the mean outside [-1, 1]; clamp after remap.
    let mean = contribution_sum / weight_sum;
    ((mean + 1.0) / 2.0).clamp(0.0, 1.0)
}
