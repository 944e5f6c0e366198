//! PSRNT: category-distribution satisfaction
//!
//! Measures how well the planted mix matches the user's desired category
//! split. Tag incidences are counted per instance (a plant tagged both
//! vegetable and medicinal feeds both buckets), normalized to percentages,
//! and compared against the target by root-mean-square error. Without a
//! target, a Shannon-entropy diversity bonus rewards balanced mixes.

use crate::domain::{CategoryDistribution, PlantCategory, PlantInstance};

pub fn calculate_psrnt(
    instances: &[PlantInstance],
    desired: Option<&CategoryDistribution>,
) -> f64 {
    let actual = actual_distribution(instances);

    match desired {
        Some(target) => {
            let target = target.as_vector();
            let mse = actual
                .iter()
                .zip(target.iter())
                .map(|(a, t)| (a - t) * (a - t))
                .sum::<f64>()
                / 4.0;
            (1.0 - mse.sqrt() / 100.0).max(0.0)
        }
        None => entropy_bonus(&actual),
    }
}

/// Per-category percentages of tag incidences, in `PlantCategory::ALL` order,
/// summing to 100 for a non-empty layout.
fn actual_distribution(instances: &[PlantInstance]) -> [f64; 4] {
    let mut counts = [0usize; 4];
    for instance in instances {
        for (slot, category) in PlantCategory::ALL.iter().enumerate() {
            if instance.plant.has_category(*category) {
                counts[slot] += 1;
            }
        }
    }

    let total: usize = counts.iter().sum();
    if total == 0 {
        return [0.0; 4];
    }

    let mut percentages = [0.0; 4];
    for (slot, count) in counts.iter().enumerate() {
        percentages[slot] = *count as f64 / total as f64 * 100.0;
    }
    percentages
}

/// Shannon entropy over non-zero buckets, normalized by log₂(4).
fn entropy_bonus(percentages: &[f64; 4]) -> f64 {
    let mut entropy = 0.0;
    for pct in percentages {
        if *pct > 0.0 {
            let p = pct / 100.0;
            entropy -= p * p.log2();
        }
    }
    (entropy / 2.0).clamp(0.0, 1.0)
}
