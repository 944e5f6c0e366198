//! CS: harvest-cycle synchronization
//!
//! Layouts whose species ripen together are easier to work; the score decays
//! with the spread of harvest days across planted instances. Two months of
//! standard deviation zeroes the metric.

use crate::domain::PlantInstance;

pub fn calculate_cs(instances: &[PlantInstance]) -> f64 {
    if instances.len() < 2 {
        return 1.0;
    }

    let days: Vec<f64> = instances
        .iter()
        .map(|i| i.plant.harvest_days as f64)
        .collect();
    let mean = days.iter().sum::<f64>() / days.len() as f64;
    let variance = days.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / days.len() as f64;
    let stdev = variance.sqrt();

    (1.0 - stdev / 60.0).max(0.0)
}
