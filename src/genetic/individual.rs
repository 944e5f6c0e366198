//! Candidate layout (genome)
//!
//! A variable-length list of placed instances plus the plot it lives on.
//! Instances hold `Arc`s to catalogue plants, so cloning an individual copies
//! the list and the metrics record but never the plants themselves.

use crate::domain::{PlantInstance, PlotDimensions, COST_PER_M2};
use crate::metrics::Metrics;

#[derive(Debug, Clone)]
pub struct Individual {
    pub dimensions: PlotDimensions,
    pub plants: Vec<PlantInstance>,
    /// Populated by the evaluator; stale after any structural mutation.
    pub metrics: Option<Metrics>,
}

impl Individual {
    pub fn new(dimensions: PlotDimensions) -> Self {
        Self {
            dimensions,
            plants: Vec::new(),
            metrics: None,
        }
    }

    pub fn total_plants(&self) -> usize {
        self.plants.len()
    }

    /// Planted footprint area in m².
    pub fn used_area(&self) -> f64 {
        self.plants.iter().map(|p| p.area()).sum()
    }

    /// Weekly water demand in liters.
    pub fn total_weekly_water(&self) -> f64 {
        self.plants.iter().map(|p| p.plant.weekly_watering).sum()
    }

    /// Implementation cost in MXN (catalogue size × cost per m²).
    pub fn total_cost(&self) -> f64 {
        self.plants.iter().map(|p| p.plant.size * COST_PER_M2).sum()
    }

    /// Aggregated fitness; 0 until evaluated.
    pub fn fitness(&self) -> f64 {
        self.metrics.map(|m| m.fitness).unwrap_or(0.0)
    }

    /// Drops the cached metrics after a structural change.
    pub fn invalidate_metrics(&mut self) {
        self.metrics = None;
    }
}
