//! Rejection-sampling placement
//!
//! Placement draws a candidate center inside an inset rectangle and rejects
//! it on any violation: leaving the plot, overlapping a placed footprint,
//! breaking the spacing policy against any neighbor, or pushing a resource
//! past its cap. Failed searches skip the instance rather than erroring.

use std::sync::Arc;

use crate::compatibility::CompatibilityIndex;
use crate::domain::{Constraints, Plant, PlantInstance, PlotDimensions, COST_PER_M2};
use crate::rng::Lcg;
use crate::spacing;

/// Planted area may not exceed this share of the plot.
pub const AREA_CAP_RATIO: f64 = 0.85;

/// Shared inputs for placement decisions within one individual.
pub struct PlacementContext<'a> {
    pub dimensions: PlotDimensions,
    pub constraints: &'a Constraints,
    pub index: &'a CompatibilityIndex,
}

impl<'a> PlacementContext<'a> {
    /// Tries up to `max_tries` random placements for `plant`, honoring
    /// bounds, overlap, spacing, and resource caps against the instances
    /// already placed. The budget cap applies only when `check_budget`.
    pub fn try_place(
        &self,
        plant: &Arc<Plant>,
        existing: &[PlantInstance],
        rng: &mut Lcg,
        max_tries: usize,
        check_budget: bool,
    ) -> Option<PlantInstance> {
        let margin = plant.size.sqrt();
        let w = self.dimensions.width;
        let h = self.dimensions.height;
        if w - 2.0 * margin < 0.0 || h - 2.0 * margin < 0.0 {
            return None;
        }

        for _ in 0..max_tries {
            let x = rng.range(margin, w - margin);
            let y = rng.range(margin, h - margin);
            let candidate = PlantInstance::at(plant.clone(), x, y);

            if self.admissible(&candidate, existing, None, check_budget) {
                return Some(candidate);
            }
        }
        None
    }

    /// Tries up to `max_tries` new positions for the instance at
    /// `moving_index`, keeping species, footprint, and rotation. Returns the
    /// accepted replacement.
    pub fn try_relocate(
        &self,
        plants: &[PlantInstance],
        moving_index: usize,
        rng: &mut Lcg,
        max_tries: usize,
    ) -> Option<PlantInstance> {
        let moving = &plants[moving_index];
        let margin = moving.plant.size.sqrt();
        let w = self.dimensions.width;
        let h = self.dimensions.height;
        if w - 2.0 * margin < 0.0 || h - 2.0 * margin < 0.0 {
            return None;
        }

        for _ in 0..max_tries {
            let x = rng.range(margin, w - margin);
            let y = rng.range(margin, h - margin);
            let mut candidate = moving.clone();
            candidate.x = x;
            candidate.y = y;

            // Relocation moves an existing footprint: resource totals are
            // unchanged, only geometry is re-checked.
            if candidate.within_bounds(w, h)
                && self.spatially_clear(&candidate, plants, Some(moving_index))
            {
                return Some(candidate);
            }
        }
        None
    }

    fn admissible(
        &self,
        candidate: &PlantInstance,
        existing: &[PlantInstance],
        skip: Option<usize>,
        check_budget: bool,
    ) -> bool {
        if !candidate.within_bounds(self.dimensions.width, self.dimensions.height) {
            return false;
        }
        if !self.spatially_clear(candidate, existing, skip) {
            return false;
        }

        let used_area: f64 = existing.iter().map(|p| p.area()).sum();
        if used_area + candidate.area() > AREA_CAP_RATIO * self.constraints.max_area {
            return false;
        }

        let water: f64 = existing.iter().map(|p| p.plant.weekly_watering).sum();
        if water + candidate.plant.weekly_watering > self.constraints.max_water_weekly {
            return false;
        }

        if check_budget {
            if let Some(budget) = self.constraints.max_budget {
                let cost: f64 = existing.iter().map(|p| p.plant.size * COST_PER_M2).sum();
                if cost + candidate.plant.size * COST_PER_M2 > budget {
                    return false;
                }
            }
        }

        true
    }

    fn spatially_clear(
        &self,
        candidate: &PlantInstance,
        existing: &[PlantInstance],
        skip: Option<usize>,
    ) -> bool {
        for (i, placed) in existing.iter().enumerate() {
            if Some(i) == skip {
                continue;
            }
            if candidate.overlaps(placed) {
                return false;
            }
            let compat = self
                .index
                .lookup(&candidate.plant.species, &placed.plant.species);
            let required = spacing::min_distance(&candidate.plant, &placed.plant, compat);
            if candidate.distance_to(placed) < required {
                return false;
            }
        }
        true
    }
}
