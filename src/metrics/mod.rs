//! Layout quality metrics
//!
//! Each sub-metric lives in its own module and lands in [0, 1]; the evaluator
//! aggregates them into a scalar fitness with objective-dependent weights.
//! Evaluation is pure: the same individual always produces the same record.

pub mod bsn;
pub mod cee;
pub mod cs;
pub mod eh;
pub mod psrnt;
pub mod ue;

pub use bsn::calculate_bsn;
pub use cee::calculate_cee;
pub use cs::calculate_cs;
pub use eh::calculate_eh;
pub use psrnt::calculate_psrnt;
pub use ue::calculate_ue;

use serde::Serialize;

use crate::compatibility::CompatibilityIndex;
use crate::domain::{CategoryDistribution, Objective};
use crate::error::EngineError;
use crate::genetic::Individual;

/// Six sub-scores plus the aggregated fitness, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub cee: f64,
    pub psrnt: f64,
    pub eh: f64,
    pub ue: f64,
    pub cs: f64,
    pub bsn: f64,
    pub fitness: f64,
}

/// One weight row; rows sum to 1.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ObjectiveWeights {
    pub cee: f64,
    pub psrnt: f64,
    pub eh: f64,
    pub ue: f64,
    pub cs: f64,
    pub bsn: f64,
}

impl ObjectiveWeights {
    pub fn for_objective(objective: Objective) -> Self {
        match objective {
            Objective::Alimenticio => Self {
                cee: 0.15,
                psrnt: 0.40,
                eh: 0.15,
                ue: 0.10,
                cs: 0.10,
                bsn: 0.10,
            },
            Objective::Medicinal => Self {
                cee: 0.20,
                psrnt: 0.35,
                eh: 0.10,
                ue: 0.10,
                cs: 0.10,
                bsn: 0.15,
            },
            Objective::Sostenible => Self {
                cee: 0.20,
                psrnt: 0.15,
                eh: 0.30,
                ue: 0.10,
                cs: 0.10,
                bsn: 0.15,
            },
            Objective::Ornamental => Self {
                cee: 0.15,
                psrnt: 0.30,
                eh: 0.10,
                ue: 0.20,
                cs: 0.10,
                bsn: 0.15,
            },
        }
    }

    pub fn sum(&self) -> f64 {
        self.cee + self.psrnt + self.eh + self.ue + self.cs + self.bsn
    }
}

/// Computes the six sub-metrics for a candidate layout and aggregates them
/// under the objective's weight row.
pub struct FitnessEvaluator<'a> {
    index: &'a CompatibilityIndex,
    weights: ObjectiveWeights,
    max_water_weekly: f64,
    desired_distribution: Option<CategoryDistribution>,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(
        index: &'a CompatibilityIndex,
        objective: Objective,
        max_water_weekly: f64,
        desired_distribution: Option<CategoryDistribution>,
    ) -> Self {
        Self {
            index,
            weights: ObjectiveWeights::for_objective(objective),
            max_water_weekly,
            desired_distribution,
        }
    }

    pub fn weights(&self) -> ObjectiveWeights {
        self.weights
    }

    pub fn evaluate(&self, individual: &Individual) -> Result<Metrics, EngineError> {
        let weight_sum = self.weights.sum();
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(EngineError::evaluation(format!(
                "objective weights sum to {weight_sum}, expected 1"
            )));
        }

        let cee = calculate_cee(&individual.plants, self.index);
        let psrnt = calculate_psrnt(&individual.plants, self.desired_distribution.as_ref());
        let eh = calculate_eh(individual.total_weekly_water(), self.max_water_weekly);
        let ue = calculate_ue(individual.used_area(), individual.dimensions.total_area());
        let cs = calculate_cs(&individual.plants);
        let bsn = calculate_bsn(&individual.plants);

        for (name, value) in [
            ("CEE", cee),
            ("PSRNT", psrnt),
            ("EH", eh),
            ("UE", ue),
            ("CS", cs),
            ("BSN", bsn),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(EngineError::evaluation(format!(
                    "{name} = {value} outside [0, 1]"
                )));
            }
        }

        let fitness = self.weights.cee * cee
            + self.weights.psrnt * psrnt
            + self.weights.eh * eh
            + self.weights.ue * ue
            + self.weights.cs * cs
            + self.weights.bsn * bsn;

        Ok(Metrics {
            cee,
            psrnt,
            eh,
            ue,
            cs,
            bsn,
            fitness: fitness.clamp(0.0, 1.0),
        })
    }
}
