//! Validation battery
//!
//! Five independent checks gate a candidate layout before it ships:
//! botanical (catalogue membership), physical (area caps), technical
//! (maintenance load), economic (budget), and agricultural (no antagonists in
//! contact range). Failures are collected into a structured report; bad data
//! never throws.

use serde::Serialize;

use crate::compatibility::CompatibilityIndex;
use crate::domain::{Constraints, Plant, MAINTENANCE_MINUTES_PER_PLANT};
use crate::genetic::{Individual, AREA_CAP_RATIO};

/// Antagonists (compatibility < -0.5) may not stand closer than this.
const CONTACT_RANGE_M: f64 = 1.0;
const HOSTILE_THRESHOLD: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationCategory {
    Botanical,
    Physical,
    Technical,
    Economic,
    Agricultural,
}

/// Aggregated report; `is_valid` iff every category passed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub passed: Vec<ValidationCategory>,
    pub failed: Vec<ValidationCategory>,
    pub errors: Vec<String>,
}

pub struct Validator<'a> {
    catalogue: &'a [std::sync::Arc<Plant>],
    index: &'a CompatibilityIndex,
    constraints: &'a Constraints,
    /// Minutes per week the user can spend on maintenance.
    available_maintenance_minutes: f64,
}

impl<'a> Validator<'a> {
    pub fn new(
        catalogue: &'a [std::sync::Arc<Plant>],
        index: &'a CompatibilityIndex,
        constraints: &'a Constraints,
        available_maintenance_minutes: f64,
    ) -> Self {
        Self {
            catalogue,
            index,
            constraints,
            available_maintenance_minutes,
        }
    }

    /// Default weekly maintenance allowance for an experience level (1-3).
    pub fn maintenance_minutes_for_experience(level: u8) -> f64 {
        level as f64 * 60.0
    }

    pub fn validate(&self, individual: &Individual) -> ValidationReport {
        let mut passed = Vec::with_capacity(5);
        let mut failed = Vec::new();
        let mut errors = Vec::new();

        let checks: [(ValidationCategory, Option<String>); 5] = [
            (ValidationCategory::Botanical, self.check_botanical(individual)),
            (ValidationCategory::Physical, self.check_physical(individual)),
            (ValidationCategory::Technical, self.check_technical(individual)),
            (ValidationCategory::Economic, self.check_economic(individual)),
            (
                ValidationCategory::Agricultural,
                self.check_agricultural(individual),
            ),
        ];

        for (category, error) in checks {
            match error {
                None => passed.push(category),
                Some(message) => {
                    failed.push(category);
                    errors.push(message);
                }
            }
        }

        ValidationReport {
            is_valid: failed.is_empty(),
            passed,
            failed,
            errors,
        }
    }

    fn check_botanical(&self, individual: &Individual) -> Option<String> {
        for instance in &individual.plants {
            if !self.catalogue.iter().any(|p| p.id == instance.plant.id) {
                return Some(format!(
                    "plant id {} ({}) is not in the catalogue",
                    instance.plant.id, instance.plant.species
                ));
            }
        }
        None
    }

    fn check_physical(&self, individual: &Individual) -> Option<String> {
        let used = individual.used_area();
        if used > self.constraints.max_area {
            return Some(format!(
                "planted area {used:.2} m² exceeds the plot's {:.2} m²",
                self.constraints.max_area
            ));
        }
        let total = individual.dimensions.total_area();
        if total > 0.0 && used / total > AREA_CAP_RATIO {
            return Some(format!(
                "utilization {:.0}% exceeds the {}% ceiling",
                used / total * 100.0,
                (AREA_CAP_RATIO * 100.0) as u32
            ));
        }
        None
    }

    fn check_technical(&self, individual: &Individual) -> Option<String> {
        let required = individual.total_plants() as f64 * MAINTENANCE_MINUTES_PER_PLANT;
        if required > self.available_maintenance_minutes {
            return Some(format!(
                "{} plants need {required:.0} min/week, only {:.0} available",
                individual.total_plants(),
                self.available_maintenance_minutes
            ));
        }
        None
    }

    fn check_economic(&self, individual: &Individual) -> Option<String> {
        if let Some(budget) = self.constraints.max_budget {
            let cost = individual.total_cost();
            if cost > budget {
                return Some(format!(
                    "implementation cost {cost:.2} MXN exceeds budget {budget:.2} MXN"
                ));
            }
        }
        None
    }

    fn check_agricultural(&self, individual: &Individual) -> Option<String> {
        for i in 0..individual.plants.len() {
            for j in i + 1..individual.plants.len() {
                let a = &individual.plants[i];
                let b = &individual.plants[j];
                if a.distance_to(b) < CONTACT_RANGE_M {
                    let compat = self.index.lookup(&a.plant.species, &b.plant.species);
                    if compat < HOSTILE_THRESHOLD {
                        return Some(format!(
                            "{} and {} are {:.2} m apart with compatibility {compat:.2}",
                            a.plant.species,
                            b.plant.species,
                            a.distance_to(b)
                        ));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CompatibilityEntry, PlantCategory, PlantInstance, PlotDimensions, SunRequirement,
    };
    use std::sync::Arc;

    fn plant(id: u32, species: &str, size: f64) -> Arc<Plant> {
        Arc::new(Plant {
            id,
            species: species.into(),
            scientific_name: format!("{} sp.", species),
            types: vec![PlantCategory::Vegetable],
            sun_requirement: SunRequirement::Medium,
            weekly_watering: 10.0,
            harvest_days: 60,
            soil_type: "franco".into(),
            water_per_kg: 25.0,
            benefits: vec![],
            size,
        })
    }

    fn constraints() -> Constraints {
        Constraints {
            max_area: 9.0,
            max_water_weekly: 200.0,
            max_budget: Some(500.0),
            desired_distribution: None,
            desired_plant_ids: vec![],
        }
    }

    fn layout(instances: Vec<PlantInstance>) -> Individual {
        let mut ind = Individual::new(PlotDimensions::new(3.0, 3.0));
        ind.plants = instances;
        ind
    }

    #[test]
    fn feasible_layout_passes_all_five() {
        let catalogue = vec![plant(1, "Tomate", 0.25), plant(2, "Lechuga", 0.25)];
        let index = CompatibilityIndex::from_entries(&[]).unwrap();
        let cons = constraints();
        let validator = Validator::new(&catalogue, &index, &cons, 120.0);

        let report = validator.validate(&layout(vec![
            PlantInstance::at(catalogue[0].clone(), 0.5, 0.5),
            PlantInstance::at(catalogue[1].clone(), 2.5, 2.5),
        ]));

        assert!(report.is_valid);
        assert_eq!(report.passed.len(), 5);
        assert!(report.failed.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn unknown_plant_fails_botanical() {
        let catalogue = vec![plant(1, "Tomate", 0.25)];
        let stranger = plant(99, "Fantasma", 0.25);
        let index = CompatibilityIndex::from_entries(&[]).unwrap();
        let cons = constraints();
        let validator = Validator::new(&catalogue, &index, &cons, 120.0);

        let report = validator.validate(&layout(vec![PlantInstance::at(stranger, 1.0, 1.0)]));
        assert!(!report.is_valid);
        assert!(report.failed.contains(&ValidationCategory::Botanical));
    }

    #[test]
    fn crowded_plot_fails_physical() {
        let catalogue = vec![plant(1, "Calabaza", 8.5)];
        let index = CompatibilityIndex::from_entries(&[]).unwrap();
        let cons = constraints();
        let validator = Validator::new(&catalogue, &index, &cons, 120.0);

        // 8.5 of 9 m² total: under max_area but over the 85 % ceiling.
        let report =
            validator.validate(&layout(vec![PlantInstance::at(catalogue[0].clone(), 1.5, 1.5)]));
        assert!(report.failed.contains(&ValidationCategory::Physical));
    }

    #[test]
    fn too_many_plants_fail_technical() {
        let catalogue = vec![plant(1, "Tomate", 0.04)];
        let index = CompatibilityIndex::from_entries(&[]).unwrap();
        let cons = constraints();
        // 60 min allowance: at most 4 plants.
        let validator = Validator::new(&catalogue, &index, &cons, 60.0);

        let instances: Vec<PlantInstance> = (0..5)
            .map(|i| PlantInstance::at(catalogue[0].clone(), 0.3 + i as f64 * 0.6, 0.3))
            .collect();
        let report = validator.validate(&layout(instances));
        assert!(report.failed.contains(&ValidationCategory::Technical));
    }

    #[test]
    fn blown_budget_fails_economic() {
        let catalogue = vec![plant(1, "Olivo", 4.0)];
        let index = CompatibilityIndex::from_entries(&[]).unwrap();
        let mut cons = constraints();
        cons.max_budget = Some(150.0);
        let validator = Validator::new(&catalogue, &index, &cons, 120.0);

        // 4 m² × 50 = 200 MXN against a 150 MXN budget.
        let report =
            validator.validate(&layout(vec![PlantInstance::at(catalogue[0].clone(), 1.5, 1.5)]));
        assert!(report.failed.contains(&ValidationCategory::Economic));
    }

    #[test]
    fn antagonists_in_contact_range_fail_agricultural() {
        let catalogue = vec![plant(1, "Tomate", 0.04), plant(2, "Ruda", 0.04)];
        let index = CompatibilityIndex::from_entries(&[CompatibilityEntry {
            species1: "Tomate".into(),
            species2: "Ruda".into(),
            score: -0.9,
        }])
        .unwrap();
        let cons = constraints();
        let validator = Validator::new(&catalogue, &index, &cons, 120.0);

        let close = validator.validate(&layout(vec![
            PlantInstance::at(catalogue[0].clone(), 1.0, 1.0),
            PlantInstance::at(catalogue[1].clone(), 1.8, 1.0),
        ]));
        assert!(close.failed.contains(&ValidationCategory::Agricultural));

        let apart = validator.validate(&layout(vec![
            PlantInstance::at(catalogue[0].clone(), 0.5, 0.5),
            PlantInstance::at(catalogue[1].clone(), 2.5, 2.5),
        ]));
        assert!(!apart.failed.contains(&ValidationCategory::Agricultural));
    }

    #[test]
    fn experience_levels_map_to_minutes() {
        assert_eq!(Validator::maintenance_minutes_for_experience(1), 60.0);
        assert_eq!(Validator::maintenance_minutes_for_experience(2), 120.0);
        assert_eq!(Validator::maintenance_minutes_for_experience(3), 180.0);
    }
}
