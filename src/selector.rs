//! Plant selector
//!
//! Chooses the species pool the genetic algorithm is allowed to place.
//! Candidates are scored on objective fit, mutual compatibility, resource
//! thrift, and tag diversity, then picked greedily under a
//! mutual-compatibility gate so the pool does not ship antagonists together.

use std::sync::Arc;

use crate::compatibility::CompatibilityIndex;
use crate::domain::{Objective, Plant, PlantCategory, Season};

const W_OBJECTIVE: f64 = 0.30;
const W_COMPATIBILITY: f64 = 0.40;
const W_RESOURCE: f64 = 0.20;
const W_DIVERSITY: f64 = 0.10;

/// A pairing below this threshold counts as strongly negative for the
/// greedy gate.
const STRONG_NEGATIVE: f64 = -0.3;

/// Selection inputs.
pub struct PlantSelectionConfig<'a> {
    /// Restricts the candidate pool when non-empty.
    pub desired_plant_ids: &'a [u32],
    /// Pool ceiling (3 or 5).
    pub max_species: usize,
    pub objective: Objective,
    pub index: &'a CompatibilityIndex,
    /// Reserved; the season filter is currently a pass-through.
    pub season: Season,
}

#[derive(Debug)]
struct ScoredCandidate {
    plant: Arc<Plant>,
    score: f64,
}

/// Scores the catalogue and greedily picks up to `max_species` plants.
///
/// Never fails: with a non-empty catalogue at least one plant comes back.
pub fn select_plants(catalogue: &[Arc<Plant>], config: &PlantSelectionConfig) -> Vec<Arc<Plant>> {
    if catalogue.is_empty() {
        return Vec::new();
    }

    // 1. Desired-id restriction. Falls back to the full catalogue only when
    // the filter matches nothing; a smaller explicit pool is honored as-is.
    let mut candidates: Vec<Arc<Plant>> = if config.desired_plant_ids.is_empty() {
        catalogue.to_vec()
    } else {
        let filtered: Vec<Arc<Plant>> = catalogue
            .iter()
            .filter(|p| config.desired_plant_ids.contains(&p.id))
            .cloned()
            .collect();
        if filtered.is_empty() {
            tracing::warn!(
                desired = ?config.desired_plant_ids,
                "no desired plant ids matched the catalogue, falling back to all species"
            );
            catalogue.to_vec()
        } else {
            filtered
        }
    };

    // 2. Season filter (reserved).
    candidates = filter_by_season(candidates, config.season);

    // 3. Score every remaining candidate.
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|plant| ScoredCandidate {
            plant: plant.clone(),
            score: candidate_score(plant, &candidates, config.objective, config.index),
        })
        .collect();

    // 4. Sort by score, id as the deterministic tie-break, then pick
    // greedily: a candidate joins only while it has at most one strongly
    // negative pairing with the members already chosen.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.plant.id.cmp(&b.plant.id))
    });

    let mut selected: Vec<Arc<Plant>> = Vec::with_capacity(config.max_species);
    for candidate in &scored {
        if selected.len() >= config.max_species {
            break;
        }
        let negatives = selected
            .iter()
            .filter(|member| {
                config.index.lookup(&candidate.plant.species, &member.species) < STRONG_NEGATIVE
            })
            .count();
        if negatives <= 1 {
            selected.push(candidate.plant.clone());
        }
    }

    // 5. If the gate starved the pool, fill the remainder in pure score
    // order regardless of pairings.
    if selected.len() < config.max_species {
        for candidate in &scored {
            if selected.len() >= config.max_species {
                break;
            }
            if !selected.iter().any(|p| p.id == candidate.plant.id) {
                selected.push(candidate.plant.clone());
            }
        }
    }

    tracing::debug!(
        pool = ?selected.iter().map(|p| p.species.as_str()).collect::<Vec<_>>(),
        objective = config.objective.as_str(),
        "species pool selected"
    );

    selected
}

fn filter_by_season(candidates: Vec<Arc<Plant>>, _season: Season) -> Vec<Arc<Plant>> {
    candidates
}

fn candidate_score(
    plant: &Plant,
    candidates: &[Arc<Plant>],
    objective: Objective,
    index: &CompatibilityIndex,
) -> f64 {
    W_OBJECTIVE * objective_score(plant, objective)
        + W_COMPATIBILITY * compatibility_score(plant, candidates, index)
        + W_RESOURCE * resource_score(plant)
        + W_DIVERSITY * diversity_score(plant)
}

fn objective_score(plant: &Plant, objective: Objective) -> f64 {
    match objective {
        Objective::Alimenticio => {
            if plant.has_category(PlantCategory::Vegetable) {
                1.0
            } else {
                0.3
            }
        }
        Objective::Medicinal => {
            if plant.has_category(PlantCategory::Medicinal) {
                1.0
            } else if plant.has_category(PlantCategory::Aromatic) {
                0.6
            } else {
                0.2
            }
        }
        Objective::Sostenible => (1.0 - plant.weekly_watering / 100.0).max(0.0),
        Objective::Ornamental => {
            if plant.has_category(PlantCategory::Ornamental) {
                1.0
            } else if plant.has_category(PlantCategory::Aromatic) {
                0.5
            } else {
                0.2
            }
        }
    }
}

/// Mean pairwise compatibility with every other candidate, remapped from
/// [-1, 1] to [0, 1]. A lone candidate scores 1.0.
fn compatibility_score(plant: &Plant, candidates: &[Arc<Plant>], index: &CompatibilityIndex) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for other in candidates {
        if other.species == plant.species {
            continue;
        }
        sum += index.lookup(&plant.species, &other.species);
        count += 1;
    }
    if count == 0 {
        return 1.0;
    }
    (sum / count as f64 + 1.0) / 2.0
}

fn resource_score(plant: &Plant) -> f64 {
    let size_thrift = (1.0 - plant.size / 2.0).max(0.0);
    let water_thrift = (1.0 - plant.weekly_watering / 100.0).max(0.0);
    (size_thrift + water_thrift) / 2.0
}

fn diversity_score(plant: &Plant) -> f64 {
    (plant.types.len() as f64 / 3.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompatibilityEntry, SunRequirement};
    use approx::assert_relative_eq;

    fn plant(id: u32, species: &str, types: Vec<PlantCategory>, watering: f64) -> Arc<Plant> {
        Arc::new(Plant {
            id,
            species: species.into(),
            scientific_name: format!("{} sp.", species),
            types,
            sun_requirement: SunRequirement::Medium,
            weekly_watering: watering,
            harvest_days: 60,
            soil_type: "franco".into(),
            water_per_kg: 25.0,
            benefits: vec![],
            size: 0.25,
        })
    }

    fn catalogue() -> Vec<Arc<Plant>> {
        vec![
            plant(1, "Cilantro", vec![PlantCategory::Aromatic, PlantCategory::Vegetable], 10.0),
            plant(2, "Tomate", vec![PlantCategory::Vegetable], 30.0),
            plant(3, "Albahaca", vec![PlantCategory::Aromatic, PlantCategory::Medicinal], 12.0),
            plant(4, "Ruda", vec![PlantCategory::Medicinal], 8.0),
            plant(5, "Geranio", vec![PlantCategory::Ornamental], 15.0),
            plant(6, "Lechuga", vec![PlantCategory::Vegetable], 18.0),
        ]
    }

    fn index(entries: &[(&str, &str, f64)]) -> CompatibilityIndex {
        let entries: Vec<CompatibilityEntry> = entries
            .iter()
            .map(|(a, b, s)| CompatibilityEntry {
                species1: (*a).into(),
                species2: (*b).into(),
                score: *s,
            })
            .collect();
        CompatibilityIndex::from_entries(&entries).unwrap()
    }

    fn config<'a>(
        desired: &'a [u32],
        max_species: usize,
        index: &'a CompatibilityIndex,
    ) -> PlantSelectionConfig<'a> {
        PlantSelectionConfig {
            desired_plant_ids: desired,
            max_species,
            objective: Objective::Alimenticio,
            index,
            season: Season::Auto,
        }
    }

    #[test]
    fn single_desired_id_pins_the_pool() {
        let idx = index(&[]);
        let pool = select_plants(&catalogue(), &config(&[2], 5, &idx));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, 2);
    }

    #[test]
    fn unmatched_desired_ids_fall_back_to_catalogue() {
        let idx = index(&[]);
        let pool = select_plants(&catalogue(), &config(&[99], 3, &idx));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn returns_exactly_max_species_from_a_large_catalogue() {
        let idx = index(&[]);
        for max in [3usize, 5] {
            let pool = select_plants(&catalogue(), &config(&[], max, &idx));
            assert_eq!(pool.len(), max);
        }
    }

    #[test]
    fn greedy_gate_defers_antagonists() {
        // Ruda is hostile to both vegetables that outscore it; with two
        // strongly negative pairings it cannot join until the fill stage.
        let idx = index(&[
            ("Ruda", "Tomate", -0.8),
            ("Ruda", "Cilantro", -0.7),
            ("Tomate", "Cilantro", 0.9),
            ("Tomate", "Lechuga", 0.7),
            ("Cilantro", "Lechuga", 0.6),
        ]);
        let pool = select_plants(&catalogue(), &config(&[1, 2, 4, 6], 3, &idx));
        assert_eq!(pool.len(), 3);
        assert!(!pool.iter().any(|p| p.species == "Ruda"));
    }

    #[test]
    fn gate_starvation_fills_by_score_order() {
        // Every pair is hostile; the gate admits the first two (one negative
        // pairing each is tolerated), the rest join by score order anyway.
        let idx = index(&[
            ("Cilantro", "Tomate", -0.9),
            ("Cilantro", "Albahaca", -0.9),
            ("Tomate", "Albahaca", -0.9),
            ("Cilantro", "Lechuga", -0.9),
            ("Tomate", "Lechuga", -0.9),
            ("Albahaca", "Lechuga", -0.9),
        ]);
        let pool = select_plants(&catalogue(), &config(&[1, 2, 3, 6], 4, &idx));
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn objective_scoring_matches_the_bands() {
        let veg = plant(1, "Tomate", vec![PlantCategory::Vegetable], 50.0);
        let herb = plant(2, "Albahaca", vec![PlantCategory::Aromatic], 50.0);
        assert_relative_eq!(objective_score(&veg, Objective::Alimenticio), 1.0);
        assert_relative_eq!(objective_score(&herb, Objective::Alimenticio), 0.3);
        assert_relative_eq!(objective_score(&herb, Objective::Medicinal), 0.6);
        assert_relative_eq!(objective_score(&herb, Objective::Ornamental), 0.5);
        assert_relative_eq!(objective_score(&veg, Objective::Sostenible), 0.5);
    }

    #[test]
    fn lone_candidate_gets_full_compatibility_score() {
        let idx = index(&[]);
        let only = plant(1, "Tomate", vec![PlantCategory::Vegetable], 10.0);
        let pool = vec![only.clone()];
        assert_relative_eq!(compatibility_score(&only, &pool, &idx), 1.0);
    }

    #[test]
    fn empty_catalogue_yields_empty_pool() {
        let idx = index(&[]);
        assert!(select_plants(&[], &config(&[], 5, &idx)).is_empty());
    }
}
