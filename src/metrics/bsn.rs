//! BSN: soil-type diversity
//!
//! A couple of distinct soil types spread nutrient demand; a monoculture of
//! one soil is mediocre, and past three the plot becomes impractical to
//! prepare, so the score steps back down.

use std::collections::HashSet;

use crate::domain::PlantInstance;

pub fn calculate_bsn(instances: &[PlantInstance]) -> f64 {
    let distinct: HashSet<&str> = instances
        .iter()
        .map(|i| i.plant.soil_type.as_str())
        .collect();

    match distinct.len() {
        2 | 3 => 1.0,
        0 | 1 => 0.6,
        k => (1.0 - (k as f64 - 3.0) * 0.2).max(0.4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Plant, PlantCategory, SunRequirement};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn instance(id: u32, soil: &str) -> PlantInstance {
        PlantInstance::at(
            Arc::new(Plant {
                id,
                species: format!("sp-{id}"),
                scientific_name: "Testus plantus".into(),
                types: vec![PlantCategory::Vegetable],
                sun_requirement: SunRequirement::Medium,
                weekly_watering: 10.0,
                harvest_days: 60,
                soil_type: soil.into(),
                water_per_kg: 25.0,
                benefits: vec![],
                size: 0.25,
            }),
            1.0,
            1.0,
        )
    }

    #[test]
    fn two_or_three_soils_are_ideal() {
        let two = vec![instance(1, "franco"), instance(2, "arenoso")];
        let three = vec![
            instance(1, "franco"),
            instance(2, "arenoso"),
            instance(3, "arcilloso"),
        ];
        assert_relative_eq!(calculate_bsn(&two), 1.0);
        assert_relative_eq!(calculate_bsn(&three), 1.0);
    }

    #[test]
    fn single_soil_is_mediocre() {
        let layout = vec![instance(1, "franco"), instance(2, "franco")];
        assert_relative_eq!(calculate_bsn(&layout), 0.6);
        assert_relative_eq!(calculate_bsn(&[]), 0.6);
    }

    #[test]
    fn many_soils_step_down_to_the_floor() {
        let four = vec![
            instance(1, "franco"),
            instance(2, "arenoso"),
            instance(3, "arcilloso"),
            instance(4, "limoso"),
        ];
        assert_relative_eq!(calculate_bsn(&four), 0.8);

        let seven: Vec<PlantInstance> = (0..7)
            .map(|i| instance(i, &format!("suelo-{i}")))
            .collect();
        assert_relative_eq!(calculate_bsn(&seven), 0.4);
    }
}
