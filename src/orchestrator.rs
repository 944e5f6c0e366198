//! Request orchestration
//!
//! Normalizes an inbound optimization request with its documented defaults,
//! drives selector → genetic algorithm → validator, and assembles the ranked
//! response with per-solution estimations, calendar summary, pair
//! compatibilities, and run metadata. Random defaults draw from the same LCG
//! stream as the evolution itself, so a seeded request reproduces the whole
//! response.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::compatibility::CompatibilityIndex;
use crate::data::{CatalogueStore, CompatibilityStore, NotificationSink, UserProfileStore};
use crate::domain::{
    CategoryDistribution, Constraints, Objective, Plant, PlantCategory, PlotDimensions, Season,
    MAINTENANCE_MINUTES_PER_PLANT,
};
use crate::error::EngineError;
use crate::genetic::{GaConfig, GeneticAlgorithm, Individual, StoppingReason};
use crate::metrics::{FitnessEvaluator, ObjectiveWeights};
use crate::rng::Lcg;
use crate::selector::{select_plants, PlantSelectionConfig};
use crate::validator::{ValidationReport, Validator};

/// Default plot location when the request omits one (Tuxtla Gutiérrez).
const DEFAULT_LOCATION: (f64, f64) = (16.75, -93.11);
/// Monthly production estimate per m² of vegetable footprint, in kg.
const PRODUCTION_KG_PER_VEGETABLE_M2: f64 = 2.0;

// ---------------------------------------------------------------------------
// Inbound request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub user_id: String,
    #[serde(default)]
    pub desired_plant_ids: Vec<u32>,
    pub max_plant_species: Option<usize>,
    pub dimensions: Option<DimensionsInput>,
    pub water_limit: Option<f64>,
    pub user_experience: u8,
    pub season: Option<Season>,
    pub location: Option<Location>,
    pub category_distribution: Option<CategoryDistribution>,
    pub budget: Option<f64>,
    pub objective: Option<Objective>,
    pub maintenance_minutes: Option<f64>,
    /// Evolution tuning overrides, including the reproducibility seed.
    pub ga: Option<GaOverrides>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DimensionsInput {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaOverrides {
    pub population_size: Option<usize>,
    pub max_generations: Option<usize>,
    pub crossover_probability: Option<f64>,
    pub mutation_rate: Option<f64>,
    pub insertion_rate: Option<f64>,
    pub deletion_rate: Option<f64>,
    pub tournament_k: Option<usize>,
    pub elite_count: Option<usize>,
    pub patience: Option<usize>,
    pub convergence_threshold: Option<f64>,
    pub timeout_ms: Option<u64>,
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub success: bool,
    pub solutions: Vec<Solution>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub rank: usize,
    pub layout: Layout,
    pub metrics: MetricsOut,
    pub estimations: Estimations,
    pub calendar: CalendarSummary,
    pub compatibilities: Vec<PairCompatibility>,
    pub validation: ValidationReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub dimensions: LayoutDimensions,
    pub plants: Vec<PlacedPlant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDimensions {
    pub width: f64,
    pub height: f64,
    pub total_area: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPlant {
    pub id: u32,
    pub name: String,
    pub scientific_name: String,
    pub quantity: u32,
    pub position: Position,
    pub area: f64,
    pub types: Vec<PlantCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsOut {
    pub cee: f64,
    pub psrnt: f64,
    pub eh: f64,
    pub ue: f64,
    pub cs: f64,
    pub bsn: f64,
    pub fitness: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimations {
    pub monthly_production_kg: f64,
    pub weekly_water_liters: f64,
    pub implementation_cost_mxn: f64,
    pub maintenance_minutes_per_week: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    pub first_harvest_days: u32,
    pub last_harvest_days: u32,
    pub staggered_harvest: bool,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub species: String,
    pub harvest_days: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCompatibility {
    pub species1: String,
    pub species2: String,
    pub score: f64,
    /// `benefica` (> 0.5), `neutral`, or `perjudicial` (< -0.5).
    pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub execution_time_ms: u64,
    pub total_generations: usize,
    pub convergence_generation: Option<usize>,
    pub population_size: usize,
    pub stopping_reason: StoppingReason,
    pub weights: ObjectiveWeights,
    pub selected_plants: Vec<SelectedPlant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPlant {
    pub id: u32,
    pub species: String,
    pub scientific_name: String,
}

// ---------------------------------------------------------------------------
// Normalized request
// ---------------------------------------------------------------------------

/// Request after defaults and validation; every field is concrete.
#[derive(Debug)]
struct NormalizedRequest {
    user_id: String,
    constraints: Constraints,
    max_species: usize,
    objective: Objective,
    season: Season,
    maintenance_minutes: f64,
    config: GaConfig,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    catalogue: Vec<Arc<Plant>>,
    index: Arc<CompatibilityIndex>,
    profiles: Option<Arc<dyn UserProfileStore>>,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl Orchestrator {
    /// Builds the orchestrator from its stores. Fails with a catalogue error
    /// when the catalogue is empty or the compatibility data is defective.
    pub fn new(
        catalogue_store: &dyn CatalogueStore,
        compatibility_store: &dyn CompatibilityStore,
    ) -> Result<Self, EngineError> {
        let catalogue = catalogue_store.list_all();
        if catalogue.is_empty() {
            return Err(EngineError::catalogue("plant catalogue is empty"));
        }
        let entries = compatibility_store.load_all()?;
        let index = CompatibilityIndex::from_entries(&entries)?;

        Ok(Self {
            catalogue,
            index: Arc::new(index),
            profiles: None,
            notifier: None,
        })
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn UserProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn catalogue(&self) -> &[Arc<Plant>] {
        &self.catalogue
    }

    /// Full pipeline: normalize → select pool → evolve → validate → respond.
    pub fn optimize(&self, request: OptimizeRequest) -> Result<OptimizeResponse, EngineError> {
        let start = Instant::now();

        let seed = request.ga.as_ref().and_then(|ga| ga.seed);
        let mut rng = match seed {
            Some(seed) => Lcg::new(seed),
            None => Lcg::from_entropy(),
        };

        let normalized = self.normalize(request, &mut rng)?;

        let pool = select_plants(
            &self.catalogue,
            &PlantSelectionConfig {
                desired_plant_ids: &normalized.constraints.desired_plant_ids,
                max_species: normalized.max_species,
                objective: normalized.objective,
                index: &self.index,
                season: normalized.season,
            },
        );

        let evaluator = FitnessEvaluator::new(
            &self.index,
            normalized.objective,
            normalized.constraints.max_water_weekly,
            normalized.constraints.desired_distribution,
        );

        let ga = GeneticAlgorithm::new(
            &pool,
            &normalized.constraints,
            &self.index,
            &evaluator,
            &normalized.config,
        );
        let outcome = ga.run(&mut rng)?;

        let validator = Validator::new(
            &self.catalogue,
            &self.index,
            &normalized.constraints,
            normalized.maintenance_minutes,
        );

        let solutions: Vec<Solution> = outcome
            .top
            .iter()
            .enumerate()
            .map(|(i, individual)| self.build_solution(i + 1, individual, &validator))
            .collect();

        let metadata = ResponseMetadata {
            execution_time_ms: start.elapsed().as_millis() as u64,
            total_generations: outcome.total_generations,
            convergence_generation: outcome.convergence_generation,
            population_size: normalized.config.population_size,
            stopping_reason: outcome.stopping_reason,
            weights: evaluator.weights(),
            selected_plants: pool
                .iter()
                .map(|p| SelectedPlant {
                    id: p.id,
                    species: p.species.clone(),
                    scientific_name: p.scientific_name.clone(),
                })
                .collect(),
        };

        let response = OptimizeResponse {
            success: !solutions.is_empty(),
            solutions,
            metadata,
        };

        self.notify(&normalized.user_id, &response);

        Ok(response)
    }

    /// Applies the documented defaults and rejects malformed fields. Random
    /// defaults (dimensions, water limit) draw from the request stream.
    fn normalize(
        &self,
        request: OptimizeRequest,
        rng: &mut Lcg,
    ) -> Result<NormalizedRequest, EngineError> {
        if request.user_id.trim().is_empty() {
            return Err(EngineError::validation("userId is required"));
        }
        if !(1..=3).contains(&request.user_experience) {
            return Err(EngineError::validation(
                "userExperience must be 1, 2, or 3",
            ));
        }

        let max_species = request.max_plant_species.unwrap_or(5);
        if !matches!(max_species, 3 | 5) {
            return Err(EngineError::validation("maxPlantSpecies must be 3 or 5"));
        }

        let dimensions = match request.dimensions {
            Some(dims) => {
                for (name, value) in [("width", dims.width), ("height", dims.height)] {
                    if !(0.5..=10.0).contains(&value) {
                        return Err(EngineError::validation(format!(
                            "dimensions.{name} must be in [0.5, 10], got {value}"
                        )));
                    }
                }
                PlotDimensions::new(dims.width, dims.height)
            }
            None => {
                let area = rng.range(1.0, 5.0);
                let ratio = rng.range(0.6, 1.4);
                let width = (area * ratio).sqrt();
                PlotDimensions::new(width, area / width)
            }
        };
        let area = dimensions.total_area();

        let water_limit = match request.water_limit {
            Some(limit) if limit < 0.0 => {
                return Err(EngineError::validation("waterLimit must be ≥ 0"));
            }
            Some(limit) => limit,
            None => area * rng.range(50.0, 80.0),
        };

        // Location defaults to Tuxtla Gutiérrez; the engine only range-checks
        // it today (seasonal adjustment is the reserved consumer).
        let location = request.location.unwrap_or(Location {
            lat: DEFAULT_LOCATION.0,
            lon: DEFAULT_LOCATION.1,
        });
        if !(-90.0..=90.0).contains(&location.lat) {
            return Err(EngineError::validation("location.lat must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&location.lon) {
            return Err(EngineError::validation(
                "location.lon must be in [-180, 180]",
            ));
        }

        if let Some(distribution) = &request.category_distribution {
            let sum = distribution.sum();
            if (sum - 100.0).abs() > 1e-6 {
                return Err(EngineError::validation(format!(
                    "categoryDistribution must sum to 100, got {sum}"
                )));
            }
        }

        let budget = match request.budget {
            Some(budget) if budget < 0.0 => {
                return Err(EngineError::validation("budget must be ≥ 0"));
            }
            Some(budget) => budget,
            None => area * 200.0,
        };

        let profile_experience = self
            .profiles
            .as_ref()
            .and_then(|store| store.get_by_id(&request.user_id))
            .map(|profile| profile.experience_level);

        let maintenance_minutes = match request.maintenance_minutes {
            Some(minutes) if minutes < 0.0 => {
                return Err(EngineError::validation("maintenanceMinutes must be ≥ 0"));
            }
            Some(minutes) => minutes,
            None => {
                let level = profile_experience.unwrap_or(request.user_experience);
                Validator::maintenance_minutes_for_experience(level)
            }
        };

        let mut config = GaConfig {
            max_species,
            ..GaConfig::default()
        };
        if let Some(overrides) = &request.ga {
            apply_overrides(&mut config, overrides);
        }
        config.validate()?;

        Ok(NormalizedRequest {
            user_id: request.user_id,
            constraints: Constraints {
                max_area: area,
                max_water_weekly: water_limit,
                max_budget: Some(budget),
                desired_distribution: request.category_distribution,
                desired_plant_ids: request.desired_plant_ids,
            },
            max_species,
            objective: request.objective.unwrap_or(Objective::Alimenticio),
            season: request.season.unwrap_or(Season::Auto),
            maintenance_minutes,
            config,
        })
    }

    fn build_solution(
        &self,
        rank: usize,
        individual: &Individual,
        validator: &Validator,
    ) -> Solution {
        let metrics = individual.metrics.unwrap_or(crate::metrics::Metrics {
            cee: 0.0,
            psrnt: 0.0,
            eh: 0.0,
            ue: 0.0,
            cs: 0.0,
            bsn: 0.0,
            fitness: 0.0,
        });

        let plants: Vec<PlacedPlant> = individual
            .plants
            .iter()
            .map(|instance| PlacedPlant {
                id: instance.plant.id,
                name: instance.plant.species.clone(),
                scientific_name: instance.plant.scientific_name.clone(),
                quantity: 1,
                position: Position {
                    x: instance.x,
                    y: instance.y,
                },
                area: instance.area(),
                types: instance.plant.types.clone(),
            })
            .collect();

        let vegetable_area: f64 = individual
            .plants
            .iter()
            .filter(|i| i.plant.has_category(PlantCategory::Vegetable))
            .map(|i| i.area())
            .sum();

        let harvest_days: Vec<u32> = individual
            .plants
            .iter()
            .map(|i| i.plant.harvest_days)
            .collect();
        let first = harvest_days.iter().min().copied().unwrap_or(0);
        let last = harvest_days.iter().max().copied().unwrap_or(0);

        let mut seen_species: Vec<&str> = Vec::new();
        let mut entries = Vec::new();
        for instance in &individual.plants {
            if !seen_species.contains(&instance.plant.species.as_str()) {
                seen_species.push(&instance.plant.species);
                entries.push(CalendarEntry {
                    species: instance.plant.species.clone(),
                    harvest_days: instance.plant.harvest_days,
                });
            }
        }

        let mut compatibilities = Vec::new();
        for i in 0..individual.plants.len() {
            for j in i + 1..individual.plants.len() {
                let a = &individual.plants[i];
                let b = &individual.plants[j];
                let score = self.index.lookup(&a.plant.species, &b.plant.species);
                compatibilities.push(PairCompatibility {
                    species1: a.plant.species.clone(),
                    species2: b.plant.species.clone(),
                    score,
                    label: pair_label(score).to_string(),
                });
            }
        }

        Solution {
            rank,
            layout: Layout {
                dimensions: LayoutDimensions {
                    width: individual.dimensions.width,
                    height: individual.dimensions.height,
                    total_area: individual.dimensions.total_area(),
                },
                plants,
            },
            metrics: MetricsOut {
                cee: round4(metrics.cee),
                psrnt: round4(metrics.psrnt),
                eh: round4(metrics.eh),
                ue: round4(metrics.ue),
                cs: round4(metrics.cs),
                bsn: round4(metrics.bsn),
                fitness: round4(metrics.fitness),
            },
            estimations: Estimations {
                monthly_production_kg: round4(vegetable_area * PRODUCTION_KG_PER_VEGETABLE_M2),
                weekly_water_liters: round4(individual.total_weekly_water()),
                implementation_cost_mxn: round4(individual.total_cost()),
                maintenance_minutes_per_week: individual.total_plants() as f64
                    * MAINTENANCE_MINUTES_PER_PLANT,
            },
            calendar: CalendarSummary {
                first_harvest_days: first,
                last_harvest_days: last,
                staggered_harvest: first != last,
                entries,
            },
            compatibilities,
            validation: validator.validate(individual),
        }
    }

    /// Fire-and-forget completion notice; failures are logged and swallowed.
    fn notify(&self, user_id: &str, response: &OptimizeResponse) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let body = format!(
            "{} layout(s) ready, best fitness {:.4}",
            response.solutions.len(),
            response
                .solutions
                .first()
                .map(|s| s.metrics.fitness)
                .unwrap_or(0.0)
        );
        let data = serde_json::json!({
            "solutions": response.solutions.len(),
            "stoppingReason": response.metadata.stopping_reason,
        });
        if let Err(error) = notifier.send(user_id, "Garden plan ready", &body, &data) {
            tracing::warn!(user_id, %error, "notification delivery failed");
        }
    }
}

fn apply_overrides(config: &mut GaConfig, overrides: &GaOverrides) {
    if let Some(v) = overrides.population_size {
        config.population_size = v;
    }
    if let Some(v) = overrides.max_generations {
        config.max_generations = v;
    }
    if let Some(v) = overrides.crossover_probability {
        config.crossover_probability = v;
    }
    if let Some(v) = overrides.mutation_rate {
        config.mutation_rate = v;
    }
    if let Some(v) = overrides.insertion_rate {
        config.insertion_rate = v;
    }
    if let Some(v) = overrides.deletion_rate {
        config.deletion_rate = v;
    }
    if let Some(v) = overrides.tournament_k {
        config.tournament_k = v;
    }
    if let Some(v) = overrides.elite_count {
        config.elite_count = v;
    }
    if let Some(v) = overrides.patience {
        config.patience = v;
    }
    if let Some(v) = overrides.convergence_threshold {
        config.convergence_threshold = v;
    }
    if let Some(v) = overrides.timeout_ms {
        config.timeout_ms = v;
    }
    config.seed = overrides.seed;
}

fn pair_label(score: f64) -> &'static str {
    if score > 0.5 {
        "benefica"
    } else if score < -0.5 {
        "perjudicial"
    } else {
        "neutral"
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
