//! Urban-garden layout optimizer
//!
//! Given a plot, a plant catalogue with a pairwise compatibility matrix, and
//! resource ceilings, the engine selects a species pool, evolves physical
//! layouts with a genetic algorithm, scores them on six quality metrics, and
//! gates the ranked results through a five-category validation battery.
//!
//! - `selector`: picks the species pool under objective and compatibility constraints
//! - `genetic`: variable-length layout evolution with spatial feasibility
//! - `metrics`: the six sub-metrics and the objective-weighted evaluator
//! - `validator`: botanical / physical / technical / economic / agricultural checks
//! - `orchestrator`: request normalization and response assembly
//! - `data`: store ports plus CSV (Polars) and in-memory implementations

pub mod compatibility;
pub mod data;
pub mod domain;
pub mod error;
pub mod genetic;
pub mod metrics;
pub mod orchestrator;
pub mod rng;
pub mod selector;
pub mod spacing;
pub mod validator;

#[cfg(feature = "api")]
pub mod api_server;

pub use compatibility::CompatibilityIndex;
pub use data::{
    CatalogueStore, CompatibilityStore, CsvCatalogueStore, CsvCompatibilityStore,
    LogNotificationSink, MemoryCatalogueStore, MemoryCompatibilityStore, NotificationSink,
    UserProfile, UserProfileStore,
};
pub use domain::{
    CategoryDistribution, CompatibilityEntry, Constraints, Objective, Plant, PlantCategory,
    PlantInstance, PlantStatus, PlotDimensions, Rotation, Season, SunRequirement,
};
pub use error::EngineError;
pub use genetic::{GaConfig, GaOutcome, GeneticAlgorithm, Individual, StoppingReason};
pub use metrics::{FitnessEvaluator, Metrics, ObjectiveWeights};
pub use orchestrator::{OptimizeRequest, OptimizeResponse, Orchestrator};
pub use rng::Lcg;
pub use selector::{select_plants, PlantSelectionConfig};
pub use validator::{ValidationReport, Validator};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
