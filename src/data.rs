//! Data loading and store ports
//!
//! The engine consumes catalogue and compatibility data through small store
//! traits. File-backed implementations load CSV with Polars once at startup,
//! validate the rows, and keep everything in memory; catalogues are immutable
//! afterwards and safe to share across requests. In-memory stores back the
//! tests and any embedding caller.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashSet;

use crate::domain::{
    CompatibilityEntry, Plant, PlantCategory, SunRequirement,
};
use crate::error::EngineError;

/// Read access to the plant catalogue.
pub trait CatalogueStore: Send + Sync {
    fn list_all(&self) -> Vec<Arc<Plant>>;

    fn find_by_id(&self, id: u32) -> Option<Arc<Plant>> {
        self.list_all().into_iter().find(|p| p.id == id)
    }
}

/// One-shot access to the compatibility matrix, used to build the index.
pub trait CompatibilityStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<CompatibilityEntry>, EngineError>;
}

/// Optional user-profile lookup.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub experience_level: u8,
}

pub trait UserProfileStore: Send + Sync {
    fn get_by_id(&self, user_id: &str) -> Option<UserProfile>;
}

/// Fire-and-forget notification delivery. Failures never propagate to the
/// caller; the orchestrator logs and swallows them.
pub trait NotificationSink: Send + Sync {
    fn send(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> anyhow::Result<()>;
}

/// Sink that writes notifications to the log stream.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn send(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        _data: &serde_json::Value,
    ) -> anyhow::Result<()> {
        tracing::info!(user_id, title, body, "notification");
        Ok(())
    }
}

/// Catalogue held fully in memory.
pub struct MemoryCatalogueStore {
    plants: Vec<Arc<Plant>>,
}

impl MemoryCatalogueStore {
    pub fn new(plants: Vec<Plant>) -> Self {
        Self {
            plants: plants.into_iter().map(Arc::new).collect(),
        }
    }
}

impl CatalogueStore for MemoryCatalogueStore {
    fn list_all(&self) -> Vec<Arc<Plant>> {
        self.plants.clone()
    }
}

/// Compatibility entries held in memory.
pub struct MemoryCompatibilityStore {
    entries: Vec<CompatibilityEntry>,
}

impl MemoryCompatibilityStore {
    pub fn new(entries: Vec<CompatibilityEntry>) -> Self {
        Self { entries }
    }
}

impl CompatibilityStore for MemoryCompatibilityStore {
    fn load_all(&self) -> Result<Vec<CompatibilityEntry>, EngineError> {
        Ok(self.entries.clone())
    }
}

/// Catalogue loaded from a CSV file.
///
/// Expected columns: `id, species, scientific_name, types, sun_requirement,
/// weekly_watering, harvest_days, soil_type, water_per_kg, benefits, size`.
/// `types` and `benefits` are pipe-separated lists.
pub struct CsvCatalogueStore {
    plants: Vec<Arc<Plant>>,
}

impl CsvCatalogueStore {
    pub fn load(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to load plant catalogue: {}", path.display()))?;

        let plants = Self::parse_rows(&df)
            .with_context(|| format!("Invalid plant catalogue: {}", path.display()))?;

        log_catalogue_stats(&plants);

        Ok(Self { plants })
    }

    fn parse_rows(df: &DataFrame) -> Result<Vec<Arc<Plant>>> {
        let ids = df.column("id")?.cast(&DataType::Int64)?;
        let ids = ids.i64()?;
        let species = df.column("species")?.str()?;
        let scientific = df.column("scientific_name")?.str()?;
        let types = df.column("types")?.str()?;
        let sun = df.column("sun_requirement")?.str()?;
        let watering = df.column("weekly_watering")?.cast(&DataType::Float64)?;
        let watering = watering.f64()?;
        let harvest = df.column("harvest_days")?.cast(&DataType::Int64)?;
        let harvest = harvest.i64()?;
        let soil = df.column("soil_type")?.str()?;
        let water_per_kg = df.column("water_per_kg")?.cast(&DataType::Float64)?;
        let water_per_kg = water_per_kg.f64()?;
        let benefits = df.column("benefits")?.str()?;
        let sizes = df.column("size")?.cast(&DataType::Float64)?;
        let sizes = sizes.f64()?;

        let mut seen_ids: FxHashSet<u32> = FxHashSet::default();
        let mut seen_species: FxHashSet<String> = FxHashSet::default();
        let mut plants = Vec::with_capacity(df.height());

        for row in 0..df.height() {
            let id = ids
                .get(row)
                .with_context(|| format!("row {row}: missing id"))? as u32;
            let species_name = species
                .get(row)
                .with_context(|| format!("row {row}: missing species"))?
                .to_string();

            if !seen_ids.insert(id) {
                anyhow::bail!("duplicate plant id {id}");
            }
            if !seen_species.insert(species_name.clone()) {
                anyhow::bail!("duplicate species '{species_name}'");
            }

            let type_tags: Vec<PlantCategory> = types
                .get(row)
                .unwrap_or("")
                .split('|')
                .filter(|s| !s.is_empty())
                .map(|tag| {
                    PlantCategory::parse(tag)
                        .with_context(|| format!("{species_name}: unknown type tag '{tag}'"))
                })
                .collect::<Result<_>>()?;
            if type_tags.is_empty() {
                anyhow::bail!("{species_name}: at least one type tag is required");
            }

            let sun_requirement = sun
                .get(row)
                .and_then(SunRequirement::parse)
                .with_context(|| format!("{species_name}: invalid sun_requirement"))?;

            let weekly_watering = watering.get(row).unwrap_or(0.0);
            let harvest_days = harvest.get(row).unwrap_or(0);
            let size = sizes.get(row).unwrap_or(0.0);

            if weekly_watering < 0.0 {
                anyhow::bail!("{species_name}: weekly_watering must be ≥ 0");
            }
            if harvest_days < 1 {
                anyhow::bail!("{species_name}: harvest_days must be ≥ 1");
            }
            if size <= 0.0 {
                anyhow::bail!("{species_name}: size must be > 0");
            }

            let benefit_list: Vec<String> = benefits
                .get(row)
                .unwrap_or("")
                .split('|')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            plants.push(Arc::new(Plant {
                id,
                species: species_name,
                scientific_name: scientific.get(row).unwrap_or("").to_string(),
                types: type_tags,
                sun_requirement,
                weekly_watering,
                harvest_days: harvest_days as u32,
                soil_type: soil.get(row).unwrap_or("").to_string(),
                water_per_kg: water_per_kg.get(row).unwrap_or(0.0).max(0.0),
                benefits: benefit_list,
                size,
            }));
        }

        Ok(plants)
    }
}

impl CatalogueStore for CsvCatalogueStore {
    fn list_all(&self) -> Vec<Arc<Plant>> {
        self.plants.clone()
    }
}

/// Compatibility matrix loaded from a CSV file with columns
/// `species1, species2, score`.
pub struct CsvCompatibilityStore {
    entries: Vec<CompatibilityEntry>,
}

impl CsvCompatibilityStore {
    pub fn load(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to load compatibility matrix: {}", path.display()))?;

        let species1 = df.column("species1")?.str()?;
        let species2 = df.column("species2")?.str()?;
        let scores = df.column("score")?.cast(&DataType::Float64)?;
        let scores = scores.f64()?;

        let mut entries = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let (Some(a), Some(b), Some(score)) =
                (species1.get(row), species2.get(row), scores.get(row))
            else {
                anyhow::bail!("row {row}: incomplete compatibility entry");
            };
            entries.push(CompatibilityEntry {
                species1: a.to_string(),
                species2: b.to_string(),
                score,
            });
        }

        tracing::info!(entries = entries.len(), "compatibility matrix loaded");
        Ok(Self { entries })
    }
}

impl CompatibilityStore for CsvCompatibilityStore {
    fn load_all(&self) -> Result<Vec<CompatibilityEntry>, EngineError> {
        Ok(self.entries.clone())
    }
}

/// Startup summary of the loaded catalogue, per category.
fn log_catalogue_stats(plants: &[Arc<Plant>]) {
    let count = |category: PlantCategory| {
        plants.iter().filter(|p| p.has_category(category)).count()
    };
    tracing::info!(
        total = plants.len(),
        vegetable = count(PlantCategory::Vegetable),
        medicinal = count(PlantCategory::Medicinal),
        aromatic = count(PlantCategory::Aromatic),
        ornamental = count(PlantCategory::Ornamental),
        "plant catalogue loaded"
    );
}
