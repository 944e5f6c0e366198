//! Core domain types
//!
//! Catalogue plants, placed instances, and the request-level constraint set.
//! Plants are immutable catalogue rows; instances reference them by `Arc` so
//! that individuals stay cheap to clone during evolution.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cost model: implementation cost per m² of planted footprint, in MXN.
pub const COST_PER_M2: f64 = 50.0;

/// Weekly maintenance load per planted instance, in minutes.
pub const MAINTENANCE_MINUTES_PER_PLANT: f64 = 15.0;

/// Category tags a catalogue plant can carry. A plant has at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantCategory {
    Vegetable,
    Medicinal,
    Aromatic,
    Ornamental,
}

impl PlantCategory {
    /// All categories, in the order used for distribution vectors.
    pub const ALL: [PlantCategory; 4] = [
        PlantCategory::Vegetable,
        PlantCategory::Medicinal,
        PlantCategory::Aromatic,
        PlantCategory::Ornamental,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "vegetable" => Some(Self::Vegetable),
            "medicinal" => Some(Self::Medicinal),
            "aromatic" => Some(Self::Aromatic),
            "ornamental" => Some(Self::Ornamental),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetable => "vegetable",
            Self::Medicinal => "medicinal",
            Self::Aromatic => "aromatic",
            Self::Ornamental => "ornamental",
        }
    }
}

impl fmt::Display for PlantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunRequirement {
    Low,
    Medium,
    High,
}

impl SunRequirement {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// High-level goal for the garden; selects the fitness weight row and the
/// selector's objective scoring. Serialized values are the Spanish domain
/// vocabulary used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[serde(rename = "alimenticio")]
    Alimenticio,
    #[serde(rename = "medicinal")]
    Medicinal,
    #[serde(rename = "sostenible")]
    Sostenible,
    #[serde(rename = "ornamental")]
    Ornamental,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alimenticio => "alimenticio",
            Self::Medicinal => "medicinal",
            Self::Sostenible => "sostenible",
            Self::Ornamental => "ornamental",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Auto,
    Spring,
    Summer,
    Autumn,
    Winter,
}

/// One catalogue species. Immutable once loaded; uniquely identified by both
/// `id` and `species`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: u32,
    pub species: String,
    pub scientific_name: String,
    /// Non-empty set of category tags.
    pub types: Vec<PlantCategory>,
    pub sun_requirement: SunRequirement,
    /// Liters per week, ≥ 0.
    pub weekly_watering: f64,
    /// Days until first harvest, ≥ 1.
    pub harvest_days: u32,
    pub soil_type: String,
    /// Liters per kg of production, ≥ 0.
    pub water_per_kg: f64,
    pub benefits: Vec<String>,
    /// Footprint area in m², > 0.
    pub size: f64,
}

impl Plant {
    pub fn has_category(&self, category: PlantCategory) -> bool {
        self.types.contains(&category)
    }

    /// Side length of the default square footprint.
    pub fn footprint_side(&self) -> f64 {
        self.size.sqrt()
    }
}

/// Lifecycle state of a placed instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantStatus {
    #[default]
    Pending,
    Planted,
    Growing,
    HarvestReady,
    Harvested,
}

/// Rotation of a placed footprint, degrees clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    R0,
    #[serde(rename = "90")]
    R90,
    #[serde(rename = "180")]
    R180,
    #[serde(rename = "270")]
    R270,
}

/// One physically placed plant. `(x, y)` is the footprint center in meters;
/// the bounding box spans `x ± width/2`, `y ± height/2`.
#[derive(Debug, Clone)]
pub struct PlantInstance {
    pub plant: Arc<Plant>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: Rotation,
    pub planted_at: Option<DateTime<Utc>>,
    pub status: PlantStatus,
}

impl PlantInstance {
    /// New instance at the given center with the plant's default square
    /// footprint and no rotation.
    pub fn at(plant: Arc<Plant>, x: f64, y: f64) -> Self {
        let side = plant.footprint_side();
        Self {
            plant,
            x,
            y,
            width: side,
            height: side,
            rotation: Rotation::default(),
            planted_at: None,
            status: PlantStatus::default(),
        }
    }

    /// Footprint area of this instance.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Center-to-center Euclidean distance to another instance.
    pub fn distance_to(&self, other: &PlantInstance) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Axis-aligned bounding-box overlap test.
    pub fn overlaps(&self, other: &PlantInstance) -> bool {
        (self.x - other.x).abs() < (self.width + other.width) / 2.0
            && (self.y - other.y).abs() < (self.height + other.height) / 2.0
    }

    /// Whether the bounding box lies inside a `w × h` plot.
    pub fn within_bounds(&self, w: f64, h: f64) -> bool {
        self.x - self.width / 2.0 >= 0.0
            && self.y - self.height / 2.0 >= 0.0
            && self.x + self.width / 2.0 <= w
            && self.y + self.height / 2.0 <= h
    }
}

/// Rectangular plot dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotDimensions {
    pub width: f64,
    pub height: f64,
}

impl PlotDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn total_area(&self) -> f64 {
        self.width * self.height
    }
}

/// Desired category distribution, percentages summing to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    #[serde(default)]
    pub vegetable: f64,
    #[serde(default)]
    pub medicinal: f64,
    #[serde(default)]
    pub aromatic: f64,
    #[serde(default)]
    pub ornamental: f64,
}

impl CategoryDistribution {
    /// Percentages in `PlantCategory::ALL` order.
    pub fn as_vector(&self) -> [f64; 4] {
        [self.vegetable, self.medicinal, self.aromatic, self.ornamental]
    }

    pub fn sum(&self) -> f64 {
        self.vegetable + self.medicinal + self.aromatic + self.ornamental
    }
}

/// Resource ceilings and preferences a layout must respect.
#[derive(Debug, Clone)]
pub struct Constraints {
    /// Plot area in m².
    pub max_area: f64,
    /// Weekly water ceiling in liters.
    pub max_water_weekly: f64,
    /// Budget ceiling in MXN, when set.
    pub max_budget: Option<f64>,
    pub desired_distribution: Option<CategoryDistribution>,
    /// Restricts the candidate pool when non-empty.
    pub desired_plant_ids: Vec<u32>,
}

/// Directed compatibility triple as stored; lookups are symmetric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    pub species1: String,
    pub species2: String,
    /// Affinity in [-1, 1].
    pub score: f64,
}
