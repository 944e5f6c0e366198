//! Genetic layout search
//!
//! Evolves a population of variable-length layouts: heuristic initialization
//! with rejection-sampled placement, tournament selection, uniform crossover,
//! four mutations, and generational replacement with elitism by truncation.
//! Every stochastic decision draws from one LCG stream, so a seeded request
//! reproduces its layouts exactly. Fitness evaluation is pure and runs in
//! parallel with Rayon; that never touches the stream.

pub mod individual;
pub mod operators;
pub mod placement;

pub use individual::Individual;
pub use placement::{PlacementContext, AREA_CAP_RATIO};

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::compatibility::CompatibilityIndex;
use crate::domain::{Constraints, Plant, PlotDimensions};
use crate::error::EngineError;
use crate::metrics::FitnessEvaluator;
use crate::rng::Lcg;

use operators::{
    mutate_delete, mutate_insert, mutate_relocate, mutate_swap, tournament_select,
    uniform_crossover,
};

/// Placement attempts during initialization.
const INIT_TRIES: usize = 50;
/// Best-fitness improvements below this do not reset the stall counter.
const IMPROVEMENT_EPSILON: f64 = 0.001;
/// How many top individuals a run returns.
const TOP_K: usize = 3;

/// Why the evolution loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingReason {
    Timeout,
    Patience,
    Convergence,
    MaxGenerations,
}

/// Evolution tuning. `Default` carries the production values; requests may
/// override any field.
#[derive(Debug, Clone)]
pub struct GaConfig {
    pub population_size: usize,
    pub max_generations: usize,
    pub crossover_probability: f64,
    pub mutation_rate: f64,
    pub insertion_rate: f64,
    pub deletion_rate: f64,
    pub tournament_k: usize,
    pub elite_count: usize,
    pub patience: usize,
    pub convergence_threshold: f64,
    pub timeout_ms: u64,
    pub seed: Option<u64>,
    /// Species pool ceiling, 3 or 5.
    pub max_species: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            max_generations: 120,
            crossover_probability: 0.85,
            mutation_rate: 0.15,
            insertion_rate: 0.12,
            deletion_rate: 0.08,
            tournament_k: 3,
            elite_count: 2,
            patience: 15,
            convergence_threshold: 1e-4,
            timeout_ms: 30_000,
            seed: None,
            max_species: 5,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.population_size < 2 {
            return Err(EngineError::validation("populationSize must be at least 2"));
        }
        if self.max_generations == 0 {
            return Err(EngineError::validation("maxGenerations must be positive"));
        }
        for (name, p) in [
            ("crossoverProbability", self.crossover_probability),
            ("mutationRate", self.mutation_rate),
            ("insertionRate", self.insertion_rate),
            ("deletionRate", self.deletion_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::validation(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        if self.tournament_k == 0 {
            return Err(EngineError::validation("tournamentK must be at least 1"));
        }
        if self.elite_count == 0 || self.elite_count > self.population_size {
            return Err(EngineError::validation(
                "eliteCount must be in [1, populationSize]",
            ));
        }
        if !matches!(self.max_species, 3 | 5) {
            return Err(EngineError::validation("maxSpecies must be 3 or 5"));
        }
        Ok(())
    }
}

/// Result of one evolution run.
#[derive(Debug)]
pub struct GaOutcome {
    /// Best individuals, fitness descending, at most three.
    pub top: Vec<Individual>,
    pub stopping_reason: StoppingReason,
    pub total_generations: usize,
    /// Generation of the last best-fitness improvement, if any.
    pub convergence_generation: Option<usize>,
}

pub struct GeneticAlgorithm<'a> {
    pool: &'a [Arc<Plant>],
    constraints: &'a Constraints,
    index: &'a CompatibilityIndex,
    evaluator: &'a FitnessEvaluator<'a>,
    config: &'a GaConfig,
}

impl<'a> GeneticAlgorithm<'a> {
    pub fn new(
        pool: &'a [Arc<Plant>],
        constraints: &'a Constraints,
        index: &'a CompatibilityIndex,
        evaluator: &'a FitnessEvaluator<'a>,
        config: &'a GaConfig,
    ) -> Self {
        Self {
            pool,
            constraints,
            index,
            evaluator,
            config,
        }
    }

    /// Runs the full evolution and returns the top individuals with stopping
    /// metadata. `rng` is the request's single stream.
    pub fn run(&self, rng: &mut Lcg) -> Result<GaOutcome, EngineError> {
        self.config.validate()?;
        let start = Instant::now();

        let mut population = self.initialize(rng);
        self.evaluate_population(&mut population)?;

        let mut best_fitness = population
            .iter()
            .map(Individual::fitness)
            .fold(0.0_f64, f64::max);
        let mut stall = 0usize;
        let mut convergence_generation: Option<usize> = None;
        let mut stopping_reason = StoppingReason::MaxGenerations;
        let mut generations_run = 0usize;

        if start.elapsed().as_millis() as u64 > self.config.timeout_ms {
            sort_by_fitness(&mut population);
            return Ok(GaOutcome {
                top: population.into_iter().take(TOP_K).collect(),
                stopping_reason: StoppingReason::Timeout,
                total_generations: 0,
                convergence_generation: None,
            });
        }

        for generation in 0..self.config.max_generations {
            generations_run = generation + 1;

            // 1. Tournament selection with replacement.
            let selected: Vec<Individual> = (0..self.config.population_size)
                .map(|_| population[tournament_select(&population, self.config.tournament_k, rng)].clone())
                .collect();

            // 2. Pairwise crossover.
            let mut offspring: Vec<Individual> = Vec::with_capacity(selected.len());
            let mut pairs = selected.chunks_exact(2);
            for pair in pairs.by_ref() {
                if rng.chance(self.config.crossover_probability) {
                    let (c1, c2) = uniform_crossover(&pair[0], &pair[1], rng);
                    offspring.push(c1);
                    offspring.push(c2);
                } else {
                    offspring.push(pair[0].clone());
                    offspring.push(pair[1].clone());
                }
            }
            if let [last] = pairs.remainder() {
                offspring.push(last.clone());
            }

            // 3. Mutations, applied to every offspring in a fixed order.
            for child in &mut offspring {
                let ctx = PlacementContext {
                    dimensions: child.dimensions,
                    constraints: self.constraints,
                    index: self.index,
                };
                if rng.chance(self.config.mutation_rate) {
                    mutate_swap(child, rng);
                }
                if rng.chance(self.config.insertion_rate) {
                    mutate_insert(child, self.pool, self.config.max_species, &ctx, rng);
                }
                if rng.chance(self.config.deletion_rate) {
                    mutate_delete(child, rng);
                }
                if rng.chance(0.5 * self.config.mutation_rate) {
                    mutate_relocate(child, &ctx, rng);
                }
                child.invalidate_metrics();
            }

            // 4. Re-evaluate all offspring.
            self.evaluate_population(&mut offspring)?;

            // 5. Generational replacement with elitism: best of
            // parents ∪ offspring survive.
            population.append(&mut offspring);
            sort_by_fitness(&mut population);
            population.truncate(self.config.population_size);

            // 6. Bookkeeping.
            let current_best = population[0].fitness();
            let improvement = current_best - best_fitness;
            if improvement > IMPROVEMENT_EPSILON {
                stall = 0;
                convergence_generation = Some(generation);
            } else {
                stall += 1;
            }
            best_fitness = best_fitness.max(current_best);

            tracing::trace!(
                generation,
                best = current_best,
                stall,
                "generation complete"
            );

            // 7. Stopping conditions, in contract order.
            if start.elapsed().as_millis() as u64 > self.config.timeout_ms {
                stopping_reason = StoppingReason::Timeout;
                break;
            }
            if stall >= self.config.patience {
                stopping_reason = StoppingReason::Patience;
                break;
            }
            if fitness_variance(&population) < self.config.convergence_threshold {
                stopping_reason = StoppingReason::Convergence;
                break;
            }
            if generation == self.config.max_generations - 1 {
                stopping_reason = StoppingReason::MaxGenerations;
                break;
            }
        }

        sort_by_fitness(&mut population);
        tracing::debug!(
            generations = generations_run,
            best = population[0].fitness(),
            reason = ?stopping_reason,
            "evolution finished"
        );

        Ok(GaOutcome {
            top: population.into_iter().take(TOP_K).collect(),
            stopping_reason,
            total_generations: generations_run,
            convergence_generation,
        })
    }

    /// Heuristic initialization: every individual draws its own aspect ratio
    /// (area preserved), picks 2..maxSpecies species from a shuffled pool,
    /// and places one or two instances of each by rejection sampling.
    fn initialize(&self, rng: &mut Lcg) -> Vec<Individual> {
        let mut population = Vec::with_capacity(self.config.population_size);

        for _ in 0..self.config.population_size {
            let ratio = rng.range(0.6, 1.4);
            let width = (self.constraints.max_area * ratio).sqrt();
            let height = self.constraints.max_area / width;
            let dimensions = PlotDimensions::new(width, height);

            let mut individual = Individual::new(dimensions);
            let ctx = PlacementContext {
                dimensions,
                constraints: self.constraints,
                index: self.index,
            };

            let drawn = rng.int_range(2, self.config.max_species.max(2));
            let num_species = drawn.min(self.pool.len());

            let mut shuffled: Vec<Arc<Plant>> = self.pool.to_vec();
            rng.shuffle(&mut shuffled);

            for species in shuffled.iter().take(num_species) {
                let count = rng.int_range(1, 2);
                for _ in 0..count {
                    if let Some(instance) =
                        ctx.try_place(species, &individual.plants, rng, INIT_TRIES, true)
                    {
                        individual.plants.push(instance);
                    }
                }
            }

            population.push(individual);
        }

        population
    }

    /// Parallel, pure re-evaluation; writes fresh metrics into each
    /// individual. Runs off the RNG stream entirely.
    fn evaluate_population(&self, population: &mut [Individual]) -> Result<(), EngineError> {
        let results: Result<Vec<_>, EngineError> = population
            .par_iter()
            .map(|ind| self.evaluator.evaluate(ind))
            .collect();
        for (individual, metrics) in population.iter_mut().zip(results?) {
            individual.metrics = Some(metrics);
        }
        Ok(())
    }
}

/// Stable descending sort by fitness; equal fitness preserves list order.
fn sort_by_fitness(population: &mut [Individual]) {
    population.sort_by(|a, b| {
        b.fitness()
            .partial_cmp(&a.fitness())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn fitness_variance(population: &[Individual]) -> f64 {
    let n = population.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = population.iter().map(Individual::fitness).sum::<f64>() / n;
    population
        .iter()
        .map(|ind| {
            let d = ind.fitness() - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
