//! Variation operators
//!
//! Tournament selection, uniform index-aligned crossover, and the four
//! mutations. Crossover may produce spatially infeasible children; selection
//! pressure and relocation are expected to cull them over generations, so no
//! repair happens here. Operators never fail: an infeasible insert or
//! relocation leaves the individual unchanged.

use std::sync::Arc;

use crate::domain::Plant;
use crate::rng::Lcg;

use super::individual::Individual;
use super::placement::PlacementContext;

/// Placement attempts for the insert mutation.
const INSERT_TRIES: usize = 30;
/// Placement attempts for the relocate mutation.
const RELOCATE_TRIES: usize = 20;
/// An individual never grows beyond `GENOME_CAP_FACTOR · maxSpecies` instances.
const GENOME_CAP_FACTOR: usize = 3;
/// Deletion keeps at least this many instances.
const MIN_INSTANCES: usize = 2;

/// Tournament with replacement: samples `k` members, returns the index of
/// the fittest; ties go to the earlier population index.
pub fn tournament_select(population: &[Individual], k: usize, rng: &mut Lcg) -> usize {
    debug_assert!(!population.is_empty() && k >= 1);
    let mut best = rng.below(population.len());
    for _ in 1..k {
        let contender = rng.below(population.len());
        let better = population[contender].fitness() > population[best].fitness()
            || (population[contender].fitness() == population[best].fitness()
                && contender < best);
        if better {
            best = contender;
        }
    }
    best
}

/// Uniform crossover over instance lists: walks the longer list and flips a
/// coin per slot to decide which parent feeds which child. Both children
/// inherit the first parent's dimensions. Metrics are dropped; children must
/// be re-evaluated.
pub fn uniform_crossover(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut Lcg,
) -> (Individual, Individual) {
    let mut child1 = Individual::new(parent1.dimensions);
    let mut child2 = Individual::new(parent1.dimensions);

    let slots = parent1.plants.len().max(parent2.plants.len());
    for i in 0..slots {
        if rng.chance(0.5) {
            if let Some(inst) = parent1.plants.get(i) {
                child1.plants.push(inst.clone());
            }
            if let Some(inst) = parent2.plants.get(i) {
                child2.plants.push(inst.clone());
            }
        } else {
            if let Some(inst) = parent2.plants.get(i) {
                child1.plants.push(inst.clone());
            }
            if let Some(inst) = parent1.plants.get(i) {
                child2.plants.push(inst.clone());
            }
        }
    }

    (child1, child2)
}

/// Exchanges two random slots in the genome list. Positions travel with the
/// instance, so geometry is untouched; this only stirs list order for the
/// index-aligned crossover.
pub fn mutate_swap(individual: &mut Individual, rng: &mut Lcg) {
    if individual.plants.len() < 2 {
        return;
    }
    let a = rng.below(individual.plants.len());
    let b = rng.below(individual.plants.len());
    individual.plants.swap(a, b);
}

/// Adds one instance of a random pool species via rejection sampling. Caps
/// the genome at 3·maxSpecies instances; honors the area and water ceilings.
pub fn mutate_insert(
    individual: &mut Individual,
    pool: &[Arc<Plant>],
    max_species: usize,
    ctx: &PlacementContext,
    rng: &mut Lcg,
) {
    if pool.is_empty() || individual.plants.len() >= GENOME_CAP_FACTOR * max_species {
        return;
    }
    let species = &pool[rng.below(pool.len())];
    if let Some(instance) =
        ctx.try_place(species, &individual.plants, rng, INSERT_TRIES, false)
    {
        individual.plants.push(instance);
        individual.invalidate_metrics();
    }
}

/// Removes a uniformly chosen instance, keeping at least two.
pub fn mutate_delete(individual: &mut Individual, rng: &mut Lcg) {
    if individual.plants.len() <= MIN_INSTANCES {
        return;
    }
    let victim = rng.below(individual.plants.len());
    individual.plants.remove(victim);
    individual.invalidate_metrics();
}

/// Moves one instance to a fresh feasible position, keeping species, size,
/// and rotation. Leaves the individual unchanged when no slot is found.
pub fn mutate_relocate(individual: &mut Individual, ctx: &PlacementContext, rng: &mut Lcg) {
    if individual.plants.is_empty() {
        return;
    }
    let moving = rng.below(individual.plants.len());
    if let Some(replacement) =
        ctx.try_relocate(&individual.plants, moving, rng, RELOCATE_TRIES)
    {
        individual.plants[moving] = replacement;
        individual.invalidate_metrics();
    }
}
