//! Probability validation and seed-vertex selection.

use std::collections::BTreeSet;

use contagion_types::VertexId;
use rand::SeedableRng;
use rand::distr::Bernoulli;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::error::SimError;

/// Salt separating the seeding stream from the topology stream.
const SEEDING_SALT: u64 = 0x5eed_5eed_5eed_5eed;

/// Validate `value` as a probability and build a reusable trial.
pub fn chance(name: &'static str, value: f64) -> Result<Bernoulli, SimError> {
    Bernoulli::new(value).map_err(|_rejected| SimError::InvalidProbability { name, value })
}

/// Choose `count` distinct vertices out of ids `0..population`.
///
/// The choice depends only on `(population, count, seed)`.
pub fn choose_seeds(population: usize, count: u64, seed: u64) -> Result<BTreeSet<VertexId>, SimError> {
    let amount = usize::try_from(count)
        .ok()
        .filter(|&amount| amount <= population)
        .ok_or(SimError::TooManySeeds {
            requested: count,
            population,
        })?;

    let mut rng = StdRng::seed_from_u64(seed ^ SEEDING_SALT);
    Ok(index::sample(&mut rng, population, amount)
        .into_iter()
        .filter_map(|position| u64::try_from(position).ok())
        .map(VertexId)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chance_rejects_out_of_range_values() {
        assert!(chance("p", 0.0).is_ok());
        assert!(chance("p", 1.0).is_ok());
        assert!(matches!(
            chance("p", 1.5),
            Err(SimError::InvalidProbability { name: "p", .. })
        ));
        assert!(chance("p", -0.1).is_err());
        assert!(chance("p", f64::NAN).is_err());
    }

    #[test]
    fn seeds_are_distinct_and_in_range() {
        let seeds = choose_seeds(50, 10, 7).unwrap();
        assert_eq!(seeds.len(), 10);
        assert!(seeds.iter().all(|id| id.0 < 50));
    }

    #[test]
    fn seeds_are_reproducible() {
        assert_eq!(choose_seeds(100, 5, 3).unwrap(), choose_seeds(100, 5, 3).unwrap());
    }

    #[test]
    fn whole_population_can_be_seeded() {
        let seeds = choose_seeds(4, 4, 1).unwrap();
        assert_eq!(seeds.len(), 4);
    }

    #[test]
    fn too_many_seeds_is_an_error() {
        assert!(matches!(
            choose_seeds(3, 4, 1),
            Err(SimError::TooManySeeds {
                requested: 4,
                population: 3
            })
        ));
    }
}
