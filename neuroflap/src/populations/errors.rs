use thiserror::Error;

/// An error type indicating that a population
/// could not be evolved. Failed evolutions leave
/// the population untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    /// A genome's fitness is NaN or infinite, so
    /// the population cannot be ranked.
    #[error("genome {0} has non-finite fitness {1}")]
    InvalidFitness(usize, f32),
}
