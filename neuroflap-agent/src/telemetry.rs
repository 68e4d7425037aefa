use serde::{Deserialize, Serialize};

use std::fmt;

/// A read-only snapshot of a controller's progress,
/// for presentation layers to poll.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub generation: usize,
    /// Fitness accumulated so far by the live genome.
    pub current_fitness: f32,
    pub best_score: u32,
    /// 1-based position of the live genome in its generation.
    pub genome_index: usize,
    pub population_size: usize,
    pub frame_count: u32,
    pub genomes_evaluated: u64,
    pub zero_score_streak: u32,
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gen {} | genome {}/{} | fitness {:.1} | best {}",
            self.generation,
            self.genome_index,
            self.population_size,
            self.current_fitness,
            self.best_score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let telemetry = Telemetry {
            generation: 3,
            current_fitness: 12.3,
            best_score: 7,
            genome_index: 4,
            population_size: 50,
            ..Telemetry::default()
        };
        assert_eq!(telemetry.to_string(), "gen 3 | genome 4/50 | fitness 12.3 | best 7");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Telemetry::default()).unwrap();
        assert!(json.get("bestScore").is_some());
        assert!(json.get("genomesEvaluated").is_some());
    }
}
