// Data-driven puzzle configuration.
//
// Every tunable the engine reads lives in `PuzzleConfig`, which loads from
// JSON and falls back to `Default`. The search code never hard-codes these
// numbers; it is handed the relevant sub-struct.
//
// Parameter groups:
// - `AccessibilityParams`: decay factor and recursion depth for scoring.
// - `BlockingParams`: how many blocker/blockee pairs the blocking search
//   collects (`search_limit`) and how many survive ranking (`keep`).
// - `ExpansionParams`: the roulette weight exponent and the retry budget for
//   the expand-then-verify loop.
//
// See also: `assembly.rs`, which reads the top-level fields (piece count,
// seed, split mode), and the `burr` CLI, which loads this from `--config`.

use serde::{Deserialize, Serialize};

/// Accessibility scoring parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityParams {
    /// Decay per recursion level, in (0, 1).
    pub alpha: f64,
    /// Number of propagation rounds on top of the raw neighbor count.
    pub depth: u32,
}

impl Default for AccessibilityParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            depth: 3,
        }
    }
}

/// Limits for the blocking-pair searches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockingParams {
    /// Stop the BFS once this many pairs have been recorded.
    pub search_limit: usize,
    /// Pairs kept after sorting by blockee accessibility.
    pub keep: usize,
}

impl Default for BlockingParams {
    fn default() -> Self {
        Self {
            search_limit: 50,
            keep: 10,
        }
    }
}

/// Weighted random growth parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpansionParams {
    /// Exponent applied to a candidate's accessibility sum to get its
    /// selection weight. Negative values favor small, exposed extensions.
    pub weight_exponent: f64,
    /// Expansion attempts before accepting a shortfall.
    pub max_attempts: u32,
}

impl Default for ExpansionParams {
    fn default() -> Self {
        Self {
            weight_exponent: -2.0,
            max_attempts: 32,
        }
    }
}

/// Top-level configuration. Loaded once, never mutated during a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub accessibility: AccessibilityParams,
    pub blocking: BlockingParams,
    pub expansion: ExpansionParams,

    /// Total number of pieces requested, key included.
    pub piece_count: u32,

    /// A piece is accepted once it reaches this fraction of the target size.
    pub key_size_fraction: f64,

    /// Maximum candidate seeds considered for each non-key piece.
    pub candidate_seed_limit: usize,

    /// Random key seeds tried before giving up.
    pub max_key_attempts: u32,

    /// Build half as many double-size pieces and split each one in two
    /// afterwards. When false every piece is grown directly.
    pub split_pieces: bool,

    /// Seed for the run's `PuzzleRng`.
    pub seed: u64,

    /// Emit full voxel-list dumps at trace level.
    pub verbose: bool,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            accessibility: AccessibilityParams::default(),
            blocking: BlockingParams::default(),
            expansion: ExpansionParams::default(),
            piece_count: 6,
            key_size_fraction: 0.75,
            candidate_seed_limit: 10,
            max_key_attempts: 64,
            split_pieces: true,
            seed: 0,
            verbose: false,
        }
    }
}

impl PuzzleConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips() {
        let config = PuzzleConfig::default();
        let json = config.to_json().unwrap();
        let restored = PuzzleConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = PuzzleConfig::from_json(r#"{ "piece_count": 9, "seed": 77 }"#).unwrap();
        assert_eq!(config.piece_count, 9);
        assert_eq!(config.seed, 77);
        assert_eq!(config.blocking.search_limit, 50);
        assert_eq!(config.accessibility.depth, 3);
        assert!(config.split_pieces);
    }

    #[test]
    fn nested_groups_load_from_json() {
        let json = r#"{
            "accessibility": { "alpha": 0.25, "depth": 1 },
            "blocking": { "search_limit": 20, "keep": 4 },
            "expansion": { "weight_exponent": -1.0, "max_attempts": 3 },
            "split_pieces": false
        }"#;
        let config = PuzzleConfig::from_json(json).unwrap();
        assert_eq!(config.accessibility.alpha, 0.25);
        assert_eq!(config.blocking.keep, 4);
        assert_eq!(config.expansion.max_attempts, 3);
        assert!(!config.split_pieces);
        assert_eq!(config.piece_count, 6);
    }

    #[test]
    fn default_exponent_favors_low_scores() {
        let config = PuzzleConfig::default();
        assert!(config.expansion.weight_exponent < 0.0);
        assert!(config.accessibility.alpha > 0.0 && config.accessibility.alpha < 1.0);
    }
}
