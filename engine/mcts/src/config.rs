//! Search and fusion configuration.

use std::time::Duration;

/// Configuration for the tree search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Wall-clock budget for one call to `Explorer::run`.
    pub time_budget: Duration,

    /// Exploration constant of the UCT formula.
    /// 0.0 disables exploration of unvisited children entirely.
    pub exploration: f64,

    /// Maximum number of candidates requested per expansion.
    pub candidate_limit: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(9),
            exploration: 0.5,
            candidate_limit: 10,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            time_budget: Duration::from_millis(50),
            exploration: 0.5,
            candidate_limit: 10,
        }
    }

    /// Builder pattern: set the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the candidate limit.
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }
}

/// Weights for blending search statistics with position scores.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    /// Weight of the search term on an empty board.
    pub c_min: f64,

    /// Weight of the search term once `turn_to_c_max` stones are down.
    pub c_max: f64,

    /// Stone count at which the weight saturates.
    pub turn_to_c_max: u32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            c_min: 0.15,
            c_max: 0.75,
            turn_to_c_max: 40,
        }
    }
}

impl FusionConfig {
    /// Weight of the search term given the number of stones on the board.
    ///
    /// Grows linearly from `c_min` and is clamped to `c_max`. Both ends are
    /// returned exactly rather than through the interpolation.
    pub fn blend_weight(&self, moves_played: usize) -> f64 {
        if moves_played == 0 {
            return self.c_min;
        }
        if moves_played >= self.turn_to_c_max as usize {
            return self.c_max;
        }
        let progress = moves_played as f64 / self.turn_to_c_max as f64;
        (self.c_min + (self.c_max - self.c_min) * progress).min(self.c_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.time_budget, Duration::from_secs(9));
        assert!((config.exploration - 0.5).abs() < 1e-12);
        assert_eq!(config.candidate_limit, 10);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_time_budget(Duration::from_millis(250))
            .with_exploration(0.0)
            .with_candidate_limit(4);

        assert_eq!(config.time_budget, Duration::from_millis(250));
        assert_eq!(config.exploration, 0.0);
        assert_eq!(config.candidate_limit, 4);
    }

    #[test]
    fn test_blend_weight_boundaries() {
        let config = FusionConfig::default();
        assert_eq!(config.blend_weight(0), config.c_min);
        assert_eq!(config.blend_weight(40), config.c_max);
        assert_eq!(config.blend_weight(41), config.c_max);
        assert_eq!(config.blend_weight(121), config.c_max);
    }

    #[test]
    fn test_blend_weight_interpolates() {
        let config = FusionConfig::default();
        // Halfway: 0.15 + 0.6 * 0.5
        assert!((config.blend_weight(20) - 0.45).abs() < 1e-12);

        let mut previous = config.blend_weight(0);
        for moves in 1..=40 {
            let w = config.blend_weight(moves);
            assert!(w >= previous);
            assert!(w <= config.c_max);
            previous = w;
        }
    }

    #[test]
    fn test_blend_weight_zero_ramp() {
        let config = FusionConfig {
            turn_to_c_max: 0,
            ..FusionConfig::default()
        };
        assert_eq!(config.blend_weight(0), config.c_min);
        assert_eq!(config.blend_weight(1), config.c_max);
    }
}
