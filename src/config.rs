use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_LEARNING_RATE: f32 = 0.1;
pub const DEFAULT_DISCOUNT_FACTOR: f32 = 0.99;
pub const DEFAULT_EPSILON_LENGTH: u64 = 200;

/// Hyperparameters for a [`QLearningPlayer`](crate::QLearningPlayer).
///
/// ```
/// use scout_qlearner::AgentConfig;
///
/// let config = AgentConfig::default()
///     .with_learning_rate(0.5)
///     .with_discount_factor(0.9)
///     .with_epsilon_length(1_000)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step size, in (0, 1].
    pub learning_rate: f32,
    /// Discount applied to the next state's best value, in [0, 1].
    pub discount_factor: f32,
    /// Horizon of the exploration schedule. Exploration stops once the
    /// exploration counter reaches `epsilon_length - 1`.
    pub epsilon_length: u64,
    /// Seed for the agent's generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new(learning_rate: f32, discount_factor: f32, epsilon_length: u64) -> Self {
        Self {
            learning_rate,
            discount_factor,
            epsilon_length,
            seed: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f32) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_epsilon_length(mut self, epsilon_length: u64) -> Self {
        self.epsilon_length = epsilon_length;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        // Written as negated range checks so NaN is rejected too.
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::invalid_config(format!(
                "learning rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(self.discount_factor >= 0.0 && self.discount_factor <= 1.0) {
            return Err(Error::invalid_config(format!(
                "discount factor must be in [0, 1], got {}",
                self.discount_factor
            )));
        }
        if self.epsilon_length == 0 {
            return Err(Error::invalid_config("epsilon_length must be positive"));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_LEARNING_RATE,
            DEFAULT_DISCOUNT_FACTOR,
            DEFAULT_EPSILON_LENGTH,
        )
    }
}
