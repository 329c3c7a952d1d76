//! Tabular epsilon-greedy Q-learning over a sparse, lazily grown state space.
//!
//! The host discretizes its observations into hashable state keys, asks a
//! [`QLearningPlayer`] for an action, and reports the reward and next state
//! back through [`QLearningPlayer::update`]. Learned tables can be saved and
//! restored with MessagePack.

pub mod config;
pub mod error;
pub mod exploration;
pub mod persistence;
pub mod players;
pub mod table;

pub use config::AgentConfig;
pub use error::{Error, LoadFailure, Result};
pub use exploration::ExplorationSchedule;
pub use players::player::Player;
pub use players::qlearning_player::QLearningPlayer;
pub use table::{TableStats, ValueTable};
