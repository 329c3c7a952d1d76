use std::fmt;
use std::hash::Hash;
use std::io::{Read, Write};
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::exploration::ExplorationSchedule;
use crate::persistence;
use crate::players::player::Player;
use crate::table::{self, TableStats, ValueTable};

/// Tabular epsilon-greedy Q-learning agent.
///
/// States are any hashable key the host has already discretized; actions are
/// opaque identifiers whose position in the action set is the column of the
/// value table.
///
/// ```
/// use scout_qlearner::{AgentConfig, QLearningPlayer};
///
/// let config = AgentConfig::default().with_seed(1);
/// let mut agent = QLearningPlayer::new(vec!['L', 'R'], config)?;
/// let action = agent.choose_action(&(0u8, 0u8));
/// agent.update(&(0, 0), &action, &(0, 1), 1.0)?;
/// assert!(agent.stats().entries >= 1);
/// # Ok::<(), scout_qlearner::Error>(())
/// ```
pub struct QLearningPlayer<S, A> {
    actions: Vec<A>,
    config: AgentConfig,
    table: ValueTable<S>,
    exploration: ExplorationSchedule,
    training: bool,
    rng: Xoshiro256PlusPlus,
}

impl<S, A> QLearningPlayer<S, A>
where
    S: Eq + Hash + Clone,
    A: Clone + PartialEq + fmt::Debug,
{
    pub fn new(actions: Vec<A>, config: AgentConfig) -> Result<Self> {
        config.validate()?;
        if actions.is_empty() {
            return Err(Error::invalid_config("action set is empty"));
        }
        for (index, action) in actions.iter().enumerate() {
            if actions[..index].contains(action) {
                return Err(Error::invalid_config(format!(
                    "action {:?} appears more than once",
                    action
                )));
            }
        }

        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        debug!(
            actions = actions.len(),
            learning_rate = config.learning_rate,
            discount_factor = config.discount_factor,
            epsilon_length = config.epsilon_length,
            "created q-learning player"
        );

        Ok(QLearningPlayer {
            table: ValueTable::new(actions.len()),
            exploration: ExplorationSchedule::new(config.epsilon_length),
            actions,
            config,
            training: true,
            rng,
        })
    }

    /// Picks an action for `state`.
    ///
    /// In training mode this may be a uniformly random action, which leaves
    /// the table untouched. Otherwise the best-valued action is returned and
    /// the state's row is created if it has never been seen.
    pub fn choose_action(&mut self, state: &S) -> A {
        if self.exploration.should_explore(&mut self.rng, self.training) {
            let index = self.rng.gen_range(0..self.actions.len());
            trace!(
                index,
                explorations = self.exploration.counter(),
                "exploring"
            );
            return self.actions[index].clone();
        }
        let index = self.table.greedy_action(state, &mut self.rng);
        self.actions[index].clone()
    }

    /// One-step Q-learning update of `(state, action)` toward
    /// `reward + gamma * max(next_state)`.
    pub fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f32) -> Result<()> {
        let index = self.action_index(action)?;

        // Materialize `state` before `next_state` so generator use is stable.
        self.table.row_mut(state, &mut self.rng);
        let next_best = table::max_value(self.table.row_mut(next_state, &mut self.rng));

        let lr = self.config.learning_rate;
        let gamma = self.config.discount_factor;
        let value = &mut self.table.row_mut(state, &mut self.rng)[index];
        *value += lr * (reward + gamma * next_best - *value);
        Ok(())
    }

    pub fn enter_training(&mut self) {
        self.training = true;
    }

    pub fn exit_training(&mut self) {
        self.training = false;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }

    /// Current values for `state`, if it has a row. Never creates one.
    pub fn values(&self, state: &S) -> Option<&[f32]> {
        self.table.get(state)
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Number of exploratory decisions taken so far.
    pub fn explorations(&self) -> u64 {
        self.exploration.counter()
    }

    fn action_index(&self, action: &A) -> Result<usize> {
        self.actions
            .iter()
            .position(|a| a == action)
            .ok_or_else(|| Error::UnknownAction {
                action: format!("{:?}", action),
            })
    }
}

impl<S, A> QLearningPlayer<S, A>
where
    S: Eq + Hash + Clone + Serialize + DeserializeOwned,
    A: Clone + PartialEq + fmt::Debug,
{
    /// Writes the value table to `path`. Actions, hyperparameters, the
    /// exploration counter and the mode are not saved.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_table(&self.table, path.as_ref())
    }

    /// Replaces the value table with the one stored at `path`. On failure the
    /// current table is kept.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.table = persistence::load_table(path.as_ref(), self.actions.len())?;
        Ok(())
    }

    pub fn save_to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        persistence::write_table(&self.table, &mut writer)
    }

    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let table = persistence::read_table(reader, self.actions.len()).map_err(|source| {
            persistence::load_error("load value table from reader".to_string(), source)
        })?;
        debug!(entries = table.len(), "loaded value table");
        self.table = table;
        Ok(())
    }
}

impl<S, A> Player<S> for QLearningPlayer<S, A>
where
    S: Eq + Hash + Clone,
    A: Clone + PartialEq + fmt::Debug,
{
    type Action = A;

    fn choose_action(&mut self, state: &S) -> A {
        QLearningPlayer::choose_action(self, state)
    }
}

impl<S, A> fmt::Debug for QLearningPlayer<S, A>
where
    S: Eq + Hash + Clone,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QLearningPlayer")
            .field("actions", &self.actions)
            .field("config", &self.config)
            .field("entries", &self.table.len())
            .field("explorations", &self.exploration.counter())
            .field("training", &self.training)
            .finish()
    }
}
