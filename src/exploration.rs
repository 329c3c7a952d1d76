use rand::Rng;

/// Counter-gated exploration.
///
/// Every decision draws `r` uniformly from `[0, epsilon_length)`. A training
/// decision explores when the counter is below `r`, and each exploration bumps
/// the counter. Once the counter reaches `epsilon_length - 1` no draw can beat
/// it and exploration stops for good.
#[derive(Debug, Clone)]
pub struct ExplorationSchedule {
    counter: u64,
    epsilon_length: u64,
}

impl ExplorationSchedule {
    pub fn new(epsilon_length: u64) -> Self {
        debug_assert!(epsilon_length > 0);
        ExplorationSchedule {
            counter: 0,
            epsilon_length,
        }
    }

    /// The draw is taken even outside training so the generator advances the
    /// same way in both modes.
    pub fn should_explore<R: Rng>(&mut self, rng: &mut R, training: bool) -> bool {
        let draw = rng.gen_range(0..self.epsilon_length);
        if training && self.counter < draw {
            self.counter += 1;
            true
        } else {
            false
        }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn epsilon_length(&self) -> u64 {
        self.epsilon_length
    }

    /// Chance that the next training decision explores.
    pub fn exploration_probability(&self) -> f64 {
        self.epsilon_length.saturating_sub(self.counter + 1) as f64 / self.epsilon_length as f64
    }

    pub fn is_saturated(&self) -> bool {
        self.counter + 1 >= self.epsilon_length
    }
}
