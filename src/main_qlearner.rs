use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use scout_qlearner::config::DEFAULT_EPSILON_LENGTH;
use scout_qlearner::{AgentConfig, Player, QLearningPlayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Step {
    Left,
    Right,
}

const STEP_PENALTY: f32 = -0.01;
const GOAL_REWARD: f32 = 1.0;

/// Walk from cell 0 to the far end of a corridor.
struct Corridor {
    len: i32,
    position: i32,
}

impl Corridor {
    fn new(len: i32) -> Self {
        Corridor { len, position: 0 }
    }

    fn reset(&mut self) -> i32 {
        self.position = 0;
        self.position
    }

    /// Returns (next position, reward, done).
    fn step(&mut self, step: Step) -> (i32, f32, bool) {
        self.position = match step {
            Step::Left => (self.position - 1).max(0),
            Step::Right => self.position + 1,
        };
        if self.position >= self.len - 1 {
            (self.position, GOAL_REWARD, true)
        } else {
            (self.position, STEP_PENALTY, false)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "qlearner")]
#[command(about = "Train a tabular Q-learning player on a corridor world", long_about = None)]
struct Args {
    /// Number of cells in the corridor
    #[arg(long, default_value_t = 12)]
    length: i32,

    /// Training episodes
    #[arg(long, default_value_t = 300)]
    episodes: usize,

    /// Step limit per episode
    #[arg(long, default_value_t = 200)]
    max_steps: usize,

    #[arg(long, default_value_t = 0.1)]
    learning_rate: f32,

    #[arg(long, default_value_t = 0.95)]
    discount_factor: f32,

    #[arg(long, default_value_t = DEFAULT_EPSILON_LENGTH)]
    epsilon_length: u64,

    #[arg(long)]
    seed: Option<u64>,

    /// Warm-start from a previously saved table
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save the learned table here
    #[arg(long)]
    save: Option<PathBuf>,
}

fn train_episode(
    player: &mut QLearningPlayer<i32, Step>,
    corridor: &mut Corridor,
    max_steps: usize,
) -> Result<(usize, f32)> {
    let mut state = corridor.reset();
    let mut total = 0.0;
    for steps in 1..=max_steps {
        let action = player.choose_action(&state);
        let (next, reward, done) = corridor.step(action);
        player.update(&state, &action, &next, reward)?;
        total += reward;
        state = next;
        if done {
            return Ok((steps, total));
        }
    }
    Ok((max_steps, total))
}

fn evaluate<P: Player<i32, Action = Step>>(
    player: &mut P,
    corridor: &mut Corridor,
    max_steps: usize,
) -> Option<usize> {
    let mut state = corridor.reset();
    for steps in 1..=max_steps {
        let (next, _, done) = corridor.step(player.choose_action(&state));
        if done {
            return Some(steps);
        }
        state = next;
    }
    None
}

fn render_policy(player: &QLearningPlayer<i32, Step>, len: i32) -> String {
    (0..len - 1)
        .map(|cell| match player.values(&cell) {
            Some(values) => match values.iter().copied().position_max_by(f32::total_cmp) {
                Some(0) => '<',
                _ => '>',
            },
            None => '.',
        })
        .join("")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.length >= 2, "corridor needs at least two cells");

    let mut config = AgentConfig::new(args.learning_rate, args.discount_factor, args.epsilon_length);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let mut player = QLearningPlayer::new(vec![Step::Left, Step::Right], config)?;
    if let Some(path) = &args.load {
        player
            .load(path)
            .with_context(|| format!("warm start from {}", path.display()))?;
        info!(entries = player.stats().entries, "warm-started");
    }

    let mut corridor = Corridor::new(args.length);
    player.enter_training();
    for episode in 0..args.episodes {
        let (steps, total) = train_episode(&mut player, &mut corridor, args.max_steps)?;
        if episode % 50 == 0 || episode + 1 == args.episodes {
            info!(
                episode,
                steps,
                total_reward = total,
                explorations = player.explorations(),
                "episode finished"
            );
        }
    }

    player.exit_training();
    match evaluate(&mut player, &mut corridor, args.max_steps) {
        Some(steps) => info!(steps, optimal = args.length - 1, "greedy policy reached goal"),
        None => info!(max_steps = args.max_steps, "greedy policy did not reach goal"),
    }

    let stats = player.stats();
    info!(
        entries = stats.entries,
        approx_bytes = stats.approx_bytes,
        policy = %render_policy(&player, args.length),
        "value table"
    );

    if let Some(path) = &args.save {
        player.save(path)?;
        info!(path = %path.display(), "saved value table");
    }
    Ok(())
}
