pub mod player;
pub mod qlearning_player;
