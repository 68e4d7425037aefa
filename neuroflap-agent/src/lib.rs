//! Plays a side-scrolling obstacle game with a population of
//! evolving [`neuroflap`] genomes.
//!
//! The game loop hands an [`AgentController`] one
//! [`GameState`] snapshot per tick and gets back whether the
//! actor should jump. The controller takes care of the rest:
//! which genome is playing, how it is rewarded, when its
//! episode ends and when the population evolves.
//!
//! ```
//! use neuroflap_agent::{AgentConfig, AgentController, GameState};
//! use neuroflap_agent::state::Position;
//!
//! let mut controller = AgentController::new(AgentConfig::default()).unwrap();
//!
//! for tick in 0..500 {
//!     let state = GameState::new(Position::new(50.0, 300.0 + (tick % 100) as f32), vec![]);
//!     let _jump = controller.process_game_state(&state);
//! }
//! // Collision reported by the game.
//! controller.handle_game_over();
//!
//! println!("{}", controller.telemetry());
//! ```

pub mod config;
mod controller;
pub mod sensors;
pub mod state;
mod telemetry;

pub use config::{AgentConfig, ConfigError};
pub use controller::AgentController;
pub use state::GameState;
pub use telemetry::Telemetry;
