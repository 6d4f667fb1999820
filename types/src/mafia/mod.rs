//! Mafia domain types.
//!
//! Game, player, vote, and night-action records plus the rule configuration and error taxonomy
//! shared by the execution layer and clients.

mod codec;
mod config;
mod constants;
mod error;
mod game;
mod player;
mod role;

pub use codec::{read_string, string_encode_size, write_string};
pub use config::*;
pub use constants::*;
pub use error::*;
pub use game::*;
pub use player::*;
pub use role::*;
