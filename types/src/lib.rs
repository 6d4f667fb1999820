//! Records, transactions, and events for the escrowed mafia state machine.

pub mod execution;
pub mod mafia;

pub use execution::{Seed, NAMESPACE};
