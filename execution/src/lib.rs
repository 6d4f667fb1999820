//! Mafia execution layer.
//!
//! This crate contains the deterministic transaction execution logic (`Layer`) and the
//! component state machines behind it: role assignment, the Day/Night clock, the voting ledger,
//! night resolution, win evaluation, and the escrow ledger.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution. The clock is the block's `Seed` view.
//! - Do not use non-deterministic randomness; roles are derived from the seed entropy and roster.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Storage / recovery invariants
//! The execution pipeline assumes the `EventLog` may be committed ahead of state. Recovery logic in
//! `state_transition` must be safe to re-run and must converge to the same output.
//!
//! The primary entrypoint is [`Layer`].
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use mafia_execution::{state_transition::execute_state_transition, Memory};
//! use mafia_execution::mocks::create_seed;
//! use mafia_types::mafia::RulesConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut state = Memory::default();
//! let mut events: Vec<mafia_types::execution::Output> = Vec::new();
//! let rules = RulesConfig::default();
//! // Height must be exactly `committed_height + 1`.
//! let _result = execute_state_transition(
//!     &mut state,
//!     &mut events,
//!     &rules,
//!     /* height */ 1,
//!     /* seed */ create_seed(1),
//!     /* transactions */ vec![],
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod escrow;
pub mod night;
pub mod phase;
pub mod query;
pub mod roles;
pub mod state_transition;
pub mod voting;
pub mod win;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use layer::Layer;
pub use query::{
    query_claim_status, query_game, query_game_status, query_investigations, ClaimStatus,
    GameStatus, InvestigationResult, QueryError,
};
pub use state::{allocate_genesis, balance, nonce, EventLog, PrepareError, State, Status};

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
