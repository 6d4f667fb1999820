use crate::{
    state::{allocate_genesis, EventLog, State},
    state_transition::{self, StateTransitionResult},
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::Sha256,
    Hasher, Signer,
};
use mafia_types::{
    execution::Transaction,
    mafia::RulesConfig,
    Seed,
};

/// Creates an account keypair for Ed25519 signatures used by users
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

/// Creates a test seed whose entropy is derived from the view
pub fn create_seed(view: u64) -> Seed {
    let mut hasher = Sha256::new();
    hasher.update(b"mock-entropy");
    hasher.update(&view.to_be_bytes());
    Seed::new(view, hasher.finalize())
}

/// Genesis allocation of `balance` to `public`.
pub async fn fund_account<S: State>(state: &mut S, public: &PublicKey, balance: u64) {
    allocate_genesis(state, [(public.clone(), balance)])
        .await
        .expect("fund account");
}

/// Helper to execute the next block at `view`
pub async fn execute_block<S: State, E: EventLog>(
    state: &mut S,
    events: &mut E,
    rules: &RulesConfig,
    view: u64,
    txs: Vec<Transaction>,
) -> StateTransitionResult {
    let height = state_transition::committed_height(&*state)
        .await
        .expect("read height")
        + 1;
    state_transition::execute_state_transition(
        state,
        events,
        rules,
        height,
        create_seed(view),
        txs,
    )
    .await
    .expect("execute block")
}
