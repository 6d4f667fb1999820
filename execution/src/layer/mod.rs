use anyhow::{Context as _, Result};
use commonware_cryptography::ed25519::PublicKey;
use mafia_types::{
    execution::{Event, Instruction, Key, Output, Transaction, Value},
    mafia::{
        Game, GameError, GameState, NightActionKind, Player, RulesConfig, MAX_GAME_ID_LENGTH,
    },
    Seed,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::state::{load_account, validate_and_increment_nonce, PrepareError, State, Status};
use crate::{escrow, night, phase, voting};

mod handlers;

/// Stages every write made while executing one block on top of a read-only base state.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,

    rules: RulesConfig,
    seed: Seed,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, rules: RulesConfig, seed: Seed) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),

            rules,
            seed,
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    /// Block timestamp in seconds.
    pub fn now(&self) -> u64 {
        self.seed.now()
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public)
            .await
            .map_err(PrepareError::State)?;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        );

        Ok(())
    }

    async fn apply(&mut self, transaction: &Transaction) -> Result<Vec<Event>> {
        let public = &transaction.public;

        match &transaction.instruction {
            Instruction::InitializeGame {
                game_id,
                max_players,
                entry_fee,
            } => {
                self.handle_initialize_game(public, game_id, *max_players, *entry_fee)
                    .await
            }
            Instruction::JoinGame { game_id } => self.handle_join_game(public, game_id).await,
            Instruction::StartGame { game_id } => self.handle_start_game(public, game_id).await,
            Instruction::CastVote { game_id, target } => {
                self.handle_cast_vote(public, game_id, target).await
            }
            Instruction::AdvancePhase { game_id } => {
                self.handle_advance_phase(public, game_id).await
            }
            Instruction::NightAction {
                game_id,
                action,
                target,
            } => {
                self.handle_night_action(public, game_id, *action, target)
                    .await
            }
            Instruction::ClaimWinnings { game_id } => {
                self.handle_claim_winnings(public, game_id).await
            }
        }
    }

    /// Execute `transactions` in order.
    ///
    /// Transactions whose nonce does not match the sender's account are dropped without output.
    /// Every other transaction consumes its nonce, even when its instruction is rejected.
    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Vec<Output>, BTreeMap<PublicKey, u64>)> {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            match self.prepare(&tx).await {
                Ok(()) => {}
                Err(PrepareError::NonceMismatch { expected, got }) => {
                    debug!(
                        public = ?tx.public,
                        expected,
                        got,
                        "nonce mismatch; dropping transaction"
                    );
                    continue;
                }
                Err(PrepareError::State(err)) => {
                    return Err(err).context("state error during prepare");
                }
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));
            outputs.extend(self.apply(&tx).await?.into_iter().map(Output::Event));
            outputs.push(Output::Transaction(tx));
        }

        Ok((outputs, processed_nonces))
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
