//! Apply a block's transactions to state and events.
//!
//! The event log may be committed ahead of state. Re-running the same height after a crash
//! between the two writes re-executes the block, checks it against the logged outputs, and then
//! applies state only.

use crate::{EventLog, Layer, State};
use anyhow::{anyhow, Context as _};
use commonware_cryptography::ed25519::PublicKey;
use mafia_types::{
    execution::{Key, Output, Transaction, Value},
    mafia::RulesConfig,
    Seed,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Result of executing a block's state transition
#[derive(Debug)]
pub struct StateTransitionResult {
    pub height: u64,
    /// Index of this block's first output in the event log.
    pub events_start: u64,
    pub events_end: u64,
    /// Map of public keys to their next expected nonce after processing
    pub processed_nonces: BTreeMap<PublicKey, u64>,
}

/// Last height whose state changes were applied.
pub async fn committed_height<S: State>(state: &S) -> anyhow::Result<u64> {
    match state.get(&Key::Commit).await.context("read state metadata")? {
        Some(Value::Commit { height, .. }) => Ok(height),
        Some(_) => Err(anyhow!("unexpected value under commit key")),
        None => Ok(0),
    }
}

/// Last committed block in the event log as `(height, start, commit_loc)`.
async fn events_commit<E: EventLog>(events: &E) -> anyhow::Result<Option<(u64, u64, u64)>> {
    let size = events.size();
    let Some(loc) = size.checked_sub(1) else {
        return Ok(None);
    };
    match events
        .get(loc)
        .await
        .with_context(|| format!("read last events output (loc={loc})"))?
    {
        Some(Output::Commit { height, start }) => Ok(Some((height, start, loc))),
        _ => Err(anyhow!("event log does not end with a commit (size={size})")),
    }
}

/// Execute state transition for a block
///
/// Transactions with invalid signatures are dropped before execution. Only the next expected
/// height is executed: an already applied height is a no-op and a gap is an error.
pub async fn execute_state_transition<S: State, E: EventLog>(
    state: &mut S,
    events: &mut E,
    rules: &RulesConfig,
    height: u64,
    seed: Seed,
    transactions: Vec<Transaction>,
) -> anyhow::Result<StateTransitionResult> {
    let state_height = committed_height(&*state).await?;
    let events_len = events.size();

    if height <= state_height {
        debug!(height, state_height, "height already applied");
        return Ok(StateTransitionResult {
            height: state_height,
            events_start: events_len,
            events_end: events_len,
            processed_nonces: BTreeMap::new(),
        });
    }

    let expected_next_height = state_height.saturating_add(1);
    if height != expected_next_height {
        return Err(anyhow!(
            "non-sequential height: state_height={state_height}, expected={expected_next_height}, requested={height}"
        ));
    }

    let transactions: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| {
            let valid = tx.verify();
            if !valid {
                warn!(
                    public = ?tx.public,
                    nonce = tx.nonce,
                    "invalid signature; dropping transaction"
                );
            }
            valid
        })
        .collect();

    let (events_height, commit) = match events_commit(&*events).await? {
        Some((h, start, loc)) => (h, Some((start, loc))),
        None => (0, None),
    };

    let (outputs, processed_nonces, changes) = {
        let mut layer = Layer::new(&*state, rules.clone(), seed);
        let (outputs, nonces) = layer
            .execute(transactions)
            .await
            .with_context(|| format!("execute layer (height={height})"))?;
        (outputs, nonces, layer.commit())
    };

    let events_start = match events_height {
        h if h == state_height => {
            // Events must be committed before state, otherwise a crash could wedge on restart.
            let start = events_len;
            for output in outputs {
                events
                    .append(output)
                    .await
                    .with_context(|| format!("append event output (height={height})"))?;
            }
            events
                .append(Output::Commit { height, start })
                .await
                .with_context(|| format!("commit events (height={height})"))?;
            events
                .sync()
                .await
                .with_context(|| format!("sync events (height={height})"))?;
            start
        }
        h if h == height => {
            let (start, loc) =
                commit.ok_or_else(|| anyhow!("missing events commit during recovery"))?;
            let logged = loc.checked_sub(start).ok_or_else(|| {
                anyhow!("events commit start beyond commit loc (start={start}, loc={loc})")
            })?;
            if logged != outputs.len() as u64 {
                return Err(anyhow!(
                    "events output count mismatch during recovery (height={height}, logged={logged}, reexecuted={})",
                    outputs.len()
                ));
            }
            for (offset, output) in (start..).zip(outputs.iter()) {
                let existing = events
                    .get(offset)
                    .await
                    .with_context(|| format!("read logged output (loc={offset})"))?;
                if existing.as_ref() != Some(output) {
                    return Err(anyhow!(
                        "events output mismatch during recovery (height={height}, loc={offset})"
                    ));
                }
            }
            start
        }
        _ => {
            return Err(anyhow!(
                "state/events height mismatch (state={state_height}, events={events_height}, requested={height})"
            ));
        }
    };

    state
        .apply(changes)
        .await
        .with_context(|| format!("apply state changes (height={height})"))?;
    state
        .insert(
            Key::Commit,
            Value::Commit {
                height,
                start: events_start,
            },
        )
        .await
        .with_context(|| format!("commit state (height={height})"))?;

    Ok(StateTransitionResult {
        height,
        events_start,
        events_end: events.size(),
        processed_nonces,
    })
}
