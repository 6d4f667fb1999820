use anyhow::{anyhow, Result};
use commonware_cryptography::ed25519::PublicKey;
use mafia_types::execution::{Account, Key, Output, Value};
use std::future::Future;

#[cfg(any(test, feature = "mocks"))]
use std::collections::BTreeMap;

/// Why a transaction was not admitted to a block.
#[derive(Debug)]
pub enum PrepareError {
    NonceMismatch { expected: u64, got: u64 },
    State(anyhow::Error),
}

/// Key-value storage the execution layer reads from and writes to.
pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = Result<()>>;

    /// Write a staged change set in key order.
    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, change) in changes {
                match change {
                    Status::Update(value) => self.insert(key, value).await?,
                    Status::Delete => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }
}

/// Append-only log of block outputs, addressed by position.
///
/// Hosts that need durability back this with a journal; `Vec<Output>` keeps it in memory.
pub trait EventLog {
    /// Number of outputs appended so far.
    fn size(&self) -> u64;
    fn get(&self, loc: u64) -> impl Future<Output = Result<Option<Output>>>;
    /// Append `output` and return its location.
    fn append(&mut self, output: Output) -> impl Future<Output = Result<u64>>;

    /// Persist everything appended so far.
    fn sync(&mut self) -> impl Future<Output = Result<()>> {
        async { Ok(()) }
    }
}

impl EventLog for Vec<Output> {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    async fn get(&self, loc: u64) -> Result<Option<Output>> {
        Ok(usize::try_from(loc)
            .ok()
            .and_then(|loc| self.as_slice().get(loc))
            .cloned())
    }

    async fn append(&mut self, output: Output) -> Result<u64> {
        self.push(output);
        Ok(self.len() as u64 - 1)
    }
}

/// In-memory store, ordered so that iteration never depends on hashing.
#[cfg(any(test, feature = "mocks"))]
#[derive(Default)]
pub struct Memory {
    entries: BTreeMap<Key, Value>,
}

#[cfg(any(test, feature = "mocks"))]
impl Memory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(any(test, feature = "mocks"))]
impl State for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.entries.insert(key, value);
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A staged write: the new value, or removal of the key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

/// Next nonce `public` must sign with.
pub async fn nonce<S: State>(state: &S, public: &PublicKey) -> Result<u64> {
    Ok(load_account(state, public).await?.nonce)
}

pub async fn balance<S: State>(state: &S, public: &PublicKey) -> Result<u64> {
    Ok(load_account(state, public).await?.balance)
}

/// Write genesis balances before the first block. Existing nonces are kept.
///
/// Fails once any block has been committed: balances only enter the system here.
pub async fn allocate_genesis<S: State>(
    state: &mut S,
    balances: impl IntoIterator<Item = (PublicKey, u64)>,
) -> Result<()> {
    if state.get(&Key::Commit).await?.is_some() {
        return Err(anyhow!("genesis allocation after the first block"));
    }
    for (public, balance) in balances {
        let mut account = load_account(&*state, &public).await?;
        account.balance = balance;
        state
            .insert(Key::Account(public), Value::Account(account))
            .await?;
    }
    Ok(())
}

/// Missing accounts read as a zero nonce and balance.
pub(crate) async fn load_account<S: State>(state: &S, public: &PublicKey) -> Result<Account> {
    match state.get(&Key::Account(public.clone())).await? {
        Some(Value::Account(account)) => Ok(account),
        Some(_) => Err(anyhow!("unexpected value under account key")),
        None => Ok(Account::default()),
    }
}

pub(crate) fn validate_and_increment_nonce(
    account: &mut Account,
    provided: u64,
) -> Result<(), PrepareError> {
    if provided != account.nonce {
        return Err(PrepareError::NonceMismatch {
            expected: account.nonce,
            got: provided,
        });
    }
    account.nonce += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    #[test]
    fn unknown_account_reads_as_empty() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let store = Memory::default();
            let (_, public) = create_account_keypair(1);
            assert_eq!(nonce(&store, &public).await.unwrap(), 0);
            assert_eq!(balance(&store, &public).await.unwrap(), 0);
            assert!(store.is_empty());
        });
    }

    #[test]
    fn genesis_sets_balances_and_keeps_nonces() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut store = Memory::default();
            let (_, alice) = create_account_keypair(1);
            let (_, bob) = create_account_keypair(2);
            store
                .insert(
                    Key::Account(alice.clone()),
                    Value::Account(Account {
                        nonce: 4,
                        balance: 0,
                    }),
                )
                .await
                .unwrap();

            allocate_genesis(&mut store, [(alice.clone(), 300), (bob.clone(), 50)])
                .await
                .unwrap();
            assert_eq!(nonce(&store, &alice).await.unwrap(), 4);
            assert_eq!(balance(&store, &alice).await.unwrap(), 300);
            assert_eq!(balance(&store, &bob).await.unwrap(), 50);
            assert_eq!(store.len(), 2);

            store
                .insert(Key::Commit, Value::Commit { height: 1, start: 0 })
                .await
                .unwrap();
            assert!(allocate_genesis(&mut store, [(bob.clone(), 1)]).await.is_err());
            assert_eq!(balance(&store, &bob).await.unwrap(), 50);
        });
    }

    #[test]
    fn change_set_applies_updates_and_deletes() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut store = Memory::default();
            let (_, public) = create_account_keypair(1);
            allocate_genesis(&mut store, [(public.clone(), 500)])
                .await
                .unwrap();

            store
                .apply(vec![
                    (
                        Key::Commit,
                        Status::Update(Value::Commit { height: 1, start: 0 }),
                    ),
                    (Key::Account(public.clone()), Status::Delete),
                ])
                .await
                .unwrap();
            assert_eq!(balance(&store, &public).await.unwrap(), 0);
            assert_eq!(
                store.get(&Key::Commit).await.unwrap(),
                Some(Value::Commit { height: 1, start: 0 })
            );
            assert_eq!(store.len(), 1);
        });
    }

    #[test]
    fn in_memory_event_log_is_positional() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut log: Vec<Output> = Vec::new();
            assert_eq!(log.size(), 0);
            assert_eq!(EventLog::get(&log, 0).await.unwrap(), None);

            let first = Output::Commit { height: 1, start: 0 };
            let second = Output::Commit { height: 2, start: 1 };
            assert_eq!(EventLog::append(&mut log, first.clone()).await.unwrap(), 0);
            assert_eq!(EventLog::append(&mut log, second.clone()).await.unwrap(), 1);
            log.sync().await.unwrap();

            assert_eq!(log.size(), 2);
            assert_eq!(EventLog::get(&log, 1).await.unwrap(), Some(second));
            assert_eq!(EventLog::get(&log, 0).await.unwrap(), Some(first));
            assert_eq!(EventLog::get(&log, u64::MAX).await.unwrap(), None);
        });
    }

    #[test]
    fn nonce_must_match_exactly() {
        let mut account = Account {
            nonce: 2,
            balance: 0,
        };
        assert!(matches!(
            validate_and_increment_nonce(&mut account, 3),
            Err(PrepareError::NonceMismatch {
                expected: 2,
                got: 3
            })
        ));
        assert_eq!(account.nonce, 2);
        validate_and_increment_nonce(&mut account, 2).unwrap();
        assert_eq!(account.nonce, 3);
    }
}
