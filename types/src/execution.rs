use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;
use std::fmt::Debug;

use crate::mafia::{
    read_string, string_encode_size, write_string, EliminationCause, Faction, Game, GamePhase,
    NightActionKind, GAME_KEY_PREFIX, MAX_ERROR_MESSAGE_LENGTH, MAX_GAME_ID_LENGTH,
    SECONDS_PER_VIEW,
};

pub const NAMESPACE: &[u8] = b"_MAFIA";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";
pub const MAX_BLOCK_TRANSACTIONS: usize = 500;

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

/// Per-block input supplied by the host: the consensus view and recent ledger entropy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed {
    pub view: u64,
    pub entropy: Digest,
}

impl Seed {
    pub fn new(view: u64, entropy: Digest) -> Self {
        Self { view, entropy }
    }

    /// Deterministic clock in seconds.
    pub fn now(&self) -> u64 {
        self.view.saturating_mul(SECONDS_PER_VIEW)
    }
}

impl Write for Seed {
    fn write(&self, writer: &mut impl BufMut) {
        self.view.write(writer);
        self.entropy.write(writer);
    }
}

impl Read for Seed {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            view: u64::read(reader)?,
            entropy: Digest::read(reader)?,
        })
    }
}

impl FixedSize for Seed {
    const SIZE: usize = u64::SIZE + Digest::SIZE;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

impl Digestible for Transaction {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes().as_ref());
        hasher.update(self.instruction.encode().as_ref());
        hasher.update(self.public.as_ref());
        // The signature is excluded: any valid signature authorizes the same transaction.
        hasher.finalize()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Create a game with the caller as creator.
    /// Binary: [0] [idLen:u32 BE] [idBytes...] [maxPlayers:u8] [entryFee:u64 BE]
    InitializeGame {
        game_id: String,
        max_players: u8,
        entry_fee: u64,
    },

    /// Take a seat and pay the entry fee into escrow.
    /// Binary: [1] [idLen:u32 BE] [idBytes...]
    JoinGame { game_id: String },

    /// Deal roles and open day one (creator only).
    /// Binary: [2] [idLen:u32 BE] [idBytes...]
    StartGame { game_id: String },

    /// Cast or replace a day vote.
    /// Binary: [3] [idLen:u32 BE] [idBytes...] [target:PublicKey]
    CastVote { game_id: String, target: PublicKey },

    /// Close the current phase (creator only).
    /// Binary: [4] [idLen:u32 BE] [idBytes...]
    AdvancePhase { game_id: String },

    /// Submit a covert night action.
    /// Binary: [5] [idLen:u32 BE] [idBytes...] [action:u8] [target:PublicKey]
    NightAction {
        game_id: String,
        action: NightActionKind,
        target: PublicKey,
    },

    /// Collect a share of the pot after the game ends.
    /// Binary: [6] [idLen:u32 BE] [idBytes...]
    ClaimWinnings { game_id: String },
}

impl Instruction {
    pub fn game_id(&self) -> &str {
        match self {
            Self::InitializeGame { game_id, .. }
            | Self::JoinGame { game_id }
            | Self::StartGame { game_id }
            | Self::CastVote { game_id, .. }
            | Self::AdvancePhase { game_id }
            | Self::NightAction { game_id, .. }
            | Self::ClaimWinnings { game_id } => game_id,
        }
    }
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::InitializeGame {
                game_id,
                max_players,
                entry_fee,
            } => {
                0u8.write(writer);
                write_string(game_id, writer);
                max_players.write(writer);
                entry_fee.write(writer);
            }
            Self::JoinGame { game_id } => {
                1u8.write(writer);
                write_string(game_id, writer);
            }
            Self::StartGame { game_id } => {
                2u8.write(writer);
                write_string(game_id, writer);
            }
            Self::CastVote { game_id, target } => {
                3u8.write(writer);
                write_string(game_id, writer);
                target.write(writer);
            }
            Self::AdvancePhase { game_id } => {
                4u8.write(writer);
                write_string(game_id, writer);
            }
            Self::NightAction {
                game_id,
                action,
                target,
            } => {
                5u8.write(writer);
                write_string(game_id, writer);
                action.write(writer);
                target.write(writer);
            }
            Self::ClaimWinnings { game_id } => {
                6u8.write(writer);
                write_string(game_id, writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let instruction = match kind {
            0 => Self::InitializeGame {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                max_players: u8::read(reader)?,
                entry_fee: u64::read(reader)?,
            },
            1 => Self::JoinGame {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
            },
            2 => Self::StartGame {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
            },
            3 => Self::CastVote {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                target: PublicKey::read(reader)?,
            },
            4 => Self::AdvancePhase {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
            },
            5 => Self::NightAction {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                action: NightActionKind::read(reader)?,
                target: PublicKey::read(reader)?,
            },
            6 => Self::ClaimWinnings {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + string_encode_size(self.game_id())
            + match self {
                Self::InitializeGame { .. } => u8::SIZE + u64::SIZE,
                Self::CastVote { .. } => PublicKey::SIZE,
                Self::NightAction { .. } => u8::SIZE + PublicKey::SIZE,
                Self::JoinGame { .. }
                | Self::StartGame { .. }
                | Self::AdvancePhase { .. }
                | Self::ClaimWinnings { .. } => 0,
            }
    }
}

/// Account record for replay protection and escrow funding.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
    pub balance: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.balance.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
            balance: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size() + self.balance.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Account for nonce and balance tracking (tag 0)
    Account(PublicKey),

    /// Game record, addressed by `sha256("game" || game_id)` (tag 1)
    Game(Digest),

    /// Last committed block height (tag 2)
    Commit,
}

impl Key {
    /// Storage address of the game with the given identifier.
    pub fn game(game_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(GAME_KEY_PREFIX);
        hasher.update(game_id.as_bytes());
        Self::Game(hasher.finalize())
    }
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }
            Self::Game(digest) => {
                1u8.write(writer);
                digest.write(writer);
            }
            Self::Commit => 2u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),
            1 => Self::Game(Digest::read(reader)?),
            2 => Self::Commit,
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) => PublicKey::SIZE,
                Self::Game(_) => Digest::SIZE,
                Self::Commit => 0,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Account(Account),
    Game(Game),
    Commit { height: u64, start: u64 },
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Game(game) => {
                1u8.write(writer);
                game.write(writer);
            }
            Self::Commit { height, start } => {
                2u8.write(writer);
                height.write(writer);
                start.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),
            1 => Self::Game(Game::read(reader)?),
            2 => Self::Commit {
                height: u64::read(reader)?,
                start: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Game(game) => game.encode_size(),
                Self::Commit { height, start } => height.encode_size() + start.encode_size(),
            }
    }
}

/// Public output of executed instructions. Roles are never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    GameCreated {
        game_id: String,
        creator: PublicKey,
        max_players: u8,
        entry_fee: u64,
    },
    PlayerJoined {
        game_id: String,
        player: PublicKey,
        player_count: u32,
        pot: u64,
    },
    GameStarted {
        game_id: String,
        player_count: u32,
        mafia_count: u32,
        day_count: u32,
    },
    VoteCast {
        game_id: String,
        voter: PublicKey,
        target: PublicKey,
        total_votes: u32,
    },
    /// The target is withheld.
    NightActionRecorded {
        game_id: String,
        actor: PublicKey,
        action: NightActionKind,
    },
    PlayerEliminated {
        game_id: String,
        player: PublicKey,
        cause: EliminationCause,
        day_count: u32,
    },
    NightResolved {
        game_id: String,
        day_count: u32,
        eliminated: Option<PublicKey>,
        kill_prevented: bool,
    },
    PhaseChanged {
        game_id: String,
        phase: GamePhase,
        day_count: u32,
    },
    GameEnded {
        game_id: String,
        winner: Faction,
        day_count: u32,
        winners: u32,
        payout_per_winner: u64,
    },
    WinningsClaimed {
        game_id: String,
        claimer: PublicKey,
        amount: u64,
    },
    /// Rejected instruction. `error_code` is `GameError::code()`.
    GameError {
        player: PublicKey,
        game_id: String,
        error_code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::GameCreated {
                game_id,
                creator,
                max_players,
                entry_fee,
            } => {
                0u8.write(writer);
                write_string(game_id, writer);
                creator.write(writer);
                max_players.write(writer);
                entry_fee.write(writer);
            }
            Self::PlayerJoined {
                game_id,
                player,
                player_count,
                pot,
            } => {
                1u8.write(writer);
                write_string(game_id, writer);
                player.write(writer);
                player_count.write(writer);
                pot.write(writer);
            }
            Self::GameStarted {
                game_id,
                player_count,
                mafia_count,
                day_count,
            } => {
                2u8.write(writer);
                write_string(game_id, writer);
                player_count.write(writer);
                mafia_count.write(writer);
                day_count.write(writer);
            }
            Self::VoteCast {
                game_id,
                voter,
                target,
                total_votes,
            } => {
                3u8.write(writer);
                write_string(game_id, writer);
                voter.write(writer);
                target.write(writer);
                total_votes.write(writer);
            }
            Self::NightActionRecorded {
                game_id,
                actor,
                action,
            } => {
                4u8.write(writer);
                write_string(game_id, writer);
                actor.write(writer);
                action.write(writer);
            }
            Self::PlayerEliminated {
                game_id,
                player,
                cause,
                day_count,
            } => {
                5u8.write(writer);
                write_string(game_id, writer);
                player.write(writer);
                cause.write(writer);
                day_count.write(writer);
            }
            Self::NightResolved {
                game_id,
                day_count,
                eliminated,
                kill_prevented,
            } => {
                6u8.write(writer);
                write_string(game_id, writer);
                day_count.write(writer);
                eliminated.write(writer);
                kill_prevented.write(writer);
            }
            Self::PhaseChanged {
                game_id,
                phase,
                day_count,
            } => {
                7u8.write(writer);
                write_string(game_id, writer);
                phase.write(writer);
                day_count.write(writer);
            }
            Self::GameEnded {
                game_id,
                winner,
                day_count,
                winners,
                payout_per_winner,
            } => {
                8u8.write(writer);
                write_string(game_id, writer);
                winner.write(writer);
                day_count.write(writer);
                winners.write(writer);
                payout_per_winner.write(writer);
            }
            Self::WinningsClaimed {
                game_id,
                claimer,
                amount,
            } => {
                9u8.write(writer);
                write_string(game_id, writer);
                claimer.write(writer);
                amount.write(writer);
            }
            Self::GameError {
                player,
                game_id,
                error_code,
                message,
            } => {
                10u8.write(writer);
                player.write(writer);
                write_string(game_id, writer);
                error_code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let event = match kind {
            0 => Self::GameCreated {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                creator: PublicKey::read(reader)?,
                max_players: u8::read(reader)?,
                entry_fee: u64::read(reader)?,
            },
            1 => Self::PlayerJoined {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                player: PublicKey::read(reader)?,
                player_count: u32::read(reader)?,
                pot: u64::read(reader)?,
            },
            2 => Self::GameStarted {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                player_count: u32::read(reader)?,
                mafia_count: u32::read(reader)?,
                day_count: u32::read(reader)?,
            },
            3 => Self::VoteCast {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                voter: PublicKey::read(reader)?,
                target: PublicKey::read(reader)?,
                total_votes: u32::read(reader)?,
            },
            4 => Self::NightActionRecorded {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                actor: PublicKey::read(reader)?,
                action: NightActionKind::read(reader)?,
            },
            5 => Self::PlayerEliminated {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                player: PublicKey::read(reader)?,
                cause: EliminationCause::read(reader)?,
                day_count: u32::read(reader)?,
            },
            6 => Self::NightResolved {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                day_count: u32::read(reader)?,
                eliminated: Option::<PublicKey>::read(reader)?,
                kill_prevented: bool::read(reader)?,
            },
            7 => Self::PhaseChanged {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                phase: GamePhase::read(reader)?,
                day_count: u32::read(reader)?,
            },
            8 => Self::GameEnded {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                winner: Faction::read(reader)?,
                day_count: u32::read(reader)?,
                winners: u32::read(reader)?,
                payout_per_winner: u64::read(reader)?,
            },
            9 => Self::WinningsClaimed {
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                claimer: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            10 => Self::GameError {
                player: PublicKey::read(reader)?,
                game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
                error_code: u8::read(reader)?,
                message: read_string(reader, MAX_ERROR_MESSAGE_LENGTH)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::GameCreated {
                    game_id,
                    creator,
                    max_players,
                    entry_fee,
                } => {
                    string_encode_size(game_id)
                        + creator.encode_size()
                        + max_players.encode_size()
                        + entry_fee.encode_size()
                }
                Self::PlayerJoined {
                    game_id,
                    player,
                    player_count,
                    pot,
                } => {
                    string_encode_size(game_id)
                        + player.encode_size()
                        + player_count.encode_size()
                        + pot.encode_size()
                }
                Self::GameStarted {
                    game_id,
                    player_count,
                    mafia_count,
                    day_count,
                } => {
                    string_encode_size(game_id)
                        + player_count.encode_size()
                        + mafia_count.encode_size()
                        + day_count.encode_size()
                }
                Self::VoteCast {
                    game_id,
                    voter,
                    target,
                    total_votes,
                } => {
                    string_encode_size(game_id)
                        + voter.encode_size()
                        + target.encode_size()
                        + total_votes.encode_size()
                }
                Self::NightActionRecorded {
                    game_id,
                    actor,
                    action,
                } => string_encode_size(game_id) + actor.encode_size() + action.encode_size(),
                Self::PlayerEliminated {
                    game_id,
                    player,
                    cause,
                    day_count,
                } => {
                    string_encode_size(game_id)
                        + player.encode_size()
                        + cause.encode_size()
                        + day_count.encode_size()
                }
                Self::NightResolved {
                    game_id,
                    day_count,
                    eliminated,
                    kill_prevented,
                } => {
                    string_encode_size(game_id)
                        + day_count.encode_size()
                        + eliminated.encode_size()
                        + kill_prevented.encode_size()
                }
                Self::PhaseChanged {
                    game_id,
                    phase,
                    day_count,
                } => string_encode_size(game_id) + phase.encode_size() + day_count.encode_size(),
                Self::GameEnded {
                    game_id,
                    winner,
                    day_count,
                    winners,
                    payout_per_winner,
                } => {
                    string_encode_size(game_id)
                        + winner.encode_size()
                        + day_count.encode_size()
                        + winners.encode_size()
                        + payout_per_winner.encode_size()
                }
                Self::WinningsClaimed {
                    game_id,
                    claimer,
                    amount,
                } => string_encode_size(game_id) + claimer.encode_size() + amount.encode_size(),
                Self::GameError {
                    player,
                    game_id,
                    error_code,
                    message,
                } => {
                    player.encode_size()
                        + string_encode_size(game_id)
                        + error_code.encode_size()
                        + string_encode_size(message)
                }
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
    Commit { height: u64, start: u64 },
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
            Self::Commit { height, start } => {
                2u8.write(writer);
                height.write(writer);
                start.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            2 => Ok(Self::Commit {
                height: u64::read(reader)?,
                start: u64::read(reader)?,
            }),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Event(event) => event.encode_size(),
            Self::Transaction(transaction) => transaction.encode_size(),
            Self::Commit { height, start } => height.encode_size() + start.encode_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::ed25519::PrivateKey;

    fn pk(seed: u64) -> PublicKey {
        PrivateKey::from_seed(seed).public_key()
    }

    #[test]
    fn transaction_signature_verifies() {
        let private = PrivateKey::from_seed(7);
        let tx = Transaction::sign(
            &private,
            3,
            Instruction::CastVote {
                game_id: "lobby".to_string(),
                target: pk(8),
            },
        );
        assert!(tx.verify());

        let decoded = Transaction::read(&mut tx.encode().as_ref()).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.verify());
    }

    #[test]
    fn tampered_transaction_fails_verification() {
        let private = PrivateKey::from_seed(7);
        let mut tx = Transaction::sign(
            &private,
            0,
            Instruction::JoinGame {
                game_id: "lobby".to_string(),
            },
        );
        tx.nonce = 1;
        assert!(!tx.verify());

        let mut tx = Transaction::sign(
            &private,
            0,
            Instruction::JoinGame {
                game_id: "lobby".to_string(),
            },
        );
        tx.public = pk(9);
        assert!(!tx.verify());
    }

    #[test]
    fn instruction_tags_are_stable() {
        let cases = [
            (
                Instruction::InitializeGame {
                    game_id: "g".to_string(),
                    max_players: 5,
                    entry_fee: 10,
                },
                0u8,
            ),
            (Instruction::JoinGame { game_id: "g".to_string() }, 1),
            (Instruction::StartGame { game_id: "g".to_string() }, 2),
            (
                Instruction::CastVote {
                    game_id: "g".to_string(),
                    target: pk(1),
                },
                3,
            ),
            (Instruction::AdvancePhase { game_id: "g".to_string() }, 4),
            (
                Instruction::NightAction {
                    game_id: "g".to_string(),
                    action: NightActionKind::DoctorHeal,
                    target: pk(1),
                },
                5,
            ),
            (Instruction::ClaimWinnings { game_id: "g".to_string() }, 6),
        ];
        for (instruction, tag) in cases {
            let encoded = instruction.encode();
            assert_eq!(encoded[0], tag);
            assert_eq!(encoded.len(), instruction.encode_size());
            assert_eq!(Instruction::read(&mut encoded.as_ref()).unwrap(), instruction);
        }
    }

    #[test]
    fn instruction_rejects_unknown_tag() {
        assert!(matches!(
            Instruction::read(&mut [7u8].as_ref()),
            Err(Error::InvalidEnum(7))
        ));
    }

    #[test]
    fn game_key_is_derived_from_identifier() {
        assert_eq!(Key::game("alpha"), Key::game("alpha"));
        assert_ne!(Key::game("alpha"), Key::game("beta"));

        let mut hasher = Sha256::new();
        hasher.update(b"gamealpha");
        assert_eq!(Key::game("alpha"), Key::Game(hasher.finalize()));
    }

    #[test]
    fn seed_clock_uses_view_duration() {
        let seed = Seed::new(10, Sha256::hash(b"entropy"));
        assert_eq!(seed.now(), 30);
        let decoded = Seed::read(&mut seed.encode().as_ref()).unwrap();
        assert_eq!(decoded, seed);
    }

    #[test]
    fn event_encoding_matches_size() {
        let events = vec![
            Event::NightResolved {
                game_id: "g".to_string(),
                day_count: 1,
                eliminated: Some(pk(2)),
                kill_prevented: false,
            },
            Event::GameError {
                player: pk(1),
                game_id: String::new(),
                error_code: 21,
                message: "invalid game id".to_string(),
            },
            Event::GameEnded {
                game_id: "g".to_string(),
                winner: Faction::Town,
                day_count: 3,
                winners: 2,
                payout_per_winner: 150,
            },
        ];
        for event in events {
            let output = Output::Event(event);
            let encoded = output.encode();
            assert_eq!(encoded.len(), output.encode_size());
            assert_eq!(Output::read(&mut encoded.as_ref()).unwrap(), output);
        }
    }
}
