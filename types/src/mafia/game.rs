use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

use super::{
    read_string, string_encode_size, write_string, Faction, Investigation, NightAction, Player,
    Role, Vote, MAX_GAME_ID_LENGTH, MAX_ROSTER,
};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    WaitingForPlayers = 0,
    Active = 1,
    Finished = 2,
}

impl TryFrom<u8> for GameState {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameState::WaitingForPlayers),
            1 => Ok(GameState::Active),
            2 => Ok(GameState::Finished),
            _ => Err(()),
        }
    }
}

impl Write for GameState {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        GameState::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for GameState {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// Sub-phase of an active game. Meaningless outside `GameState::Active`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Day = 0,
    Night = 1,
}

impl TryFrom<u8> for GamePhase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GamePhase::Day),
            1 => Ok(GamePhase::Night),
            _ => Err(()),
        }
    }
}

impl Write for GamePhase {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GamePhase {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        GamePhase::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for GamePhase {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EliminationCause {
    Lynch = 0,
    NightKill = 1,
}

impl TryFrom<u8> for EliminationCause {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EliminationCause::Lynch),
            1 => Ok(EliminationCause::NightKill),
            _ => Err(()),
        }
    }
}

impl Write for EliminationCause {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for EliminationCause {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        EliminationCause::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for EliminationCause {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// Pooled entry fees and the settlement fixed when the game finishes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Escrow {
    /// Fees currently held by the game.
    pub pot: u64,
    /// Pot at the moment the game finished.
    pub settled_pot: u64,
    /// Eligible winners at game end.
    pub winners: u32,
    pub payout_per_winner: u64,
    /// `settled_pot % winners`, paid on top of the first claim.
    pub remainder: u64,
    pub claims: u32,
}

impl Write for Escrow {
    fn write(&self, writer: &mut impl BufMut) {
        self.pot.write(writer);
        self.settled_pot.write(writer);
        self.winners.write(writer);
        self.payout_per_winner.write(writer);
        self.remainder.write(writer);
        self.claims.write(writer);
    }
}

impl Read for Escrow {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            pot: u64::read(reader)?,
            settled_pot: u64::read(reader)?,
            winners: u32::read(reader)?,
            payout_per_winner: u64::read(reader)?,
            remainder: u64::read(reader)?,
            claims: u32::read(reader)?,
        })
    }
}

impl EncodeSize for Escrow {
    fn encode_size(&self) -> usize {
        self.pot.encode_size()
            + self.settled_pot.encode_size()
            + self.winners.encode_size()
            + self.payout_per_winner.encode_size()
            + self.remainder.encode_size()
            + self.claims.encode_size()
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum GameInvariantError {
    #[error("roster over capacity (len={len}, max={max})")]
    RosterOverCapacity { len: usize, max: u8 },
    #[error("duplicate player in roster")]
    DuplicatePlayer,
    #[error("vote cast by a dead or unknown player")]
    InvalidVoter,
    #[error("more than one vote for a single voter")]
    DuplicateVote,
    #[error("vote target mirror out of sync")]
    VoteTargetMismatch,
    #[error("eliminated player is still alive")]
    EliminatedStillAlive,
    #[error("winner set while game not finished, or missing once finished")]
    WinnerMismatch,
    #[error("roles unassigned after start")]
    RolesUnassigned,
    #[error("target investigated twice by the same detective")]
    DuplicateInvestigation,
}

/// One game instance, addressed by its identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub game_id: String,
    pub creator: PublicKey,
    pub max_players: u8,
    pub entry_fee: u64,
    pub state: GameState,
    pub current_phase: GamePhase,
    pub day_count: u32,
    pub created_at: u64,
    pub phase_start_time: u64,
    pub players: Vec<Player>,
    pub votes: Vec<Vote>,
    pub night_actions: Vec<NightAction>,
    pub investigations: Vec<Investigation>,
    pub eliminated_players: Vec<PublicKey>,
    pub winner: Option<Faction>,
    pub escrow: Escrow,
}

impl Game {
    pub fn new(
        game_id: String,
        creator: PublicKey,
        max_players: u8,
        entry_fee: u64,
        now: u64,
    ) -> Self {
        Self {
            game_id,
            creator,
            max_players,
            entry_fee,
            state: GameState::WaitingForPlayers,
            current_phase: GamePhase::Day,
            day_count: 0,
            created_at: now,
            phase_start_time: now,
            players: Vec::new(),
            votes: Vec::new(),
            night_actions: Vec::new(),
            investigations: Vec::new(),
            eliminated_players: Vec::new(),
            winner: None,
            escrow: Escrow::default(),
        }
    }

    pub fn player_index(&self, address: &PublicKey) -> Option<usize> {
        self.players.iter().position(|p| &p.address == address)
    }

    pub fn player(&self, address: &PublicKey) -> Option<&Player> {
        self.players.iter().find(|p| &p.address == address)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    /// Living players on the given side.
    pub fn alive_in(&self, faction: Faction) -> usize {
        self.players
            .iter()
            .filter(|p| p.is_alive && p.faction() == Some(faction))
            .count()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive).count()
    }

    pub fn mafia_count(&self) -> usize {
        self.players.iter().filter(|p| p.role.is_mafia()).count()
    }

    pub fn validate_invariants(&self) -> Result<(), GameInvariantError> {
        if self.players.len() > self.max_players as usize {
            return Err(GameInvariantError::RosterOverCapacity {
                len: self.players.len(),
                max: self.max_players,
            });
        }

        let mut seen = BTreeSet::new();
        for player in &self.players {
            if !seen.insert(&player.address) {
                return Err(GameInvariantError::DuplicatePlayer);
            }
        }

        let mut voters = BTreeSet::new();
        for vote in &self.votes {
            match self.player(&vote.voter) {
                Some(p) if p.is_alive => {}
                _ => return Err(GameInvariantError::InvalidVoter),
            }
            if !voters.insert(&vote.voter) {
                return Err(GameInvariantError::DuplicateVote);
            }
        }
        for player in &self.players {
            let mirrored = self
                .votes
                .iter()
                .find(|v| v.voter == player.address)
                .map(|v| &v.target);
            if mirrored != player.vote_target.as_ref() {
                return Err(GameInvariantError::VoteTargetMismatch);
            }
        }

        for eliminated in &self.eliminated_players {
            if self.player(eliminated).map_or(true, |p| p.is_alive) {
                return Err(GameInvariantError::EliminatedStillAlive);
            }
        }

        let mut investigated = BTreeSet::new();
        for investigation in &self.investigations {
            if !investigated.insert((&investigation.detective, &investigation.target)) {
                return Err(GameInvariantError::DuplicateInvestigation);
            }
        }

        if self.winner.is_some() != (self.state == GameState::Finished) {
            return Err(GameInvariantError::WinnerMismatch);
        }

        if self.state != GameState::WaitingForPlayers
            && self.players.iter().any(|p| p.role == Role::Unassigned)
        {
            return Err(GameInvariantError::RolesUnassigned);
        }

        Ok(())
    }
}

impl Write for Game {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.game_id, writer);
        self.creator.write(writer);
        self.max_players.write(writer);
        self.entry_fee.write(writer);
        self.state.write(writer);
        self.current_phase.write(writer);
        self.day_count.write(writer);
        self.created_at.write(writer);
        self.phase_start_time.write(writer);
        self.players.write(writer);
        self.votes.write(writer);
        self.night_actions.write(writer);
        self.investigations.write(writer);
        self.eliminated_players.write(writer);
        self.winner.write(writer);
        self.escrow.write(writer);
    }
}

impl Read for Game {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            game_id: read_string(reader, MAX_GAME_ID_LENGTH)?,
            creator: PublicKey::read(reader)?,
            max_players: u8::read(reader)?,
            entry_fee: u64::read(reader)?,
            state: GameState::read(reader)?,
            current_phase: GamePhase::read(reader)?,
            day_count: u32::read(reader)?,
            created_at: u64::read(reader)?,
            phase_start_time: u64::read(reader)?,
            players: Vec::<Player>::read_range(reader, 0..=MAX_ROSTER)?,
            votes: Vec::<Vote>::read_range(reader, 0..=MAX_ROSTER)?,
            night_actions: Vec::<NightAction>::read_range(reader, 0..=MAX_ROSTER)?,
            investigations: Vec::<Investigation>::read_range(reader, 0..=MAX_ROSTER)?,
            eliminated_players: Vec::<PublicKey>::read_range(reader, 0..=MAX_ROSTER)?,
            winner: Option::<Faction>::read(reader)?,
            escrow: Escrow::read(reader)?,
        })
    }
}

impl EncodeSize for Game {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.game_id)
            + self.creator.encode_size()
            + self.max_players.encode_size()
            + self.entry_fee.encode_size()
            + self.state.encode_size()
            + self.current_phase.encode_size()
            + self.day_count.encode_size()
            + self.created_at.encode_size()
            + self.phase_start_time.encode_size()
            + self.players.encode_size()
            + self.votes.encode_size()
            + self.night_actions.encode_size()
            + self.investigations.encode_size()
            + self.eliminated_players.encode_size()
            + self.winner.encode_size()
            + self.escrow.encode_size()
    }
}
