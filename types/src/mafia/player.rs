use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{Faction, NightActionKind, Role};

/// A seat in a game. Created on join and never removed, only marked dead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub address: PublicKey,
    pub role: Role,
    pub is_alive: bool,
    /// Mirrors this player's entry in `Game::votes`.
    pub vote_target: Option<PublicKey>,
    pub joined_at: u64,
    /// Set once the escrow has paid this player.
    pub has_claimed: bool,
}

impl Player {
    pub fn new(address: PublicKey, joined_at: u64) -> Self {
        Self {
            address,
            role: Role::Unassigned,
            is_alive: true,
            vote_target: None,
            joined_at,
            has_claimed: false,
        }
    }

    pub fn faction(&self) -> Option<Faction> {
        self.role.faction()
    }
}

impl Write for Player {
    fn write(&self, writer: &mut impl BufMut) {
        self.address.write(writer);
        self.role.write(writer);
        self.is_alive.write(writer);
        self.vote_target.write(writer);
        self.joined_at.write(writer);
        self.has_claimed.write(writer);
    }
}

impl Read for Player {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            address: PublicKey::read(reader)?,
            role: Role::read(reader)?,
            is_alive: bool::read(reader)?,
            vote_target: Option::<PublicKey>::read(reader)?,
            joined_at: u64::read(reader)?,
            has_claimed: bool::read(reader)?,
        })
    }
}

impl EncodeSize for Player {
    fn encode_size(&self) -> usize {
        self.address.encode_size()
            + self.role.encode_size()
            + self.is_alive.encode_size()
            + self.vote_target.encode_size()
            + self.joined_at.encode_size()
            + self.has_claimed.encode_size()
    }
}

/// One outstanding day vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub voter: PublicKey,
    pub target: PublicKey,
    pub cast_at: u64,
}

impl Write for Vote {
    fn write(&self, writer: &mut impl BufMut) {
        self.voter.write(writer);
        self.target.write(writer);
        self.cast_at.write(writer);
    }
}

impl Read for Vote {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            voter: PublicKey::read(reader)?,
            target: PublicKey::read(reader)?,
            cast_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Vote {
    fn encode_size(&self) -> usize {
        self.voter.encode_size() + self.target.encode_size() + self.cast_at.encode_size()
    }
}

/// A pending covert action, cleared when night resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NightAction {
    pub actor: PublicKey,
    pub kind: NightActionKind,
    pub target: PublicKey,
    pub submitted_at: u64,
}

impl Write for NightAction {
    fn write(&self, writer: &mut impl BufMut) {
        self.actor.write(writer);
        self.kind.write(writer);
        self.target.write(writer);
        self.submitted_at.write(writer);
    }
}

impl Read for NightAction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            actor: PublicKey::read(reader)?,
            kind: NightActionKind::read(reader)?,
            target: PublicKey::read(reader)?,
            submitted_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for NightAction {
    fn encode_size(&self) -> usize {
        self.actor.encode_size()
            + self.kind.encode_size()
            + self.target.encode_size()
            + self.submitted_at.encode_size()
    }
}

/// A resolved detective investigation. The revealed faction is derived on read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Investigation {
    pub detective: PublicKey,
    pub target: PublicKey,
    /// Night on which the investigation resolved.
    pub day_count: u32,
}

impl Write for Investigation {
    fn write(&self, writer: &mut impl BufMut) {
        self.detective.write(writer);
        self.target.write(writer);
        self.day_count.write(writer);
    }
}

impl Read for Investigation {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            detective: PublicKey::read(reader)?,
            target: PublicKey::read(reader)?,
            day_count: u32::read(reader)?,
        })
    }
}

impl EncodeSize for Investigation {
    fn encode_size(&self) -> usize {
        self.detective.encode_size() + self.target.encode_size() + self.day_count.encode_size()
    }
}
