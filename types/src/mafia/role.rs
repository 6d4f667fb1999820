use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

/// Secret role held by a player for the life of a game.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Held by every player until the game starts.
    Unassigned = 0,
    Mafia = 1,
    Detective = 2,
    Doctor = 3,
    Townsperson = 4,
}

impl Role {
    /// Faction the role plays for. `None` until roles are dealt.
    pub const fn faction(&self) -> Option<Faction> {
        match self {
            Role::Unassigned => None,
            Role::Mafia => Some(Faction::Mafia),
            Role::Detective | Role::Doctor | Role::Townsperson => Some(Faction::Town),
        }
    }

    pub const fn is_mafia(&self) -> bool {
        matches!(self, Role::Mafia)
    }
}

impl TryFrom<u8> for Role {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Unassigned),
            1 => Ok(Role::Mafia),
            2 => Ok(Role::Detective),
            3 => Ok(Role::Doctor),
            4 => Ok(Role::Townsperson),
            _ => Err(()),
        }
    }
}

impl Write for Role {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Role {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Role::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for Role {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// Side of the game. Also used as the declared winner.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Faction {
    Mafia = 0,
    Town = 1,
}

impl TryFrom<u8> for Faction {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Faction::Mafia),
            1 => Ok(Faction::Town),
            _ => Err(()),
        }
    }
}

impl Write for Faction {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Faction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Faction::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for Faction {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// Covert action submitted during the night.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NightActionKind {
    MafiaKill = 0,
    DetectiveInvestigate = 1,
    DoctorHeal = 2,
}

impl NightActionKind {
    /// The only role allowed to submit this action.
    pub const fn required_role(&self) -> Role {
        match self {
            NightActionKind::MafiaKill => Role::Mafia,
            NightActionKind::DetectiveInvestigate => Role::Detective,
            NightActionKind::DoctorHeal => Role::Doctor,
        }
    }
}

impl TryFrom<u8> for NightActionKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NightActionKind::MafiaKill),
            1 => Ok(NightActionKind::DetectiveInvestigate),
            2 => Ok(NightActionKind::DoctorHeal),
            _ => Err(()),
        }
    }
}

impl Write for NightActionKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for NightActionKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        NightActionKind::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for NightActionKind {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}
