use thiserror::Error as ThisError;

/// Named rejection reasons surfaced to callers.
///
/// Every variant maps to a stable numeric code (see [`GameError::code`]) that is carried in
/// `Event::GameError`. Codes are part of the wire format and must never be reused.
#[derive(Clone, Copy, Debug, ThisError, PartialEq, Eq)]
pub enum GameError {
    #[error("game already exists")]
    GameAlreadyExists,
    #[error("game not found")]
    GameNotFound,
    #[error("player already joined")]
    AlreadyJoined,
    #[error("game is full")]
    GameFull,
    #[error("game is not joinable")]
    GameNotJoinable,
    #[error("not the game creator")]
    NotCreator,
    #[error("game is not startable")]
    GameNotStartable,
    #[error("not enough players")]
    NotEnoughPlayers,
    #[error("game is not active")]
    GameNotActive,
    #[error("not voting phase")]
    NotVotingPhase,
    #[error("not night phase")]
    NotNightPhase,
    #[error("player not in game")]
    PlayerNotInGame,
    #[error("player is dead")]
    PlayerDead,
    #[error("invalid target")]
    InvalidTarget,
    #[error("invalid role")]
    InvalidRole,
    #[error("game not finished")]
    GameNotFinished,
    #[error("no winner")]
    NoWinner,
    #[error("not a winner")]
    NotWinner,
    #[error("winnings already claimed")]
    AlreadyClaimed,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("invalid game id")]
    InvalidGameId,
    #[error("invalid max players")]
    InvalidMaxPlayers,
    #[error("escrow amount overflows")]
    EscrowOverflow,
}

impl GameError {
    pub const fn code(&self) -> u8 {
        match self {
            Self::GameAlreadyExists => 1,
            Self::GameNotFound => 2,
            Self::AlreadyJoined => 3,
            Self::GameFull => 4,
            Self::GameNotJoinable => 5,
            Self::NotCreator => 6,
            Self::GameNotStartable => 7,
            Self::NotEnoughPlayers => 8,
            Self::GameNotActive => 9,
            Self::NotVotingPhase => 10,
            Self::NotNightPhase => 11,
            Self::PlayerNotInGame => 12,
            Self::PlayerDead => 13,
            Self::InvalidTarget => 14,
            Self::InvalidRole => 15,
            Self::GameNotFinished => 16,
            Self::NoWinner => 17,
            Self::NotWinner => 18,
            Self::AlreadyClaimed => 19,
            Self::InsufficientFunds => 20,
            Self::InvalidGameId => 21,
            Self::InvalidMaxPlayers => 22,
            Self::EscrowOverflow => 23,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::GameAlreadyExists,
            2 => Self::GameNotFound,
            3 => Self::AlreadyJoined,
            4 => Self::GameFull,
            5 => Self::GameNotJoinable,
            6 => Self::NotCreator,
            7 => Self::GameNotStartable,
            8 => Self::NotEnoughPlayers,
            9 => Self::GameNotActive,
            10 => Self::NotVotingPhase,
            11 => Self::NotNightPhase,
            12 => Self::PlayerNotInGame,
            13 => Self::PlayerDead,
            14 => Self::InvalidTarget,
            15 => Self::InvalidRole,
            16 => Self::GameNotFinished,
            17 => Self::NoWinner,
            18 => Self::NotWinner,
            19 => Self::AlreadyClaimed,
            20 => Self::InsufficientFunds,
            21 => Self::InvalidGameId,
            22 => Self::InvalidMaxPlayers,
            23 => Self::EscrowOverflow,
            _ => return None,
        })
    }

    /// Stable identifier matching the variant name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GameAlreadyExists => "GameAlreadyExists",
            Self::GameNotFound => "GameNotFound",
            Self::AlreadyJoined => "AlreadyJoined",
            Self::GameFull => "GameFull",
            Self::GameNotJoinable => "GameNotJoinable",
            Self::NotCreator => "NotCreator",
            Self::GameNotStartable => "GameNotStartable",
            Self::NotEnoughPlayers => "NotEnoughPlayers",
            Self::GameNotActive => "GameNotActive",
            Self::NotVotingPhase => "NotVotingPhase",
            Self::NotNightPhase => "NotNightPhase",
            Self::PlayerNotInGame => "PlayerNotInGame",
            Self::PlayerDead => "PlayerDead",
            Self::InvalidTarget => "InvalidTarget",
            Self::InvalidRole => "InvalidRole",
            Self::GameNotFinished => "GameNotFinished",
            Self::NoWinner => "NoWinner",
            Self::NotWinner => "NotWinner",
            Self::AlreadyClaimed => "AlreadyClaimed",
            Self::InsufficientFunds => "InsufficientFunds",
            Self::InvalidGameId => "InvalidGameId",
            Self::InvalidMaxPlayers => "InvalidMaxPlayers",
            Self::EscrowOverflow => "EscrowOverflow",
        }
    }
}
