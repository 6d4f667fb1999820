/// Maximum game identifier length in bytes (fits a single address seed).
pub const MAX_GAME_ID_LENGTH: usize = 32;

/// Fewest players a game can be started with.
pub const MIN_PLAYERS: u8 = 4;

/// Default ceiling for `max_players` at initialization.
pub const DEFAULT_MAX_PLAYERS_CAP: u8 = 20;

/// Hard ceiling for any roster, bounds every decoded collection.
pub const MAX_ROSTER: usize = 64;

/// One Mafia seat per this many players (minimum one).
pub const PLAYERS_PER_MAFIA: usize = 4;

/// Seconds represented by one consensus view.
pub const SECONDS_PER_VIEW: u64 = 3;

/// Maximum length of an error message carried in events.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 256;

/// Domain separator for deriving a game's storage address.
pub const GAME_KEY_PREFIX: &[u8] = b"game";

/// Domain separator for role assignment entropy.
pub const ROLE_ENTROPY_DOMAIN: &[u8] = b"mafia-roles";
