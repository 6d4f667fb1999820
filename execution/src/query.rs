//! Read-only game queries.
//!
//! Game records are public: any caller may fetch a snapshot, a status summary, or a player's
//! claim status. Investigation results are the one requester-scoped read and are only returned
//! to the detective who ran them.
//!
//! ```rust,ignore
//! let status = query_game_status(&state, "lobby").await?;
//! let findings = query_investigations(&state, "lobby", &detective).await?;
//! ```

use commonware_cryptography::ed25519::PublicKey;
use mafia_types::execution::{Key, Value};
use mafia_types::mafia::{Faction, Game, GamePhase, GameState, Role};

use crate::state::State;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    GameNotFound(String),
    PlayerNotFound,
    /// Requester is not the detective of this game.
    NotDetective,
    StateError(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GameNotFound(id) => write!(f, "game not found: {id}"),
            Self::PlayerNotFound => write!(f, "player not in game"),
            Self::NotDetective => write!(f, "requester is not the detective"),
            Self::StateError(msg) => write!(f, "state error: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameStatus {
    pub game_id: String,
    pub state: GameState,
    pub phase: GamePhase,
    pub day_count: u32,
    pub phase_start_time: u64,
    pub player_count: u32,
    pub max_players: u8,
    pub alive_count: u32,
    pub pot: u64,
    pub winner: Option<Faction>,
}

impl GameStatus {
    pub fn from_game(game: &Game) -> Self {
        Self {
            game_id: game.game_id.clone(),
            state: game.state,
            phase: game.current_phase,
            day_count: game.day_count,
            phase_start_time: game.phase_start_time,
            player_count: game.players.len() as u32,
            max_players: game.max_players,
            alive_count: game.alive_count() as u32,
            pot: game.escrow.pot,
            winner: game.winner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimStatus {
    /// Player could claim (or has claimed) a share.
    pub eligible: bool,
    pub has_claimed: bool,
    /// Amount a claim would pay right now. Zero once claimed or when ineligible.
    pub claimable: u64,
}

/// An investigation result as seen by the detective.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvestigationResult {
    pub target: PublicKey,
    pub faction: Faction,
    pub day_count: u32,
}

pub async fn query_game<S: State>(state: &S, game_id: &str) -> Result<Game, QueryError> {
    load_game(state, game_id).await
}

pub async fn query_game_status<S: State>(
    state: &S,
    game_id: &str,
) -> Result<GameStatus, QueryError> {
    let game = load_game(state, game_id).await?;
    Ok(GameStatus::from_game(&game))
}

pub async fn query_claim_status<S: State>(
    state: &S,
    game_id: &str,
    player: &PublicKey,
) -> Result<ClaimStatus, QueryError> {
    let game = load_game(state, game_id).await?;
    let seat = game.player(player).ok_or(QueryError::PlayerNotFound)?;
    let eligible = game.state == GameState::Finished
        && seat.is_alive
        && game.winner.is_some()
        && seat.faction() == game.winner;
    let claimable = if eligible && !seat.has_claimed {
        let bonus = if game.escrow.claims == 0 {
            game.escrow.remainder
        } else {
            0
        };
        game.escrow
            .payout_per_winner
            .saturating_add(bonus)
            .min(game.escrow.pot)
    } else {
        0
    };
    Ok(ClaimStatus {
        eligible,
        has_claimed: seat.has_claimed,
        claimable,
    })
}

/// Resolved investigations for `requester`, who must hold the Detective role.
pub async fn query_investigations<S: State>(
    state: &S,
    game_id: &str,
    requester: &PublicKey,
) -> Result<Vec<InvestigationResult>, QueryError> {
    let game = load_game(state, game_id).await?;
    match game.player(requester) {
        Some(p) if p.role == Role::Detective => {}
        _ => return Err(QueryError::NotDetective),
    }
    Ok(game
        .investigations
        .iter()
        .filter(|i| &i.detective == requester)
        .filter_map(|i| {
            let faction = game.player(&i.target)?.faction()?;
            Some(InvestigationResult {
                target: i.target.clone(),
                faction,
                day_count: i.day_count,
            })
        })
        .collect())
}

async fn load_game<S: State>(state: &S, game_id: &str) -> Result<Game, QueryError> {
    match state.get(&Key::game(game_id)).await {
        Ok(Some(Value::Game(game))) => Ok(game),
        Ok(Some(_)) => Err(QueryError::StateError(
            "unexpected value type for game key".to_string(),
        )),
        Ok(None) => Err(QueryError::GameNotFound(game_id.to_string())),
        Err(e) => Err(QueryError::StateError(e.to_string())),
    }
}
