//! Day voting ledger.

use commonware_cryptography::ed25519::PublicKey;
use mafia_types::mafia::{Game, GameError, GamePhase, GameState, Vote};

/// Record `voter`'s vote for `target`, replacing any earlier vote. Returns the number of
/// outstanding votes.
pub fn cast(
    game: &mut Game,
    voter: &PublicKey,
    target: &PublicKey,
    now: u64,
) -> Result<u32, GameError> {
    if game.state != GameState::Active || game.current_phase != GamePhase::Day {
        return Err(GameError::NotVotingPhase);
    }
    let voter_index = game.player_index(voter).ok_or(GameError::PlayerNotInGame)?;
    if !game.players[voter_index].is_alive {
        return Err(GameError::PlayerDead);
    }
    match game.player(target) {
        Some(p) if p.is_alive => {}
        _ => return Err(GameError::InvalidTarget),
    }

    let vote = Vote {
        voter: voter.clone(),
        target: target.clone(),
        cast_at: now,
    };
    match game.votes.iter_mut().find(|v| &v.voter == voter) {
        Some(existing) => *existing = vote,
        None => game.votes.push(vote),
    }
    game.players[voter_index].vote_target = Some(target.clone());

    Ok(game.votes.len() as u32)
}

/// The player with strictly the most votes. `None` on a tie or an empty ledger.
pub fn tally(game: &Game) -> Option<PublicKey> {
    let mut counts: Vec<(&PublicKey, u32)> = Vec::new();
    for vote in &game.votes {
        match counts.iter_mut().find(|(target, _)| *target == &vote.target) {
            Some((_, count)) => *count += 1,
            None => counts.push((&vote.target, 1)),
        }
    }

    let top = counts.iter().map(|(_, count)| *count).max()?;
    let mut leaders = counts.iter().filter(|(_, count)| *count == top);
    let (leader, _) = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some((*leader).clone())
}

pub fn clear(game: &mut Game) {
    game.votes.clear();
    for player in &mut game.players {
        player.vote_target = None;
    }
}
