//! Entry-fee pot and winner payouts.
//!
//! The split is fixed once, when the game finishes: `pot / winners` per eligible winner, with
//! `pot % winners` added to whichever winner claims first. Eligible winners are players alive
//! at the end whose faction matches the declared winner.

use commonware_cryptography::ed25519::PublicKey;
use mafia_types::mafia::{Faction, Game, GameError, GameState};

/// Add an entry fee to the pot. The pot is left untouched on overflow.
pub fn deposit(game: &mut Game, amount: u64) -> Result<u64, GameError> {
    let pot = game
        .escrow
        .pot
        .checked_add(amount)
        .ok_or(GameError::EscrowOverflow)?;
    game.escrow.pot = pot;
    Ok(pot)
}

/// Whether a full table's entry fees fit in the pot.
pub fn fits_full_table(entry_fee: u64, max_players: u8) -> bool {
    entry_fee.checked_mul(max_players as u64).is_some()
}

/// Fix the payout split for `winner`.
pub fn settle(game: &mut Game, winner: Faction) {
    let winners = game.alive_in(winner) as u64;
    let escrow = &mut game.escrow;
    escrow.settled_pot = escrow.pot;
    escrow.winners = winners as u32;
    escrow.payout_per_winner = escrow.pot.checked_div(winners).unwrap_or(0);
    escrow.remainder = escrow.pot.checked_rem(winners).unwrap_or(0);
}

/// Pay `claimer` their share and mark them claimed. Returns the amount released from the pot.
pub fn claim(game: &mut Game, claimer: &PublicKey) -> Result<u64, GameError> {
    if game.state != GameState::Finished {
        return Err(GameError::GameNotFinished);
    }
    let winner = game.winner.ok_or(GameError::NoWinner)?;
    let index = game.player_index(claimer).ok_or(GameError::NotWinner)?;
    let player = &game.players[index];
    if !player.is_alive || player.faction() != Some(winner) {
        return Err(GameError::NotWinner);
    }
    if player.has_claimed {
        return Err(GameError::AlreadyClaimed);
    }

    let mut amount = game.escrow.payout_per_winner;
    if game.escrow.claims == 0 {
        amount += game.escrow.remainder;
    }
    let amount = amount.min(game.escrow.pot);

    game.escrow.pot -= amount;
    game.escrow.claims += 1;
    game.players[index].has_claimed = true;
    Ok(amount)
}
