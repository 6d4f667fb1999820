//! Game lifecycle and the Day/Night clock.
//!
//! ```text
//! WaitingForPlayers --start--> Active(Day, 1) --advance--> Active(Night, 1)
//!                                   ^                            |
//!                                   +---- advance (day + 1) -----+
//! Active --(winner declared on any edge)--> Finished
//! ```
//! Once `Finished`, phase, day counter, and phase start time are frozen.

use commonware_cryptography::ed25519::PublicKey;
use mafia_types::{
    execution::Event,
    mafia::{EliminationCause, Faction, Game, GameError, GamePhase, GameState, RulesConfig},
    Seed,
};
use tracing::info;

use crate::{escrow, night, roles, voting, win};

pub fn start(
    game: &mut Game,
    seed: &Seed,
    rules: &RulesConfig,
    now: u64,
) -> Result<Vec<Event>, GameError> {
    if game.state != GameState::WaitingForPlayers {
        return Err(GameError::GameNotStartable);
    }
    if game.players.len() < rules.min_players as usize {
        return Err(GameError::NotEnoughPlayers);
    }

    let mafia_count = roles::assign(game, seed, rules);
    game.state = GameState::Active;
    game.current_phase = GamePhase::Day;
    game.day_count = 1;
    game.phase_start_time = now;

    info!(
        game_id = %game.game_id,
        players = game.players.len(),
        mafia_count,
        "game started"
    );
    Ok(vec![Event::GameStarted {
        game_id: game.game_id.clone(),
        player_count: game.players.len() as u32,
        mafia_count: mafia_count as u32,
        day_count: game.day_count,
    }])
}

/// Close the current phase: resolve it, check for a winner, and open the next one.
pub fn advance(game: &mut Game, now: u64) -> Result<Vec<Event>, GameError> {
    if game.state != GameState::Active {
        return Err(GameError::GameNotActive);
    }

    let mut events = Vec::new();
    let next = match game.current_phase {
        GamePhase::Day => {
            let lynched = voting::tally(game);
            voting::clear(game);
            if let Some(target) = lynched {
                events.push(eliminate(game, &target, EliminationCause::Lynch));
            }
            GamePhase::Night
        }
        GamePhase::Night => {
            let outcome = night::resolve(game);
            if let Some(target) = &outcome.killed {
                events.push(eliminate(game, target, EliminationCause::NightKill));
            }
            events.push(Event::NightResolved {
                game_id: game.game_id.clone(),
                day_count: game.day_count,
                eliminated: outcome.killed,
                kill_prevented: outcome.kill_prevented,
            });
            GamePhase::Day
        }
    };

    if let Some(winner) = win::evaluate(game) {
        events.push(finish(game, winner));
        return Ok(events);
    }

    if next == GamePhase::Day {
        game.day_count += 1;
    }
    game.current_phase = next;
    game.phase_start_time = now;
    info!(
        game_id = %game.game_id,
        phase = ?next,
        day_count = game.day_count,
        "phase advanced"
    );
    events.push(Event::PhaseChanged {
        game_id: game.game_id.clone(),
        phase: next,
        day_count: game.day_count,
    });
    Ok(events)
}

fn eliminate(game: &mut Game, target: &PublicKey, cause: EliminationCause) -> Event {
    if let Some(player) = game.players.iter_mut().find(|p| &p.address == target) {
        player.is_alive = false;
        player.vote_target = None;
    }
    game.eliminated_players.push(target.clone());
    info!(game_id = %game.game_id, player = ?target, ?cause, "player eliminated");
    Event::PlayerEliminated {
        game_id: game.game_id.clone(),
        player: target.clone(),
        cause,
        day_count: game.day_count,
    }
}

fn finish(game: &mut Game, winner: Faction) -> Event {
    game.state = GameState::Finished;
    game.winner = Some(winner);
    escrow::settle(game, winner);
    info!(
        game_id = %game.game_id,
        ?winner,
        winners = game.escrow.winners,
        payout = game.escrow.payout_per_winner,
        "game ended"
    );
    Event::GameEnded {
        game_id: game.game_id.clone(),
        winner,
        day_count: game.day_count,
        winners: game.escrow.winners,
        payout_per_winner: game.escrow.payout_per_winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_account_keypair, create_seed};
    use commonware_codec::{DecodeExt, Encode};
    use mafia_types::execution::Value;
    use mafia_types::mafia::{NightActionKind, Player, Role};

    fn lobby(n: u64) -> (Game, Vec<PublicKey>) {
        let (_, creator) = create_account_keypair(1);
        let mut game = Game::new("clock".to_string(), creator, 12, 10, 0);
        let mut keys = Vec::new();
        for seed in 1..=n {
            let (_, public) = create_account_keypair(seed);
            game.players.push(Player::new(public.clone(), 0));
            escrow::deposit(&mut game, 10).unwrap();
            keys.push(public);
        }
        (game, keys)
    }

    /// Active game with seat 0 Mafia, seat 1 Detective, seat 2 Doctor, rest Townsperson.
    fn scripted(n: u64) -> (Game, Vec<PublicKey>) {
        let (mut game, keys) = lobby(n);
        for (i, player) in game.players.iter_mut().enumerate() {
            player.role = match i {
                0 => Role::Mafia,
                1 => Role::Detective,
                2 => Role::Doctor,
                _ => Role::Townsperson,
            };
        }
        game.state = GameState::Active;
        game.current_phase = GamePhase::Day;
        game.day_count = 1;
        (game, keys)
    }

    #[test]
    fn start_requires_minimum_roster() {
        let (mut game, _) = lobby(3);
        assert_eq!(
            start(&mut game, &create_seed(1), &RulesConfig::default(), 3),
            Err(GameError::NotEnoughPlayers)
        );
        assert_eq!(game.state, GameState::WaitingForPlayers);
    }

    #[test]
    fn start_opens_day_one() {
        let (mut game, _) = lobby(8);
        let events = start(&mut game, &create_seed(1), &RulesConfig::default(), 3).unwrap();
        assert_eq!(game.state, GameState::Active);
        assert_eq!(game.current_phase, GamePhase::Day);
        assert_eq!(game.day_count, 1);
        assert_eq!(game.phase_start_time, 3);
        assert_eq!(game.mafia_count(), 2);
        assert!(matches!(
            events.as_slice(),
            [Event::GameStarted { player_count: 8, mafia_count: 2, day_count: 1, .. }]
        ));
        game.validate_invariants().unwrap();

        assert_eq!(
            start(&mut game, &create_seed(2), &RulesConfig::default(), 6),
            Err(GameError::GameNotStartable)
        );
    }

    #[test]
    fn advance_requires_active_game() {
        let (mut game, _) = lobby(4);
        assert_eq!(advance(&mut game, 0), Err(GameError::GameNotActive));
    }

    #[test]
    fn day_majority_lynches_and_opens_night() {
        let (mut game, keys) = scripted(6);
        voting::cast(&mut game, &keys[0], &keys[5], 0).unwrap();
        voting::cast(&mut game, &keys[1], &keys[5], 0).unwrap();
        voting::cast(&mut game, &keys[2], &keys[4], 0).unwrap();

        let events = advance(&mut game, 9).unwrap();
        assert!(!game.players[5].is_alive);
        assert_eq!(game.eliminated_players, vec![keys[5].clone()]);
        assert!(game.votes.is_empty());
        assert_eq!(game.current_phase, GamePhase::Night);
        assert_eq!(game.day_count, 1);
        assert_eq!(game.phase_start_time, 9);
        assert!(matches!(
            events.as_slice(),
            [
                Event::PlayerEliminated { cause: EliminationCause::Lynch, .. },
                Event::PhaseChanged { phase: GamePhase::Night, day_count: 1, .. }
            ]
        ));
        game.validate_invariants().unwrap();
    }

    #[test]
    fn tied_day_eliminates_nobody() {
        let (mut game, keys) = scripted(6);
        voting::cast(&mut game, &keys[0], &keys[5], 0).unwrap();
        voting::cast(&mut game, &keys[1], &keys[4], 0).unwrap();
        advance(&mut game, 3).unwrap();
        assert_eq!(game.alive_count(), 6);
        assert!(game.eliminated_players.is_empty());
        assert_eq!(game.current_phase, GamePhase::Night);
    }

    #[test]
    fn night_to_day_increments_counter() {
        let (mut game, keys) = scripted(6);
        advance(&mut game, 3).unwrap();
        night::record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[4], 4).unwrap();

        let events = advance(&mut game, 6).unwrap();
        assert!(!game.players[4].is_alive);
        assert_eq!(game.current_phase, GamePhase::Day);
        assert_eq!(game.day_count, 2);
        assert!(matches!(
            events.as_slice(),
            [
                Event::PlayerEliminated { cause: EliminationCause::NightKill, .. },
                Event::NightResolved { day_count: 1, eliminated: Some(_), kill_prevented: false, .. },
                Event::PhaseChanged { phase: GamePhase::Day, day_count: 2, .. }
            ]
        ));
    }

    #[test]
    fn lynching_last_mafia_ends_game_for_town() {
        let (mut game, keys) = scripted(4);
        for voter in &keys[1..] {
            voting::cast(&mut game, voter, &keys[0], 0).unwrap();
        }
        let events = advance(&mut game, 3).unwrap();
        assert_eq!(game.state, GameState::Finished);
        assert_eq!(game.winner, Some(Faction::Town));
        assert_eq!(game.current_phase, GamePhase::Day);
        assert_eq!(game.day_count, 1);
        assert_eq!(game.escrow.winners, 3);
        assert_eq!(game.escrow.payout_per_winner, 13);
        assert_eq!(game.escrow.remainder, 1);
        assert!(matches!(
            events.last(),
            Some(Event::GameEnded { winner: Faction::Town, winners: 3, .. })
        ));
        game.validate_invariants().unwrap();

        assert_eq!(advance(&mut game, 6), Err(GameError::GameNotActive));
    }

    #[test]
    fn mafia_wins_at_parity_after_night_kill() {
        let (mut game, keys) = scripted(4);
        voting::cast(&mut game, &keys[0], &keys[3], 0).unwrap();
        advance(&mut game, 3).unwrap();
        night::record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[1], 4).unwrap();

        advance(&mut game, 6).unwrap();
        assert_eq!(game.state, GameState::Finished);
        assert_eq!(game.winner, Some(Faction::Mafia));
        assert_eq!(game.current_phase, GamePhase::Night);
        assert_eq!(game.day_count, 1);
        assert_eq!(game.escrow.winners, 1);
        assert_eq!(game.escrow.payout_per_winner, 40);
    }

    #[test]
    fn endless_idle_game_stays_decodable() {
        let (mut game, keys) = scripted(5);
        let targets = [&keys[0], &keys[2], &keys[3], &keys[4]];
        for cycle in 0..70u64 {
            advance(&mut game, cycle * 6).unwrap();
            let target = targets[cycle as usize % targets.len()];
            night::record(
                &mut game,
                &keys[1],
                NightActionKind::DetectiveInvestigate,
                target,
                cycle * 6 + 1,
            )
            .unwrap();
            advance(&mut game, cycle * 6 + 3).unwrap();
        }

        assert_eq!(game.state, GameState::Active);
        assert_eq!(game.day_count, 71);
        assert_eq!(game.investigations.len(), targets.len());
        assert_eq!(game.investigations.last().map(|i| i.day_count), Some(70));
        game.validate_invariants().unwrap();

        let stored = Value::Game(game);
        let decoded = Value::decode(stored.encode()).unwrap();
        assert_eq!(decoded, stored);
    }
}
