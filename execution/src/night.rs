//! Night action recording and resolution.
//!
//! Resolution order: the doctor's heal is read first, then the Mafia kill is applied unless it
//! lands on the healed player, then detective investigations are recorded. At most one player
//! dies per night. Investigating the same target again refreshes the earlier entry.

use commonware_cryptography::ed25519::PublicKey;
use mafia_types::mafia::{
    Game, GameError, GamePhase, GameState, Investigation, NightAction, NightActionKind,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NightOutcome {
    /// Player killed this night.
    pub killed: Option<PublicKey>,
    /// A kill was ordered and the doctor saved its target.
    pub kill_prevented: bool,
}

/// Record a covert action. A later submission by the same actor replaces the earlier one.
pub fn record(
    game: &mut Game,
    actor: &PublicKey,
    kind: NightActionKind,
    target: &PublicKey,
    now: u64,
) -> Result<(), GameError> {
    if game.state != GameState::Active || game.current_phase != GamePhase::Night {
        return Err(GameError::NotNightPhase);
    }
    let player = game.player(actor).ok_or(GameError::PlayerNotInGame)?;
    if !player.is_alive {
        return Err(GameError::PlayerDead);
    }
    if player.role != kind.required_role() {
        return Err(GameError::InvalidRole);
    }

    let target_player = match game.player(target) {
        Some(p) if p.is_alive => p,
        _ => return Err(GameError::InvalidTarget),
    };
    match kind {
        NightActionKind::MafiaKill if target_player.role.is_mafia() => {
            return Err(GameError::InvalidTarget)
        }
        NightActionKind::DetectiveInvestigate if target == actor => {
            return Err(GameError::InvalidTarget)
        }
        _ => {}
    }

    // Drop and re-append so submission order stays chronological.
    game.night_actions.retain(|a| &a.actor != actor);
    game.night_actions.push(NightAction {
        actor: actor.clone(),
        kind,
        target: target.clone(),
        submitted_at: now,
    });
    Ok(())
}

/// Plurality of Mafia kill submissions. Ties go to the target submitted earliest.
pub fn kill_target(actions: &[NightAction]) -> Option<PublicKey> {
    // (target, votes, first position)
    let mut tally: Vec<(&PublicKey, u32, usize)> = Vec::new();
    for (position, action) in actions.iter().enumerate() {
        if action.kind != NightActionKind::MafiaKill {
            continue;
        }
        match tally.iter_mut().find(|(t, _, _)| *t == &action.target) {
            Some((_, votes, _)) => *votes += 1,
            None => tally.push((&action.target, 1, position)),
        }
    }
    tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)))
        .map(|(target, _, _)| target.clone())
}

fn heal_target(actions: &[NightAction]) -> Option<&PublicKey> {
    actions
        .iter()
        .find(|a| a.kind == NightActionKind::DoctorHeal)
        .map(|a| &a.target)
}

/// Apply pending actions and clear them. The caller records the elimination.
pub fn resolve(game: &mut Game) -> NightOutcome {
    let actions = std::mem::take(&mut game.night_actions);
    let healed = heal_target(&actions);

    let mut outcome = NightOutcome::default();
    if let Some(target) = kill_target(&actions) {
        if healed == Some(&target) {
            outcome.kill_prevented = true;
        } else if let Some(player) = game.players.iter_mut().find(|p| p.address == target) {
            if player.is_alive {
                player.is_alive = false;
                outcome.killed = Some(target);
            }
        }
    }

    for action in actions
        .iter()
        .filter(|a| a.kind == NightActionKind::DetectiveInvestigate)
    {
        // One entry per (detective, target), so the list is bounded by the roster.
        game.investigations
            .retain(|i| i.detective != action.actor || i.target != action.target);
        game.investigations.push(Investigation {
            detective: action.actor.clone(),
            target: action.target.clone(),
            day_count: game.day_count,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use mafia_types::mafia::{Player, Role};

    // Seats: 0 Mafia, 1 Mafia, 2 Detective, 3 Doctor, 4..n Townsperson.
    fn night_game(n: u64) -> (Game, Vec<PublicKey>) {
        let (_, creator) = create_account_keypair(0);
        let mut game = Game::new("night".to_string(), creator, 12, 0, 0);
        let mut keys = Vec::new();
        for seed in 1..=n {
            let (_, public) = create_account_keypair(seed);
            let mut player = Player::new(public.clone(), 0);
            player.role = match seed {
                1 | 2 => Role::Mafia,
                3 => Role::Detective,
                4 => Role::Doctor,
                _ => Role::Townsperson,
            };
            game.players.push(player);
            keys.push(public);
        }
        game.state = GameState::Active;
        game.current_phase = GamePhase::Night;
        game.day_count = 1;
        (game, keys)
    }

    #[test]
    fn rejects_wrong_role() {
        let (mut game, keys) = night_game(8);
        assert_eq!(
            record(&mut game, &keys[4], NightActionKind::MafiaKill, &keys[5], 0),
            Err(GameError::InvalidRole)
        );
        assert_eq!(
            record(&mut game, &keys[0], NightActionKind::DoctorHeal, &keys[0], 0),
            Err(GameError::InvalidRole)
        );
        assert_eq!(
            record(&mut game, &keys[3], NightActionKind::DetectiveInvestigate, &keys[0], 0),
            Err(GameError::InvalidRole)
        );
    }

    #[test]
    fn rejects_outside_night() {
        let (mut game, keys) = night_game(8);
        game.current_phase = GamePhase::Day;
        assert_eq!(
            record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 0),
            Err(GameError::NotNightPhase)
        );
    }

    #[test]
    fn rejects_invalid_targets() {
        let (mut game, keys) = night_game(8);
        assert_eq!(
            record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[1], 0),
            Err(GameError::InvalidTarget)
        );
        assert_eq!(
            record(&mut game, &keys[2], NightActionKind::DetectiveInvestigate, &keys[2], 0),
            Err(GameError::InvalidTarget)
        );
        game.players[5].is_alive = false;
        assert_eq!(
            record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 0),
            Err(GameError::InvalidTarget)
        );
        assert_eq!(
            record(&mut game, &keys[3], NightActionKind::DoctorHeal, &keys[3], 0),
            Ok(())
        );
    }

    #[test]
    fn dead_actor_is_rejected() {
        let (mut game, keys) = night_game(8);
        game.players[0].is_alive = false;
        assert_eq!(
            record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 0),
            Err(GameError::PlayerDead)
        );
    }

    #[test]
    fn resubmission_overwrites() {
        let (mut game, keys) = night_game(8);
        record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 1).unwrap();
        record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[6], 2).unwrap();
        assert_eq!(game.night_actions.len(), 1);
        assert_eq!(game.night_actions[0].target, keys[6]);
    }

    #[test]
    fn heal_negates_kill() {
        let (mut game, keys) = night_game(8);
        record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 0).unwrap();
        record(&mut game, &keys[3], NightActionKind::DoctorHeal, &keys[5], 0).unwrap();
        let outcome = resolve(&mut game);
        assert_eq!(outcome.killed, None);
        assert!(outcome.kill_prevented);
        assert!(game.players[5].is_alive);
        assert!(game.night_actions.is_empty());
    }

    #[test]
    fn unhealed_kill_lands() {
        let (mut game, keys) = night_game(8);
        record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 0).unwrap();
        record(&mut game, &keys[3], NightActionKind::DoctorHeal, &keys[6], 0).unwrap();
        let outcome = resolve(&mut game);
        assert_eq!(outcome.killed, Some(keys[5].clone()));
        assert!(!outcome.kill_prevented);
        assert!(!game.players[5].is_alive);
    }

    #[test]
    fn split_mafia_vote_goes_to_earliest_target() {
        let (mut game, keys) = night_game(8);
        record(&mut game, &keys[1], NightActionKind::MafiaKill, &keys[6], 0).unwrap();
        record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[5], 1).unwrap();
        assert_eq!(kill_target(&game.night_actions), Some(keys[6].clone()));
    }

    #[test]
    fn mafia_plurality_wins() {
        let (mut game, keys) = night_game(12);
        game.players[4].role = Role::Mafia;
        record(&mut game, &keys[0], NightActionKind::MafiaKill, &keys[6], 0).unwrap();
        record(&mut game, &keys[1], NightActionKind::MafiaKill, &keys[7], 1).unwrap();
        record(&mut game, &keys[4], NightActionKind::MafiaKill, &keys[7], 2).unwrap();
        assert_eq!(kill_target(&game.night_actions), Some(keys[7].clone()));
    }

    #[test]
    fn investigation_is_recorded_without_killing() {
        let (mut game, keys) = night_game(8);
        record(&mut game, &keys[2], NightActionKind::DetectiveInvestigate, &keys[0], 0).unwrap();
        let outcome = resolve(&mut game);
        assert_eq!(outcome, NightOutcome::default());
        assert_eq!(game.investigations.len(), 1);
        assert_eq!(game.investigations[0].detective, keys[2]);
        assert_eq!(game.investigations[0].target, keys[0]);
        assert_eq!(game.investigations[0].day_count, 1);
    }

    #[test]
    fn repeat_investigation_refreshes_entry() {
        let (mut game, keys) = night_game(8);
        record(&mut game, &keys[2], NightActionKind::DetectiveInvestigate, &keys[0], 0).unwrap();
        resolve(&mut game);
        game.day_count = 2;
        record(&mut game, &keys[2], NightActionKind::DetectiveInvestigate, &keys[5], 0).unwrap();
        resolve(&mut game);
        game.day_count = 3;
        record(&mut game, &keys[2], NightActionKind::DetectiveInvestigate, &keys[0], 0).unwrap();
        resolve(&mut game);

        assert_eq!(game.investigations.len(), 2);
        assert_eq!(game.investigations[0].target, keys[5]);
        assert_eq!(game.investigations[1].target, keys[0]);
        assert_eq!(game.investigations[1].day_count, 3);
        game.validate_invariants().unwrap();
    }
}
