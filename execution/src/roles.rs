//! Role assignment at game start.
//!
//! Roles are dealt from a fixed multiset and then shuffled with a hash-chain RNG seeded from
//! the block's ledger entropy, the game identifier, and the roster in join order:
//! ```text
//! root     = sha256(entropy || game_id || roster[0] || .. || roster[n-1] || "mafia-roles")
//! block[i] = sha256(root || i)
//! ```
//! No input is chosen by a single client, and every node can recompute the deal from
//! on-ledger data.

use commonware_cryptography::{sha256::Sha256, Hasher};
use mafia_types::{
    mafia::{Game, RulesConfig, Role, PLAYERS_PER_MAFIA, ROLE_ENTROPY_DOMAIN},
    Seed,
};

/// `max(1, floor(players / 4))`.
pub fn mafia_count(players: usize) -> usize {
    (players / PLAYERS_PER_MAFIA).max(1)
}

/// Unshuffled roles for a roster of `players` seats.
pub fn deal(players: usize, special_roles: bool) -> Vec<Role> {
    let mafia = mafia_count(players).min(players);
    let town = players - mafia;
    let mut roles = vec![Role::Mafia; mafia];
    if special_roles && town >= 2 {
        roles.push(Role::Detective);
        roles.push(Role::Doctor);
        roles.extend(std::iter::repeat(Role::Townsperson).take(town - 2));
    } else {
        roles.extend(std::iter::repeat(Role::Townsperson).take(town));
    }
    roles
}

/// Deterministic SHA-256 hash-chain RNG.
pub struct RoleRng {
    root: [u8; 32],
    counter: u64,
    buffer: [u8; 32],
    offset: usize,
}

impl RoleRng {
    pub fn new(seed: &Seed, game: &Game) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.entropy.as_ref());
        hasher.update(game.game_id.as_bytes());
        for player in &game.players {
            hasher.update(player.address.as_ref());
        }
        hasher.update(ROLE_ENTROPY_DOMAIN);
        Self::from_root(hasher.finalize().0)
    }

    pub fn from_root(root: [u8; 32]) -> Self {
        Self {
            root,
            counter: 0,
            buffer: [0u8; 32],
            offset: 32,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(&self.root);
        hasher.update(&self.counter.to_be_bytes());
        self.buffer = hasher.finalize().0;
        self.counter += 1;
        self.offset = 0;
    }

    pub fn next_u64(&mut self) -> u64 {
        if self.offset + 8 > self.buffer.len() {
            self.refill();
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buffer[self.offset..self.offset + 8]);
        self.offset += 8;
        u64::from_be_bytes(bytes)
    }

    /// Uniform value in `[0, bound)`. `bound` must be non-zero.
    pub fn below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        // Reject the tail that would bias the modulo.
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let value = self.next_u64();
            if value < zone {
                return value % bound;
            }
        }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}

/// Assign a role to every player in the roster. Returns the number of Mafia dealt.
pub fn assign(game: &mut Game, seed: &Seed, rules: &RulesConfig) -> usize {
    let mut roles = deal(game.players.len(), rules.special_roles);
    let mut rng = RoleRng::new(seed, game);
    rng.shuffle(&mut roles);
    for (player, role) in game.players.iter_mut().zip(roles) {
        player.role = role;
    }
    game.mafia_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_account_keypair, create_seed};
    use mafia_types::mafia::Player;
    use proptest::prelude::*;

    fn roster(n: usize) -> Game {
        let (_, creator) = create_account_keypair(0);
        let mut game = Game::new("deal".to_string(), creator, 64, 0, 0);
        for i in 0..n {
            let (_, public) = create_account_keypair(i as u64 + 1);
            game.players.push(Player::new(public, 0));
        }
        game
    }

    #[test]
    fn mafia_count_follows_quarter_rule() {
        assert_eq!(mafia_count(4), 1);
        assert_eq!(mafia_count(7), 1);
        assert_eq!(mafia_count(8), 2);
        assert_eq!(mafia_count(12), 3);
        assert_eq!(mafia_count(20), 5);
    }

    #[test]
    fn deal_includes_specials_when_enabled() {
        let roles = deal(5, true);
        assert_eq!(roles.iter().filter(|r| **r == Role::Mafia).count(), 1);
        assert_eq!(roles.iter().filter(|r| **r == Role::Detective).count(), 1);
        assert_eq!(roles.iter().filter(|r| **r == Role::Doctor).count(), 1);
        assert_eq!(roles.iter().filter(|r| **r == Role::Townsperson).count(), 2);

        let plain = deal(5, false);
        assert_eq!(plain.iter().filter(|r| **r == Role::Townsperson).count(), 4);
    }

    #[test]
    fn assignment_is_reproducible() {
        let seed = create_seed(9);
        let rules = RulesConfig::default();

        let mut a = roster(8);
        let mut b = roster(8);
        assign(&mut a, &seed, &rules);
        assign(&mut b, &seed, &rules);
        assert_eq!(a, b);
    }

    #[test]
    fn assignment_depends_on_entropy() {
        let rules = RulesConfig::default();
        let deals: Vec<Vec<Role>> = (1..=16)
            .map(|view| {
                let mut game = roster(12);
                assign(&mut game, &create_seed(view), &rules);
                game.players.iter().map(|p| p.role).collect()
            })
            .collect();
        assert!(deals.iter().any(|d| d != &deals[0]));
    }

    #[test]
    fn plain_rules_deal_only_mafia_and_townspeople() {
        let rules: RulesConfig =
            serde_json::from_value(serde_json::json!({ "special_roles": false })).unwrap();
        assert_eq!(rules.min_players, 4);

        let mut game = roster(9);
        assert_eq!(assign(&mut game, &create_seed(3), &rules), 2);
        assert!(game
            .players
            .iter()
            .all(|p| matches!(p.role, Role::Mafia | Role::Townsperson)));
    }

    #[test]
    fn below_stays_in_range() {
        let mut rng = RoleRng::from_root([7u8; 32]);
        for bound in 1..50u64 {
            for _ in 0..20 {
                assert!(rng.below(bound) < bound);
            }
        }
    }

    proptest! {
        #[test]
        fn assignment_partitions_roster(n in 4usize..=20, view in any::<u64>(), special in any::<bool>()) {
            let mut game = roster(n);
            let rules = RulesConfig { special_roles: special, ..RulesConfig::default() };
            let mafia = assign(&mut game, &create_seed(view), &rules);

            prop_assert_eq!(mafia, mafia_count(n));
            prop_assert!(game.players.iter().all(|p| p.role != Role::Unassigned));
            let detectives = game.players.iter().filter(|p| p.role == Role::Detective).count();
            let doctors = game.players.iter().filter(|p| p.role == Role::Doctor).count();
            let expected_specials = usize::from(special);
            prop_assert_eq!(detectives, expected_specials);
            prop_assert_eq!(doctors, expected_specials);
        }
    }
}
