use super::super::*;
use super::game_error_vec;

impl<'a, S: State> Layer<'a, S> {
    async fn game_or_error(
        &self,
        public: &PublicKey,
        game_id: &str,
    ) -> anyhow::Result<Result<Game, Vec<Event>>> {
        Ok(match self.get(&Key::game(game_id)).await? {
            Some(Value::Game(game)) => Ok(game),
            _ => Err(game_error_vec(public, game_id, GameError::GameNotFound)),
        })
    }

    fn store_game(&mut self, game: Game) {
        debug_assert!(
            game.validate_invariants().is_ok(),
            "game invariants violated"
        );
        self.insert(Key::game(&game.game_id), Value::Game(game));
    }

    pub(in crate::layer) async fn handle_initialize_game(
        &mut self,
        public: &PublicKey,
        game_id: &str,
        max_players: u8,
        entry_fee: u64,
    ) -> anyhow::Result<Vec<Event>> {
        if game_id.is_empty() || game_id.len() > MAX_GAME_ID_LENGTH {
            return Ok(game_error_vec(public, game_id, GameError::InvalidGameId));
        }
        if !self.rules.allows_max_players(max_players) {
            return Ok(game_error_vec(public, game_id, GameError::InvalidMaxPlayers));
        }
        if !escrow::fits_full_table(entry_fee, max_players) {
            return Ok(game_error_vec(public, game_id, GameError::EscrowOverflow));
        }
        if self.get(&Key::game(game_id)).await?.is_some() {
            return Ok(game_error_vec(public, game_id, GameError::GameAlreadyExists));
        }

        let game = Game::new(
            game_id.to_string(),
            public.clone(),
            max_players,
            entry_fee,
            self.now(),
        );
        self.store_game(game);

        info!(game_id, creator = ?public, max_players, entry_fee, "game created");
        Ok(vec![Event::GameCreated {
            game_id: game_id.to_string(),
            creator: public.clone(),
            max_players,
            entry_fee,
        }])
    }

    /// Checks run in order: game exists, joinable, already joined, full, funds, pot.
    pub(in crate::layer) async fn handle_join_game(
        &mut self,
        public: &PublicKey,
        game_id: &str,
    ) -> anyhow::Result<Vec<Event>> {
        let mut game = match self.game_or_error(public, game_id).await? {
            Ok(game) => game,
            Err(events) => return Ok(events),
        };

        if game.state != GameState::WaitingForPlayers {
            return Ok(game_error_vec(public, game_id, GameError::GameNotJoinable));
        }
        if game.player_index(public).is_some() {
            return Ok(game_error_vec(public, game_id, GameError::AlreadyJoined));
        }
        if game.is_full() {
            return Ok(game_error_vec(public, game_id, GameError::GameFull));
        }

        let fee = game.entry_fee;
        let mut account = load_account(self, public).await?;
        if account.balance < fee {
            return Ok(game_error_vec(
                public,
                game_id,
                GameError::InsufficientFunds,
            ));
        }
        let pot = match escrow::deposit(&mut game, fee) {
            Ok(pot) => pot,
            Err(error) => return Ok(game_error_vec(public, game_id, error)),
        };
        account.balance -= fee;
        self.insert(Key::Account(public.clone()), Value::Account(account));

        game.players.push(Player::new(public.clone(), self.now()));
        let player_count = game.players.len() as u32;
        self.store_game(game);

        info!(game_id, player = ?public, player_count, pot, "player joined");
        Ok(vec![Event::PlayerJoined {
            game_id: game_id.to_string(),
            player: public.clone(),
            player_count,
            pot,
        }])
    }

    pub(in crate::layer) async fn handle_start_game(
        &mut self,
        public: &PublicKey,
        game_id: &str,
    ) -> anyhow::Result<Vec<Event>> {
        let mut game = match self.game_or_error(public, game_id).await? {
            Ok(game) => game,
            Err(events) => return Ok(events),
        };
        if &game.creator != public {
            return Ok(game_error_vec(public, game_id, GameError::NotCreator));
        }

        let now = self.now();
        match phase::start(&mut game, &self.seed, &self.rules, now) {
            Ok(events) => {
                self.store_game(game);
                Ok(events)
            }
            Err(error) => Ok(game_error_vec(public, game_id, error)),
        }
    }

    pub(in crate::layer) async fn handle_cast_vote(
        &mut self,
        public: &PublicKey,
        game_id: &str,
        target: &PublicKey,
    ) -> anyhow::Result<Vec<Event>> {
        let mut game = match self.game_or_error(public, game_id).await? {
            Ok(game) => game,
            Err(events) => return Ok(events),
        };

        let total_votes = match voting::cast(&mut game, public, target, self.now()) {
            Ok(total) => total,
            Err(error) => return Ok(game_error_vec(public, game_id, error)),
        };
        self.store_game(game);

        Ok(vec![Event::VoteCast {
            game_id: game_id.to_string(),
            voter: public.clone(),
            target: target.clone(),
            total_votes,
        }])
    }

    pub(in crate::layer) async fn handle_advance_phase(
        &mut self,
        public: &PublicKey,
        game_id: &str,
    ) -> anyhow::Result<Vec<Event>> {
        let mut game = match self.game_or_error(public, game_id).await? {
            Ok(game) => game,
            Err(events) => return Ok(events),
        };
        if &game.creator != public {
            return Ok(game_error_vec(public, game_id, GameError::NotCreator));
        }

        match phase::advance(&mut game, self.now()) {
            Ok(events) => {
                self.store_game(game);
                Ok(events)
            }
            Err(error) => Ok(game_error_vec(public, game_id, error)),
        }
    }

    pub(in crate::layer) async fn handle_night_action(
        &mut self,
        public: &PublicKey,
        game_id: &str,
        action: NightActionKind,
        target: &PublicKey,
    ) -> anyhow::Result<Vec<Event>> {
        let mut game = match self.game_or_error(public, game_id).await? {
            Ok(game) => game,
            Err(events) => return Ok(events),
        };

        if let Err(error) = night::record(&mut game, public, action, target, self.now()) {
            return Ok(game_error_vec(public, game_id, error));
        }
        self.store_game(game);

        Ok(vec![Event::NightActionRecorded {
            game_id: game_id.to_string(),
            actor: public.clone(),
            action,
        }])
    }

    pub(in crate::layer) async fn handle_claim_winnings(
        &mut self,
        public: &PublicKey,
        game_id: &str,
    ) -> anyhow::Result<Vec<Event>> {
        let mut game = match self.game_or_error(public, game_id).await? {
            Ok(game) => game,
            Err(events) => return Ok(events),
        };

        let amount = match escrow::claim(&mut game, public) {
            Ok(amount) => amount,
            Err(error) => return Ok(game_error_vec(public, game_id, error)),
        };

        let mut account = load_account(self, public).await?;
        account.balance = match account.balance.checked_add(amount) {
            Some(balance) => balance,
            None => return Ok(game_error_vec(public, game_id, GameError::EscrowOverflow)),
        };
        self.insert(Key::Account(public.clone()), Value::Account(account));
        self.store_game(game);

        info!(game_id, claimer = ?public, amount, "winnings claimed");
        Ok(vec![Event::WinningsClaimed {
            game_id: game_id.to_string(),
            claimer: public.clone(),
            amount,
        }])
    }
}
