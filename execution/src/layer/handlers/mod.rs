use super::*;

fn game_error(player: &PublicKey, game_id: &str, error: GameError) -> Event {
    // Oversized ids are not echoed so the event stays decodable.
    let game_id = if game_id.len() > MAX_GAME_ID_LENGTH {
        String::new()
    } else {
        game_id.to_string()
    };
    Event::GameError {
        player: player.clone(),
        game_id,
        error_code: error.code(),
        message: error.to_string(),
    }
}

fn game_error_vec(player: &PublicKey, game_id: &str, error: GameError) -> Vec<Event> {
    debug!(
        player = ?player,
        game_id,
        error = error.name(),
        "instruction rejected"
    );
    vec![game_error(player, game_id, error)]
}

mod game;
