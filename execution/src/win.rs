use mafia_types::mafia::{Faction, Game};

/// Winner implied by the living roster, if any.
///
/// Town wins once no Mafia remain. Mafia wins at parity (`mafia >= town`). Town is checked first.
pub fn evaluate(game: &Game) -> Option<Faction> {
    let mafia = game.alive_in(Faction::Mafia);
    let town = game.alive_in(Faction::Town);
    if mafia == 0 {
        Some(Faction::Town)
    } else if mafia >= town {
        Some(Faction::Mafia)
    } else {
        None
    }
}
