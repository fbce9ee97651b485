//! Character assignment at game start.

use rand::{Rng, seq::SliceRandom};

use super::{entity::Player, value_object::CharacterId};

/// Give each non-host player a character, in membership order.
///
/// The roster is shuffled (Fisher-Yates) first. An empty roster skips
/// assignment; surplus players are left without a character.
pub fn assign_characters<R: Rng + ?Sized>(
    players: &mut [Player],
    characters: &[CharacterId],
    rng: &mut R,
) {
    if characters.is_empty() {
        tracing::debug!("Script declares no characters, skipping assignment");
        return;
    }

    let mut shuffled = characters.to_vec();
    shuffled.shuffle(rng);

    let guests = players.iter_mut().filter(|p| !p.is_host);
    for (player, character) in guests.zip(shuffled) {
        player.character_id = Some(character);
    }
}
