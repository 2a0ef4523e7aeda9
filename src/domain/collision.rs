/// Collision responses, dispatched by entity kind pairs.
///
/// The table is built once at world-build time. Lookups are one-directional:
/// the first element of a rule's pair is the acting entity (the player), the
/// second the passive one, so `(Coin, Player)` deliberately misses.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Player,
    Wall,
    Coin,
    Enemy,
    Particle,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Response {
    /// Pickup: sound, message, meter +1, coin removed synchronously.
    CollectCoin,
    /// Terminal: clear the world and enter the Lost scene.
    DefeatPlayer,
}

#[derive(Clone, Debug)]
pub struct ResponseTable {
    rules: Vec<((EntityKind, EntityKind), Response)>,
}

impl ResponseTable {
    /// The game's two rules, both from the player's perspective.
    pub fn standard() -> Self {
        ResponseTable {
            rules: vec![
                ((EntityKind::Player, EntityKind::Coin), Response::CollectCoin),
                ((EntityKind::Player, EntityKind::Enemy), Response::DefeatPlayer),
            ],
        }
    }

    pub fn response(&self, actor: EntityKind, target: EntityKind) -> Option<Response> {
        self.rules
            .iter()
            .find(|((a, t), _)| *a == actor && *t == target)
            .map(|(_, r)| *r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_coin_collects() {
        let table = ResponseTable::standard();
        assert_eq!(
            table.response(EntityKind::Player, EntityKind::Coin),
            Some(Response::CollectCoin)
        );
    }

    #[test]
    fn player_enemy_defeats() {
        let table = ResponseTable::standard();
        assert_eq!(
            table.response(EntityKind::Player, EntityKind::Enemy),
            Some(Response::DefeatPlayer)
        );
    }

    #[test]
    fn lookup_is_one_directional() {
        let table = ResponseTable::standard();
        assert_eq!(table.response(EntityKind::Coin, EntityKind::Player), None);
        assert_eq!(table.response(EntityKind::Enemy, EntityKind::Player), None);
    }

    #[test]
    fn inert_kinds_have_no_response() {
        let table = ResponseTable::standard();
        assert_eq!(table.response(EntityKind::Player, EntityKind::Wall), None);
        assert_eq!(table.response(EntityKind::Player, EntityKind::Particle), None);
        assert_eq!(table.response(EntityKind::Enemy, EntityKind::Coin), None);
    }
}
