/// Movement, jump and patrol rules — truth-table driven.
///
/// Pure functions over an immutable map view, no side effects. They encode
/// "what is legal" without performing the action; `sim::step` applies them.
///
/// ### Horizontal (Left / Right)
/// ┌──────────────────────┬───────┐
/// │ Condition             │ Allow?│
/// ├──────────────────────┼───────┤
/// │ Dest out of bounds    │ DENY  │
/// │ Dest tile solid       │ DENY  │
/// │ Otherwise             │ ALLOW │
/// └──────────────────────┴───────┘
/// Horizontal input is honored in the air too (walls still block).
///
/// ### Jump
/// ┌──────────────────────┬───────┐
/// │ Condition             │ Allow?│
/// ├──────────────────────┼───────┤
/// │ No support at (x, y)  │ DENY  │
/// │ Otherwise             │ ALLOW │
/// └──────────────────────┴───────┘
///
/// ### Support (who stands, who falls)
/// ┌──────────────────────────────┬──────────┐
/// │ Condition                     │ Support? │
/// ├──────────────────────────────┼──────────┤
/// │ y+1 >= height (bottom edge)   │ YES      │
/// │ below is solid                │ YES      │
/// │ Otherwise                     │ NO → Fall│
/// └──────────────────────────────┴──────────┘
///
/// ### Patrol advance (enemy back-and-forth)
/// ┌──────────────────────────────┬──────────┐
/// │ Condition                     │ Advance? │
/// ├──────────────────────────────┼──────────┤
/// │ Ahead out of bounds           │ NO → turn│
/// │ Ahead tile solid              │ NO → turn│
/// │ Ahead cell has no support     │ NO → turn│
/// │ Otherwise                     │ YES      │
/// └──────────────────────────────┴──────────┘

use super::entity::{ActorState, Facing};
use super::tile::Tile;

/// Immutable view of the tile map for rule queries.
pub struct MapView<'a> {
    pub tiles: &'a Vec<Vec<Tile>>,
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        if x >= self.width || y >= self.height {
            return Tile::Wall; // out of bounds = wall
        }
        self.tiles[y][x]
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.tile_at(x, y).is_passable()
    }

    /// Does the terrain hold an entity at (x, y)? See truth table above.
    pub fn has_support(&self, x: usize, y: usize) -> bool {
        if y + 1 >= self.height {
            return true;
        }
        self.tile_at(x, y + 1).is_solid()
    }
}

// ── State resolution ──

/// Actor state from position alone. Rising is counter-driven and decided
/// by the caller; this resolves the ground/air split.
pub fn resolve_state(map: &MapView, x: usize, y: usize) -> ActorState {
    if map.has_support(x, y) {
        ActorState::OnGround
    } else {
        ActorState::Falling
    }
}

// ── Movement rules ──

pub fn can_move_left(map: &MapView, x: usize, y: usize) -> bool {
    if x == 0 {
        return false;
    }
    map.is_passable(x - 1, y)
}

pub fn can_move_right(map: &MapView, x: usize, y: usize) -> bool {
    if x + 1 >= map.width {
        return false;
    }
    map.is_passable(x + 1, y)
}

/// Jump is only legal with support underfoot.
pub fn can_jump(map: &MapView, x: usize, y: usize) -> bool {
    map.has_support(x, y)
}

/// Can a rising entity continue upward into (x, y-1)?
pub fn can_rise(map: &MapView, x: usize, y: usize) -> bool {
    if y == 0 {
        return false;
    }
    map.is_passable(x, y - 1)
}

// ── Patrol rules ──

/// Can a patrolling enemy at (x, y) advance one cell toward `facing`?
/// Denied at walls, map edges, and ledge edges — the enemy turns instead.
pub fn patrol_can_advance(map: &MapView, x: usize, y: usize, facing: Facing) -> bool {
    let ax = match facing {
        Facing::Left => {
            if x == 0 {
                return false;
            }
            x - 1
        }
        Facing::Right => {
            if x + 1 >= map.width {
                return false;
            }
            x + 1
        }
    };
    if !map.is_passable(ax, y) {
        return false;
    }
    map.has_support(ax, y)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    /// Helper: build tiles from a string diagram. '#' = Wall, other = Empty.
    fn map_from(rows: &[&str]) -> (Vec<Vec<Tile>>, usize, usize) {
        let height = rows.len();
        let width = rows[0].len();
        let mut tiles = vec![vec![Tile::Empty; width]; height];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    tiles[y][x] = Tile::Wall;
                }
            }
        }
        (tiles, width, height)
    }

    fn mv(tiles: &Vec<Vec<Tile>>, w: usize, h: usize) -> MapView {
        MapView { tiles, width: w, height: h }
    }

    // ── Horizontal movement ──

    #[test]
    fn horizontal_on_ground() {
        let (t, w, h) = map_from(&[
            "     ",
            "#####",
        ]);
        let m = mv(&t, w, h);
        assert!(can_move_left(&m, 2, 0));
        assert!(can_move_right(&m, 2, 0));
    }

    #[test]
    fn horizontal_blocked_by_wall() {
        let (t, w, h) = map_from(&[
            " # # ",
            "#####",
        ]);
        let m = mv(&t, w, h);
        assert!(!can_move_right(&m, 0, 0)); // wall at (1,0)
        assert!(!can_move_left(&m, 2, 0));  // wall at (1,0)
    }

    #[test]
    fn horizontal_at_map_edge() {
        let (t, w, h) = map_from(&[
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(!can_move_left(&m, 0, 0));
        assert!(!can_move_right(&m, 2, 0));
    }

    #[test]
    fn horizontal_allowed_in_air() {
        let (t, w, h) = map_from(&[
            "   ",
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        // Mid-air steering is allowed; only walls block.
        assert!(can_move_left(&m, 1, 0));
        assert!(can_move_right(&m, 1, 0));
    }

    // ── Jump / rise ──

    #[test]
    fn jump_from_support() {
        let (t, w, h) = map_from(&[
            "   ",
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(can_jump(&m, 1, 1));
    }

    #[test]
    fn jump_denied_in_air() {
        let (t, w, h) = map_from(&[
            "   ",
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(!can_jump(&m, 1, 0));
    }

    #[test]
    fn rise_blocked_by_ceiling() {
        let (t, w, h) = map_from(&[
            " # ",
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(!can_rise(&m, 1, 1));
        assert!(can_rise(&m, 0, 1));
    }

    #[test]
    fn rise_blocked_at_top_edge() {
        let (t, w, h) = map_from(&[
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(!can_rise(&m, 1, 0));
    }

    // ── Support / falling ──

    #[test]
    fn support_on_solid() {
        let (t, w, h) = map_from(&[
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(m.has_support(1, 0));
        assert_eq!(resolve_state(&m, 1, 0), ActorState::OnGround);
    }

    #[test]
    fn no_support_in_air() {
        let (t, w, h) = map_from(&[
            "   ",
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(!m.has_support(1, 0));
        assert_eq!(resolve_state(&m, 1, 0), ActorState::Falling);
    }

    #[test]
    fn support_at_bottom_edge() {
        let (t, w, h) = map_from(&[
            "   ",
            "   ",
        ]);
        let m = mv(&t, w, h);
        assert!(m.has_support(1, 1));
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let (t, w, h) = map_from(&[
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert_eq!(m.tile_at(99, 0), Tile::Wall);
        assert_eq!(m.tile_at(0, 99), Tile::Wall);
    }

    // ── Patrol ──

    #[test]
    fn patrol_advances_on_platform() {
        let (t, w, h) = map_from(&[
            "     ",
            "#####",
        ]);
        let m = mv(&t, w, h);
        assert!(patrol_can_advance(&m, 2, 0, Facing::Left));
        assert!(patrol_can_advance(&m, 2, 0, Facing::Right));
    }

    #[test]
    fn patrol_turns_at_wall() {
        let (t, w, h) = map_from(&[
            "  # ",
            "####",
        ]);
        let m = mv(&t, w, h);
        assert!(!patrol_can_advance(&m, 1, 0, Facing::Right));
        assert!(patrol_can_advance(&m, 1, 0, Facing::Left));
    }

    #[test]
    fn patrol_turns_at_ledge() {
        let (t, w, h) = map_from(&[
            "    ",
            "##  ",
            "    ",
        ]);
        let m = mv(&t, w, h);
        // (2,0) is open but has no floor below — do not walk off
        assert!(!patrol_can_advance(&m, 1, 0, Facing::Right));
    }

    #[test]
    fn patrol_turns_at_map_edge() {
        let (t, w, h) = map_from(&[
            "   ",
            "###",
        ]);
        let m = mv(&t, w, h);
        assert!(!patrol_can_advance(&m, 0, 0, Facing::Left));
        assert!(!patrol_can_advance(&m, 2, 0, Facing::Right));
    }

    #[test]
    fn patrol_walks_along_bottom_edge() {
        let (t, w, h) = map_from(&[
            "   ",
            "   ",
        ]);
        let m = mv(&t, w, h);
        // Bottom row counts as supported everywhere
        assert!(patrol_can_advance(&m, 1, 1, Facing::Right));
    }
}
