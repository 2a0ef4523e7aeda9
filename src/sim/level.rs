/// Level sources and the entity factory.
///
/// ## Sources (priority order):
///   1. Level file named in `config.toml` (`[general] level = "..."`)
///   2. Built-in embedded level
///
/// ## Single-level format (`.txt`):
///   Line 1 (optional): `# Level Name`
///   Lines: map rows in the grid alphabet (see `sim::grid`)
///
/// Any read or decode failure is fatal to startup — a bad level is a
/// configuration error, not something to limp past.
///
/// ## The factory
///
/// `build_world` walks the decoded placements and runs one spawn recipe
/// per symbol. Every spawned entity lands in the live world immediately;
/// the player is additionally remembered for camera follow and respawn.

use rand::Rng;
use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::collision::ResponseTable;
use crate::domain::entity::{Coin, Enemy, Player, ENEMY_SKIN_COUNT};
use crate::domain::tile::Tile;
use crate::sim::grid::{DecodedGrid, Symbol};
use crate::sim::score::ScoreMeter;
use crate::sim::world::{Phase, WorldState};

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("level file {path} has no map rows")]
    Empty { path: String },
}

// ══════════════════════════════════════════════════════════════
// Loading
// ══════════════════════════════════════════════════════════════

/// Resolve the level source: configured file if any, built-in otherwise.
pub fn load_level_def(config: &GameConfig) -> Result<LevelDef, LevelError> {
    match &config.level_path {
        Some(path) => {
            let display = path.display().to_string();
            let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
                path: display.clone(),
                source,
            })?;
            parse_level_file(&content, &display)
        }
        None => Ok(embedded_level()),
    }
}

/// Parse a single level from text content.
/// The title line starts with `# ` and contains a letter, which keeps it
/// distinct from wall rows made of `#` runs.
fn parse_level_file(content: &str, path: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows: Vec<String> = vec![];

    for line in content.lines() {
        if name.is_empty() && rows.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return Err(LevelError::Empty { path: path.to_string() });
    }

    if name.is_empty() {
        name = "Unnamed Meadow".to_string();
    }

    Ok(LevelDef { name, rows })
}

/// A name line is `# ` followed by something alphabetic; a wall row that
/// happens to start with '#' has only tile characters after it.
fn is_name_line(line: &str) -> bool {
    line.starts_with("# ") && line[1..].chars().any(|c| c.is_alphabetic())
}

// ══════════════════════════════════════════════════════════════
// Entity factory
// ══════════════════════════════════════════════════════════════

/// Build the live world from a decoded grid. Preserves nothing from the
/// previous run; restart is just another call with the same grid.
pub fn build_world(
    world: &mut WorldState,
    name: &str,
    grid: &DecodedGrid,
    config: &GameConfig,
    rng: &mut impl Rng,
) {
    world.speed = config.speed.clone();
    world.effects = config.effects.clone();
    world.width = grid.width;
    world.height = grid.height;
    world.tiles = vec![vec![Tile::Empty; grid.width]; grid.height];
    world.coins.clear();
    world.enemies.clear();
    world.particles.clear();
    world.level_name = name.to_string();
    world.tick = 0;
    world.anim_tick = 0;

    for p in &grid.placements {
        match p.symbol {
            Symbol::Wall => spawn_wall(world, p.x, p.y),
            Symbol::Coin => spawn_coin(world, p.x, p.y),
            Symbol::Enemy => spawn_enemy(world, p.x, p.y, rng),
            Symbol::Player => spawn_player(world, p.x, p.y),
        }
    }
    world.player_spawn = grid.player_spawn;

    let target = if config.scoring.coin_target > 0 {
        config.scoring.coin_target
    } else {
        world.coins.len() as u32
    };
    world.meter = ScoreMeter::new(target);
    world.responses = ResponseTable::standard();

    world.phase = Phase::Playing;
    world.set_message(name, 50);
    world.camera.center_on(
        world.player_spawn.0,
        world.player_spawn.1,
        world.width,
        world.height,
    );
}

// ── The four spawn recipes ──

fn spawn_wall(world: &mut WorldState, x: usize, y: usize) {
    world.tiles[y][x] = Tile::Wall;
}

fn spawn_coin(world: &mut WorldState, x: usize, y: usize) {
    world.coins.push(Coin { x, y });
}

/// Enemies get a skin drawn uniformly at random at spawn time. The RNG is
/// injected so tests can pin the outcome.
fn spawn_enemy(world: &mut WorldState, x: usize, y: usize, rng: &mut impl Rng) {
    let mut enemy = Enemy::new(x, y, rng.gen_range(0..ENEMY_SKIN_COUNT));
    enemy.move_cooldown = world.speed.enemy_move_rate;
    world.enemies.push(enemy);
}

fn spawn_player(world: &mut WorldState, x: usize, y: usize) {
    world.player = Player::new(x, y);
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

pub fn embedded_level() -> LevelDef {
    LevelDef {
        name: "Penny Meadow".to_string(),
        rows: [
            "       X  *                 ",
            "       #####                ",
            "                            ",
            " **     *        *    X    ",
            " ###   ###      ###  ###    ",
            "                            ",
            "   X        *       *       ",
            "  ####     ###     ###      ",
            "                            ",
            "      *        X *          ",
            "     ###      #####         ",
            "                            ",
            "  N                  *      ",
            "############################",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn parses_title_line() {
        let def = parse_level_file("# Coin Cave\nN *\n####\n", "t.txt").unwrap();
        assert_eq!(def.name, "Coin Cave");
        assert_eq!(def.rows, vec!["N *", "####"]);
    }

    #[test]
    fn wall_row_is_not_a_title() {
        let def = parse_level_file("####\nN *\n", "t.txt").unwrap();
        assert_eq!(def.name, "Unnamed Meadow");
        assert_eq!(def.rows.len(), 2);
    }

    #[test]
    fn empty_file_is_an_error() {
        let err = parse_level_file("# Just A Title\n\n\n", "t.txt").unwrap_err();
        assert!(matches!(err, LevelError::Empty { .. }));
    }

    #[test]
    fn embedded_level_decodes() {
        let def = embedded_level();
        let grid = grid::decode(&def.rows).unwrap();
        let coins = grid
            .placements
            .iter()
            .filter(|p| p.symbol == grid::Symbol::Coin)
            .count();
        assert_eq!(coins, 10);
        assert_eq!(grid.player_spawn, (2, 12));
    }

    #[test]
    fn factory_builds_all_four_kinds() {
        let config = test_config();
        let decoded = grid::decode(&rows(&[
            "N * X",
            "#####",
        ]))
        .unwrap();
        let mut world = WorldState::new();
        build_world(&mut world, "Test Pen", &decoded, &config, &mut seeded_rng());

        assert_eq!(world.coins.len(), 1);
        assert_eq!(world.enemies.len(), 1);
        assert!(world.enemies[0].skin < ENEMY_SKIN_COUNT);
        assert_eq!((world.player.x, world.player.y), (0, 0));
        assert_eq!(world.terrain_at(0, 1), Tile::Wall);
        assert_eq!(world.phase, Phase::Playing);
        // Target defaults to the coin count
        assert_eq!(world.meter.max(), 1);
    }

    #[test]
    fn coin_target_override_wins() {
        let mut config = test_config();
        config.scoring.coin_target = 7;
        let decoded = grid::decode(&rows(&["N * * *"])).unwrap();
        let mut world = WorldState::new();
        build_world(&mut world, "Test Pen", &decoded, &config, &mut seeded_rng());
        assert_eq!(world.meter.max(), 7);
    }

    fn rows(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    fn test_config() -> GameConfig {
        GameConfig {
            speed: Default::default(),
            scoring: crate::config::ScoringConfig { coin_target: 0 },
            effects: Default::default(),
            keys: crate::config::KeyConfig {
                left: vec![],
                right: vec![],
                jump: vec![],
                restart: vec![],
            },
            gamepad: crate::config::GamepadConfig {
                jump: vec![],
                confirm: vec![],
                cancel: vec![],
                restart: vec![],
            },
            level_path: None,
        }
    }
}
