/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player walk (held input)
///   2. Player jump start + rise (edge input, impulse counter)
///   3. Enemy patrol
///   4. Gravity resolution (player → enemies)
///   5. Collision dispatch via the response table
///
/// Collision responses run synchronously to completion inside the tick, so
/// a picked-up coin is gone before anything else can see it and a terminal
/// transition leaves no live world behind for later phases to touch.

use rand::Rng;

use crate::domain::collision::{EntityKind, Response};
use crate::domain::entity::{ActorState, Facing, FrameInput, MoveDir, Particle};
use crate::domain::rules;
use crate::sim::event::GameEvent;
use crate::sim::world::{Phase, WorldState};

pub const PICKUP_MESSAGE: &str = "Oink! Got a coin!";
pub const WIN_MESSAGE: &str =
    "You grabbed every coin and the tax bear never caught you!";
pub const LOSE_MESSAGE: &str = "The tax bear sank its teeth into you. Game over!";

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, rng: &mut impl Rng) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_player_walk(world, input.movement);
    resolve_player_jump(world, input.jump, &mut events);
    resolve_player_rise(world);
    resolve_enemy_patrol(world);
    resolve_gravity(world, &mut events);
    resolve_collisions(world, rng, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_walk(world: &mut WorldState, movement: Option<MoveDir>) {
    if !world.player.alive {
        return;
    }
    if world.player.move_cooldown > 0 {
        world.player.move_cooldown -= 1;
        return;
    }

    let dir = match movement {
        Some(d) => d,
        None => return,
    };

    let map = world.map_view();
    let p = &world.player;
    let (can_move, dx, facing) = match dir {
        MoveDir::Left => (rules::can_move_left(&map, p.x, p.y), -1i32, Facing::Left),
        MoveDir::Right => (rules::can_move_right(&map, p.x, p.y), 1i32, Facing::Right),
    };

    if can_move {
        world.player.x = (world.player.x as i32 + dx) as usize;
        world.player.facing = facing;
        world.player.move_cooldown = world.speed.player_move_rate;
    }
}

fn resolve_player_jump(world: &mut WorldState, jump: bool, events: &mut Vec<GameEvent>) {
    if !jump || !world.player.alive {
        return;
    }
    if world.player.state == ActorState::Rising {
        return;
    }
    let map = world.map_view();
    if rules::can_jump(&map, world.player.x, world.player.y) {
        world.player.state = ActorState::Rising;
        world.player.rise_remaining = world.speed.jump_height;
        events.push(GameEvent::PlayerJumped);
    }
}

/// Spend one cell of the jump impulse, or hand over to gravity when the
/// impulse is used up or a ceiling is in the way.
fn resolve_player_rise(world: &mut WorldState) {
    if world.player.state != ActorState::Rising {
        return;
    }
    let map = world.map_view();
    if world.player.rise_remaining > 0 && rules::can_rise(&map, world.player.x, world.player.y) {
        world.player.y -= 1;
        world.player.rise_remaining -= 1;
    } else {
        let new_state = rules::resolve_state(&map, world.player.x, world.player.y);
        world.player.rise_remaining = 0;
        world.player.state = new_state;
    }
}

// ══════════════════════════════════════════════════════════════
// Enemy patrol — back-and-forth, turning at walls and ledges
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_patrol(world: &mut WorldState) {
    for i in 0..world.enemies.len() {
        if world.enemies[i].state == ActorState::Falling {
            continue;
        }
        if world.enemies[i].move_cooldown > 0 {
            world.enemies[i].move_cooldown -= 1;
            continue;
        }

        let map = rules::MapView {
            tiles: &world.tiles,
            width: world.width,
            height: world.height,
        };
        let (ex, ey, facing) = {
            let e = &world.enemies[i];
            (e.x, e.y, e.facing)
        };

        if rules::patrol_can_advance(&map, ex, ey, facing) {
            world.enemies[i].x = (ex as i32 + facing.dx()) as usize;
        } else {
            world.enemies[i].facing = facing.flipped();
        }
        world.enemies[i].move_cooldown = world.speed.enemy_move_rate;
    }
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

fn resolve_gravity(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    // ── Player ──
    if world.player.alive && world.player.state != ActorState::Rising {
        let map = world.map_view();
        let px = world.player.x;
        let py = world.player.y;
        if !map.has_support(px, py) {
            if py + 1 < world.height && map.is_passable(px, py + 1) {
                world.player.y += 1;
            }
            if world.player.state != ActorState::Falling {
                world.player.state = ActorState::Falling;
                events.push(GameEvent::PlayerFallStart);
            }
        } else if world.player.state == ActorState::Falling {
            world.player.state = ActorState::OnGround;
            world.player.move_cooldown = 0;
        }
    }

    // ── Enemies ──
    for i in 0..world.enemies.len() {
        let map = rules::MapView {
            tiles: &world.tiles,
            width: world.width,
            height: world.height,
        };
        let (ex, ey) = (world.enemies[i].x, world.enemies[i].y);
        if !map.has_support(ex, ey) {
            if ey + 1 < world.height && map.is_passable(ex, ey + 1) {
                world.enemies[i].y += 1;
            }
            world.enemies[i].state = ActorState::Falling;
        } else if world.enemies[i].state == ActorState::Falling {
            world.enemies[i].state = ActorState::OnGround;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Collision dispatch
// ══════════════════════════════════════════════════════════════

fn resolve_collisions(world: &mut WorldState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    if !world.player.alive {
        return;
    }
    let px = world.player.x;
    let py = world.player.y;

    // Pickup: the coin is removed in the same tick, so it can never
    // answer a second collision.
    if let Some(idx) = world.coins.iter().position(|c| c.x == px && c.y == py) {
        if let Some(Response::CollectCoin) =
            world.responses.response(EntityKind::Player, EntityKind::Coin)
        {
            world.coins.remove(idx);
            events.push(GameEvent::CoinPicked { x: px, y: py });
            world.set_message(PICKUP_MESSAGE, 25);
            if world.meter.increment() {
                events.push(GameEvent::AllCoinsCollected);
                enter_won(world, rng);
            }
        }
    }

    // Enemy contact — skipped when the win transition already cleared
    // the world this tick.
    if world.phase != Phase::Playing {
        return;
    }
    if world.enemies.iter().any(|e| e.x == px && e.y == py) {
        if let Some(Response::DefeatPlayer) =
            world.responses.response(EntityKind::Player, EntityKind::Enemy)
        {
            enter_lost(world, events);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Terminal scene transitions
// ══════════════════════════════════════════════════════════════

/// Win: clear the world, weaken the pull, shower gold particles.
/// Guarded: a no-op unless the game is live.
pub fn enter_won(world: &mut WorldState, rng: &mut impl Rng) {
    if world.phase != Phase::Playing {
        return;
    }
    world.phase = Phase::Won;
    world.clear_world();
    world.set_message(WIN_MESSAGE, 0);
    world.anim_tick = 0;

    for _ in 0..world.effects.particle_count {
        let x = rng.gen_range(0..world.width);
        let y = rng.gen_range(0..world.height);
        world.particles.push(Particle {
            x,
            y,
            fall_cooldown: world.effects.win_fall_period,
        });
    }
}

/// Loss: clear the world, no particles. Guarded like the win.
pub fn enter_lost(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Playing {
        return;
    }
    world.phase = Phase::Lost;
    world.clear_world();
    world.set_message(LOSE_MESSAGE, 0);
    world.anim_tick = 0;
    events.push(GameEvent::PlayerCaught);
}

/// Advance the win-scene shower: particles descend one cell per
/// `win_fall_period` ticks and rest on the bottom row.
pub fn tick_particles(world: &mut WorldState) {
    if world.phase != Phase::Won {
        return;
    }
    let height = world.height;
    let period = world.effects.win_fall_period;
    for p in &mut world.particles {
        if p.y + 1 >= height {
            continue;
        }
        if p.fall_cooldown > 0 {
            p.fall_cooldown -= 1;
            continue;
        }
        p.y += 1;
        p.fall_cooldown = period;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EffectsConfig, GameConfig, GamepadConfig, KeyConfig, ScoringConfig, SpeedConfig};
    use crate::sim::{grid, level};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn test_config() -> GameConfig {
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: 60,
                player_move_rate: 1,
                enemy_move_rate: 4,
                jump_height: 3,
            },
            scoring: ScoringConfig { coin_target: 0 },
            effects: EffectsConfig {
                particle_count: 200,
                win_fall_period: 2,
            },
            keys: KeyConfig {
                left: vec![],
                right: vec![],
                jump: vec![],
                restart: vec![],
            },
            gamepad: GamepadConfig {
                jump: vec![],
                confirm: vec![],
                cancel: vec![],
                restart: vec![],
            },
            level_path: None,
        }
    }

    fn build(rows_src: &[&str], tweak: fn(&mut GameConfig)) -> WorldState {
        let mut config = test_config();
        tweak(&mut config);
        let rows: Vec<String> = rows_src.iter().map(|s| s.to_string()).collect();
        let decoded = grid::decode(&rows).unwrap();
        let mut world = WorldState::new();
        level::build_world(&mut world, "Test Pen", &decoded, &config, &mut seeded_rng());
        world
    }

    fn walk_right() -> FrameInput {
        FrameInput { movement: Some(MoveDir::Right), jump: false }
    }

    // ── Pickup ──

    #[test]
    fn pickup_increments_meter_and_removes_coin() {
        let mut world = build(&["N*", "##"], |c| c.scoring.coin_target = 5);
        let mut rng = seeded_rng();

        let events = step(&mut world, walk_right(), &mut rng);
        assert_eq!(world.player.x, 1);
        assert!(matches!(events[..], [GameEvent::CoinPicked { x: 1, y: 0 }, ..]));
        assert_eq!(world.meter.value(), 1);
        assert!(world.coins.is_empty());
        assert_eq!(world.message, PICKUP_MESSAGE);
    }

    #[test]
    fn destroyed_coin_cannot_fire_twice() {
        let mut world = build(&["N**", "###"], |c| c.scoring.coin_target = 5);
        let mut rng = seeded_rng();

        step(&mut world, walk_right(), &mut rng);
        assert_eq!(world.meter.value(), 1);

        // Stand on the pickup cell for a while — nothing more happens
        for _ in 0..5 {
            let events = step(&mut world, FrameInput::idle(), &mut rng);
            assert!(events.is_empty());
        }
        assert_eq!(world.meter.value(), 1);
    }

    // ── Win ──

    #[test]
    fn last_coin_triggers_the_win_scene() {
        let mut world = build(&["N*", "##"], |c| c.effects.particle_count = 50);
        let mut rng = seeded_rng();

        let events = step(&mut world, walk_right(), &mut rng);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::AllCoinsCollected)));
        assert_eq!(world.phase, Phase::Won);
        assert_eq!(world.live_entity_count(), 0);
        assert_eq!(world.particles.len(), 50);
        assert!(world
            .particles
            .iter()
            .all(|p| p.x < world.width && p.y < world.height));
        assert_eq!(world.message, WIN_MESSAGE);
    }

    #[test]
    fn win_shower_is_deterministic_under_a_seed() {
        let run = || {
            let mut world = build(&["N*", "##"], |c| c.effects.particle_count = 20);
            let mut rng = seeded_rng();
            step(&mut world, walk_right(), &mut rng);
            world
                .particles
                .iter()
                .map(|p| (p.x, p.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn particles_settle_on_the_bottom_row() {
        let mut world = build(&["N*", "##"], |c| {
            c.effects.particle_count = 30;
            c.effects.win_fall_period = 0;
        });
        let mut rng = seeded_rng();
        step(&mut world, walk_right(), &mut rng);
        assert_eq!(world.phase, Phase::Won);

        for _ in 0..10 {
            tick_particles(&mut world);
        }
        assert!(world.particles.iter().all(|p| p.y == world.height - 1));
    }

    #[test]
    fn won_scene_ignores_further_steps() {
        let mut world = build(&["N*", "##"], |_| {});
        let mut rng = seeded_rng();
        step(&mut world, walk_right(), &mut rng);
        assert_eq!(world.phase, Phase::Won);

        let tick_before = world.tick;
        let events = step(&mut world, walk_right(), &mut rng);
        assert!(events.is_empty());
        assert_eq!(world.tick, tick_before);
    }

    // ── Loss ──

    #[test]
    fn enemy_contact_clears_world_and_keeps_score() {
        // Five coins, then the enemy. Target is above the coin count so
        // the run cannot end in a win first.
        let mut world = build(&["N*****X ", "########"], |c| {
            c.scoring.coin_target = 10;
            c.speed.enemy_move_rate = 1000; // hold the enemy still
        });
        let mut rng = seeded_rng();

        let mut caught = false;
        for _ in 0..40 {
            let events = step(&mut world, walk_right(), &mut rng);
            if events.iter().any(|e| matches!(e, GameEvent::PlayerCaught)) {
                caught = true;
                break;
            }
        }
        assert!(caught);
        assert_eq!(world.phase, Phase::Lost);
        assert_eq!(world.live_entity_count(), 0);
        assert!(world.particles.is_empty());
        // The meter keeps its value — there is no reset on defeat
        assert_eq!(world.meter.value(), 5);
        assert_eq!(world.message, LOSE_MESSAGE);
    }

    #[test]
    fn lost_scene_ignores_further_steps() {
        let mut world = build(&["NX", "##"], |c| c.speed.enemy_move_rate = 1000);
        let mut rng = seeded_rng();
        step(&mut world, walk_right(), &mut rng);
        assert_eq!(world.phase, Phase::Lost);

        let events = step(&mut world, walk_right(), &mut rng);
        assert!(events.is_empty());
        assert_eq!(world.phase, Phase::Lost);
    }

    // ── Movement / physics ──

    #[test]
    fn jump_rises_then_lands() {
        let mut world = build(&[
            "    ",
            "    ",
            "    ",
            "    ",
            "N   ",
            "####",
        ], |_| {});
        let mut rng = seeded_rng();
        assert_eq!(world.player.y, 4);

        let events = step(
            &mut world,
            FrameInput { movement: None, jump: true },
            &mut rng,
        );
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerJumped)));
        assert_eq!(world.player.y, 3);
        assert_eq!(world.player.state, ActorState::Rising);

        // Rise the rest of the impulse, then fall back to the floor
        for _ in 0..20 {
            step(&mut world, FrameInput::idle(), &mut rng);
        }
        assert_eq!(world.player.y, 4);
        assert_eq!(world.player.state, ActorState::OnGround);
    }

    #[test]
    fn jump_denied_in_mid_air() {
        let mut world = build(&[
            "N  ",
            "   ",
            "   ",
            "###",
        ], |_| {});
        let mut rng = seeded_rng();

        // First step: gravity kicks in, player starts falling
        let events = step(&mut world, FrameInput::idle(), &mut rng);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerFallStart)));
        assert_eq!(world.player.state, ActorState::Falling);

        // Jump input mid-fall is ignored
        let events = step(
            &mut world,
            FrameInput { movement: None, jump: true },
            &mut rng,
        );
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerJumped)));
    }

    #[test]
    fn walls_block_walking() {
        let mut world = build(&["N# ", "###"], |_| {});
        let mut rng = seeded_rng();
        for _ in 0..4 {
            step(&mut world, walk_right(), &mut rng);
        }
        assert_eq!(world.player.x, 0);
    }

    #[test]
    fn enemy_patrols_back_and_forth() {
        let mut world = build(&[
            "X   ",
            "####",
            "  N ",
            "####",
        ], |c| {
            c.speed.enemy_move_rate = 0; // advance every tick
        });
        let mut rng = seeded_rng();

        // Spawns facing left at the map edge: turns on the first tick,
        // walks to the far edge, turns again and comes back.
        let mut xs = vec![world.enemies[0].x];
        for _ in 0..8 {
            step(&mut world, FrameInput::idle(), &mut rng);
            xs.push(world.enemies[0].x);
        }
        assert!(xs.iter().any(|&x| x >= 2));
        assert!(xs.windows(2).any(|w| w[1] < w[0]));
    }

    #[test]
    fn enemy_falls_to_a_floor() {
        let mut world = build(&[
            "X  N",
            "    ",
            "####",
        ], |c| c.speed.enemy_move_rate = 1000);
        let mut rng = seeded_rng();
        for _ in 0..4 {
            step(&mut world, FrameInput::idle(), &mut rng);
        }
        assert_eq!(world.enemies[0].y, 1);
        assert_eq!(world.enemies[0].state, ActorState::OnGround);
    }
}
