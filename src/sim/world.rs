/// WorldState: the complete snapshot of a running game.
///
/// ## Scenes
///
/// `Phase` makes the scene explicit: Title is the host shell's start
/// screen, Playing the one live scene, Won and Lost the absorbing ends.
/// Entering Won or Lost clears the live world; nothing transitions back
/// out of them except exit / return-to-title, handled in `main`.
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate:
///   - `camera` — viewport into the world (top-left corner + size)
///   - Renderer maps: `screen(sx, sy) = world(camera.x + sx, camera.y + sy)`
///   - The camera follows the player with a dead-zone margin
///   - Maps smaller than the viewport are centered

use crate::config::{EffectsConfig, SpeedConfig};
use crate::domain::collision::ResponseTable;
use crate::domain::entity::{Coin, Enemy, Particle, Player};
use crate::domain::rules::MapView;
use crate::domain::tile::Tile;
use crate::sim::score::ScoreMeter;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Won,
    Lost,
}

/// Camera: a viewport into the world.
///
/// `(x, y)` is the world coordinate of the top-left visible cell, possibly
/// negative when a small map is centered. `(view_w, view_h)` are set by the
/// renderer from the terminal size.
#[derive(Clone, Debug)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0, y: 0, view_w: 0, view_h: 0 }
    }

    /// Follow a target with a dead-zone: only scroll when the target nears
    /// the viewport edge, clamped to the world bounds.
    pub fn follow(&mut self, target_x: usize, target_y: usize, world_w: usize, world_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        self.x = Self::axis_follow(self.x, target_x, world_w, self.view_w);
        self.y = Self::axis_follow(self.y, target_y, world_h, self.view_h);
    }

    fn axis_follow(cur: i32, target: usize, world: usize, view: usize) -> i32 {
        // Map fits entirely → center it
        if world <= view {
            return -((view as i32 - world as i32) / 2);
        }
        let margin = (view as i32) / 5; // 20% margin each side
        let near = cur + margin;
        let far = cur + view as i32 - margin - 1;
        let t = target as i32;

        let mut next = cur;
        if t < near {
            next = t - margin;
        } else if t > far {
            next = t - view as i32 + margin + 1;
        }
        next.max(0).min((world as i32 - view as i32).max(0))
    }

    /// Snap directly onto a position (no dead zone). Used on level load.
    pub fn center_on(&mut self, target_x: usize, target_y: usize, world_w: usize, world_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        self.x = Self::axis_center(target_x, world_w, self.view_w);
        self.y = Self::axis_center(target_y, world_h, self.view_h);
    }

    fn axis_center(target: usize, world: usize, view: usize) -> i32 {
        if world <= view {
            -((view as i32 - world as i32) / 2)
        } else {
            (target as i32 - view as i32 / 2)
                .max(0)
                .min((world as i32 - view as i32).max(0))
        }
    }

    /// World coordinate → viewport coordinate, None when off-screen.
    pub fn world_to_view(&self, wx: usize, wy: usize) -> Option<(usize, usize)> {
        let vx = wx as i32 - self.x;
        let vy = wy as i32 - self.y;
        if vx >= 0 && vx < self.view_w as i32 && vy >= 0 && vy < self.view_h as i32 {
            Some((vx as usize, vy as usize))
        } else {
            None
        }
    }
}

pub struct WorldState {
    // ── Terrain ──
    pub tiles: Vec<Vec<Tile>>,
    pub width: usize,
    pub height: usize,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub particles: Vec<Particle>,

    // ── Scoring / dispatch ──
    pub meter: ScoreMeter,
    pub responses: ResponseTable,

    // ── Config mirrors ──
    pub speed: SpeedConfig,
    pub effects: EffectsConfig,

    // ── Meta ──
    pub phase: Phase,
    pub level_name: String,
    pub tick: u64,
    pub player_spawn: (usize, usize),

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,

    // ── Camera / Viewport ──
    pub camera: Camera,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState {
            tiles: vec![],
            width: 0,
            height: 0,
            player: Player::new(0, 0),
            enemies: vec![],
            coins: vec![],
            particles: vec![],
            meter: ScoreMeter::new(0),
            responses: ResponseTable::standard(),
            speed: SpeedConfig::default(),
            effects: EffectsConfig::default(),
            phase: Phase::Title,
            level_name: String::new(),
            tick: 0,
            player_spawn: (0, 0),
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            camera: Camera::new(),
        }
    }

    pub fn map_view(&self) -> MapView {
        MapView {
            tiles: &self.tiles,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn terrain_at(&self, x: usize, y: usize) -> Tile {
        if x < self.width && y < self.height {
            self.tiles[y][x]
        } else {
            Tile::Wall // out of bounds = wall
        }
    }

    /// Remove every live entity and flatten the terrain. Both terminal
    /// scene transitions start with this.
    pub fn clear_world(&mut self) {
        self.coins.clear();
        self.enemies.clear();
        self.particles.clear();
        self.player.alive = false;
        for row in &mut self.tiles {
            row.fill(Tile::Empty);
        }
    }

    /// Count of live entities (the player counts while alive).
    #[allow(dead_code)]
    pub fn live_entity_count(&self) -> usize {
        self.coins.len()
            + self.enemies.len()
            + if self.player.alive { 1 } else { 0 }
    }

    /// A sticky message has duration 0 and never times out.
    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
