/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// One game cell spans two terminal columns, which keeps the level close
/// to square on common fonts. Scene backgrounds are vertical RGB
/// gradients; particles draw after the map so the win shower sits on top
/// of everything.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Facing;
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 24, g: 22, b: 30 };

const SKY_TOP: (u8, u8, u8) = (252, 248, 200); // light yellow
const SKY_BOTTOM: (u8, u8, u8) = (20, 60, 130); // dark azure
const WIN_TOP: (u8, u8, u8) = (250, 250, 250); // white
const WIN_BOTTOM: (u8, u8, u8) = (212, 170, 20); // gold
const LOST_TOP: (u8, u8, u8) = (10, 8, 10); // black
const LOST_BOTTOM: (u8, u8, u8) = (125, 15, 25); // blood red

const WALL_BG: Color = Color::Rgb { r: 46, g: 139, b: 87 }; // sea green
const COIN_FG: Color = Color::Rgb { r: 200, g: 150, b: 10 };
const PLAYER_FG: Color = Color::Rgb { r: 225, g: 110, b: 140 }; // pig pink
const ENEMY_FG: [Color; 3] = [
    Color::Rgb { r: 139, g: 90, b: 43 },
    Color::Rgb { r: 160, g: 60, b: 60 },
    Color::Rgb { r: 110, g: 110, b: 130 },
];
const PARTICLE_FG: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PANEL_BG: Color = Color::Rgb { r: 25, g: 25, b: 112 }; // midnight blue

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell so every position gets diffed.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    fn put_str_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Gradient helper ──

fn gradient(top: (u8, u8, u8), bottom: (u8, u8, u8), frac: f32) -> Color {
    let f = frac.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f) as u8;
    Color::Rgb {
        r: lerp(top.0, bottom.0),
        g: lerp(top.1, bottom.1),
        b: lerp(top.2, bottom.2),
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force a full repaint on the first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        // Update camera viewport from terminal size
        let reserved_rows = MAP_ROW + 3; // HUD + gap + message + help
        world.camera.view_w = self.term_w / CELL_W;
        let max_view_h = self.term_h.saturating_sub(reserved_rows).max(1);
        if world.width > 0 {
            world.camera.view_w = world.camera.view_w.min(world.width);
        }
        world.camera.view_h = if world.height > 0 {
            max_view_h.min(world.height)
        } else {
            max_view_h
        };

        // Phase change → clear for a clean scene transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        if world.phase == Phase::Playing {
            world.camera.follow(world.player.x, world.player.y, world.width, world.height);
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_game(world),
            Phase::Won => self.compose_won(world),
            Phase::Lost => self.compose_lost(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                let mut tmp = [0u8; 4];
                queue!(self.writer, Print(&*cell.ch.encode_utf8(&mut tmp)))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Shared pieces ──

    /// Draw a game cell (2 terminal columns) inside the map viewport.
    fn put_cell(&mut self, vx: usize, vy: usize, ch: char, fg: Color, bg: Color) {
        let col = vx * CELL_W;
        let row = MAP_ROW + vy;
        self.front.set(col, row, Cell::new(ch, fg, bg));
        self.front.set(col + 1, row, Cell::new(' ', fg, bg));
    }

    fn hud(&mut self, world: &WorldState) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let line = format!(
            " Coins:{:>2}/{:<2}  {}",
            world.meter.value(),
            world.meter.max(),
            world.level_name,
        );
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);
    }

    fn message_line(&mut self, world: &WorldState, fg: Color, bg: Color) {
        if world.message.is_empty() {
            return;
        }
        let row = MAP_ROW + world.camera.view_h;
        if row < self.front.height {
            self.front.put_str_centered(row, &world.message, fg, bg);
        }
    }

    fn help_line(&mut self, text: &str) {
        let row = self.front.height.saturating_sub(1);
        self.front.put_str_centered(row, text, Color::DarkGrey, BASE_BG);
    }

    /// Fill the map viewport with a scene gradient anchored to world rows.
    fn scene_backdrop(&mut self, world: &WorldState, top: (u8, u8, u8), bottom: (u8, u8, u8)) {
        let cam = &world.camera;
        let denom = (world.height.max(2) - 1) as f32;
        for vy in 0..cam.view_h {
            let wy = cam.y + vy as i32;
            let frac = (wy.max(0) as f32) / denom;
            let bg = gradient(top, bottom, frac);
            for vx in 0..cam.view_w {
                self.put_cell(vx, vy, ' ', Color::White, bg);
            }
        }
    }

    // ── Scenes ──

    fn compose_title(&mut self, world: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_str_centered(
            mid.saturating_sub(4),
            "C O I N   H O G",
            Color::Rgb { r: 255, g: 215, b: 0 },
            BASE_BG,
        );
        self.front.put_str_centered(
            mid.saturating_sub(2),
            "A greedy pig, a meadow of coins, and the tax bear.",
            Color::White,
            BASE_BG,
        );
        // Blink the prompt
        if (world.anim_tick / 8) % 2 == 0 {
            self.front.put_str_centered(
                mid + 1,
                "[Enter] Start",
                Color::Rgb { r: 225, g: 110, b: 140 },
                BASE_BG,
            );
        }
        self.message_line(world, Color::White, BASE_BG);
        self.help_line("[Enter] Start   [Esc] Quit");
    }

    fn compose_game(&mut self, world: &WorldState) {
        self.hud(world);
        self.scene_backdrop(world, SKY_TOP, SKY_BOTTOM);
        let cam = world.camera.clone();

        // Terrain
        for vy in 0..cam.view_h {
            let wy = cam.y + vy as i32;
            if wy < 0 || wy >= world.height as i32 {
                continue;
            }
            for vx in 0..cam.view_w {
                let wx = cam.x + vx as i32;
                if wx < 0 || wx >= world.width as i32 {
                    continue;
                }
                if world.terrain_at(wx as usize, wy as usize) == Tile::Wall {
                    self.put_cell(vx, vy, ' ', Color::White, WALL_BG);
                }
            }
        }

        // Coins (shimmering)
        let coin_ch = if (world.tick / 8) % 2 == 0 { 'o' } else { '0' };
        for coin in &world.coins {
            if let Some((vx, vy)) = cam.world_to_view(coin.x, coin.y) {
                let bg = self.cell_bg(vx, vy);
                self.put_cell(vx, vy, coin_ch, COIN_FG, bg);
            }
        }

        // Enemies
        for enemy in &world.enemies {
            if let Some((vx, vy)) = cam.world_to_view(enemy.x, enemy.y) {
                let bg = self.cell_bg(vx, vy);
                let fg = ENEMY_FG[enemy.skin as usize % ENEMY_FG.len()];
                self.put_cell(vx, vy, '&', fg, bg);
            }
        }

        // Player — the snout points where the pig walks
        if world.player.alive {
            if let Some((vx, vy)) = cam.world_to_view(world.player.x, world.player.y) {
                let bg = self.cell_bg(vx, vy);
                let (body, snout) = match world.player.facing {
                    Facing::Left => ('<', '@'),
                    Facing::Right => ('@', '>'),
                };
                let col = vx * CELL_W;
                let row = MAP_ROW + vy;
                self.front.set(col, row, Cell::new(body, PLAYER_FG, bg));
                self.front.set(col + 1, row, Cell::new(snout, PLAYER_FG, bg));
            }
        }

        self.message_line(world, Color::White, HUD_BG);
        self.help_line("[< >] Walk   [^] Jump   [R] Restart   [Esc] Title");
    }

    fn compose_won(&mut self, world: &WorldState) {
        self.hud(world);
        self.scene_backdrop(world, WIN_TOP, WIN_BOTTOM);
        let cam = world.camera.clone();

        // The shower draws over everything else in the scene
        for p in &world.particles {
            if let Some((vx, vy)) = cam.world_to_view(p.x, p.y) {
                let bg = self.cell_bg(vx, vy);
                self.put_cell(vx, vy, '*', PARTICLE_FG, bg);
            }
        }

        self.message_line(
            world,
            Color::Rgb { r: 80, g: 60, b: 0 },
            Color::Rgb { r: WIN_TOP.0, g: WIN_TOP.1, b: WIN_TOP.2 },
        );
        self.help_line("[Enter] Title   [Esc] Quit");
    }

    fn compose_lost(&mut self, world: &WorldState) {
        self.hud(world);
        self.scene_backdrop(world, LOST_TOP, LOST_BOTTOM);

        // Defeat panel: white on midnight blue, centered
        let mid = MAP_ROW + world.camera.view_h / 2;
        let panel_rows = [mid.saturating_sub(1), mid, mid + 1];
        for &row in &panel_rows {
            if row < self.front.height {
                self.front.fill_row(row, PANEL_BG);
            }
        }
        self.front.put_str_centered(mid, &world.message, Color::White, PANEL_BG);

        self.help_line("[Enter] Title   [Esc] Quit");
    }

    /// Background already composed at a viewport cell (for drawing
    /// entities over the gradient without flattening it).
    fn cell_bg(&self, vx: usize, vy: usize) -> Color {
        self.front.get(vx * CELL_W, MAP_ROW + vy).bg
    }
}
