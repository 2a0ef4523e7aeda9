/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Key and gamepad bindings stay as strings here; the ui layer resolves
/// them into key codes / buttons at startup.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub scoring: ScoringConfig,
    pub effects: EffectsConfig,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    /// Optional level file; empty = built-in level.
    pub level_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_move_rate: u32,
    pub enemy_move_rate: u32,
    pub jump_height: u32,
}

#[derive(Clone, Debug)]
pub struct ScoringConfig {
    /// Coins needed to win. 0 = every coin in the level.
    pub coin_target: u32,
}

#[derive(Clone, Debug)]
pub struct EffectsConfig {
    pub particle_count: u32,
    /// Ticks per cell of particle descent — the weakened win-scene pull.
    pub win_fall_period: u32,
}

#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
    pub restart: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig {
            tick_rate_ms: default_tick_rate(),
            player_move_rate: default_player_move(),
            enemy_move_rate: default_enemy_move(),
            jump_height: default_jump_height(),
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        EffectsConfig {
            particle_count: default_particle_count(),
            win_fall_period: default_win_fall(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    effects: TomlEffects,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_move")]
    player_move_rate: u32,
    #[serde(default = "default_enemy_move")]
    enemy_move_rate: u32,
    #[serde(default = "default_jump_height")]
    jump_height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default)]
    coin_target: u32,
}

#[derive(Deserialize, Debug)]
struct TomlEffects {
    #[serde(default = "default_particle_count")]
    particle_count: u32,
    #[serde(default = "default_win_fall")]
    win_fall_period: u32,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_keys_left")]
    left: Vec<String>,
    #[serde(default = "default_keys_right")]
    right: Vec<String>,
    #[serde(default = "default_keys_jump")]
    jump: Vec<String>,
    #[serde(default = "default_keys_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    level: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 60 }
fn default_player_move() -> u32 { 1 }
fn default_enemy_move() -> u32 { 4 }
fn default_jump_height() -> u32 { 3 }

fn default_particle_count() -> u32 { 200 }
fn default_win_fall() -> u32 { 2 }

fn default_keys_left() -> Vec<String> { vec!["Left".into(), "a".into()] }
fn default_keys_right() -> Vec<String> { vec!["Right".into(), "d".into()] }
fn default_keys_jump() -> Vec<String> { vec!["Up".into(), "w".into(), "Space".into()] }
fn default_keys_restart() -> Vec<String> { vec!["r".into()] }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_move_rate: default_player_move(),
            enemy_move_rate: default_enemy_move(),
            jump_height: default_jump_height(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring { coin_target: 0 }
    }
}

impl Default for TomlEffects {
    fn default() -> Self {
        TomlEffects {
            particle_count: default_particle_count(),
            win_fall_period: default_win_fall(),
        }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            left: default_keys_left(),
            right: default_keys_right(),
            jump: default_keys_jump(),
            restart: default_keys_restart(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            confirm: default_pad_confirm(),
            cancel: default_pad_cancel(),
            restart: default_pad_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let level_path = if toml_cfg.general.level.is_empty() {
            None
        } else {
            let p = PathBuf::from(&toml_cfg.general.level);
            if p.is_absolute() {
                Some(p)
            } else {
                // Search candidate dirs for the level file
                Some(
                    search_dirs
                        .iter()
                        .map(|d| d.join(&toml_cfg.general.level))
                        .find(|c| c.is_file())
                        .unwrap_or(p),
                )
            }
        };

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms,
                player_move_rate: toml_cfg.speed.player_move_rate,
                enemy_move_rate: toml_cfg.speed.enemy_move_rate,
                jump_height: toml_cfg.speed.jump_height,
            },
            scoring: ScoringConfig {
                coin_target: toml_cfg.scoring.coin_target,
            },
            effects: EffectsConfig {
                particle_count: toml_cfg.effects.particle_count,
                win_fall_period: toml_cfg.effects.win_fall_period,
            },
            keys: KeyConfig {
                left: toml_cfg.keys.left,
                right: toml_cfg.keys.right,
                jump: toml_cfg.keys.jump,
                restart: toml_cfg.keys.restart,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                restart: toml_cfg.gamepad.restart,
            },
            level_path,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (resolve symlinks)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
