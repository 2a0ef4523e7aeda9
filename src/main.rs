/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::entity::{FrameInput, MoveDir};
use sim::event::GameEvent;
use sim::grid::{self, DecodedGrid};
use sim::level::{self, LevelDef};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KeyBindings};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

// Meta keys are fixed; the binding table covers the in-game actions.
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn main() {
    let config = GameConfig::load();

    // A bad level is fatal before the terminal is touched.
    let def = match level::load_level_def(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Level error: {e}");
            std::process::exit(1);
        }
    };
    let decoded = match grid::decode(&def.rows) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Level error in {:?}: {e}", def.name);
            std::process::exit(1);
        }
    };

    let bindings = KeyBindings::from_config(&config.keys);
    let mut rng = StdRng::from_entropy();

    let mut world = WorldState::new();
    world.speed = config.speed.clone();
    world.effects = config.effects.clone();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(
        &mut world,
        &mut renderer,
        sound.as_ref(),
        &config,
        &bindings,
        &def,
        &decoded,
        &mut rng,
    );

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Coin Hog!");
    if world.meter.max() > 0 {
        println!("Coins collected: {}/{}", world.meter.value(), world.meter.max());
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    bindings: &KeyBindings,
    def: &LevelDef,
    decoded: &DecodedGrid,
    rng: &mut StdRng,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        world.set_message("Gamepad connected", 40);
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    // Jump is edge-triggered and frames outnumber ticks, so a fresh press
    // between ticks is latched here until the next simulation step.
    let mut pending_jump = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp, bindings, config, def, decoded, rng) {
            break;
        }

        if world.phase == Phase::Playing
            && (kb.any_pressed(&bindings.jump) || gp.jump_pressed())
        {
            pending_jump = true;
        }

        if last_tick.elapsed() >= tick_rate {
            match world.phase {
                Phase::Playing => {
                    let input = FrameInput {
                        movement: detect_movement(&kb, &gp, bindings),
                        jump: std::mem::take(&mut pending_jump),
                    };
                    let events = step::step(world, input, rng);
                    process_sound_events(sound, &events);
                }
                Phase::Won => {
                    step::tick_particles(world);
                    world.anim_tick += 1;
                }
                Phase::Title | Phase::Lost => {
                    world.anim_tick += 1;
                }
            }

            if world.message_timer > 0 {
                world.message_timer -= 1;
                if world.message_timer == 0 {
                    world.message.clear();
                }
            }

            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn detect_movement(kb: &InputState, gp: &GamepadState, bindings: &KeyBindings) -> Option<MoveDir> {
    if kb.any_held(&bindings.left) || gp.left_held() {
        Some(MoveDir::Left)
    } else if kb.any_held(&bindings.right) || gp.right_held() {
        Some(MoveDir::Right)
    } else {
        None
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CoinPicked { .. } => sfx.play_pickup(),
            GameEvent::AllCoinsCollected => sfx.play_win(),
            GameEvent::PlayerCaught => sfx.play_caught(),
            GameEvent::PlayerJumped => sfx.play_jump(),
            GameEvent::PlayerFallStart => sfx.play_fall(),
        }
    }
}

fn return_to_title(world: &mut WorldState) {
    world.phase = Phase::Title;
    world.message.clear();
    world.message_timer = 0;
    world.anim_tick = 0;
}

/// Phase-dependent meta input. Returns true to quit the application.
fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    gp: &GamepadState,
    bindings: &KeyBindings,
    config: &GameConfig,
    def: &LevelDef,
    decoded: &DecodedGrid,
    rng: &mut StdRng,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match world.phase {
        // ── Title ──
        Phase::Title => {
            if confirm {
                level::build_world(world, &def.name, decoded, config, rng);
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if kb.any_pressed(&bindings.restart) || gp.restart_pressed() {
                level::build_world(world, &def.name, decoded, config, rng);
                world.set_message("Level restarted", 30);
            } else if esc {
                return_to_title(world);
            }
        }

        // ── Won / Lost — only the exit confirmation remains ──
        Phase::Won | Phase::Lost => {
            if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            } else if confirm {
                return_to_title(world);
            }
        }
    }

    false
}
