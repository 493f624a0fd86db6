/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LogConfig};
use error::GameError;
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::link;
use ui::renderer::{CellScale, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Longest frame fed to the simulation after a stall.
const MAX_FRAME_MS: u64 = 250;

fn main() {
    let config = GameConfig::load();

    if let Err(e) = init_logging(&config.log) {
        eprintln!("{e}; continuing without a log file");
    }
    for problem in &config.diagnostics {
        warn!("config: {problem}");
    }
    report_missing_assets(&config);

    let mut renderer = Renderer::new(CellScale::from_config(&config.display));
    if let Err(e) = renderer.init() {
        error!(error = %e, "terminal init failed");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut kb = InputState::new();
    kb.honor_release = enable_key_release();

    let sound = SoundEngine::new();
    if sound.is_none() {
        info!("no audio output, playing silently");
    }

    let result = game_loop(&mut renderer, &mut kb, sound.as_ref(), &config);

    if kb.honor_release {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(attempts) => {
            info!(attempts, "session ended");
            println!();
            println!("Thanks for playing First Time Buyer!");
            println!("Attempts on the ladder: {attempts}");
        }
        Err(e) => {
            error!(error = %e, "session aborted");
            eprintln!("Game error: {e}");
        }
    }
}

/// Send tracing output to the configured file. The terminal itself is
/// owned by the renderer, so nothing is ever written to stdout.
fn init_logging(cfg: &LogConfig) -> error::Result<()> {
    if !cfg.enabled {
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .map_err(|source| GameError::Log { path: cfg.file.clone(), source })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn report_missing_assets(config: &GameConfig) {
    for id in config.assets.missing(&config.base_dir) {
        warn!(
            asset = id.name(),
            path = %config.assets.path(id).display(),
            "asset not found, using built-in terminal art"
        );
    }
}

/// Ask the terminal for key Release events. Without them held keys are
/// released by timeout.
fn enable_key_release() -> bool {
    if !terminal::supports_keyboard_enhancement().unwrap_or(false) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

fn game_loop(
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> error::Result<u32> {
    let mut gp = GamepadState::new();
    for name in gp.load_button_config(&config.gamepad) {
        warn!(button = %name, "unknown gamepad button in config, ignored");
    }

    let scale = renderer.scale();
    let (cols, rows) = renderer.size();
    let (width, height) = scale.world_size(cols, rows);
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, cols, rows, "scene laid out");

    let mut world = WorldState::new(config, width, height, seed);
    let mut events = Vec::new();
    step::start_session(&mut world, &mut events);
    process_events(sound, &events);

    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();
        match gp.connection_change() {
            Some(true) => info!("gamepad connected"),
            Some(false) => info!("gamepad disconnected"),
            None => {}
        }

        if kb.quit_requested() || gp.quit_pressed() {
            break;
        }

        let mut events = Vec::new();

        if let Some((c, r)) = kb.resized.take() {
            let (w, h) = scale.world_size(c, r);
            step::resize(&mut world, w, h, &mut events);
        }
        for &(c, r) in &kb.clicks {
            let (x, y) = scale.to_world(c, r);
            step::click(&mut world, x, y, &mut events);
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            let mut dt_ms = elapsed.as_millis() as u64;
            if dt_ms > MAX_FRAME_MS {
                dt_ms = MAX_FRAME_MS;
                last_tick = Instant::now();
            } else {
                // Carry the sub-millisecond remainder into the next frame
                last_tick += Duration::from_millis(dt_ms);
            }

            let input = gp.merge_into(kb.frame_input());
            events.extend(step::step(&mut world, input, dt_ms));
        }

        process_events(sound, &events);
        renderer.render(&world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(world.state.attempt_count)
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        if let Some(sfx) = sound {
            sfx.play_for(event);
        }
        if let GameEvent::OpenLink(url) = event {
            if let Err(e) = link::open_url(url) {
                warn!(%url, error = %e, "could not open link");
            }
        }
    }
}
