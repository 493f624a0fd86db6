/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, CWD or a data dir.
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems found while loading are collected in `diagnostics` and
/// reported once logging is up.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::assets::AssetManifest;
use crate::domain::physics::PhysicsParams;
use crate::error::GameError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub assets: AssetManifest,
    pub log: LogConfig,
    pub link_url: String,
    pub seed: Option<u64>,
    /// Directory assets and the log file are resolved against.
    pub base_dir: PathBuf,
    pub diagnostics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,       // negative = upward
    pub proximity_threshold: f32,
    pub floor_y: f32,
    pub ladder_bottom_y: f32,     // where the ladder's foot rests (bottom of the wall)
    pub ladder_hidden_y: f32,     // ladder top while off-screen
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub antagonist_ms: u64,
    pub ladder_tween_ms: u64,
    pub message_ms: u64,
    pub initial_message_ms: u64,
}

/// Terminal cell size in world units. 80×24 cells at the defaults is the
/// classic 800×600 scene.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    pub cell_width: f32,
    pub cell_height: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub enabled: bool,
    pub file: PathBuf,
    pub level: String,
}

impl PhysicsConfig {
    pub fn params(&self) -> PhysicsParams {
        PhysicsParams { gravity: self.gravity }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    assets: BTreeMap<String, String>,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_proximity")]
    proximity_threshold: f32,
    #[serde(default = "default_floor_y")]
    floor_y: f32,
    #[serde(default = "default_ladder_bottom")]
    ladder_bottom_y: f32,
    #[serde(default = "default_ladder_hidden")]
    ladder_hidden_y: f32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_antagonist_ms")]
    antagonist_ms: u64,
    #[serde(default = "default_ladder_tween_ms")]
    ladder_tween_ms: u64,
    #[serde(default = "default_message_ms")]
    message_ms: u64,
    #[serde(default = "default_message_ms")]
    initial_message_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_cell_width")]
    cell_width: f32,
    #[serde(default = "default_cell_height")]
    cell_height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_enabled")]
    enabled: bool,
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_link_url")]
    link_url: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_gravity() -> f32 { 800.0 }
fn default_move_speed() -> f32 { 300.0 }
fn default_jump_velocity() -> f32 { -500.0 }
fn default_proximity() -> f32 { 100.0 }
fn default_floor_y() -> f32 { 450.0 }
fn default_ladder_bottom() -> f32 { 400.0 }
fn default_ladder_hidden() -> f32 { -50.0 }

fn default_tick_rate() -> u64 { 16 }       // ~60 fps
fn default_antagonist_ms() -> u64 { 1000 }
fn default_ladder_tween_ms() -> u64 { 200 }
fn default_message_ms() -> u64 { 3000 }

fn default_cell_width() -> f32 { 10.0 }
fn default_cell_height() -> f32 { 25.0 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_log_enabled() -> bool { true }
fn default_log_file() -> String { "firstbuyer.log".into() }
fn default_log_level() -> String { "info".into() }

fn default_link_url() -> String { "https://knokknok.social/".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump_velocity: default_jump_velocity(),
            proximity_threshold: default_proximity(),
            floor_y: default_floor_y(),
            ladder_bottom_y: default_ladder_bottom(),
            ladder_hidden_y: default_ladder_hidden(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            antagonist_ms: default_antagonist_ms(),
            ladder_tween_ms: default_ladder_tween_ms(),
            message_ms: default_message_ms(),
            initial_message_ms: default_message_ms(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            enabled: default_log_enabled(),
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            link_url: default_link_url(),
            seed: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory,
    /// ~/.local/share/firstbuyer, /usr/share/firstbuyer.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut diagnostics = Vec::new();

        let (toml_cfg, base_dir) = match find_config(&search_dirs) {
            Some(path) => {
                let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
                match load_toml(&path) {
                    Ok(cfg) => (cfg, base),
                    Err(e) => {
                        diagnostics.push(format!("{e}; using default settings"));
                        (TomlConfig::default(), base)
                    }
                }
            }
            None => {
                let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                (TomlConfig::default(), base)
            }
        };

        let mut cfg = Self::from_toml(toml_cfg, base_dir);
        diagnostics.append(&mut cfg.diagnostics);
        cfg.diagnostics = diagnostics;
        cfg
    }

    /// Parse a config document directly. Used by tests and `load`.
    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, base_dir))
    }

    fn from_toml(t: TomlConfig, base_dir: PathBuf) -> Self {
        let mut diagnostics = Vec::new();

        let (assets, unknown) = AssetManifest::with_overrides(
            t.assets.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        for name in unknown {
            diagnostics.push(format!("unknown asset '{name}' in [assets], ignored"));
        }

        let mut display = DisplayConfig {
            cell_width: t.display.cell_width,
            cell_height: t.display.cell_height,
        };
        if !(display.cell_width > 0.0) || !(display.cell_height > 0.0) {
            diagnostics.push("[display] cell sizes must be positive; using defaults".into());
            display = DisplayConfig {
                cell_width: default_cell_width(),
                cell_height: default_cell_height(),
            };
        }

        let mut tick_rate_ms = t.timing.tick_rate_ms;
        if tick_rate_ms == 0 {
            diagnostics.push("[timing] tick_rate_ms must be at least 1; using default".into());
            tick_rate_ms = default_tick_rate();
        }

        let log_file = PathBuf::from(&t.log.file);
        let log_file = if log_file.is_absolute() { log_file } else { base_dir.join(log_file) };

        GameConfig {
            physics: PhysicsConfig {
                gravity: t.physics.gravity,
                move_speed: t.physics.move_speed,
                jump_velocity: t.physics.jump_velocity,
                proximity_threshold: t.physics.proximity_threshold,
                floor_y: t.physics.floor_y,
                ladder_bottom_y: t.physics.ladder_bottom_y,
                ladder_hidden_y: t.physics.ladder_hidden_y,
            },
            timing: TimingConfig {
                tick_rate_ms,
                antagonist_ms: t.timing.antagonist_ms,
                ladder_tween_ms: t.timing.ladder_tween_ms,
                message_ms: t.timing.message_ms,
                initial_message_ms: t.timing.initial_message_ms,
            },
            display,
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                quit: t.gamepad.quit,
            },
            assets,
            log: LogConfig {
                enabled: t.log.enabled,
                file: log_file,
                level: t.log.level,
            },
            link_url: t.general.link_url,
            seed: t.general.seed,
            base_dir,
            diagnostics,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), PathBuf::from("."))
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
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

    // 3. XDG data home (~/.local/share/firstbuyer)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/firstbuyer");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/firstbuyer");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter()
        .map(|d| d.join("config.toml"))
        .find(|p| p.is_file())
}

fn load_toml(path: &Path) -> Result<TomlConfig, GameError> {
    let text = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<TomlConfig>(&text).map_err(|source| GameError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assets::AssetId;

    #[test]
    fn empty_document_gives_scene_constants() {
        let cfg = GameConfig::parse("", PathBuf::from("/tmp")).unwrap();
        assert_eq!(cfg.physics.gravity, 800.0);
        assert_eq!(cfg.physics.move_speed, 300.0);
        assert_eq!(cfg.physics.jump_velocity, -500.0);
        assert_eq!(cfg.physics.proximity_threshold, 100.0);
        assert_eq!(cfg.timing.antagonist_ms, 1000);
        assert_eq!(cfg.timing.ladder_tween_ms, 200);
        assert_eq!(cfg.timing.message_ms, 3000);
        assert_eq!(cfg.link_url, "https://knokknok.social/");
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.log.file, PathBuf::from("/tmp/firstbuyer.log"));
        assert!(cfg.diagnostics.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [physics]
            gravity = 1200.0

            [timing]
            message_ms = 5000

            [general]
            seed = 99
        "#;
        let cfg = GameConfig::parse(text, PathBuf::from(".")).unwrap();
        assert_eq!(cfg.physics.gravity, 1200.0);
        assert_eq!(cfg.physics.move_speed, 300.0);
        assert_eq!(cfg.timing.message_ms, 5000);
        assert_eq!(cfg.timing.initial_message_ms, 3000);
        assert_eq!(cfg.seed, Some(99));
    }

    #[test]
    fn asset_overrides_and_unknown_names() {
        let text = r#"
            [assets]
            joker = "img/clown.webp"
            regulation = "img/red_tape.png"
        "#;
        let cfg = GameConfig::parse(text, PathBuf::from(".")).unwrap();
        assert_eq!(cfg.assets.path(AssetId::Joker), Path::new("img/clown.webp"));
        assert_eq!(cfg.diagnostics.len(), 1);
        assert!(cfg.diagnostics[0].contains("regulation"));
    }

    #[test]
    fn invalid_display_and_tick_fall_back() {
        let text = r#"
            [display]
            cell_width = 0.0
            [timing]
            tick_rate_ms = 0
        "#;
        let cfg = GameConfig::parse(text, PathBuf::from(".")).unwrap();
        assert_eq!(cfg.display.cell_width, 10.0);
        assert_eq!(cfg.timing.tick_rate_ms, 16);
        assert_eq!(cfg.diagnostics.len(), 2);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::parse("[physics\ngravity = ", PathBuf::from(".")).is_err());
    }

    #[test]
    fn load_toml_reports_path_on_missing_file() {
        let path = std::env::temp_dir().join("firstbuyer-definitely-missing/config.toml");
        match load_toml(&path) {
            Err(GameError::ConfigRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ConfigRead, got {:?}", other.map(|_| ())),
        }
    }
}
