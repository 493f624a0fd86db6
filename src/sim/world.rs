/// WorldState: the complete state of a running session.
///
/// ## Overlay Architecture
///
/// At most one overlay is on screen at a time, so the overlay is a single
/// enum rather than a set of booleans:
///   - `Idle`: gameplay input is live
///   - `ShowingAntagonist(kind)`: antagonist label + image, input blocked
///   - `ShowingMessage(kind)`: centred message box, input blocked
///
/// Message requests that arrive while the antagonist is up wait in
/// `pending_messages` and are shown as soon as the overlay goes idle.
///
/// ## Time
///
/// All timers (overlay expiry, ladder tween completion) are records in
/// `scheduler`, which advances only through `step()`.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{GameConfig, PhysicsConfig, TimingConfig};
use crate::domain::antagonist::AntagonistKind;
use crate::domain::entity::{Ladder, Logo, Player};
use crate::domain::message::{GuardClass, MessageKind};
use super::scheduler::Scheduler;
use super::tween::Tween;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Overlay {
    Idle,
    ShowingAntagonist(AntagonistKind),
    ShowingMessage(MessageKind),
}

/// Deferred work processed by `step()`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Task {
    HideAntagonist,
    HideMessage(MessageKind),
    LadderExitDone,
    LadderReturnDone,
}

/// Which leg of the ladder's round trip is running.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LadderLeg {
    Exiting,
    Returning,
}

#[derive(Clone, Copy, Debug)]
pub struct LadderMotion {
    pub leg: LadderLeg,
    pub tween: Tween,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub attempt_count: u32,
    pub ladder_moving: bool,
    pub overlay: Overlay,
    pub pending_messages: VecDeque<MessageKind>,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            attempt_count: 0,
            ladder_moving: false,
            overlay: Overlay::Idle,
            pending_messages: VecDeque::new(),
        }
    }

    /// Any overlay on screen (input is blocked).
    #[inline]
    pub fn is_displaying(&self) -> bool {
        self.overlay != Overlay::Idle
    }

    pub fn initial_message_displaying(&self) -> bool {
        self.message_class_displaying(GuardClass::Initial)
    }

    pub fn message_class_displaying(&self, class: GuardClass) -> bool {
        matches!(self.overlay, Overlay::ShowingMessage(k) if k.guard_class() == class)
    }

    pub fn message_class_pending(&self, class: GuardClass) -> bool {
        self.pending_messages.iter().any(|k| k.guard_class() == class)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WorldState {
    // ── Viewport (world units) ──
    pub width: f32,
    pub height: f32,

    // ── Scene objects ──
    pub player: Player,
    pub ladder: Ladder,
    pub logo: Logo,
    /// Key and wall are laid out once at session start and never follow resizes.
    pub key_x: f32,
    pub wall_x: f32,

    // ── Controller state ──
    pub state: GameState,
    pub ladder_motion: Option<LadderMotion>,
    pub scheduler: Scheduler<Task>,
    pub rng: ChaCha8Rng,

    // ── Tuning ──
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub link_url: String,
}

impl WorldState {
    /// Lay out the scene for a `width × height` viewport.
    pub fn new(config: &GameConfig, width: f32, height: f32, seed: u64) -> Self {
        let physics = config.physics.clone();

        let mut player = Player::new(width * 0.75, physics.floor_y);
        player.body.touching_down = true;
        let ladder = Ladder::resting(width * 0.25, physics.ladder_bottom_y);

        WorldState {
            width,
            height,
            player,
            ladder,
            logo: Logo::top_right(width),
            key_x: width / 2.0,
            wall_x: width / 2.0,
            state: GameState::new(),
            ladder_motion: None,
            scheduler: Scheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            physics,
            timing: config.timing.clone(),
            link_url: config.link_url.clone(),
        }
    }

    /// Top of the ladder when resting against the bottom of the wall.
    pub fn ladder_rest_y(&self) -> f32 {
        self.physics.ladder_bottom_y - self.ladder.height
    }

    pub fn message_duration(&self, kind: MessageKind) -> u64 {
        match kind {
            MessageKind::Initial => self.timing.initial_message_ms,
            _ => self.timing.message_ms,
        }
    }

    /// Controls + attempt counter, one line each.
    pub fn info_lines(&self) -> [String; 3] {
        [
            "Move: Left/Right".to_string(),
            "Jump: Space".to_string(),
            format!("Attempts: {}", self.state.attempt_count),
        ]
    }
}
