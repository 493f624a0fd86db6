/// The step function: advances the scene by one frame.
///
/// Processing order:
///   1. Clock advance
///   2. Due tasks (overlay expiry, ladder tween completion), in expiry order
///   3. Ladder tween sampling
///   4. Player input (skipped while any overlay is displaying)
///   5. Physics integration
///   6. Ladder proximity check → repel + trigger sequence
///
/// Follow-up work started by a task is anchored to that task's expiry,
/// not to the end of the frame, so one long frame resolves the same way
/// as many short ones.

use tracing::{debug, info};

use crate::domain::antagonist::AntagonistKind;
use crate::domain::entity::{FrameInput, Logo};
use crate::domain::message::MessageKind;
use crate::domain::physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::tween::Tween;
use super::world::{LadderLeg, LadderMotion, Overlay, Task, WorldState};

/// What happened to a message request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageOutcome {
    Shown,
    /// Waiting for the antagonist overlay to hide.
    Queued,
    /// Rejected by the re-entrancy guard.
    Dropped,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, dt_ms: u64) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    world.scheduler.advance(dt_ms);
    run_due_tasks(world, &mut events);
    sample_ladder(world);

    resolve_input(world, input, &mut events);
    let params = world.physics.params();
    physics::integrate(
        &mut world.player.body,
        &params,
        dt_ms as f32 / 1000.0,
        world.physics.floor_y,
        world.width,
    );
    resolve_proximity(world, &mut events);

    events
}

/// Show the opening message. Called once when the scene is laid out.
pub fn start_session(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    info!(width = world.width, height = world.height, "session started");
    show_timed_message(world, MessageKind::Initial, events);
}

// ══════════════════════════════════════════════════════════════
// Ladder sequence
// ══════════════════════════════════════════════════════════════

/// Start one attempt: count it, flash an antagonist, send the ladder away.
/// Returns false (and changes nothing) while the ladder is already moving
/// or any overlay is up.
pub fn trigger_ladder_sequence(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.state.ladder_moving || world.state.is_displaying() {
        debug!(
            ladder_moving = world.state.ladder_moving,
            overlay = ?world.state.overlay,
            "trigger ignored"
        );
        return false;
    }

    let now = world.scheduler.now();
    world.state.ladder_moving = true;
    world.state.attempt_count += 1;
    events.push(GameEvent::AttemptCounted { attempts: world.state.attempt_count });

    let kind = AntagonistKind::pick(&mut world.rng);
    world.state.overlay = Overlay::ShowingAntagonist(kind);
    world.scheduler.schedule(world.timing.antagonist_ms, Task::HideAntagonist);
    events.push(GameEvent::AntagonistShown(kind));

    let tween = Tween::new(world.ladder.y, world.physics.ladder_hidden_y, now, world.timing.ladder_tween_ms);
    world.ladder_motion = Some(LadderMotion { leg: LadderLeg::Exiting, tween });
    world.scheduler.schedule_at(tween.end_ms(), Task::LadderExitDone);
    events.push(GameEvent::LadderLeft);

    info!(
        attempts = world.state.attempt_count,
        antagonist = kind.label(),
        pending = world.scheduler.pending(),
        "ladder sequence started"
    );
    true
}

/// Move the ladder to a fresh random x within the middle 80% of the viewport.
pub fn reposition_ladder(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let x = rules::random_ladder_x(world.width, &mut world.rng);
    world.ladder.x = x;
    events.push(GameEvent::LadderRelocated { x });
    debug!(x, "ladder relocated");
}

fn ladder_leg_is(world: &WorldState, leg: LadderLeg) -> bool {
    matches!(world.ladder_motion, Some(m) if m.leg == leg)
}

fn finish_exit(world: &mut WorldState, at: u64, events: &mut Vec<GameEvent>) {
    if !ladder_leg_is(world, LadderLeg::Exiting) {
        debug!(at, "stale exit completion");
        return;
    }
    reposition_ladder(world, events);
    let hidden = world.physics.ladder_hidden_y;
    world.ladder.y = hidden;

    let tween = Tween::new(hidden, world.ladder_rest_y(), at, world.timing.ladder_tween_ms);
    world.ladder_motion = Some(LadderMotion { leg: LadderLeg::Returning, tween });
    world.scheduler.schedule_at(tween.end_ms(), Task::LadderReturnDone);
}

fn finish_return(world: &mut WorldState, at: u64, events: &mut Vec<GameEvent>) {
    if !ladder_leg_is(world, LadderLeg::Returning) {
        debug!(at, "stale return completion");
        return;
    }
    world.ladder_motion = None;
    world.ladder.y = world.ladder_rest_y();
    world.state.ladder_moving = false;
    events.push(GameEvent::LadderSettled);

    if let Some(kind) = rules::humorous_message_for(world.state.attempt_count) {
        request_message(world, kind, at, events);
    }
}

fn sample_ladder(world: &mut WorldState) {
    if let Some(motion) = world.ladder_motion {
        world.ladder.y = motion.tween.value_at(world.scheduler.now());
    }
}

// ══════════════════════════════════════════════════════════════
// Messages
// ══════════════════════════════════════════════════════════════

/// Request a timed message at the current time.
pub fn show_timed_message(world: &mut WorldState, kind: MessageKind, events: &mut Vec<GameEvent>) -> MessageOutcome {
    let now = world.scheduler.now();
    request_message(world, kind, now, events)
}

fn request_message(world: &mut WorldState, kind: MessageKind, at: u64, events: &mut Vec<GameEvent>) -> MessageOutcome {
    let class = kind.guard_class();
    let state = &world.state;
    if state.message_class_displaying(class)
        || state.message_class_pending(class)
        || state.initial_message_displaying()
    {
        debug!(?kind, overlay = ?state.overlay, "message dropped");
        return MessageOutcome::Dropped;
    }

    if state.is_displaying() {
        world.state.pending_messages.push_back(kind);
        events.push(GameEvent::MessageQueued(kind));
        debug!(?kind, "message queued");
        return MessageOutcome::Queued;
    }

    display_message(world, kind, at, events);
    MessageOutcome::Shown
}

fn display_message(world: &mut WorldState, kind: MessageKind, at: u64, events: &mut Vec<GameEvent>) {
    world.state.overlay = Overlay::ShowingMessage(kind);
    world.scheduler.schedule_at(at.saturating_add(world.message_duration(kind)), Task::HideMessage(kind));
    events.push(GameEvent::MessageShown(kind));
    info!(?kind, "message shown");
}

/// Overlay just went idle: promote the oldest queued message.
fn show_next_pending(world: &mut WorldState, at: u64, events: &mut Vec<GameEvent>) {
    if let Some(kind) = world.state.pending_messages.pop_front() {
        display_message(world, kind, at, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Scheduled tasks
// ══════════════════════════════════════════════════════════════

fn run_due_tasks(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    while let Some((at, task)) = world.scheduler.pop_due() {
        debug!(at, ?task, "task due");
        match task {
            Task::HideAntagonist => {
                if let Overlay::ShowingAntagonist(kind) = world.state.overlay {
                    world.state.overlay = Overlay::Idle;
                    events.push(GameEvent::AntagonistHidden(kind));
                    show_next_pending(world, at, events);
                }
            }
            Task::HideMessage(kind) => {
                if world.state.overlay == Overlay::ShowingMessage(kind) {
                    world.state.overlay = Overlay::Idle;
                    events.push(GameEvent::MessageHidden(kind));
                    show_next_pending(world, at, events);
                }
            }
            Task::LadderExitDone => finish_exit(world, at, events),
            Task::LadderReturnDone => finish_return(world, at, events),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Velocity is left untouched while an overlay blocks input.
fn resolve_input(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    if world.state.is_displaying() { return; }

    let player = &mut world.player;
    player.body.vx = rules::horizontal_velocity(input.horizontal, world.physics.move_speed);

    if input.jump && player.body.touching_down {
        player.body.vy = world.physics.jump_velocity;
        events.push(GameEvent::Jumped);
    }
}

fn resolve_proximity(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let body = &world.player.body;
    if !rules::proximity_triggers(body, &world.ladder, world.physics.proximity_threshold, world.state.ladder_moving) {
        return;
    }

    // Repel regardless of overlays; the trigger applies its own guard
    let vx = rules::repel_velocity(body.x, world.ladder.x, world.physics.move_speed);
    world.player.body.vx = vx;
    events.push(GameEvent::PlayerRepelled);
    trigger_ladder_sequence(world, events);
}

// ══════════════════════════════════════════════════════════════
// Viewport & pointer
// ══════════════════════════════════════════════════════════════

/// New viewport size. Only the logo follows; everything else stays put.
pub fn resize(world: &mut WorldState, width: f32, height: f32, events: &mut Vec<GameEvent>) {
    world.width = width;
    world.height = height;
    world.logo = Logo::top_right(width);
    events.push(GameEvent::Resized { width, height });
    debug!(width, height, "viewport resized");
}

/// Pointer press at world coordinates.
pub fn click(world: &mut WorldState, x: f32, y: f32, events: &mut Vec<GameEvent>) {
    if world.logo.contains(x, y) {
        info!(url = %world.link_url, "logo clicked");
        events.push(GameEvent::OpenLink(world.link_url.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::Facing;

    const FRAME: u64 = 16;

    fn world() -> WorldState {
        WorldState::new(&GameConfig::default(), 800.0, 600.0, 9)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    /// Put the player in the air, `dx` to the right of the ladder.
    fn hover_near_ladder(w: &mut WorldState, dx: f32) {
        w.player.body.x = w.ladder.x + dx;
        w.player.body.y = 300.0;
        w.player.body.vy = 0.0;
        w.player.body.touching_down = false;
    }

    /// Step in 100 ms frames until the ladder is back and no overlay is up.
    fn settle(w: &mut WorldState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(step(w, idle(), 100));
            if !w.state.ladder_moving && !w.state.is_displaying() && w.state.pending_messages.is_empty() {
                break;
            }
        }
        events
    }

    fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    #[test]
    fn ten_attempts_show_each_humorous_message_once() {
        let mut w = world();
        let mut all = Vec::new();
        for _ in 0..10 {
            let mut events = Vec::new();
            assert!(trigger_ladder_sequence(&mut w, &mut events));
            all.extend(events);
            all.extend(settle(&mut w));
        }

        assert_eq!(w.state.attempt_count, 10);
        assert_eq!(count(&all, &GameEvent::MessageShown(MessageKind::RentAnotherFourYears)), 1);
        assert_eq!(count(&all, &GameEvent::MessageShown(MessageKind::UnaffordableListings)), 1);
        assert_eq!(count(&all, &GameEvent::LadderSettled), 10);
        assert!(!w.state.ladder_moving);
        assert_eq!(w.state.overlay, Overlay::Idle);
    }

    #[test]
    fn trigger_is_not_reentrant() {
        let mut w = world();
        let mut events = Vec::new();
        assert!(trigger_ladder_sequence(&mut w, &mut events));
        assert!(matches!(w.state.overlay, Overlay::ShowingAntagonist(_)));
        assert!(!trigger_ladder_sequence(&mut w, &mut events));
        assert_eq!(w.state.attempt_count, 1);
        assert_eq!(w.scheduler.pending(), 2); // hide antagonist + exit tween
    }

    #[test]
    fn lingering_antagonist_repels_without_new_attempt() {
        let mut w = world();
        let mut events = Vec::new();
        trigger_ladder_sequence(&mut w, &mut events);

        // Ladder back in place, antagonist still up
        step(&mut w, idle(), 500);
        assert!(!w.state.ladder_moving);
        assert!(matches!(w.state.overlay, Overlay::ShowingAntagonist(_)));

        hover_near_ladder(&mut w, 30.0);
        w.player.body.vx = 0.0;
        let events = step(&mut w, idle(), FRAME);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::AttemptCounted { .. })));
        assert_eq!(w.state.attempt_count, 1);
        // Still pushed away while the overlay is up
        assert!(events.contains(&GameEvent::PlayerRepelled));
        assert_eq!(w.player.body.vx, w.physics.move_speed);
    }

    #[test]
    fn trigger_blocked_by_initial_message() {
        let mut w = world();
        let mut events = Vec::new();
        start_session(&mut w, &mut events);
        assert!(w.state.initial_message_displaying());

        hover_near_ladder(&mut w, -50.0);
        w.player.body.vx = 0.0;
        let events = step(&mut w, idle(), FRAME);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::AttemptCounted { .. })));
        assert_eq!(w.state.attempt_count, 0);
        assert!(w.state.initial_message_displaying());

        // The repel does not wait for the overlay to clear
        assert!(events.contains(&GameEvent::PlayerRepelled));
        assert_eq!(w.player.body.vx, -w.physics.move_speed);
    }

    #[test]
    fn humorous_request_dropped_while_one_is_showing() {
        let mut w = world();
        let mut events = Vec::new();
        let first = show_timed_message(&mut w, MessageKind::UnaffordableListings, &mut events);
        assert_eq!(first, MessageOutcome::Shown);

        let second = show_timed_message(&mut w, MessageKind::RentAnotherFourYears, &mut events);
        assert_eq!(second, MessageOutcome::Dropped);
        assert_eq!(w.state.overlay, Overlay::ShowingMessage(MessageKind::UnaffordableListings));
        assert!(w.state.pending_messages.is_empty());
        assert_eq!(count(&events, &GameEvent::MessageShown(MessageKind::RentAnotherFourYears)), 0);
    }

    #[test]
    fn airborne_near_ladder_repels_and_triggers() {
        let mut w = world();
        hover_near_ladder(&mut w, 50.0);
        let events = step(&mut w, idle(), FRAME);

        assert!(events.contains(&GameEvent::AttemptCounted { attempts: 1 }));
        assert!(events.contains(&GameEvent::PlayerRepelled));
        assert_eq!(w.player.body.vx, w.physics.move_speed);
        assert!(w.state.ladder_moving);

        // Left of the ladder is pushed left
        let mut w = world();
        hover_near_ladder(&mut w, -40.0);
        step(&mut w, idle(), FRAME);
        assert_eq!(w.player.body.vx, -w.physics.move_speed);
    }

    #[test]
    fn grounded_near_ladder_does_nothing() {
        let mut w = world();
        w.player.body.x = w.ladder.x + 20.0;
        let events = step(&mut w, idle(), FRAME);
        assert!(events.is_empty());
        assert_eq!(w.state.attempt_count, 0);
    }

    #[test]
    fn ladder_tweens_out_and_back() {
        let mut w = world();
        let rest = w.ladder_rest_y();
        let mut events = Vec::new();
        trigger_ladder_sequence(&mut w, &mut events);

        step(&mut w, idle(), 100);
        let halfway = (rest + w.physics.ladder_hidden_y) / 2.0;
        assert!((w.ladder.y - halfway).abs() < 1e-3, "y = {}", w.ladder.y);

        let events = step(&mut w, idle(), 100);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LadderRelocated { .. })));
        assert_eq!(w.ladder.y, w.physics.ladder_hidden_y);

        let events = step(&mut w, idle(), 200);
        assert!(events.contains(&GameEvent::LadderSettled));
        assert_eq!(w.ladder.y, rest);
        assert!(!w.state.ladder_moving);
        assert!(matches!(w.state.overlay, Overlay::ShowingAntagonist(_)));
    }

    #[test]
    fn one_long_frame_resolves_whole_sequence() {
        let mut w = world();
        let mut events = Vec::new();
        trigger_ladder_sequence(&mut w, &mut events);
        let events = step(&mut w, idle(), 5_000);

        assert!(events.contains(&GameEvent::LadderSettled));
        assert!(events.iter().any(|e| matches!(e, GameEvent::AntagonistHidden(_))));
        assert_eq!(w.ladder.y, w.ladder_rest_y());
        assert!(w.ladder.x >= 80.0 && w.ladder.x <= 720.0);
        assert_eq!(w.state.overlay, Overlay::Idle);
        assert_eq!(w.scheduler.pending(), 0);
    }

    #[test]
    fn message_requested_during_antagonist_waits_for_it() {
        let mut w = world();
        let mut events = Vec::new();
        trigger_ladder_sequence(&mut w, &mut events);

        let outcome = show_timed_message(&mut w, MessageKind::UnaffordableListings, &mut events);
        assert_eq!(outcome, MessageOutcome::Queued);
        assert_eq!(
            show_timed_message(&mut w, MessageKind::RentAnotherFourYears, &mut events),
            MessageOutcome::Dropped
        );

        let events = step(&mut w, idle(), 999);
        assert!(!events.contains(&GameEvent::MessageShown(MessageKind::UnaffordableListings)));

        let events = step(&mut w, idle(), 1);
        assert!(events.contains(&GameEvent::MessageShown(MessageKind::UnaffordableListings)));
        assert_eq!(w.state.overlay, Overlay::ShowingMessage(MessageKind::UnaffordableListings));

        let events = step(&mut w, idle(), 3_000);
        assert!(events.contains(&GameEvent::MessageHidden(MessageKind::UnaffordableListings)));
        assert_eq!(w.state.overlay, Overlay::Idle);
    }

    #[test]
    fn humorous_message_dropped_while_initial_shows() {
        let mut w = world();
        let mut events = Vec::new();
        start_session(&mut w, &mut events);
        assert_eq!(events, vec![GameEvent::MessageShown(MessageKind::Initial)]);
        assert_eq!(
            show_timed_message(&mut w, MessageKind::RentAnotherFourYears, &mut events),
            MessageOutcome::Dropped
        );

        let events = step(&mut w, idle(), 3_000);
        assert!(events.contains(&GameEvent::MessageHidden(MessageKind::Initial)));
        assert!(!w.state.is_displaying());
    }

    #[test]
    fn fifth_attempt_shows_message_after_antagonist() {
        let mut w = world();
        w.state.attempt_count = 4;
        let mut events = Vec::new();
        trigger_ladder_sequence(&mut w, &mut events);

        let events = step(&mut w, idle(), 400);
        assert!(events.contains(&GameEvent::MessageQueued(MessageKind::RentAnotherFourYears)));

        let events = step(&mut w, idle(), 600);
        assert!(events.contains(&GameEvent::MessageShown(MessageKind::RentAnotherFourYears)));
    }

    #[test]
    fn input_ignored_under_overlay_but_gravity_applies() {
        let mut w = world();
        let mut events = Vec::new();
        start_session(&mut w, &mut events);

        let input = FrameInput { horizontal: Some(Facing::Right), jump: true };
        let events = step(&mut w, input, FRAME);
        assert!(!events.contains(&GameEvent::Jumped));
        assert_eq!(w.player.body.vx, 0.0);
        assert!(w.player.body.touching_down);

        w.player.body.y = 200.0;
        w.player.body.touching_down = false;
        step(&mut w, input, FRAME);
        assert!(w.player.body.vy > 0.0);
        assert!(w.player.body.y > 200.0);
        assert_eq!(w.player.body.vx, 0.0);
    }

    #[test]
    fn jump_and_move_when_idle() {
        let mut w = world();
        let input = FrameInput { horizontal: Some(Facing::Left), jump: true };
        let events = step(&mut w, input, FRAME);
        assert!(events.contains(&GameEvent::Jumped));
        assert_eq!(w.player.body.vx, -300.0);
        assert!(w.player.body.airborne());
        assert!(w.player.body.vy < 0.0);
    }

    #[test]
    fn resize_moves_only_the_logo() {
        let mut w = world();
        let (px, py) = (w.player.body.x, w.player.body.y);
        let (lx, ly) = (w.ladder.x, w.ladder.y);
        let key_x = w.key_x;

        let mut events = Vec::new();
        resize(&mut w, 1200.0, 700.0, &mut events);
        assert_eq!((w.logo.x, w.logo.y), (1150.0, 50.0));
        assert_eq!((w.player.body.x, w.player.body.y), (px, py));
        assert_eq!((w.ladder.x, w.ladder.y), (lx, ly));
        assert_eq!(w.key_x, key_x);
        assert_eq!(events, vec![GameEvent::Resized { width: 1200.0, height: 700.0 }]);
    }

    #[test]
    fn click_on_logo_opens_link() {
        let mut w = world();
        let mut events = Vec::new();
        click(&mut w, 10.0, 10.0, &mut events);
        assert!(events.is_empty());

        let (x, y) = (w.logo.x, w.logo.y);
        click(&mut w, x, y, &mut events);
        assert_eq!(events, vec![GameEvent::OpenLink("https://knokknok.social/".to_string())]);
    }

    #[test]
    fn reposition_stays_in_bounds() {
        let mut w = world();
        let mut events = Vec::new();
        for width in [120.0f32, 800.0, 2560.0] {
            w.width = width;
            for _ in 0..500 {
                reposition_ladder(&mut w, &mut events);
                assert!(w.ladder.x >= 0.1 * width && w.ladder.x <= 0.9 * width);
            }
        }
    }
}
