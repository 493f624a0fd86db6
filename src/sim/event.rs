/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and side effects.

use crate::domain::antagonist::AntagonistKind;
use crate::domain::message::MessageKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    PlayerRepelled,
    AttemptCounted { attempts: u32 },
    AntagonistShown(AntagonistKind),
    AntagonistHidden(AntagonistKind),
    LadderLeft,
    LadderRelocated { x: f32 },
    LadderSettled,
    MessageShown(MessageKind),
    MessageQueued(MessageKind),
    MessageHidden(MessageKind),
    Resized { width: f32, height: f32 },
    OpenLink(String),
}
