/// Entities: Player, Ladder, Logo, Key. Plain data; behaviour lives in
/// `sim::step` and `domain::rules`.

use super::physics::Body;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Frame input, sampled once per tick.
/// Horizontal = continuous (held key), jump = held as well: the jump only
/// fires while grounded, so holding it simply re-jumps on landing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub horizontal: Option<Facing>,
    pub jump: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
}

impl Player {
    /// Collision box, roughly the size of the player sprite.
    pub const HALF_WIDTH: f32 = 15.0;
    pub const HEIGHT: f32 = 50.0;

    pub fn new(x: f32, feet_y: f32) -> Self {
        Player {
            body: Body::new(x, feet_y, Self::HALF_WIDTH, Self::HEIGHT),
        }
    }
}

/// The ladder hangs from `y` (its top) downward by `height`.
/// It has no physics body and never collides.
#[derive(Clone, Debug)]
pub struct Ladder {
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

impl Ladder {
    pub const HEIGHT: f32 = 120.0;

    /// Place with its bottom resting at `bottom_y`.
    pub fn resting(x: f32, bottom_y: f32) -> Self {
        Ladder {
            x,
            y: bottom_y - Self::HEIGHT,
            height: Self::HEIGHT,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Clickable logo anchored at its centre.
#[derive(Clone, Debug)]
pub struct Logo {
    pub x: f32,
    pub y: f32,
    pub half_extent: f32,
}

impl Logo {
    /// Distance from the top-right corner.
    pub const INSET: f32 = 50.0;

    pub fn top_right(viewport_width: f32) -> Self {
        Logo { x: viewport_width - Self::INSET, y: Self::INSET, half_extent: 20.0 }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        (px - self.x).abs() <= self.half_extent && (py - self.y).abs() <= self.half_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_ladder_bottom_matches() {
        let l = Ladder::resting(200.0, 400.0);
        assert_eq!(l.bottom(), 400.0);
        assert_eq!(l.y, 400.0 - Ladder::HEIGHT);
    }

    #[test]
    fn logo_hit_box() {
        let logo = Logo::top_right(800.0);
        assert_eq!((logo.x, logo.y), (750.0, 50.0));
        assert!(logo.contains(750.0, 50.0));
        assert!(logo.contains(765.0, 35.0));
        assert!(!logo.contains(700.0, 50.0));
        assert!(!logo.contains(750.0, 100.0));
    }
}
