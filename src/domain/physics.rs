/// Arcade physics: one dynamic body against a flat floor and the
/// world's side/top bounds.
///
/// ## Coordinates
///
/// World units, origin top-left, y grows downward. A body is anchored at
/// its feet: `(x, y)` is the bottom-centre point. The body occupies
/// `[x - half_width, x + half_width] × [y - height, y]`.
///
/// ## Integration (semi-implicit Euler)
///
///   1. `vy += gravity · dt`
///   2. `x += vx · dt`, `y += vy · dt`
///   3. Floor: feet at or below `floor_y` while falling → snap to floor,
///      `vy = 0`, `touching_down = true`
///   4. Sides: clamp `x` into `[half_width, world_width - half_width]`
///   5. Top: head above 0 → snap, zero upward velocity

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsParams {
    /// Downward acceleration in units/s².
    pub gravity: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        PhysicsParams { gravity: 800.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub half_width: f32,
    pub height: f32,
    /// Resting on the floor after the last integration.
    pub touching_down: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, half_width: f32, height: f32) -> Self {
        Body { x, y, vx: 0.0, vy: 0.0, half_width, height, touching_down: false }
    }

    #[inline]
    pub fn airborne(&self) -> bool {
        !self.touching_down
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y - self.height
    }
}

/// Advance `body` by `dt` seconds.
pub fn integrate(body: &mut Body, params: &PhysicsParams, dt: f32, floor_y: f32, world_width: f32) {
    if dt <= 0.0 { return; }

    body.vy += params.gravity * dt;
    body.x += body.vx * dt;
    body.y += body.vy * dt;

    // Floor
    if body.y >= floor_y && body.vy >= 0.0 {
        body.y = floor_y;
        body.vy = 0.0;
        body.touching_down = true;
    } else {
        body.touching_down = false;
    }

    // Sides
    let min_x = body.half_width;
    let max_x = (world_width - body.half_width).max(min_x);
    if body.x < min_x {
        body.x = min_x;
        body.vx = 0.0;
    } else if body.x > max_x {
        body.x = max_x;
        body.vx = 0.0;
    }

    // Top
    if body.top() < 0.0 {
        body.y = body.height;
        if body.vy < 0.0 { body.vy = 0.0; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f32 = 450.0;
    const WIDTH: f32 = 800.0;
    const DT: f32 = 1.0 / 60.0;

    fn grounded_body(x: f32) -> Body {
        let mut b = Body::new(x, FLOOR, 10.0, 40.0);
        integrate(&mut b, &PhysicsParams::default(), DT, FLOOR, WIDTH);
        b
    }

    #[test]
    fn resting_body_stays_on_floor() {
        let mut b = grounded_body(400.0);
        assert!(b.touching_down);
        for _ in 0..120 {
            integrate(&mut b, &PhysicsParams::default(), DT, FLOOR, WIDTH);
        }
        assert!(b.touching_down);
        assert_eq!(b.y, FLOOR);
        assert_eq!(b.vy, 0.0);
    }

    #[test]
    fn jump_leaves_floor_and_lands_again() {
        let params = PhysicsParams::default();
        let mut b = grounded_body(400.0);
        b.vy = -500.0;
        integrate(&mut b, &params, DT, FLOOR, WIDTH);
        assert!(b.airborne());
        assert!(b.y < FLOOR);

        let mut peak = b.y;
        let mut frames = 0;
        while b.airborne() && frames < 600 {
            integrate(&mut b, &params, DT, FLOOR, WIDTH);
            peak = peak.min(b.y);
            frames += 1;
        }
        assert!(b.touching_down, "never landed");
        // v²/2g = 156.25; Euler steps land close to that
        let height = FLOOR - peak;
        assert!((140.0..=170.0).contains(&height), "jump height {}", height);
        // Flight time ≈ 2·500/800 = 1.25s = 75 frames
        assert!((65..=85).contains(&frames), "flight {} frames", frames);
    }

    #[test]
    fn sides_clamp_position_and_velocity() {
        let params = PhysicsParams::default();
        let mut b = grounded_body(15.0);
        b.vx = -300.0;
        for _ in 0..30 {
            integrate(&mut b, &params, DT, FLOOR, WIDTH);
            assert!(b.x >= b.half_width);
        }
        assert_eq!(b.x, b.half_width);
        assert_eq!(b.vx, 0.0);

        b.vx = 300.0;
        for _ in 0..300 {
            integrate(&mut b, &params, DT, FLOOR, WIDTH);
            assert!(b.x <= WIDTH - b.half_width);
        }
        assert_eq!(b.x, WIDTH - b.half_width);
    }

    #[test]
    fn head_cannot_leave_top_of_world() {
        let params = PhysicsParams::default();
        let mut b = grounded_body(400.0);
        b.vy = -100_000.0;
        integrate(&mut b, &params, DT, FLOOR, WIDTH);
        assert_eq!(b.top(), 0.0);
        assert_eq!(b.vy, 0.0);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut b = Body::new(100.0, 200.0, 10.0, 40.0);
        let before = b;
        integrate(&mut b, &PhysicsParams::default(), 0.0, FLOOR, WIDTH);
        assert_eq!(b, before);
    }
}
