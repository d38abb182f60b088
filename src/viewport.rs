use crate::config::MagnifierConfig;
use crate::constants::MAX_ANALOG_MAGNITUDE;
use crate::filter::sign;
use crate::types::{FilteredStick, Point, ViewportState};

/// Turns filtered right-stick input into a bounded screen position.
///
/// Velocity accelerates while the stick is deflected and brakes toward zero
/// when it is centered. Position integrates velocity once per update and is
/// clamped to the screen.
#[derive(Clone, Debug)]
pub struct ViewportController {
    state: ViewportState,
    screen: Point,
    lens_half: Point,
    max_speed: f32,
    brake: f32,
    accel_multiplier: f32,
    max_magnitude: f32,
}

impl ViewportController {
    /// Controller centered on the configured screen, at rest.
    pub fn new(config: &MagnifierConfig) -> Self {
        Self {
            state: ViewportState {
                position: config.screen.center(),
                velocity: Point::default(),
            },
            screen: Point::new(config.screen.width as f32, config.screen.height as f32),
            lens_half: Point::new(
                (config.lens_width / 2) as f32,
                (config.lens_height / 2) as f32,
            ),
            max_speed: config.max_speed,
            brake: config.brake,
            accel_multiplier: config.accel_multiplier,
            max_magnitude: MAX_ANALOG_MAGNITUDE,
        }
    }

    pub fn with_state(mut self, state: ViewportState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    pub fn velocity(&self) -> Point {
        self.state.velocity
    }

    /// Advance one tick.
    ///
    /// Velocity is always updated. When `integrate` is false (frozen, or the
    /// overlay is hidden) the position and its clamp are left untouched.
    pub fn update(&mut self, stick: FilteredStick, integrate: bool) -> Point {
        self.state.velocity.x = self.step_velocity(self.state.velocity.x, stick.x);
        self.state.velocity.y = self.step_velocity(self.state.velocity.y, stick.y);

        if integrate {
            self.state.position.x += self.state.velocity.x;
            self.state.position.y += self.state.velocity.y;
            self.clamp_position();
        }

        log::trace!(
            "stick=({:.0},{:.0}) velocity=({:.2},{:.2}) position=({:.1},{:.1}) integrate={}",
            stick.x,
            stick.y,
            self.state.velocity.x,
            self.state.velocity.y,
            self.state.position.x,
            self.state.position.y,
            integrate
        );

        self.state.position
    }

    fn step_velocity(&self, velocity: f32, input: f32) -> f32 {
        let ratio = input / self.max_magnitude;
        let mut v = velocity;

        if input > 0.0 {
            v += ratio.abs() * self.accel_multiplier;
        } else if input < 0.0 {
            v -= ratio.abs() * self.accel_multiplier;
        } else {
            if v > 0.0 {
                v -= self.brake;
                if v < 0.0 {
                    v = 0.0;
                }
            }
            if v < 0.0 {
                v += self.brake;
                if v > 0.0 {
                    v = 0.0;
                }
            }
        }

        // Clamped toward the stick's direction, not the velocity's. With a
        // centered stick an over-limit velocity therefore snaps to zero.
        if v.abs() > self.max_speed {
            v = self.max_speed * sign(input);
        }

        v
    }

    fn clamp_position(&mut self) {
        let p = &mut self.state.position;

        // The lens half-extent appears on both sides of the comparison, so the
        // effective bound is the screen edge itself.
        if p.x + self.lens_half.x > self.screen.x + self.lens_half.x {
            p.x = self.screen.x - 1.0;
        }
        if p.x < 0.0 {
            p.x = 0.0;
        }
        if p.y + self.lens_half.y > self.screen.y + self.lens_half.y {
            p.y = self.screen.y - 1.0;
        }
        if p.y < 0.0 {
            p.y = 0.0;
        }
    }
}
