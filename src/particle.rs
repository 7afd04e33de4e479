use nalgebra::{Point2, Vector2};

use crate::render::Hsl;

const SATURATION: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Point2<f64>,
    velocity: Vector2<f64>,
    pub size: f64,
    pub hue: f64,
    multiplier: f64,
}

/// What the renderer needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub center: Point2<f64>,
    pub radius: f64,
    pub fill: Hsl,
}

impl Particle {
    /// `direction` is in radians, `hue` in degrees.
    pub fn new(position: Point2<f64>, size: f64, speed: f64, direction: f64, hue: f64) -> Self {
        Particle {
            position,
            velocity: Vector2::new(direction.cos() * speed, direction.sin() * speed),
            size,
            hue,
            multiplier: 1.0,
        }
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Keeps the current direction.
    pub fn set_speed(&mut self, speed: f64) {
        let direction = self.direction();
        self.velocity = Vector2::new(direction.cos() * speed, direction.sin() * speed);
    }

    pub fn direction(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }

    /// Keeps the current speed.
    pub fn set_direction(&mut self, direction: f64) {
        let speed = self.speed();
        self.velocity = Vector2::new(direction.cos() * speed, direction.sin() * speed);
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }

    pub fn effective_radius(&self) -> f64 {
        self.size * self.multiplier
    }

    pub fn lightness(&self) -> f64 {
        if self.multiplier > 1.0 {
            100.0 - self.multiplier * 10.0
        } else {
            100.0
        }
    }

    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            center: self.position,
            radius: self.effective_radius(),
            fill: Hsl {
                hue: self.hue,
                saturation: SATURATION,
                lightness: self.lightness(),
            },
        }
    }

    pub fn distance_to(&self, other: &Particle) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }

    /// Moves the particle one tick inside a `width` x `height` surface.
    ///
    /// While the multiplier is not 1 the speed is raised by half the multiplier
    /// for the move and lowered again afterwards, so the particle only drifts
    /// faster while hovered.
    pub fn update(&mut self, width: f64, height: f64) {
        let increment = if self.multiplier != 1.0 {
            self.multiplier / 2.0
        } else {
            0.0
        };
        if increment != 0.0 {
            self.set_speed(self.speed() + increment);
        }

        reflect_axis(&mut self.position.x, &mut self.velocity.x, self.size, width);
        reflect_axis(&mut self.position.y, &mut self.velocity.y, self.size, height);

        if increment != 0.0 {
            self.set_speed(self.speed() - increment);
        }
    }
}

/// Advances one axis, or bounces off the edge the move would cross and snaps
/// the particle to that edge.
fn reflect_axis(position: &mut f64, velocity: &mut f64, size: f64, bound: f64) {
    let next = *position + *velocity;
    if next + size > bound {
        *velocity = -*velocity;
        *position = bound - size;
    } else if next - size < 0.0 {
        *velocity = -*velocity;
        *position = size;
    } else {
        *position = next;
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn particle_at(x: f64, y: f64, speed: f64, direction: f64) -> Particle {
        Particle::new(Point2::new(x, y), 5.0, speed, direction, 120.0)
    }

    #[test]
    fn moves_by_velocity() {
        let mut particle = particle_at(50.0, 50.0, 2.0, 0.0);
        particle.update(100.0, 100.0);
        assert!((particle.position.x - 52.0).abs() < EPSILON);
        assert!((particle.position.y - 50.0).abs() < EPSILON);
    }

    #[test]
    fn reflects_off_the_right_edge() {
        let mut particle = particle_at(93.0, 50.0, 3.0, 0.0);
        particle.update(100.0, 100.0);
        assert_eq!(particle.position.x, 95.0);
        assert!(particle.velocity().x < 0.0);

        particle.update(100.0, 100.0);
        assert!((particle.position.x - 92.0).abs() < EPSILON);
        assert!(particle.velocity().x < 0.0);
    }

    #[test]
    fn reflects_off_the_top_edge() {
        let mut particle = particle_at(50.0, 6.0, 2.0, -FRAC_PI_2);
        particle.update(100.0, 100.0);
        assert_eq!(particle.position.y, 5.0);
        assert!(particle.velocity().y > 0.0);
    }

    #[test]
    fn reflects_off_the_left_and_bottom_edges_at_once() {
        let mut particle = particle_at(6.0, 94.0, 4.0, 3.0 * PI / 4.0);
        particle.update(100.0, 100.0);
        assert_eq!(particle.position.x, 5.0);
        assert_eq!(particle.position.y, 95.0);
        assert!(particle.velocity().x > 0.0);
        assert!(particle.velocity().y < 0.0);
    }

    #[test]
    fn stays_in_bounds() {
        let mut particle = Particle::new(Point2::new(20.0, 30.0), 4.0, 7.3, 0.9, 0.0);
        particle.set_multiplier(2.5);
        for _ in 0..10_000 {
            particle.update(64.0, 48.0);
            assert!(particle.position.x >= 4.0 && particle.position.x <= 60.0);
            assert!(particle.position.y >= 4.0 && particle.position.y <= 44.0);
        }
    }

    #[test]
    fn multiplier_boosts_only_the_move() {
        let mut particle = particle_at(20.0, 50.0, 0.3, 0.0);
        particle.set_multiplier(2.0);
        particle.update(100.0, 100.0);
        assert!((particle.position.x - 21.3).abs() < EPSILON);
        assert!((particle.speed() - 0.3).abs() < EPSILON);

        particle.set_multiplier(1.0);
        particle.update(100.0, 100.0);
        assert!((particle.position.x - 21.6).abs() < EPSILON);
    }

    #[test]
    fn render_params_follow_multiplier() {
        let mut particle = particle_at(10.0, 20.0, 1.0, 0.0);
        let params = particle.render_params();
        assert_eq!(params.center, Point2::new(10.0, 20.0));
        assert_eq!(params.radius, 5.0);
        assert_eq!(params.fill.lightness, 100.0);
        assert_eq!(params.fill.saturation, 100.0);
        assert_eq!(params.fill.hue, 120.0);

        particle.set_multiplier(2.0);
        let params = particle.render_params();
        assert_eq!(params.radius, 10.0);
        assert_eq!(params.fill.lightness, 80.0);

        particle.set_multiplier(0.5);
        assert_eq!(particle.render_params().fill.lightness, 100.0);

        particle.set_multiplier(20.0);
        assert_eq!(particle.render_params().fill.lightness, -100.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = particle_at(1.5, -3.25, 0.0, 0.0);
        let b = particle_at(-7.0, 12.0, 0.0, 0.0);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert_eq!(particle_at(0.0, 0.0, 0.0, 0.0).distance_to(&particle_at(3.0, 4.0, 0.0, 0.0)), 5.0);
    }

    #[test]
    fn speed_and_direction_accessors() {
        let mut particle = particle_at(50.0, 50.0, 2.0, FRAC_PI_2);
        assert!((particle.speed() - 2.0).abs() < EPSILON);
        assert!((particle.direction() - FRAC_PI_2).abs() < EPSILON);
        particle.set_direction(PI);
        assert!((particle.velocity().x + 2.0).abs() < EPSILON);
        particle.set_speed(0.5);
        assert!((particle.speed() - 0.5).abs() < EPSILON);
        assert!((particle.direction() - PI).abs() < EPSILON);
    }
}
