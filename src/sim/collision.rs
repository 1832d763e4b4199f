//! Collision detection and response for circles and capsules
//!
//! Detection is purely positional (overlap tests on the working positions);
//! response is a 2D elastic impulse along the contact normal. Walls take part
//! in the impulse through a short-lived proxy circle placed at the closest
//! point of the wall.

use glam::Vec2;

use super::segment::LineSegment;
use crate::consts::EPSILON;

/// Result of an overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point on the other shape (closest point for segments)
    pub point: Vec2,
    /// Unit normal pointing from the other shape toward the tested circle
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Ephemeral stand-in for a wall contact: an immovable circle sitting at the
/// closest point of the segment. Never stored, rendered or bonded.
#[derive(Debug, Clone, Copy)]
pub struct ProxyBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub mass: f32,
}

impl ProxyBody {
    /// Proxy for a wall hit: mirrors the colliding body's velocity and mass
    pub fn for_wall(point: Vec2, wall_radius: f32, body_velocity: Vec2, body_mass: f32) -> Self {
        Self {
            position: point,
            velocity: -body_velocity,
            radius: wall_radius,
            mass: body_mass,
        }
    }

    pub fn impactor(&self) -> Impactor {
        Impactor {
            position: self.position,
            velocity: self.velocity,
            mass: self.mass,
        }
    }
}

/// The state an impulse needs from one side of a contact
#[derive(Debug, Clone, Copy)]
pub struct Impactor {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
}

/// Check a circle against a capsule segment
///
/// Touching counts as a hit (`distance <= reach`). When the centre lies
/// exactly on the segment the normal falls back to the segment normal on the
/// side of `prev_pos`, so a tunnelling body is pushed back where it came from.
pub fn ball_segment_collision(
    pos: Vec2,
    radius: f32,
    prev_pos: Vec2,
    segment: &LineSegment,
) -> CollisionResult {
    let closest = segment.closest_point(pos);
    let offset = pos - closest;
    let dist = offset.length();
    let reach = radius + segment.radius;

    if dist > reach {
        return CollisionResult::miss();
    }

    let normal = if dist > EPSILON {
        offset / dist
    } else {
        segment.normal_toward(prev_pos)
    };
    if normal == Vec2::ZERO {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        point: closest,
        normal,
        penetration: reach - dist,
    }
}

/// Check two circles for strict overlap
///
/// The normal points from `b` toward `a`. Coincident centres report a miss:
/// there is no direction to separate along.
pub fn circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let reach = a_radius + b_radius;
    let offset = a_pos - b_pos;
    let dist_sq = offset.length_squared();

    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    if dist <= EPSILON {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        point: b_pos + offset / dist * b_radius,
        normal: offset / dist,
        penetration: reach - dist,
    }
}

/// Elastic impulse between two impactors
///
/// `n = normalize(b - a)`, `p = 2 (va - vb)·n / (ma + mb)`, then
/// `va -= p mb n damp` and `vb += p ma n damp`. Returns the new velocities,
/// or `None` when the centres coincide or the pair is already separating.
pub fn elastic_impulse(a: Impactor, b: Impactor, damp: f32) -> Option<(Vec2, Vec2)> {
    let offset = b.position - a.position;
    let dist = offset.length();
    if dist <= EPSILON {
        return None;
    }
    let n = offset / dist;

    let k = a.velocity - b.velocity;
    let approach = k.dot(n);
    if approach <= 0.0 {
        return None;
    }

    let p = 2.0 * approach / (a.mass + b.mass);
    Some((
        a.velocity - p * b.mass * n * damp,
        b.velocity + p * a.mass * n * damp,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wall() -> LineSegment {
        LineSegment::new(Vec2::new(0.0, 100.0), Vec2::new(200.0, 100.0), 10.0).unwrap()
    }

    #[test]
    fn test_ball_segment_hit() {
        let result = ball_segment_collision(Vec2::new(50.0, 85.0), 8.0, Vec2::new(50.0, 80.0), &wall());
        assert!(result.hit);
        assert!((result.penetration - 3.0).abs() < 0.001);
        // Normal points back toward the ball (up, toward smaller y)
        assert!(result.normal.y < -0.99);
        assert!((result.point - Vec2::new(50.0, 100.0)).length() < 0.001);
    }

    #[test]
    fn test_ball_segment_miss() {
        let result = ball_segment_collision(Vec2::new(50.0, 70.0), 8.0, Vec2::new(50.0, 70.0), &wall());
        assert!(!result.hit);
    }

    #[test]
    fn test_ball_segment_touching_counts() {
        let result = ball_segment_collision(Vec2::new(50.0, 82.0), 8.0, Vec2::new(50.0, 82.0), &wall());
        assert!(result.hit);
        assert!(result.penetration.abs() < 0.001);
    }

    #[test]
    fn test_ball_segment_centre_on_line_uses_history() {
        let result = ball_segment_collision(Vec2::new(50.0, 100.0), 8.0, Vec2::new(50.0, 90.0), &wall());
        assert!(result.hit);
        assert!(result.normal.y < -0.99);
        assert!((result.penetration - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_circle_collision() {
        let result = circle_collision(Vec2::new(15.0, 0.0), 10.0, Vec2::ZERO, 10.0);
        assert!(result.hit);
        assert!((result.penetration - 5.0).abs() < 0.001);
        assert!((result.normal - Vec2::X).length() < 0.001);

        assert!(!circle_collision(Vec2::new(20.0, 0.0), 10.0, Vec2::ZERO, 10.0).hit);
        assert!(!circle_collision(Vec2::ZERO, 10.0, Vec2::ZERO, 10.0).hit);
    }

    #[test]
    fn test_head_on_equal_masses_swap() {
        let a = Impactor { position: Vec2::ZERO, velocity: Vec2::new(5.0, 0.0), mass: 1.0 };
        let b = Impactor { position: Vec2::new(20.0, 0.0), velocity: Vec2::new(-5.0, 0.0), mass: 1.0 };
        let (va, vb) = elastic_impulse(a, b, 1.0).unwrap();
        assert!((va - Vec2::new(-5.0, 0.0)).length() < 0.001);
        assert!((vb - Vec2::new(5.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_separating_pair_untouched() {
        let a = Impactor { position: Vec2::ZERO, velocity: Vec2::new(-5.0, 0.0), mass: 1.0 };
        let b = Impactor { position: Vec2::new(20.0, 0.0), velocity: Vec2::new(5.0, 0.0), mass: 1.0 };
        assert!(elastic_impulse(a, b, 1.0).is_none());
    }

    #[test]
    fn test_zero_damping_keeps_velocities() {
        let a = Impactor { position: Vec2::ZERO, velocity: Vec2::new(5.0, 1.0), mass: 2.0 };
        let b = Impactor { position: Vec2::new(20.0, 0.0), velocity: Vec2::ZERO, mass: 1.0 };
        let (va, vb) = elastic_impulse(a, b, 0.0).unwrap();
        assert_eq!(va, a.velocity);
        assert_eq!(vb, b.velocity);
    }

    #[test]
    fn test_wall_proxy_reflects() {
        // Ball moving straight down into a horizontal wall below it
        let velocity = Vec2::new(3.0, 40.0);
        let body = Impactor { position: Vec2::new(50.0, 85.0), velocity, mass: 2.0 };
        let proxy = ProxyBody::for_wall(Vec2::new(50.0, 100.0), 10.0, velocity, 2.0);
        let (v, _) = elastic_impulse(body, proxy.impactor(), 1.0).unwrap();
        // Mirrored off the wall: tangent kept, normal component flipped
        assert!((v - Vec2::new(3.0, -40.0)).length() < 0.001, "{:?}", v);
    }

    proptest! {
        #[test]
        fn prop_impulse_conserves_momentum(
            ma in 0.1f32..50.0,
            mb in 0.1f32..50.0,
            vax in -200.0f32..200.0,
            vay in -200.0f32..200.0,
            vbx in -200.0f32..200.0,
            vby in -200.0f32..200.0,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let a = Impactor { position: Vec2::ZERO, velocity: Vec2::new(vax, vay), mass: ma };
            let b = Impactor {
                position: crate::unit_from_angle(angle) * 20.0,
                velocity: Vec2::new(vbx, vby),
                mass: mb,
            };
            if let Some((va, vb)) = elastic_impulse(a, b, 1.0) {
                let before = a.velocity * ma + b.velocity * mb;
                let after = va * ma + vb * mb;
                let scale = 1.0 + before.length();
                prop_assert!((before - after).length() <= 1.0e-3 * scale * 50.0);

                let energy_before = 0.5 * (ma * a.velocity.length_squared() + mb * b.velocity.length_squared());
                let energy_after = 0.5 * (ma * va.length_squared() + mb * vb.length_squared());
                prop_assert!((energy_before - energy_after).abs() <= 1.0e-3 * (1.0 + energy_before));
            }
        }

        #[test]
        fn prop_circle_normal_is_unit(
            ax in -100.0f32..100.0,
            ay in -100.0f32..100.0,
            dx in -15.0f32..15.0,
            dy in -15.0f32..15.0,
        ) {
            let a = Vec2::new(ax, ay);
            let result = circle_collision(a, 10.0, a + Vec2::new(dx, dy), 10.0);
            if result.hit {
                prop_assert!((result.normal.length() - 1.0).abs() < 1.0e-3);
                prop_assert!(result.penetration > 0.0);
            }
        }
    }
}
