//! Continuous collision: ray-vs-rect slab test and swept AABB

use crate::physics::rect::Rect;
use glam::Vec2;

/// Velocities below this on both axes are treated as stationary
pub const SWEEP_EPSILON: f32 = 1e-4;

/// Where and when a ray or swept box first touches a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub point: Vec2,
    /// Surface normal at the hit, zero for an exact corner hit
    pub normal: Vec2,
    /// Fraction of the ray length at first contact
    pub time: f32,
}

/// Slab-method ray test. `direction` is not normalized: `time` is a fraction of it.
pub fn ray_vs_rect(origin: Vec2, direction: Vec2, target: &Rect) -> Option<Contact> {
    // IEEE division: zero components become infinities, and 0 * inf becomes NaN
    let inv = Vec2::ONE / direction;
    let mut t_near = (target.min() - origin) * inv;
    let mut t_far = (target.max() - origin) * inv;

    if t_near.is_nan() || t_far.is_nan() {
        return None;
    }

    if t_near.x > t_far.x {
        std::mem::swap(&mut t_near.x, &mut t_far.x);
    }
    if t_near.y > t_far.y {
        std::mem::swap(&mut t_near.y, &mut t_far.y);
    }

    if t_near.x > t_far.y || t_near.y > t_far.x {
        return None;
    }

    let time = t_near.x.max(t_near.y);
    let t_hit_far = t_far.x.min(t_far.y);
    if t_hit_far < 0.0 {
        return None;
    }

    let normal = if t_near.x > t_near.y {
        if direction.x < 0.0 {
            Vec2::X
        } else {
            Vec2::NEG_X
        }
    } else if t_near.x < t_near.y {
        if direction.y < 0.0 {
            Vec2::Y
        } else {
            Vec2::NEG_Y
        }
    } else {
        Vec2::ZERO
    };

    Some(Contact {
        point: origin + direction * time,
        normal,
        time,
    })
}

/// Swept test of a moving box against a static one.
///
/// The target is grown by the body's half size and the body's center is cast
/// along `velocity * dt * (w + h) / length_divisor`. Only contacts with
/// `time` in `[0, 1)` are reported.
pub fn sweep(body: &Rect, velocity: Vec2, dt: f32, target: &Rect, length_divisor: f32) -> Option<Contact> {
    if velocity.x.abs() < SWEEP_EPSILON && velocity.y.abs() < SWEEP_EPSILON {
        return None;
    }

    let expanded = target.expanded(body.size * 0.5);
    let ray = velocity * dt * ((body.size.x + body.size.y) / length_divisor);

    ray_vs_rect(body.center(), ray, &expanded).filter(|c| (0.0..1.0).contains(&c.time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_reports_side_contact() {
        let body = Rect::from_xywh(0.0, 0.0, 16.0, 24.0);
        let wall = Rect::from_xywh(20.0, 0.0, 16.0, 16.0);

        let contact = sweep(&body, Vec2::new(100.0, 0.0), 0.1, &wall, 8.0).expect("contact");
        assert!((0.0..1.0).contains(&contact.time));
        assert_eq!(contact.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_sweep_ignores_stationary_body() {
        let body = Rect::from_xywh(0.0, 0.0, 16.0, 24.0);
        let wall = Rect::from_xywh(10.0, 0.0, 16.0, 16.0);
        assert!(sweep(&body, Vec2::new(0.00001, 0.0), 1.0, &wall, 8.0).is_none());
    }

    #[test]
    fn test_sweep_misses_when_moving_away() {
        let body = Rect::from_xywh(0.0, 0.0, 16.0, 24.0);
        let wall = Rect::from_xywh(20.0, 0.0, 16.0, 16.0);
        assert!(sweep(&body, Vec2::new(-100.0, 0.0), 0.1, &wall, 8.0).is_none());
    }

    #[test]
    fn test_sweep_out_of_reach_this_step() {
        let body = Rect::from_xywh(0.0, 0.0, 16.0, 24.0);
        let wall = Rect::from_xywh(400.0, 0.0, 16.0, 16.0);
        assert!(sweep(&body, Vec2::new(100.0, 0.0), 0.1, &wall, 8.0).is_none());
    }

    #[test]
    fn test_ray_zero_component_on_edge_is_nan() {
        // Origin lies exactly on the target's top edge with no vertical motion
        let target = Rect::from_xywh(10.0, 0.0, 10.0, 10.0);
        assert!(ray_vs_rect(Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0), &target).is_none());
    }

    #[test]
    fn test_ray_vertical_hit_from_above() {
        let target = Rect::from_xywh(0.0, 10.0, 10.0, 10.0);
        let contact = ray_vs_rect(Vec2::new(5.0, 0.0), Vec2::new(0.0, 20.0), &target).expect("hit");
        assert_eq!(contact.normal, Vec2::new(0.0, -1.0));
        assert!((contact.time - 0.5).abs() < 1e-6);
        assert_eq!(contact.point, Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_ray_disjoint_slabs() {
        let target = Rect::from_xywh(10.0, 10.0, 5.0, 5.0);
        assert!(ray_vs_rect(Vec2::ZERO, Vec2::new(20.0, 2.0), &target).is_none());
    }
}
