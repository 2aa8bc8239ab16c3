use eframe::egui::{Pos2, Rect, Vec2};
use glam::Vec3;

const MIN_DISTANCE: f32 = 30.0;
const MAX_DISTANCE: f32 = 400.0;
/// Distance at which the level-of-detail zoom reaches zero.
const ZOOM_FADE_DISTANCE: f32 = 500.0;
const FOCUS_DISTANCE: f32 = 77.0;
const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_3;
const NEAR_PLANE: f32 = 1.0;
const FOCUS_RATE: f32 = 4.0;

/// Orbit camera around a target point, projected with a perspective divide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle (radians).
    pub yaw: f32,
    /// Vertical rotation angle (radians).
    pub pitch: f32,
    /// Distance from target.
    pub distance: f32,
    pub target: Vec3,
    /// Where an in-progress focus animation is heading.
    goal: Option<(Vec3, f32)>,
}

/// A world point mapped into the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub screen: Pos2,
    /// Pixels per world unit at this depth.
    pub scale: f32,
    pub depth: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.4,
            distance: 234.0,
            target: Vec3::ZERO,
            goal: None,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn orbit(&mut self, drag: Vec2) {
        self.yaw -= drag.x * 0.01;
        self.pitch = (self.pitch + drag.y * 0.01).clamp(-1.5, 1.5);
    }

    pub fn zoom_by(&mut self, scroll: f32) {
        let factor = (1.0 - scroll * 0.0018).clamp(0.85, 1.15);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Level-of-detail factor in `[0, 1]` derived from how close the camera is.
    pub fn zoom_level(&self) -> f32 {
        (1.0 - self.distance / ZOOM_FADE_DISTANCE).clamp(0.0, 1.0)
    }

    /// Starts easing the camera towards `point`.
    pub fn focus_on(&mut self, point: Vec3) {
        if point.is_finite() {
            self.goal = Some((point, FOCUS_DISTANCE));
        }
    }

    pub fn is_animating(&self) -> bool {
        self.goal.is_some()
    }

    /// Advances the focus animation by `dt` seconds.
    pub fn animate(&mut self, dt: f32) {
        let Some((goal, distance)) = self.goal else {
            return;
        };
        let t = 1.0 - (-dt.max(0.0) * FOCUS_RATE).exp();
        self.target = self.target.lerp(goal, t);
        self.distance += (distance - self.distance) * t;

        if self.target.distance(goal) < 0.05 && (self.distance - distance).abs() < 0.05 {
            self.target = goal;
            self.distance = distance;
            self.goal = None;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Projects a world point onto `rect`. Points behind the near plane yield `None`.
    pub fn project(&self, rect: Rect, point: Vec3) -> Option<Projected> {
        let eye = self.eye();
        let forward = (self.target - eye).normalize_or_zero();
        if forward == Vec3::ZERO {
            return None;
        }
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);

        let relative = point - eye;
        let depth = relative.dot(forward);
        if depth < NEAR_PLANE || !depth.is_finite() {
            return None;
        }

        let focal = (rect.height() * 0.5) / (FIELD_OF_VIEW * 0.5).tan();
        let scale = focal / depth;
        let screen = rect.center()
            + Vec2::new(relative.dot(right) * scale, -relative.dot(up) * scale);

        Some(Projected {
            screen,
            scale,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn target_projects_to_the_center() {
        let camera = OrbitCamera::default();
        let projected = camera.project(canvas(), Vec3::ZERO).expect("in front");
        assert!(approx_eq!(f32, projected.screen.x, 400.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, projected.screen.y, 300.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, projected.depth, camera.distance, epsilon = 1e-2));
    }

    #[test]
    fn nearer_points_draw_larger() {
        let camera = OrbitCamera::default();
        let eye = camera.eye();
        let near = camera.project(canvas(), eye * 0.5).expect("near point");
        let far = camera.project(canvas(), -eye).expect("far point");
        assert!(near.scale > far.scale);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let camera = OrbitCamera::default();
        assert!(camera.project(canvas(), camera.eye() * 2.0).is_none());
    }

    #[test]
    fn higher_points_appear_higher_on_screen() {
        let camera = OrbitCamera::default();
        let low = camera.project(canvas(), Vec3::ZERO).expect("low");
        let high = camera.project(canvas(), Vec3::new(0.0, 20.0, 0.0)).expect("high");
        assert!(high.screen.y < low.screen.y);
    }

    #[test]
    fn zoom_is_clamped_and_drives_level_of_detail() {
        let mut camera = OrbitCamera::default();
        let before = camera.zoom_level();
        camera.zoom_by(100.0);
        assert!(camera.zoom_level() > before);

        for _ in 0..200 {
            camera.zoom_by(-100.0);
        }
        assert_eq!(camera.distance, MAX_DISTANCE);
        assert!(approx_eq!(f32, camera.zoom_level(), 0.2, epsilon = 1e-6));
    }

    #[test]
    fn focus_animation_converges_on_the_goal() {
        let mut camera = OrbitCamera::default();
        let goal = Vec3::new(40.0, -10.0, 25.0);
        camera.focus_on(goal);
        assert!(camera.is_animating());

        for _ in 0..600 {
            camera.animate(1.0 / 60.0);
        }
        assert!(!camera.is_animating());
        assert_eq!(camera.target, goal);
        assert_eq!(camera.distance, FOCUS_DISTANCE);
    }

    #[test]
    fn non_finite_focus_is_ignored() {
        let mut camera = OrbitCamera::default();
        camera.focus_on(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!camera.is_animating());
    }
}
