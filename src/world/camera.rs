use crate::math::Vec2Ext;
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

/// Angular bias applied when a requested direction lands exactly on an
/// axis (0, ±π/2, π). At those angles the ray-vs-wall intersection
/// solver divides by a term that goes to zero; nudging the angle by a
/// quantity far smaller than any visible pixel keeps it well-conditioned.
pub const DIR_BIAS: f32 = 1e-4;

pub const MIN_FOV: f32 = 0.01;
pub const MAX_FOV: f32 = PI - 0.01;

/// Player view-point in the tile grid.
///
/// `dir` is the unit view direction; `plane` is perpendicular to `dir`
/// (rotated clockwise) with magnitude `tan(fov/2)`. Every screen column
/// samples one point along `dir + plane * camX` for `camX in [-1,1]`.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec2,
    dir: Vec2,
    plane: Vec2,
    fov: f32,
}

impl Camera {
    pub fn new(pos: Vec2, direction: f32, fov: f32) -> Self {
        let fov = fov.clamp(MIN_FOV, MAX_FOV);
        let dir = Self::biased_dir(direction);
        let plane = dir.perp_cw() * (fov * 0.5).tan();
        Self {
            pos,
            dir,
            plane,
            fov,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    #[inline]
    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// `1 / (2 * tan(fov/2))`, the constant factor in the perpendicular
    /// distance -> screen-space line-height formula (SPEC_FULL.md §4.4).
    #[inline]
    pub fn pcm(&self) -> f32 {
        1.0 / (2.0 * (self.fov * 0.5).tan())
    }

    fn biased_dir(radians: f32) -> Vec2 {
        let lands_on_axis = radians == 0.0
            || radians == PI
            || radians == FRAC_PI_2
            || radians == -FRAC_PI_2;
        let theta = if lands_on_axis {
            radians + DIR_BIAS
        } else {
            radians
        };
        Vec2::new(theta.cos(), theta.sin())
    }

    /// Point the camera at an absolute heading in radians.
    pub fn set_direction(&mut self, radians: f32) {
        let dir = Self::biased_dir(radians);
        let mag = self.plane.length();
        self.dir = dir;
        self.plane = dir.perp_cw() * mag;
    }

    /// Rotate the current heading by `delta` radians.
    pub fn change_direction(&mut self, delta: f32) {
        let current = self.dir.y.atan2(self.dir.x);
        self.set_direction(current + delta);
    }

    /// Change the field of view, rescaling the plane vector to match.
    pub fn set_field_of_view(&mut self, fov: f32) {
        self.fov = fov.clamp(MIN_FOV, MAX_FOV);
        self.plane = self.dir.perp_cw() * (self.fov * 0.5).tan();
    }

    /// Translate the eye position in world space.
    pub fn change_position(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    /// Move `forward` units along `dir` and `side` units along the
    /// camera's right axis (derived from `plane`, not scaled by it).
    pub fn step(&mut self, forward: f32, side: f32) {
        let right = self.dir.perp_cw().normalize_or_zero();
        self.pos += self.dir * forward + right * side;
    }
}
