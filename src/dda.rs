//! Grid traversal: steps one tile at a time along a ray until it hits an
//! occupied tile, leaves the grid, or exceeds the configured distance.

use bitflags::bitflags;
use glam::Vec2;

use crate::world::{Scene, TileId};

/// Upper bound substituted for `1/0` when a ray is exactly axis-aligned,
/// so `delta_x`/`delta_y` stay finite without branching at every step.
const MAX_DD: f32 = 1e10;

bitflags! {
    /// Outcome of the most recent [`Dda::next`] call.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RayFlags: u8 {
        /// Stepped into a tile, nothing resolved yet.
        const CLEAR   = 0b00001;
        /// Stepped into a tile with a nonzero id.
        const HIT     = 0b00010;
        /// Entered the new tile across an X-axis boundary (vs Y-axis).
        const SIDE    = 0b00100;
        /// Exceeded `max_tile_dist` before finding anything.
        const TOO_FAR = 0b01000;
        /// Left the scene bounds.
        const OUTSIDE = 0b10000;
        /// Not initialised / exhausted.
        const FAIL    = 0;
    }
}

/// One tile visited by the walk.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub tile: (i32, i32),
    pub tile_id: TileId,
    /// World-space point where the ray entered `tile`.
    pub entry: Vec2,
    pub flags: RayFlags,
    /// Euclidean distance travelled along the ray to reach `entry`.
    pub distance: f32,
}

/// Stateful grid-DDA walker. Construct with [`Dda::new`], then pull hits
/// with [`Dda::next`] until it returns `None`.
pub struct Dda<'a> {
    scene: &'a Scene,
    start: Vec2,
    dir: Vec2,
    max_tile_dist_sq: f32,

    tile: (i32, i32),
    origin_tile: (i32, i32),
    step: (i32, i32),
    side_dist: Vec2,
    delta_dist: Vec2,
    side: RayFlags,
    emitted_origin: bool,
    done: bool,
}

impl<'a> Dda<'a> {
    pub fn new(scene: &'a Scene, start: Vec2, dir: Vec2, max_tile_dist: f32) -> Self {
        let tile = (start.x.floor() as i32, start.y.floor() as i32);

        let delta_dist = Vec2::new(
            if dir.x == 0.0 { MAX_DD } else { (1.0 / dir.x).abs() },
            if dir.y == 0.0 { MAX_DD } else { (1.0 / dir.y).abs() },
        );

        let (step_x, side_x) = if dir.x < 0.0 {
            (-1, (start.x - tile.0 as f32) * delta_dist.x)
        } else {
            (1, (tile.0 as f32 + 1.0 - start.x) * delta_dist.x)
        };
        let (step_y, side_y) = if dir.y < 0.0 {
            (-1, (start.y - tile.1 as f32) * delta_dist.y)
        } else {
            (1, (tile.1 as f32 + 1.0 - start.y) * delta_dist.y)
        };

        Self {
            scene,
            start,
            dir,
            max_tile_dist_sq: max_tile_dist * max_tile_dist,
            tile,
            origin_tile: tile,
            step: (step_x, step_y),
            side_dist: Vec2::new(side_x, side_y),
            delta_dist,
            side: RayFlags::CLEAR,
            emitted_origin: false,
            done: false,
        }
    }

    /// Advance the walk by one tile and return what was found there, or
    /// `None` once the walk has terminated (too far, out of bounds, or a
    /// blocking hit already consumed by the caller).
    pub fn next(&mut self) -> Option<RayHit> {
        if self.done {
            return None;
        }

        if !self.emitted_origin {
            self.emitted_origin = true;
            return Some(self.make_hit(self.start, 0.0, RayFlags::CLEAR));
        }

        if self.side_dist.x < self.side_dist.y {
            self.side_dist.x += self.delta_dist.x;
            self.tile.0 += self.step.0;
            self.side = RayFlags::SIDE;
        } else {
            self.side_dist.y += self.delta_dist.y;
            self.tile.1 += self.step.1;
            self.side = RayFlags::CLEAR;
        }

        let di = (self.tile.0 - self.origin_tile.0) as f32;
        let dj = (self.tile.1 - self.origin_tile.1) as f32;
        if di * di + dj * dj > self.max_tile_dist_sq {
            self.done = true;
            return None;
        }

        if !self.scene.in_bounds(self.tile.0, self.tile.1) {
            self.done = true;
            return None;
        }

        let distance = if self.side == RayFlags::SIDE {
            self.side_dist.x - self.delta_dist.x
        } else {
            self.side_dist.y - self.delta_dist.y
        };
        let entry = self.start + self.dir * distance;

        Some(self.make_hit(entry, distance, self.side))
    }

    fn make_hit(&self, entry: Vec2, distance: f32, side: RayFlags) -> RayHit {
        let tile_id = self.scene.tile_at(self.tile.0, self.tile.1);
        let mut flags = side;
        if tile_id != 0 {
            flags |= RayFlags::HIT;
        }
        RayHit {
            tile: self.tile,
            tile_id,
            entry,
            flags,
            distance,
        }
    }
}
