//! The tile grid and the oblique wall segments that live inside each tile.

use std::collections::HashMap;

use glam::Vec2;

use crate::math::LinearFunc;
use crate::world::texture::{NO_TEXTURE, TextureId};

/// Solid colour tint, 0xAARRGGBB to match [`crate::world::texture::Texture`].
pub type Tint = u32;

/// One tile id. `0` always means empty (no walls, ray passes through).
pub type TileId = u16;

/// A single oblique wall fragment living inside one tile.
///
/// `func` is expressed in tile-local `[0,1]^2` coordinates. `pivot` and
/// `length` are derived from `func` by [`Wall::update_metrics`] and used
/// to build the texture u-coordinate of any point on the segment.
#[derive(Clone, Copy, Debug)]
pub struct Wall {
    pub func: LinearFunc,
    pivot: Vec2,
    length: f32,
    pub h_min: f32,
    pub h_max: f32,
    pub tint: Tint,
    pub tex_id: TextureId,
    pub blocks_ray: bool,
}

impl Wall {
    pub fn new(func: LinearFunc, h_min: f32, h_max: f32, tint: Tint, blocks_ray: bool) -> Self {
        let mut w = Self {
            func,
            pivot: Vec2::ZERO,
            length: 0.0,
            h_min,
            h_max,
            tint,
            tex_id: NO_TEXTURE,
            blocks_ray,
        };
        w.update_metrics();
        w
    }

    /// Recompute `pivot` and `length` from `func`. Must be called again
    /// whenever `func` is mutated directly.
    pub fn update_metrics(&mut self) {
        let (a, b) = self.func.clipped_endpoints();
        self.pivot = a;
        self.length = (b - a).length();
    }

    #[inline]
    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Texture u-coordinate of a point `p` known to lie on this wall's
    /// segment, measured from `pivot`.
    pub fn u_at(&self, p: Vec2) -> f32 {
        if self.length <= 0.0 {
            0.0
        } else {
            (p - self.pivot).length() / self.length
        }
    }
}

/// A `width x height` grid of tile ids plus the oblique walls that live in
/// each occupied tile.
#[derive(Clone, Debug)]
pub struct Scene {
    width: usize,
    height: usize,
    tiles: Vec<TileId>,
    walls_by_tile: HashMap<TileId, Vec<Wall>>,
}

impl Scene {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![0; width * height],
            walls_by_tile: HashMap::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, i: i32, j: i32) -> bool {
        i >= 0 && j >= 0 && (i as usize) < self.width && (j as usize) < self.height
    }

    /// Tile id at `(i, j)`, or `0` if outside the grid.
    pub fn tile_at(&self, i: i32, j: i32) -> TileId {
        if !self.in_bounds(i, j) {
            0
        } else {
            self.tiles[j as usize * self.width + i as usize]
        }
    }

    pub fn set_tile(&mut self, i: usize, j: usize, id: TileId) {
        debug_assert!(i < self.width && j < self.height);
        self.tiles[j * self.width + i] = id;
    }

    /// Append a wall to the list for `tile_id`. No-op bookkeeping for
    /// `tile_id == 0` is the caller's responsibility to avoid; an empty
    /// tile id with walls attached is simply never reached by the DDA
    /// walk, since empty tiles are skipped before their wall list is
    /// consulted.
    pub fn add_wall(&mut self, tile_id: TileId, wall: Wall) {
        self.walls_by_tile.entry(tile_id).or_default().push(wall);
    }

    /// Ordered wall list for a tile id (empty slice if none registered).
    pub fn walls_for(&self, tile_id: TileId) -> &[Wall] {
        self.walls_by_tile
            .get(&tile_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
