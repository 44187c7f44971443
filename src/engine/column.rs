//! The per-column ray march: walks tiles with the DDA, solves ray-vs-wall
//! intersections, sorts survivors by perpendicular distance, and
//! composites them into the framebuffer while tracking which rows are
//! already opaque. This is the single busiest routine in the renderer;
//! see SPEC_FULL.md §4.4 for the derivation of every formula below.

use glam::Vec2;
use smallvec::SmallVec;

use crate::dda::{Dda, RayFlags};
use crate::engine::opaque_range::OpaqueRange;
use crate::math::frac_snapped;
use crate::renderer::Renderer;
use crate::world::{Camera, Scene, TextureBank, Wall};

/// Intercepts exactly at `height == 0` are singular in the intersection
/// formula below (the ray direction term cancels with the line's own
/// zero intercept); nudge by an amount far below one pixel.
const SAFE_LINE_HEIGHT: f32 = 1e-4;

/// Where on the framebuffer the 3D view is drawn, and how it is sampled.
#[derive(Clone, Copy, Debug)]
pub struct RenderArea {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// Tunables that do not change frame to frame.
#[derive(Clone, Copy, Debug)]
pub struct ColumnConfig {
    /// How many screen columns one cast ray paints (>=1; performance knob).
    pub columns_per_ray: usize,
    /// Row stride when writing a span (>=1; performance knob).
    pub row_stride: usize,
    /// Upper bound on tiles travelled per ray.
    pub max_tile_dist: f32,
    /// Unit-length direction light travels *from*; `None` disables shading.
    pub light_dir: Option<Vec2>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            columns_per_ray: 1,
            row_stride: 1,
            max_tile_dist: 64.0,
            light_dir: None,
        }
    }
}

struct Candidate {
    perp: f32,
    tile: (i32, i32),
    inter_local: Vec2,
    wall_idx: usize,
}

/// Render one screen column (and its `columns_per_ray - 1` repeats) of the
/// view. `screen_x` is the leftmost framebuffer column this ray covers.
pub fn render_column(
    scene: &Scene,
    camera: &Camera,
    textures: &TextureBank,
    area: &RenderArea,
    cfg: &ColumnConfig,
    screen_x: usize,
    cam_x: f32,
    out: &mut dyn Renderer,
) {
    let ray_dir = (camera.dir() + camera.plane() * cam_x).normalize_or_zero();
    if ray_dir == Vec2::ZERO {
        return;
    }

    let mut dda = Dda::new(scene, camera.pos(), ray_dir, cfg.max_tile_dist);
    let mut opaque = OpaqueRange::new();
    let area_top = area.y as i32;
    let area_bot = (area.y + area.h) as i32 - 1;

    'walk: while let Some(hit) = dda.next() {
        if !hit.flags.contains(RayFlags::HIT) {
            continue;
        }
        let walls = scene.walls_for(hit.tile_id);
        if walls.is_empty() {
            continue;
        }

        let entry_local = local_entry(&hit, ray_dir);

        // Tiles rarely carry more than a couple of overlapping wall
        // fragments, so the common case never touches the heap.
        let mut candidates: SmallVec<[Candidate; 4]> = SmallVec::new();
        for (idx, wall) in walls.iter().enumerate() {
            if let Some((t, inter)) = solve_intersection(entry_local, ray_dir, wall) {
                let perp = ray_dir.dot(camera.dir()) * (hit.distance + t);
                candidates.push(Candidate {
                    perp,
                    tile: hit.tile,
                    inter_local: inter,
                    wall_idx: idx,
                });
            }
        }
        candidates.sort_by(|a, b| {
            a.perp
                .partial_cmp(&b.perp)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.wall_idx.cmp(&b.wall_idx))
        });

        for c in &candidates {
            let wall = &walls[c.wall_idx];
            draw_wall_slice(
                wall,
                c,
                camera,
                textures,
                area,
                area_top,
                area_bot,
                cfg,
                screen_x,
                &mut opaque,
                out,
            );

            if wall.blocks_ray {
                break 'walk;
            }
        }

        if opaque.is_full(area_top, area_bot) {
            break;
        }
    }
}

/// Tile-local coordinates the ray is considered to enter `hit.tile` from.
/// The fractional part of `hit.entry` is only trustworthy on the axis the
/// ray actually crossed; the other axis is pinned to the boundary implied
/// by the step direction (see SPEC_FULL.md §4.4 step 1).
fn local_entry(hit: &crate::dda::RayHit, ray_dir: Vec2) -> Vec2 {
    let lx = frac_snapped(hit.entry.x);
    let ly = frac_snapped(hit.entry.y);
    if hit.distance == 0.0 {
        Vec2::new(lx, ly)
    } else if hit.flags.contains(RayFlags::SIDE) {
        Vec2::new(if ray_dir.x < 0.0 { 1.0 } else { 0.0 }, ly)
    } else {
        Vec2::new(lx, if ray_dir.y < 0.0 { 1.0 } else { 0.0 })
    }
}

/// Solve for the ray/wall intersection in tile-local space. A wall's
/// function is `x = slope*y + height` (tile-local y is the independent
/// axis, see SPEC_FULL.md §4.1), so a flat wall faces east/west and can
/// actually be struck by a ray travelling along either world axis.
/// Returns the travelled parameter `t` (in the same units as `ray_dir`)
/// and the intersection point, or `None` if the ray misses the segment.
fn solve_intersection(entry_local: Vec2, ray_dir: Vec2, wall: &Wall) -> Option<(f32, Vec2)> {
    let f = &wall.func;
    let h = if f.height == 0.0 {
        SAFE_LINE_HEIGHT
    } else {
        f.height
    };
    let denom = ray_dir.x - f.slope * ray_dir.y;
    if denom == 0.0 {
        return None;
    }
    let t = (f.slope * entry_local.y + h - entry_local.x) / denom;
    if !(0.0..=std::f32::consts::SQRT_2).contains(&t) {
        return None;
    }
    let inter = entry_local + ray_dir * t;
    // function domain constrains local y, function range constrains local x.
    if inter.y < f.x_min || inter.y > f.x_max || inter.x < f.y_min || inter.x > f.y_max {
        return None;
    }
    Some((t, inter))
}

/// Outward normal of `wall` at `tile`, and whether it had to be flipped
/// because the camera is on the line's "positive" side.
fn wall_normal(wall: &Wall, tile: (i32, i32), cam_pos: Vec2) -> (Vec2, bool) {
    let m = wall.func.slope;
    let mut n = Vec2::new(-1.0, m).normalize_or_zero();
    let side =
        cam_pos.x - (m * (cam_pos.y - tile.1 as f32) + tile.0 as f32 + wall.func.height);
    let flipped = side >= 0.0;
    if flipped {
        n = -n;
    }
    (n, flipped)
}

#[allow(clippy::too_many_arguments)]
fn draw_wall_slice(
    wall: &Wall,
    c: &Candidate,
    camera: &Camera,
    textures: &TextureBank,
    area: &RenderArea,
    area_top: i32,
    area_bot: i32,
    cfg: &ColumnConfig,
    screen_x: usize,
    opaque: &mut OpaqueRange,
    out: &mut dyn Renderer,
) {
    if c.perp <= 0.0 {
        return;
    }

    let (normal, flipped) = wall_normal(wall, c.tile, camera.pos());

    let line_h = area.h as f32 * camera.pcm() / c.perp;
    let mid = area.y as f32 + area.h as f32 * 0.5;
    let full_top = mid - line_h * 0.5 + line_h * (1.0 - wall.h_max);
    let full_bot = mid + line_h * 0.5 - line_h * wall.h_min;
    if full_bot <= full_top {
        return;
    }

    let y_top = (full_top.max(area_top as f32)).round() as i32;
    let y_bot = (full_bot.min(area_bot as f32 + 1.0)).round() as i32 - 1;
    if y_bot < y_top {
        return;
    }

    let func_space = Vec2::new(c.inter_local.y, c.inter_local.x);
    let u_raw = wall.u_at(func_space);
    let u = if flipped { 1.0 - u_raw } else { u_raw };

    let row_stride = cfg.row_stride.max(1) as i32;
    for (a, b) in opaque.visible_subranges(y_top, y_bot) {
        let mut y = a;
        while y <= b {
            let v = 1.0 - (y as f32 - full_top) / (full_bot - full_top);
            let mut pixel = if wall.tex_id != crate::world::NO_TEXTURE {
                textures
                    .texture(wall.tex_id)
                    .map(|t| t.get_coords(u, v))
                    .unwrap_or(wall.tint)
            } else {
                wall.tint
            };

            if let Some(light) = cfg.light_dir {
                pixel = shade(pixel, normal, light);
            }

            let row_end = (y + row_stride).min(b + 1);
            for ry in y..row_end {
                for dx in 0..cfg.columns_per_ray {
                    out.set_pixel(screen_x + dx, ry as usize, pixel);
                }
            }
            y += row_stride;
        }
    }

    opaque.insert(y_top, y_bot);
}

fn shade(rgba: u32, normal: Vec2, light_dir: Vec2) -> u32 {
    let perc = (1.0 - normal.dot(light_dir)) / 2.0;
    let brightness = (0.2 + 0.8 * perc).clamp(0.0, 1.0);
    let a = (rgba >> 24) & 0xFF;
    let r = (((rgba >> 16) & 0xFF) as f32 * brightness) as u32;
    let g = (((rgba >> 8) & 0xFF) as f32 * brightness) as u32;
    let b = ((rgba & 0xFF) as f32 * brightness) as u32;
    (a << 24) | (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::LinearFunc;
    use crate::world::{Scene, TextureBank, Wall};

    fn scene_with_wall() -> Scene {
        let mut scene = Scene::new(3, 3);
        scene.set_tile(2, 1, 1);
        // faces east/west (function domain is local y, range is local x);
        // sits across the middle of the tile, one world unit from the
        // camera used in the tests below.
        let func = LinearFunc::new(0.0, 0.5, 0.0, 1.0, 0.0, 1.0);
        scene.add_wall(1, Wall::new(func, 0.0, 1.0, 0xFFAABBCC, true));
        scene
    }

    #[test]
    fn straight_shot_fills_expected_span() {
        let scene = scene_with_wall();
        let camera = Camera::new(Vec2::new(1.5, 1.5), 0.0, std::f32::consts::FRAC_PI_2);
        let textures = TextureBank::default_with_checker();
        let area = RenderArea {
            x: 0,
            y: 0,
            w: 100,
            h: 100,
        };
        let cfg = ColumnConfig {
            columns_per_ray: 1,
            row_stride: 1,
            max_tile_dist: 64.0,
            light_dir: None,
        };
        let mut out = crate::renderer::Software::default();
        out.begin_frame(100, 100, 0);
        render_column(&scene, &camera, &textures, &area, &cfg, 50, 0.0, &mut out);

        let col: Vec<u32> = (0..100).map(|y| out.buffer()[y * 100 + 50]).collect();
        let first_lit = col.iter().position(|&p| p != 0).unwrap();
        let last_lit = col.iter().rposition(|&p| p != 0).unwrap();
        assert!((first_lit as i32 - 25).abs() <= 1);
        assert!((last_lit as i32 - 74).abs() <= 1);
    }

    #[test]
    fn row_stride_fills_every_row_not_just_the_sampled_one() {
        let scene = scene_with_wall();
        let camera = Camera::new(Vec2::new(1.5, 1.5), 0.0, std::f32::consts::FRAC_PI_2);
        let textures = TextureBank::default_with_checker();
        let area = RenderArea {
            x: 0,
            y: 0,
            w: 100,
            h: 100,
        };
        let cfg = ColumnConfig {
            columns_per_ray: 1,
            row_stride: 3,
            max_tile_dist: 64.0,
            light_dir: None,
        };
        let mut out = crate::renderer::Software::default();
        out.begin_frame(100, 100, 0);
        render_column(&scene, &camera, &textures, &area, &cfg, 50, 0.0, &mut out);

        let col: Vec<u32> = (0..100).map(|y| out.buffer()[y * 100 + 50]).collect();
        let first_lit = col.iter().position(|&p| p != 0).unwrap();
        let last_lit = col.iter().rposition(|&p| p != 0).unwrap();
        // Every row inside the lit span must be painted, not just every
        // third one — a gap here means the stride is skipping rows
        // instead of replicating across them.
        assert!(
            col[first_lit..=last_lit].iter().all(|&p| p != 0),
            "row_stride left unfilled rows inside the draw span"
        );
    }

    #[test]
    fn empty_scene_paints_nothing() {
        let scene = Scene::new(3, 3);
        let camera = Camera::new(Vec2::new(1.5, 1.5), 0.0, std::f32::consts::FRAC_PI_2);
        let textures = TextureBank::default_with_checker();
        let area = RenderArea {
            x: 0,
            y: 0,
            w: 20,
            h: 20,
        };
        let cfg = ColumnConfig::default();
        let mut out = crate::renderer::Software::default();
        out.begin_frame(20, 20, 0);
        render_column(&scene, &camera, &textures, &area, &cfg, 10, 0.0, &mut out);
        assert!(out.buffer().iter().all(|&p| p == 0));
    }

    #[test]
    fn blocking_wall_stops_the_march() {
        let mut scene = Scene::new(3, 3);
        scene.set_tile(1, 1, 1);
        scene.set_tile(2, 1, 2);
        let func = LinearFunc::new(0.0, 0.5, 0.0, 1.0, 0.0, 1.0);
        scene.add_wall(1, Wall::new(func, 0.0, 1.0, 0xFF111111, true));
        scene.add_wall(2, Wall::new(func, 0.0, 1.0, 0xFF222222, true));

        let camera = Camera::new(Vec2::new(0.5, 1.5), 0.0, std::f32::consts::FRAC_PI_2);
        let textures = TextureBank::default_with_checker();
        let area = RenderArea {
            x: 0,
            y: 0,
            w: 100,
            h: 100,
        };
        let cfg = ColumnConfig::default();
        let mut out = crate::renderer::Software::default();
        out.begin_frame(100, 100, 0);
        render_column(&scene, &camera, &textures, &area, &cfg, 50, 0.0, &mut out);

        let col: Vec<u32> = (0..100).map(|y| out.buffer()[y * 100 + 50]).collect();
        assert!(col.iter().all(|&p| p != 0xFF222222));
        assert!(col.iter().any(|&p| p == 0xFF111111));
    }
}
