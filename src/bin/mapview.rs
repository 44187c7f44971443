//! Static top-down viewer: draws the tile grid and every oblique wall
//! segment it contains, for debugging scene geometry without running
//! the 3D renderer at all.

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use minifb::{Key, Window, WindowOptions};

use tilecast::scene_file::load_scene_file;
use tilecast::world::{Scene, TextureBank};

#[derive(Parser, Debug)]
#[command(about = "Top-down wall-geometry viewer for tilecast scene files")]
struct Args {
    scene: std::path::PathBuf,

    #[arg(long, default_value_t = 64)]
    pixels_per_tile: usize,
}

fn draw_line(buf: &mut [u32], w: usize, h: usize, p0: (i32, i32), p1: (i32, i32), color: u32) {
    // Bresenham, same shape as the classic integer line-drawing routine.
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as usize) < w && (y0 as usize) < h {
            buf[y0 as usize * w + x0 as usize] = color;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_grid(buf: &mut [u32], w: usize, h: usize, scene: &Scene, ppt: usize) {
    let grid_color = 0xFF404040;
    for i in 0..=scene.width() {
        let x = (i * ppt) as i32;
        draw_line(buf, w, h, (x, 0), (x, (scene.height() * ppt) as i32), grid_color);
    }
    for j in 0..=scene.height() {
        let y = (j * ppt) as i32;
        draw_line(buf, w, h, (0, y), ((scene.width() * ppt) as i32, y), grid_color);
    }
}

fn draw_walls(buf: &mut [u32], w: usize, h: usize, scene: &Scene, ppt: usize) {
    for j in 0..scene.height() as i32 {
        for i in 0..scene.width() as i32 {
            let id = scene.tile_at(i, j);
            if id == 0 {
                continue;
            }
            for wall in scene.walls_for(id) {
                let (a, b) = wall.func.clipped_endpoints();
                // wall-function space is (local_y, local_x); flip back to
                // world-aligned (x, y) before projecting onto the screen.
                let world_a = Vec2::new(i as f32 + a.y, j as f32 + a.x);
                let world_b = Vec2::new(i as f32 + b.y, j as f32 + b.x);
                let p0 = (
                    (world_a.x * ppt as f32) as i32,
                    (world_a.y * ppt as f32) as i32,
                );
                let p1 = (
                    (world_b.x * ppt as f32) as i32,
                    (world_b.y * ppt as f32) as i32,
                );
                let color = if wall.blocks_ray { 0xFFE0E0E0 } else { 0xFF808040 };
                draw_line(buf, w, h, p0, p1, color);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut textures = TextureBank::default_with_checker();
    let scene = load_scene_file(&args.scene, &mut textures)
        .with_context(|| format!("loading scene file {}", args.scene.display()))?;

    let w = scene.width() * args.pixels_per_tile;
    let h = scene.height() * args.pixels_per_tile;
    let mut window = Window::new("tilecast-mapview", w, h, WindowOptions::default())
        .context("opening window")?;

    let mut buf = vec![0xFF101010u32; w * h];
    draw_grid(&mut buf, w, h, &scene, args.pixels_per_tile);
    draw_walls(&mut buf, w, h, &scene, args.pixels_per_tile);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window.update_with_buffer(&buf, w, h)?;
    }

    Ok(())
}
