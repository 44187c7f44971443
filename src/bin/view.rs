//! Interactive first-person viewer: opens a window, loads a scene file,
//! and drives [`tilecast::engine::Engine`] at a capped frame rate.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use minifb::{Key as MiniKey, KeyRepeat, Window, WindowOptions};

use tilecast::engine::Engine;
use tilecast::input::{InputEvent, Key};
use tilecast::renderer::Software;
use tilecast::scene_file::load_scene_file;
use tilecast::world::{Camera, TextureBank};

#[derive(Parser, Debug)]
#[command(about = "Interactive viewer for tilecast scene files")]
struct Args {
    /// Path to a `.rps` scene file.
    scene: std::path::PathBuf,

    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 540)]
    height: usize,

    #[arg(long, default_value_t = std::f32::consts::FRAC_PI_2)]
    fov: f32,

    /// Cap in frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Enable directional shading with the given light heading in radians.
    #[arg(long)]
    light: Option<f32>,
}

fn map_key(key: MiniKey) -> Option<Key> {
    match key {
        MiniKey::W | MiniKey::Up => Some(Key::Forward),
        MiniKey::S | MiniKey::Down => Some(Key::Back),
        MiniKey::A => Some(Key::StrafeLeft),
        MiniKey::D => Some(Key::StrafeRight),
        MiniKey::Left => Some(Key::TurnLeft),
        MiniKey::Right => Some(Key::TurnRight),
        MiniKey::Escape => Some(Key::Quit),
        _ => None,
    }
}

fn poll_events(window: &Window, down_last: &mut [bool; 7], events: &mut Vec<InputEvent>) {
    let keys = [
        Key::Forward,
        Key::Back,
        Key::StrafeLeft,
        Key::StrafeRight,
        Key::TurnLeft,
        Key::TurnRight,
        Key::Quit,
    ];
    let mini_keys = [
        MiniKey::W,
        MiniKey::S,
        MiniKey::A,
        MiniKey::D,
        MiniKey::Left,
        MiniKey::Right,
        MiniKey::Escape,
    ];
    for (i, &mk) in mini_keys.iter().enumerate() {
        let is_down = window.is_key_down(mk);
        if is_down && !down_last[i] {
            events.push(InputEvent::KeyDown(keys[i]));
        } else if !is_down && down_last[i] {
            events.push(InputEvent::KeyUp(keys[i]));
        }
        down_last[i] = is_down;
    }
    let _ = window.is_key_pressed(MiniKey::Space, KeyRepeat::No);
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut textures = TextureBank::default_with_checker();
    let scene = load_scene_file(&args.scene, &mut textures)
        .with_context(|| format!("loading scene file {}", args.scene.display()))?;

    let mut window = Window::new(
        "tilecast",
        args.width,
        args.height,
        WindowOptions::default(),
    )
    .context("opening window")?;
    window.set_target_fps(args.fps as usize);

    let mut engine = Engine::new(Software::default(), textures, args.width, args.height);
    engine.set_scene(scene);
    engine.set_camera(Camera::new(
        Vec2::new(1.5, 1.5),
        0.0,
        args.fov.clamp(0.1, std::f32::consts::PI - 0.1),
    ));
    if let Some(light) = args.light {
        engine.column_config_mut().light_dir = Some(Vec2::new(light.cos(), light.sin()));
    }

    let mut down_last = [false; 7];
    let mut last_tick = Instant::now();

    while window.is_open() && !engine.quit_requested() {
        let now = Instant::now();
        let dt = (now - last_tick).as_secs_f32();
        last_tick = now;

        let mut events = Vec::new();
        poll_events(&window, &mut down_last, &mut events);
        engine.handle_input(&events, dt);

        engine.render_frame().map_err(|e| anyhow::anyhow!("{e:?}"))?;

        window.update_with_buffer(
            engine.renderer().buffer(),
            args.width,
            args.height,
        )?;
    }

    Ok(())
}
