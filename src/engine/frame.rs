//! Top-level driver: owns the scene, camera and renderer, turns input
//! into camera motion, and runs one full frame of [`render_column`]
//! calls per tick. Modelled on a classic fixed-role frame loop: poll
//! input, simulate, render, present.

use bitflags::bitflags;
use log::warn;

use crate::engine::column::{ColumnConfig, RenderArea, render_column};
use crate::input::{Key, KeyMap};
use crate::renderer::Renderer;
use crate::world::{Camera, Scene, TextureBank};

bitflags! {
    /// Conditions that make the engine refuse to render. Checked fresh
    /// every frame rather than cached, since scene/camera can be cleared
    /// between ticks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EngineError: u8 {
        const SCENE_NOT_SET  = 0b01;
        const CAMERA_NOT_SET = 0b10;
    }
}

/// How the 3D view's render rectangle sits inside the full screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitMode {
    /// The render area is the whole screen.
    Stretch,
    /// The render area is the largest centred square that fits.
    Square,
}

/// Drives camera movement from held keys and mouse motion. Walk/turn are
/// per-second; the engine scales by the tick's `dt`. `mouse_sensitivity`
/// is radians of turn per pixel of reported mouse motion and is applied
/// directly, not scaled by `dt` (mouse deltas are already per-tick).
#[derive(Clone, Copy, Debug)]
pub struct MoveSpeeds {
    pub walk: f32,
    pub turn: f32,
    pub mouse_sensitivity: f32,
}

impl Default for MoveSpeeds {
    fn default() -> Self {
        Self {
            walk: 3.0,
            turn: 2.0,
            mouse_sensitivity: 0.003,
        }
    }
}

pub struct Engine<R: Renderer> {
    renderer: R,
    textures: TextureBank,
    scene: Option<Scene>,
    camera: Option<Camera>,
    keys: KeyMap,
    speeds: MoveSpeeds,
    screen_w: usize,
    screen_h: usize,
    fit: FitMode,
    column_cfg: ColumnConfig,
    clear_color: u32,
    cursor_locked: bool,
    /// Set once per completed frame while `cursor_locked` is true; a host
    /// drains it via [`Self::take_cursor_warp`] and issues the actual
    /// pointer warp itself (SPEC_FULL.md §4.6 step 7, §6.3 — the core
    /// crate never names a windowing type).
    pending_warp: Option<(usize, usize)>,
}

impl<R: Renderer> Engine<R> {
    pub fn new(renderer: R, textures: TextureBank, screen_w: usize, screen_h: usize) -> Self {
        Self {
            renderer,
            textures,
            scene: None,
            camera: None,
            keys: KeyMap::new(),
            speeds: MoveSpeeds::default(),
            screen_w,
            screen_h,
            fit: FitMode::Stretch,
            column_cfg: ColumnConfig::default(),
            clear_color: 0xFF202020,
            cursor_locked: false,
            pending_warp: None,
        }
    }

    /// Enable or disable periodic cursor recentring. While locked, every
    /// successful [`Self::render_frame`] arms a warp-to-centre signal
    /// collected with [`Self::take_cursor_warp`].
    pub fn set_cursor_lock(&mut self, locked: bool) {
        self.cursor_locked = locked;
        if !locked {
            self.pending_warp = None;
        }
    }

    pub fn cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Take this tick's pending warp-to-centre signal, if any. Returns
    /// the screen-space point the host should warp the pointer to.
    pub fn take_cursor_warp(&mut self) -> Option<(usize, usize)> {
        self.pending_warp.take()
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = Some(scene);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn textures_mut(&mut self) -> &mut TextureBank {
        &mut self.textures
    }

    pub fn column_config_mut(&mut self) -> &mut ColumnConfig {
        &mut self.column_cfg
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Resizing requires a camera (the square fit mode needs the field
    /// of view to stay meaningful across the resulting aspect change),
    /// mirroring the `CAMERA_NOT_SET` guard in [`Self::errors`].
    pub fn set_fit_mode(&mut self, fit: FitMode) -> Result<(), EngineError> {
        if self.camera.is_none() {
            return Err(EngineError::CAMERA_NOT_SET);
        }
        self.fit = fit;
        Ok(())
    }

    pub fn errors(&self) -> EngineError {
        let mut e = EngineError::empty();
        if self.scene.is_none() {
            e |= EngineError::SCENE_NOT_SET;
        }
        if self.camera.is_none() {
            e |= EngineError::CAMERA_NOT_SET;
        }
        e
    }

    fn render_area(&self) -> RenderArea {
        match self.fit {
            FitMode::Stretch => RenderArea {
                x: 0,
                y: 0,
                w: self.screen_w,
                h: self.screen_h,
            },
            FitMode::Square => {
                let side = self.screen_w.min(self.screen_h);
                RenderArea {
                    x: (self.screen_w - side) / 2,
                    y: (self.screen_h - side) / 2,
                    w: side,
                    h: side,
                }
            }
        }
    }

    /// Feed raw key/mouse events for this tick and move the camera by
    /// `dt` seconds' worth of held input (mouse turn is applied
    /// unscaled, see [`MoveSpeeds`]). A no-op while no camera is set.
    pub fn handle_input(&mut self, events: &[crate::input::InputEvent], dt: f32) {
        self.keys.apply(events);
        let Some(camera) = self.camera.as_mut() else {
            return;
        };

        let mut forward = 0.0;
        let mut side = 0.0;
        let mut turn = 0.0;
        if self.keys.is_down(Key::Forward) {
            forward += self.speeds.walk * dt;
        }
        if self.keys.is_down(Key::Back) {
            forward -= self.speeds.walk * dt;
        }
        if self.keys.is_down(Key::StrafeRight) {
            side += self.speeds.walk * dt;
        }
        if self.keys.is_down(Key::StrafeLeft) {
            side -= self.speeds.walk * dt;
        }
        if self.keys.is_down(Key::TurnRight) {
            turn += self.speeds.turn * dt;
        }
        if self.keys.is_down(Key::TurnLeft) {
            turn -= self.speeds.turn * dt;
        }
        for ev in events {
            if let crate::input::InputEvent::MouseMoved { dx, .. } = *ev {
                turn += dx * self.speeds.mouse_sensitivity;
            }
        }

        if forward != 0.0 || side != 0.0 {
            camera.step(forward, side);
        }
        if turn != 0.0 {
            camera.change_direction(turn);
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.keys.is_down(Key::Quit)
    }

    /// Render one full frame into the owned `Renderer`.
    pub fn render_frame(&mut self) -> Result<(), EngineError> {
        let errors = self.errors();
        if !errors.is_empty() {
            warn!("render_frame skipped: {errors:?}");
            return Err(errors);
        }
        let scene = self.scene.as_ref().expect("checked by errors()");
        let camera = self.camera.as_ref().expect("checked by errors()");
        let area = self.render_area();

        self.renderer
            .begin_frame(self.screen_w, self.screen_h, self.clear_color);

        let stride = self.column_cfg.columns_per_ray.max(1);
        let mut x = area.x;
        while x < area.x + area.w {
            let cam_x = 2.0 * ((x - area.x) as f32) / (area.w as f32) - 1.0;
            render_column(
                scene,
                camera,
                &self.textures,
                &area,
                &self.column_cfg,
                x,
                cam_x,
                &mut self.renderer,
            );
            x += stride;
        }

        self.renderer.end_frame();

        if self.cursor_locked {
            self.pending_warp = Some((self.screen_w / 2, self.screen_h / 2));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use crate::renderer::Software;
    use glam::Vec2;

    #[test]
    fn errors_flag_missing_scene_and_camera() {
        let engine = Engine::new(Software::default(), TextureBank::default_with_checker(), 10, 10);
        assert_eq!(
            engine.errors(),
            EngineError::SCENE_NOT_SET | EngineError::CAMERA_NOT_SET
        );
    }

    #[test]
    fn render_frame_errors_without_scene() {
        let mut engine =
            Engine::new(Software::default(), TextureBank::default_with_checker(), 10, 10);
        engine.set_camera(Camera::new(Vec2::ZERO, 0.0, 1.2));
        assert!(engine.render_frame().is_err());
    }

    #[test]
    fn render_frame_succeeds_with_scene_and_camera() {
        let mut engine =
            Engine::new(Software::default(), TextureBank::default_with_checker(), 20, 20);
        engine.set_scene(Scene::new(3, 3));
        engine.set_camera(Camera::new(Vec2::new(1.5, 1.5), 0.0, 1.2));
        assert!(engine.render_frame().is_ok());
    }

    #[test]
    fn forward_key_moves_camera() {
        let mut engine =
            Engine::new(Software::default(), TextureBank::default_with_checker(), 20, 20);
        engine.set_camera(Camera::new(Vec2::ZERO, 0.0, 1.2));
        engine.handle_input(&[InputEvent::KeyDown(Key::Forward)], 1.0);
        let pos = engine.camera().unwrap().pos();
        assert!(pos.x > 0.0);
    }

    #[test]
    fn cursor_lock_arms_warp_after_render_and_clears_on_unlock() {
        let mut engine =
            Engine::new(Software::default(), TextureBank::default_with_checker(), 20, 10);
        engine.set_scene(Scene::new(3, 3));
        engine.set_camera(Camera::new(Vec2::new(1.5, 1.5), 0.0, 1.2));
        assert!(engine.take_cursor_warp().is_none());

        engine.set_cursor_lock(true);
        assert!(engine.cursor_locked());
        assert!(engine.render_frame().is_ok());
        assert_eq!(engine.take_cursor_warp(), Some((10, 5)));
        assert!(engine.take_cursor_warp().is_none());

        engine.set_cursor_lock(false);
        assert!(!engine.cursor_locked());
    }

    #[test]
    fn mouse_motion_turns_camera() {
        let mut engine =
            Engine::new(Software::default(), TextureBank::default_with_checker(), 20, 20);
        engine.set_camera(Camera::new(Vec2::ZERO, 0.0, 1.2));
        let before = engine.camera().unwrap().dir();
        engine.handle_input(&[InputEvent::MouseMoved { dx: 100.0, dy: 0.0 }], 1.0);
        let after = engine.camera().unwrap().dir();
        assert_ne!(before, after);
    }

    #[test]
    fn square_fit_requires_camera() {
        let mut engine =
            Engine::new(Software::default(), TextureBank::default_with_checker(), 20, 10);
        assert_eq!(
            engine.set_fit_mode(FitMode::Square),
            Err(EngineError::CAMERA_NOT_SET)
        );
    }
}
