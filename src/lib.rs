//! A 2.5D raycasting renderer: a tile grid whose cells may hold oblique
//! sub-tile wall segments, cast one ray per screen column and projected
//! with perpendicular-distance correction.
//!
//! [`engine::Engine`] is the top-level entry point; [`world`] holds the
//! scene/camera/texture data model; [`dda`] and [`engine::column`] (the
//! latter re-exported as [`engine::render_column`]) hold the actual ray
//! march and column projection math.

pub mod dda;
pub mod engine;
pub mod input;
pub mod math;
pub mod renderer;
pub mod scene_file;
pub mod world;
