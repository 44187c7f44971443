mod camera;
mod scene;
mod texture;

pub use camera::{Camera, DIR_BIAS, MAX_FOV, MIN_FOV};
pub use scene::{Scene, Tint, TileId, Wall};
pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId};
