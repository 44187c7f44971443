mod column;
mod frame;
mod opaque_range;

pub use column::{ColumnConfig, RenderArea, render_column};
pub use frame::{EngineError, Engine, FitMode, MoveSpeeds};
pub use opaque_range::OpaqueRange;
