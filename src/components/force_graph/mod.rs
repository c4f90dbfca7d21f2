mod canvas;
mod color;
mod component;
mod highlight;
mod layout;
mod render;
mod state;

pub use component::{CanvasIntent, ForceGraphCanvas};
pub use layout::LayoutConfig;
pub use render::{DrawCommand, RenderStyle};
