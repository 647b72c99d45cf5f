//! Software drawing surface and spectrum visualization.

mod canvas;
mod scope;
mod spectrum;

// Re-export public types
pub use canvas::{hsl_to_rgba, Canvas, CanvasRegistry, Rgba};
pub use scope::{ScopeSnapshot, SpectrumScope};
pub use spectrum::{draw_spectrum, hue_for_bin};
