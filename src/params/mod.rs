//! Parameter definitions with physical units and documented semantics.
//!
//! All tunables live here with:
//! - Physical units (meters, seconds, pixels, degrees)
//! - Documented ranges and meanings
//! - Serde support so hosts can load them from a config file

mod ocean;
mod render;

// Re-export all types
pub use ocean::{EdgeFilterParams, WaterConfig, WaveSpectrum};
pub use render::RenderConfig;
