//! Seaswell library - Procedural ocean surface simulation

pub mod cli;
pub mod error;
pub mod ocean;
pub mod params;
pub mod rendering;

pub use error::{Result, WaterError};
