//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use crate::error::Result;
use crate::ocean::ViewState;
use crate::params::{RenderConfig, WaterConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Seaswell")]
#[command(about = "Headless procedural ocean surface simulator", long_about = None)]
pub struct Args {
    /// JSON water config (missing fields use defaults)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, value_name = "COUNT", default_value_t = 600)]
    pub frames: usize,

    /// Time step per frame (seconds)
    #[arg(long, value_name = "SECONDS", default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Remesh every N frames (time still advances every frame)
    #[arg(long, value_name = "N", default_value_t = 2)]
    pub remesh_every: usize,

    /// Override the number of waves
    #[arg(long, value_name = "COUNT")]
    pub waves: Option<usize>,

    /// Override the wave spectrum seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable the sum-of-sines layer
    #[arg(long)]
    pub no_sines: bool,

    /// Disable the Gerstner layer
    #[arg(long)]
    pub no_gerstner: bool,

    /// Enable edge-length filtering
    #[arg(long)]
    pub edge_filter: bool,

    /// Edge filter threshold (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub threshold: Option<f32>,

    /// Eye position used by the edge filter, as x,y,z (meters)
    #[arg(long, value_name = "X,Y,Z", default_value = "0,0,3", value_parser = parse_vec3)]
    pub eye: Vec3,

    /// Log statistics every N frames
    #[arg(long, value_name = "N", default_value_t = 30)]
    pub report_every: usize,
}

impl Args {
    /// Load the config file (if any) and apply command-line overrides
    pub fn water_config(&self) -> Result<WaterConfig> {
        let mut config = match &self.config {
            Some(path) => WaterConfig::load(path)?,
            None => WaterConfig::default(),
        };

        if let Some(waves) = self.waves {
            config.wave_count = waves;
        }
        if let Some(seed) = self.seed {
            config.spectrum.seed = seed;
        }
        if self.no_sines {
            config.enable_sum_of_sines = false;
        }
        if self.no_gerstner {
            config.enable_gerstner = false;
        }
        if self.edge_filter {
            config.enable_edge_filter = true;
        }
        if let Some(threshold) = self.threshold {
            config.edge_filter.threshold_px = threshold;
        }
        Ok(config)
    }

    /// Viewer for the edge filter
    pub fn view_state(&self) -> ViewState {
        ViewState::new(self.eye, &RenderConfig::default())
    }
}

/// Parse `x,y,z` into a vector
pub fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{}': {}", s, e))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected three comma-separated values, got '{}'", s)),
    }
}
