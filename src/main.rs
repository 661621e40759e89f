//! Seaswell - procedural ocean surface simulator
//!
//! Runs the water simulation headlessly at a fixed time step, the way a host
//! render loop would drive it, and logs per-frame statistics.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use seaswell::cli::Args;
use seaswell::ocean::WaterSurface;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> seaswell::Result<()> {
    let config = args.water_config()?;
    let mut surface = WaterSurface::new(&config)?;
    surface.set_view(args.view_state());

    info!(
        "Simulating {} frames at dt={:.4}s ({} waves, mode {:?}, edge filter {})",
        args.frames,
        args.dt,
        surface.waves().len(),
        surface.mode(),
        if surface.edge_filter_enabled() { "on" } else { "off" }
    );

    let remesh_every = args.remesh_every.max(1);
    let report_every = args.report_every.max(1);
    let start = Instant::now();
    let mut remeshes = 0usize;

    for frame in 1..=args.frames {
        surface.update_time(args.dt);

        // Remesh on the first frame of each interval
        if frame % remesh_every == 1 % remesh_every {
            surface.update_mesh();
            remeshes += 1;
        }

        if frame % report_every == 0 {
            let stats = surface.stats();
            info!(
                "frame {:>5}  t={:>7.3}s  triangles {}/{}  height [{:+.3}, {:+.3}] m",
                frame,
                stats.time_s,
                stats.triangles,
                stats.full_triangles,
                stats.min_height_m,
                stats.max_height_m
            );
        }
    }

    let elapsed = start.elapsed().as_secs_f32();
    let per_remesh_ms = if remeshes > 0 {
        elapsed * 1000.0 / remeshes as f32
    } else {
        0.0
    };
    info!(
        "Done: {} remeshes of {} vertices in {:.2}s ({:.3} ms each)",
        remeshes,
        surface.vertices().len(),
        elapsed,
        per_remesh_ms
    );
    Ok(())
}
