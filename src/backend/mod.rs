//! Headless host: drives a [`Game`] from an event script and renders to PNG.

use crate::config::Config;
use crate::draw::CairoSurface;
use crate::game::{Game, GameSettings};
use crate::util::Point;
use crate::world::rapier::{RapierSettings, RapierWorld};
use crate::world::World;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;

pub mod script;

pub use script::{Script, ScriptError};

/// Options for one scripted run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub script: PathBuf,
    /// Overrides the script's frame count.
    pub frames: Option<u64>,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Snapshot of the final world, if wanted.
    pub save_world: Option<PathBuf>,
    pub no_throttle: bool,
}

/// What a run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub bodies: usize,
    pub joints: usize,
}

/// Physics settings for a canvas of the given size.
pub fn rapier_settings(config: &Config, width: u32, height: u32) -> RapierSettings {
    let sim = &config.simulation;
    let joints = &config.joints;
    RapierSettings {
        width: f64::from(width),
        height: f64::from(height),
        pixels_per_meter: sim.pixels_per_meter,
        gravity: Point::new(sim.gravity[0], sim.gravity[1]),
        frame_rate: sim.frame_rate,
        motor_speed: joints.motor_speed,
        distance_stiffness: joints.distance_stiffness,
        distance_damping: joints.distance_damping,
        pointer_stiffness: joints.pointer_stiffness,
        pointer_damping: joints.pointer_damping,
        body_color: config.render.body_color.to_color(),
        static_color: config.render.static_color.to_color(),
        joint_color: config.render.joint_color.to_color(),
        with_ground: true,
    }
}

/// Runs a script against a fresh world and writes the last frame as PNG.
///
/// # Errors
/// Returns an error if the script cannot be loaded, the keybindings are
/// invalid, or the image or world snapshot cannot be written.
pub fn run(config: &Config, options: &RunOptions) -> Result<RunSummary> {
    let script = Script::load(&options.script)
        .with_context(|| format!("Failed to load script {}", options.script.display()))?;
    let frames = options.frames.unwrap_or(script.frames);

    let mut settings = GameSettings::from_config(config)?;
    if options.no_throttle {
        settings.throttle = false;
    }

    let width = i32::try_from(options.width).context("Canvas width too large")?;
    let height = i32::try_from(options.height).context("Canvas height too large")?;
    let mut surface = CairoSurface::new(width, height)?;

    let world = RapierWorld::new(rapier_settings(config, options.width, options.height));
    let mut game = Game::new(world, settings);

    info!(
        "Running {} for {} frame(s) on a {}x{} canvas",
        options.script.display(),
        frames,
        options.width,
        options.height
    );
    let mut schedule = script.schedule();
    game.run(frames, &mut surface, |frame| {
        schedule.remove(&frame).unwrap_or_default()
    });
    if let Some((first, _)) = schedule.first_key_value() {
        warn!("Script events from frame {first} on were never delivered ({frames} frames run)");
    }

    surface.write_png(&options.output)?;
    info!("Wrote {}", options.output.display());

    if let Some(path) = &options.save_world {
        game.world_mut()
            .save(path)
            .with_context(|| format!("Failed to save world to {}", path.display()))?;
        info!("Saved world to {}", path.display());
    }

    Ok(RunSummary {
        frames: game.frame_count(),
        bodies: game.world().body_count(),
        joints: game.world().joint_count(),
    })
}
