use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use physbox::backend::{self, RunOptions};
use physbox::config::Config;
use physbox::game::ToolRegistry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "physbox")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PHYSBOX_GIT_HASH"), ")"),
    about = "Draw shapes into a live 2D rigid-body simulation"
)]
struct Cli {
    /// Use this config file instead of ~/.config/physbox/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play an event script headlessly and write the last frame as PNG
    Run {
        /// Event script (TOML)
        #[arg(long, short = 's', value_name = "FILE")]
        script: PathBuf,

        /// Number of frames to run (overrides the script)
        #[arg(long, short = 'n')]
        frames: Option<u64>,

        /// PNG file for the last frame
        #[arg(long, short = 'o', default_value = "physbox.png")]
        output: PathBuf,

        /// Canvas width in pixels
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Also write a snapshot of the final world (.json or .json.gz)
        #[arg(long, value_name = "PATH")]
        save_world: Option<PathBuf>,

        /// Run frames as fast as possible instead of at the configured rate
        #[arg(long, action = ArgAction::SetTrue)]
        no_throttle: bool,
    },

    /// List the available tools
    Tools,

    /// Write the documented default config file
    InitConfig,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run {
            script,
            frames,
            output,
            width,
            height,
            save_world,
            no_throttle,
        }) => {
            let config = load_config(cli.config.as_ref())?;
            let options = RunOptions {
                script,
                frames,
                output,
                width,
                height,
                save_world,
                no_throttle,
            };
            let summary = backend::run(&config, &options)?;
            println!(
                "Rendered {} frame(s) to {} ({} bodies, {} joints)",
                summary.frames,
                options.output.display(),
                summary.bodies,
                summary.joints
            );
        }
        Some(Command::Tools) => {
            for name in ToolRegistry::new().names() {
                println!("{name}");
            }
        }
        Some(Command::InitConfig) => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::get_config_path()?,
            };
            Config::create_default_file(&path)
                .with_context(|| format!("Could not initialise {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        None => {
            println!("physbox: Draw shapes into a live 2D rigid-body simulation");
            println!();
            println!("Usage:");
            println!("  physbox run --script scene.toml    Play a script, write the last frame as PNG");
            println!("  physbox tools                      List the available tools");
            println!("  physbox init-config                Write ~/.config/physbox/config.toml");
            println!("  physbox --help                     Show help");
            println!();
            println!("Tools: draw (magicpen), circle, triangle, box, polygon, grab, motor,");
            println!("pin, joint, roll and destroy. Space pauses the simulation.");
        }
    }

    Ok(())
}
