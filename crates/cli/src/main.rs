#![deny(unsafe_code)]
//! CLI binary for the topography contour engines.
//!
//! Subcommands:
//! - `render [engine]`: animate an engine for N frames headlessly, write the
//!   last frame as PNG
//! - `list`: print available engines and their parameter schemas

mod error;

use clap::{ArgAction, Parser, Subcommand};
use error::CliError;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;
use topography_core::color::Rgba;
use topography_core::params::param_str;
use topography_core::surface::SurfaceSize;
use topography_core::Engine;
use topography_engines::pixel::RasterSurface;
use topography_engines::EngineKind;
use topography_runtime::{
    AnimationController, HeadlessHost, HostEvent, ManualScheduler, PointerButton, StartOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "topography", about = "Animated contour-line renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Overrides RUST_LOG.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Animate an engine for N frames and write the last frame as PNG.
    Render {
        /// Engine name.
        #[arg(default_value = "perlin-topography")]
        engine: String,

        /// Surface width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 800.0)]
        width: f64,

        /// Surface height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 600.0)]
        height: f64,

        /// Number of animation frames to run.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// PRNG seed for the noise table.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Device pixel ratio of the output image.
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,

        /// Contour stroke color (CSS hex or rgb()/rgba(); the raster draws no
        /// other notation).
        #[arg(long)]
        line_color: Option<String>,

        /// Theme foreground color, used at half alpha when no line color is set.
        #[arg(long)]
        theme_foreground: Option<String>,

        /// Background fill color.
        #[arg(long, default_value = "#000000")]
        background: String,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Hold the primary pointer at X,Y (CSS pixels) for every frame.
        #[arg(long, value_parser = parse_point)]
        poke: Option<(f64, f64)>,

        /// Output file path.
        #[arg(short, long, default_value = "topography.png")]
        output: PathBuf,
    },
    /// List available engines and their parameters.
    List,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{v}'"))
    };
    Ok((coord(x)?, coord(y)?))
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            if cli.json {
                let entries = engines
                    .iter()
                    .map(|name| {
                        Ok(json!({
                            "name": name,
                            "params": EngineKind::schema_for(name)?,
                        }))
                    })
                    .collect::<Result<Vec<Value>, CliError>>()?;
                println!("{}", serde_json::to_string_pretty(&json!({ "engines": entries }))?);
            } else {
                for name in engines {
                    println!("{name}");
                    let schema = EngineKind::schema_for(name)?;
                    if let Some(params) = schema.as_object() {
                        for (key, spec) in params {
                            println!(
                                "  {key:<22} {:<8} default {:<10} {}",
                                spec["type"].as_str().unwrap_or("?"),
                                spec["default"],
                                spec["description"].as_str().unwrap_or(""),
                            );
                        }
                    }
                }
            }
        }
        Command::Render {
            engine,
            width,
            height,
            frames,
            seed,
            dpr,
            line_color,
            theme_foreground,
            background,
            params,
            poke,
            output,
        } => {
            let params: Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            if !(dpr.is_finite() && dpr > 0.0) {
                return Err(CliError::Input(format!("invalid --dpr {dpr}")));
            }
            let background = Rgba::parse_css(&background)?;
            let line_color =
                line_color.or_else(|| param_str(&params, "line_color").map(String::from));
            if let Some(color) = line_color.as_deref().filter(|c| !c.trim().is_empty()) {
                Rgba::parse_css(color)?;
            }
            let size = SurfaceSize::new(width, height);

            let kind = EngineKind::from_name(&engine, size, seed, &params)?;
            let mut host = HeadlessHost::new(size, dpr);
            if let Some(theme) = theme_foreground {
                host = host.with_theme_foreground(theme);
            }
            let options = StartOptions {
                line_color,
                ..StartOptions::default()
            };
            let mut controller = AnimationController::start(
                Some(RasterSurface::new(size, dpr, background)),
                host,
                ManualScheduler::new(),
                options,
                move |_| Ok(kind),
            );
            if !controller.is_running() {
                return Err(CliError::Engine(topography_core::EngineError::InvalidDimensions));
            }

            if let Some((x, y)) = poke {
                controller.handle_event(HostEvent::PointerDown {
                    x,
                    y,
                    button: PointerButton::Primary,
                });
            }
            for _ in 0..frames {
                controller.tick();
            }

            let engine_params = controller.engine().map(Engine::params).unwrap_or(Value::Null);
            let surface = controller
                .into_surface()
                .ok_or_else(|| CliError::Io("surface was released before output".into()))?;
            topography_engines::snapshot::write_png(&surface, &output)?;
            info!(path = %output.display(), frames, "snapshot written");

            if cli.json {
                let info = json!({
                    "engine": engine,
                    "width": width,
                    "height": height,
                    "dpr": dpr,
                    "frames": frames,
                    "seed": seed,
                    "params": engine_params,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {engine} ({width}x{height} @{dpr}x, {frames} frames, seed {seed}) -> {}",
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
