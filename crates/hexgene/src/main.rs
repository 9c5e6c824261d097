//! Animation driver: generates a map and diffuses its genes frame by frame.

mod render;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use hexgene_core::{GridConfig, MapConfig};
use hexgene_world::{HexLayout, PerlinNoise, RandomProvider, RunSummary, SeededRandom, Simulation, ThreadRandom};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

#[derive(Parser, Debug)]
#[command(name = "hexgene", version, about = "Noise-generated hex map with gene diffusion")]
struct Args {
    /// JSON map configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    hex_radius: Option<f64>,

    #[arg(long)]
    ocean_percentage: Option<f64>,

    /// Stop after this many ticks; runs until interrupted when omitted
    #[arg(long)]
    ticks: Option<u64>,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Seed for noise and diffusion; ambient randomness when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Compute each tick on the rayon pool
    #[arg(long)]
    parallel: bool,

    /// Draw the map to stdout every n ticks (0 disables drawing)
    #[arg(long, default_value_t = 0)]
    render_every: u64,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,

    /// Write the final map as an SVG file
    #[arg(long)]
    svg: Option<PathBuf>,
}

impl Args {
    /// Resolve the map configuration: file or defaults, then flag overrides.
    fn map_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_json_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => MapConfig::default(),
        };

        if let Some(radius) = self.hex_radius {
            config.layout.hex_radius = radius;
        }

        // A config file keeps its own grid unless the viewport or radius is given
        let viewport_given = self.width.is_some() || self.height.is_some();
        if self.config.is_none() || viewport_given || self.hex_radius.is_some() {
            config.grid = GridConfig::from_viewport(
                self.width.unwrap_or(DEFAULT_WIDTH) as f64,
                self.height.unwrap_or(DEFAULT_HEIGHT) as f64,
                config.layout.hex_radius,
            );
        }

        if let Some(percentage) = self.ocean_percentage {
            config.terrain.ocean_percentage = percentage;
        }

        if let (Some(seed), None) = (self.seed, config.terrain.noise_seed) {
            config.terrain.noise_seed = Some(seed as u32);
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameOptions {
    ticks: Option<u64>,
    frame_ms: u64,
    render_every: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.log_json)?;

    let config = args.map_config()?;
    let layout = HexLayout::new(&config.layout);
    let (canvas_width, canvas_height) = layout.canvas_size(&config.grid);
    info!(
        columns = config.grid.columns,
        rows = config.grid.rows,
        canvas_width,
        canvas_height,
        ocean_percentage = config.terrain.ocean_percentage,
        parallel = args.parallel,
        "Starting hexgene"
    );

    let options = FrameOptions {
        ticks: args.ticks,
        frame_ms: args.frame_ms,
        render_every: args.render_every,
    };

    let summary = match args.seed {
        Some(seed) => {
            let mut random = SeededRandom::new(seed);
            let noise_seed = config.terrain.noise_seed.unwrap_or_else(|| random.next_seed() as u32);
            let noise = PerlinNoise::from_config(&config.terrain, noise_seed);
            let mut simulation = Simulation::new(config, noise, random)?.with_parallel(args.parallel);
            let summary = drive(&mut simulation, options).await?;
            if let Some(path) = &args.svg {
                write_svg(&simulation, &layout, path).await?;
            }
            summary
        }
        None => {
            let mut simulation = Simulation::<ThreadRandom>::from_config(config)?.with_parallel(args.parallel);
            let summary = drive(&mut simulation, options).await?;
            if let Some(path) = &args.svg {
                write_svg(&simulation, &layout, path).await?;
            }
            summary
        }
    };

    info!(
        ticks = summary.ticks,
        land_cells = summary.land_cells,
        genes_changed = summary.genes_changed,
        distinct_colors = summary.distinct_colors,
        "Shutting down hexgene"
    );

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Tick once per frame until the tick limit or a shutdown signal.
async fn drive<R: RandomProvider>(simulation: &mut Simulation<R>, options: FrameOptions) -> Result<RunSummary> {
    let mut frames = interval(Duration::from_millis(options.frame_ms.max(1)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut stdout = std::io::stdout();
    if options.render_every > 0 {
        write!(stdout, "{}", render::CLEAR_SCREEN)?;
    }

    loop {
        if options.ticks.is_some_and(|limit| simulation.tick() >= limit) {
            info!(ticks = simulation.tick(), "Tick limit reached");
            break;
        }

        tokio::select! {
            _ = frames.tick() => {
                let stats = simulation.step();
                debug!(tick = simulation.tick(), genes_changed = stats.genes_changed, "Frame");

                if options.render_every > 0 && simulation.tick() % options.render_every == 0 {
                    let frame = render::render_frame(simulation.grid());
                    write!(stdout, "{}{}", render::CURSOR_HOME, frame)?;
                    stdout.flush()?;
                }
            }
            _ = &mut shutdown => {
                break;
            }
        }
    }

    Ok(simulation.summary())
}

async fn write_svg<R: RandomProvider>(simulation: &Simulation<R>, layout: &HexLayout, path: &Path) -> Result<()> {
    let document = render::render_svg(simulation.grid(), layout);
    tokio::fs::write(path, document)
        .await
        .with_context(|| format!("failed to write SVG to {}", path.display()))?;
    info!(path = %path.display(), tick = simulation.tick(), "Wrote SVG snapshot");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
