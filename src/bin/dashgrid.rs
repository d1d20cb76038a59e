use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dashgrid::common::config::{Config, config_file};
use dashgrid::common::log;
use dashgrid::layout_engine::{
    DynamicTableLayout, EventReceiver, LayoutEvent, Point, Rect, Size, SizeRequest, event_channel,
};
use dashgrid::model::Scene;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "dashgrid")]
#[command(about = "Lay out dashboard grids described in scene files")]
struct Cli {
    /// Configuration file to use instead of ~/.dashgrid.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Set row and column spacing to the same value.
    #[arg(long, global = true, allow_negative_numbers = true)]
    spacing: Option<f64>,

    /// Space between rows, overrides --spacing.
    #[arg(long, global = true, allow_negative_numbers = true)]
    row_spacing: Option<f64>,

    /// Space between columns, overrides --spacing.
    #[arg(long, global = true, allow_negative_numbers = true)]
    column_spacing: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the minimum and natural size of a scene
    Measure {
        /// RON file describing the children
        #[arg(long)]
        scene: PathBuf,
        /// Width the height is measured for
        #[arg(long)]
        for_width: Option<f64>,
        /// Height the width is measured for
        #[arg(long)]
        for_height: Option<f64>,
    },
    /// Place every visible child of a scene into a box
    Allocate {
        /// RON file describing the children
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
    },
    /// Print the effective configuration
    Config {
        /// Only check the configuration and report problems
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Serialize)]
struct Measurement {
    width: SizeRequest,
    height: SizeRequest,
    number_children: usize,
    rows: usize,
    columns: usize,
    events: Vec<LayoutEvent>,
}

#[derive(Serialize)]
struct Placement {
    index: usize,
    name: String,
    rect: Rect,
}

#[derive(Serialize)]
struct Allocation {
    number_children: usize,
    rows: usize,
    columns: usize,
    column_coords: Vec<f64>,
    row_coords: Vec<f64>,
    children: Vec<Placement>,
    events: Vec<LayoutEvent>,
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();
    log::init_logging();

    let config_path = opt.config.clone().or_else(config_file);
    let mut config = Config::read_or_default(config_path.as_deref())?;
    for issue in config.validate() {
        warn!("config: {issue}");
    }

    match opt.command {
        Commands::Config { validate } => print_config(&config, validate),
        Commands::Measure { ref scene, for_width, for_height } => {
            let (mut layout, mut events_rx) = build_layout(&opt, &mut config)?;
            let scene = load_scene(scene, &config)?;
            let width = layout.preferred_width(&scene, for_height);
            let height = layout.preferred_height(&scene, for_width);
            print_json(&Measurement {
                width,
                height,
                number_children: layout.number_children(),
                rows: layout.rows(),
                columns: layout.columns(),
                events: drain_events(&mut events_rx),
            })
        }
        Commands::Allocate { ref scene, width, height } => {
            if !(width >= 0.0 && height >= 0.0) {
                bail!("allocation box must have a non-negative size, got {width}x{height}");
            }
            let (mut layout, mut events_rx) = build_layout(&opt, &mut config)?;
            let scene = load_scene(scene, &config)?;
            let placed =
                layout.allocate(&scene, Rect::new(Point::default(), Size::new(width, height)));
            let children = placed
                .into_iter()
                .map(|(index, rect)| Placement {
                    index,
                    name: scene.child_name(index).unwrap_or_default().to_string(),
                    rect,
                })
                .collect();
            print_json(&Allocation {
                number_children: layout.number_children(),
                rows: layout.rows(),
                columns: layout.columns(),
                column_coords: layout.column_coords().to_vec(),
                row_coords: layout.row_coords().to_vec(),
                children,
                events: drain_events(&mut events_rx),
            })
        }
    }
}

fn build_layout(
    opt: &Cli,
    config: &mut Config,
) -> anyhow::Result<(DynamicTableLayout, EventReceiver)> {
    if config.auto_fix_values() > 0 {
        warn!("config: replaced invalid values with defaults");
    }

    let (events_tx, mut events_rx) = event_channel();
    let mut layout = DynamicTableLayout::with_settings(&config.settings.table, Some(events_tx))?;
    if let Some(spacing) = opt.spacing {
        layout.set_spacing(spacing)?;
    }
    if let Some(spacing) = opt.row_spacing {
        layout.set_row_spacing(spacing)?;
    }
    if let Some(spacing) = opt.column_spacing {
        layout.set_column_spacing(spacing)?;
    }
    // Spacing overrides are part of the setup, not of the layout passes.
    drain_events(&mut events_rx);

    Ok((layout, events_rx))
}

fn load_scene(path: &Path, config: &Config) -> anyhow::Result<Scene> {
    let scene = Scene::read(path)?;
    Ok(scene.with_default_request_mode(config.settings.table.request_mode))
}

fn drain_events(rx: &mut EventReceiver) -> Vec<LayoutEvent> {
    let mut events = Vec::new();
    while let Ok((_, event)) = rx.try_recv() {
        debug!(?event, "layout event");
        events.push(event);
    }
    events
}

fn print_config(config: &Config, validate: bool) -> anyhow::Result<()> {
    if validate {
        let issues = config.validate();
        if issues.is_empty() {
            println!("configuration is valid");
            return Ok(());
        }
        for issue in &issues {
            eprintln!("{issue}");
        }
        bail!("{} configuration issue(s) found", issues.len());
    }
    let buf = toml::to_string_pretty(config).context("serializing config")?;
    print!("{buf}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let buf = serde_json::to_string_pretty(value).context("serializing result")?;
    println!("{buf}");
    Ok(())
}
