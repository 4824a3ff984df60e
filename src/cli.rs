use crate::config::load_config;
use crate::export::write_output_roster;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::{GroupingMode, process_roster};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ggroup", version, about = "Split a guest list into groups that keep friends together")]
pub struct Args {
    /// Input roster (.csv with Name, Friends, Group columns) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output roster. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Maximum number of groups
    #[arg(short = 'g', long = "max-groups", allow_negative_numbers = true)]
    pub max_groups: Option<i64>,

    /// Guests per group
    #[arg(short = 's', long = "group-size", allow_negative_numbers = true)]
    pub group_size: Option<i64>,

    /// Seed for a reproducible run
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// What to do with the imported groups
    #[arg(short = 'm', long = "mode", value_enum, default_value = "optimize")]
    pub mode: Mode,

    /// Order the output by group, then by name
    #[arg(long = "regroup")]
    pub regroup: bool,

    /// Layout width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Layout height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Write an SVG preview of the grouped graph
    #[arg(long = "svg")]
    pub svg: Option<PathBuf>,

    /// Write a PNG preview of the grouped graph
    #[cfg(feature = "png")]
    #[arg(long = "png")]
    pub png: Option<PathBuf>,

    /// Write node positions and groups as JSON
    #[arg(long = "layout-dump")]
    pub layout_dump: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Mode {
    /// Random fill followed by local search
    Optimize,
    /// Random fill only
    Randomize,
    /// Keep the groups from the input
    Keep,
}

impl From<Mode> for GroupingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Optimize => GroupingMode::Optimize,
            Mode::Randomize => GroupingMode::Randomize,
            Mode::Keep => GroupingMode::Keep,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(v) = args.max_groups {
        config.optimizer.max_groups = v;
    }
    if let Some(v) = args.group_size {
        config.optimizer.group_size = v;
    }
    if args.seed.is_some() {
        config.optimizer.seed = args.seed;
    }
    if let Some(v) = args.width {
        config.layout.width = v;
    }
    if let Some(v) = args.height {
        config.layout.height = v;
    }

    let input = read_input(args.input.as_deref())?;
    let output = process_roster(&input, &config, args.mode.into(), args.regroup)?;
    if output.graph.is_empty() {
        log::warn!("no guests found in input");
    }
    let report = &output.report;
    if let Some(randomized) = report.randomized.filter(|r| r.full > 0) {
        log::warn!(
            "{} guests did not fit into {} groups of {}",
            randomized.full,
            config.optimizer.max_groups,
            config.optimizer.group_size
        );
    }
    log::info!(
        "cost {} -> {} after {} passes",
        report.initial_cost,
        report.final_cost,
        report.passes
    );

    write_output_roster(&output.roster, args.output.as_deref())?;

    if let Some(path) = args.svg.as_deref() {
        let svg = render_svg(&output.graph, output.bounds, &config.theme, &config.render, None);
        write_output_svg(&svg, Some(path))?;
    }
    #[cfg(feature = "png")]
    if let Some(path) = args.png.as_deref() {
        let svg = render_svg(&output.graph, output.bounds, &config.theme, &config.render, None);
        crate::render::write_output_png(&svg, path, output.bounds)?;
    }
    if let Some(path) = args.layout_dump.as_deref() {
        write_layout_dump(path, &output.graph, output.bounds)?;
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
