#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod optimizer;
pub mod parser;
pub mod render;
pub mod session;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, ConfigError, load_config};
pub use export::{export_rows, roster_to_string};
pub use ir::{Graph, GroupLabel, NodeId};
pub use layout::{Bounds, apply_grid_layout, grid_positions, regroup};
pub use optimizer::{CancelToken, GroupLimits, OptimizeReport, Optimizer, total_cost};
pub use parser::{RosterRow, import_roster, import_rows, parse_roster};
pub use render::render_svg;
pub use session::Session;
pub use theme::Theme;

/// What to do with the imported group assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    #[default]
    Optimize,
    Randomize,
    Keep,
}

#[derive(Debug)]
pub struct GroupingOutput {
    pub graph: Graph,
    pub bounds: Bounds,
    pub report: OptimizeReport,
    pub roster: String,
}

/// Import, lay out, group and export a roster in one call.
pub fn process_roster(
    input: &str,
    config: &Config,
    mode: GroupingMode,
    sort_by_group: bool,
) -> anyhow::Result<GroupingOutput> {
    let validated = config.validate()?;
    let mut graph = import_roster(input);
    apply_grid_layout(&mut graph, validated.bounds);

    let mut optimizer = Optimizer::from_seed(validated.limits, config.optimizer.seed);
    let report = match mode {
        GroupingMode::Optimize => optimizer.optimize(&mut graph),
        GroupingMode::Randomize => {
            let randomized = optimizer.randomize(&mut graph);
            let cost = total_cost(&graph);
            OptimizeReport {
                randomized: Some(randomized),
                initial_cost: cost,
                final_cost: cost,
                ..OptimizeReport::default()
            }
        }
        GroupingMode::Keep => {
            let cost = total_cost(&graph);
            OptimizeReport {
                initial_cost: cost,
                final_cost: cost,
                ..OptimizeReport::default()
            }
        }
    };

    if sort_by_group {
        regroup(&mut graph, validated.bounds);
    }
    let roster = roster_to_string(&export_rows(&graph))?;
    Ok(GroupingOutput {
        graph,
        bounds: validated.bounds,
        report,
        roster,
    })
}
