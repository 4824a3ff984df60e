use crate::ir::Graph;
use crate::parser::RosterRow;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

pub const HEADER: &str = "Name,Friends,Group";
const FRIEND_JOINER: &str = "; ";
const BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to write roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write roster: {0}")]
    Io(#[from] io::Error),
    #[error("roster output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One row per node in display order. Friends are every node sharing an
/// edge with it, in the order the edges were added.
pub fn export_rows(graph: &Graph) -> Vec<RosterRow> {
    graph
        .nodes()
        .map(|(id, node)| RosterRow {
            name: node.name.clone(),
            friends: graph
                .neighbors(id)
                .iter()
                .map(|friend| graph.node(*friend).name.as_str())
                .collect::<Vec<_>>()
                .join(FRIEND_JOINER),
            group: node.group.clone(),
        })
        .collect()
}

/// Writes the header followed by every row with all fields double-quoted.
pub fn write_roster<W: Write>(mut writer: W, rows: &[RosterRow]) -> Result<(), RosterError> {
    writeln!(writer, "{HEADER}")?;
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    for row in rows {
        let group = row.group.to_string();
        csv_writer.write_record([row.name.as_str(), row.friends.as_str(), group.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn roster_to_string(rows: &[RosterRow]) -> Result<String, RosterError> {
    let mut buf = Vec::new();
    write_roster(&mut buf, rows)?;
    Ok(String::from_utf8(buf)?)
}

/// Writes to `output` with a leading byte-order mark for spreadsheet
/// tools, or to stdout without one.
pub fn write_output_roster(roster: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let mut contents = String::with_capacity(BOM.len() + roster.len());
            contents.push_str(BOM);
            contents.push_str(roster);
            std::fs::write(path, contents)?;
        }
        None => {
            print!("{}", roster);
        }
    }
    Ok(())
}
