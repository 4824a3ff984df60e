use crate::ir::{Graph, GroupLabel, NodeId};
use crate::layout::compare_names;
use once_cell::sync::Lazy;
use regex::Regex;

static FRIEND_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;,]").unwrap());

const BOM: char = '\u{feff}';

/// One guest line of a roster, as read from or written to the
/// `Name,Friends,Group` interchange format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterRow {
    pub name: String,
    /// Friend names separated by `;` or `,`.
    pub friends: String,
    pub group: GroupLabel,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    friends: Option<usize>,
    group: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Option<Self> {
        let find = |wanted: &str| {
            header
                .iter()
                .position(|cell| unquote(cell).eq_ignore_ascii_case(wanted))
        };
        Some(Self {
            name: find("Name")?,
            friends: find("Friends"),
            group: find("Group"),
        })
    }
}

/// Reads roster rows, sorted by name. Each line is its own record, so a
/// broken line never swallows the lines after it. Rows without a name and
/// lines the reader cannot decode are skipped.
pub fn parse_roster(input: &str) -> Vec<RosterRow> {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All);

    let mut columns: Option<Columns> = None;
    let mut rows = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        if line.matches('"').count() % 2 == 1 {
            log::warn!("roster line {line_no} has an unbalanced quote");
        }
        let record = match read_record(&builder, line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("skipping unreadable roster line {line_no}: {err}");
                continue;
            }
        };
        if record.iter().all(|cell| unquote(cell).is_empty()) {
            continue;
        }
        let Some(cols) = columns else {
            match Columns::from_header(&record) {
                Some(found) => columns = Some(found),
                None => {
                    log::warn!("roster header has no Name column");
                    return Vec::new();
                }
            }
            continue;
        };

        let cell = |idx: Option<usize>| idx.and_then(|idx| record.get(idx)).map(unquote);
        let name = cell(Some(cols.name)).unwrap_or_default();
        if name.is_empty() {
            log::warn!("skipping roster line {line_no} without a name");
            continue;
        }
        rows.push(RosterRow {
            name: name.to_string(),
            friends: cell(cols.friends).unwrap_or_default().to_string(),
            group: cell(cols.group)
                .map(GroupLabel::parse_field)
                .unwrap_or_default(),
        });
    }

    rows.sort_by(|a, b| compare_names(&a.name, &b.name));
    rows
}

fn read_record(
    builder: &csv::ReaderBuilder,
    line: &str,
) -> Result<Option<csv::StringRecord>, csv::Error> {
    builder.from_reader(line.as_bytes()).records().next().transpose()
}

/// Builds a graph from roster rows. Later rows repeating a name are
/// dropped; friend names that match no row are ignored.
pub fn import_rows(rows: &[RosterRow]) -> Graph {
    let mut graph = Graph::new();
    let mut pending: Vec<(NodeId, &str)> = Vec::with_capacity(rows.len());
    for row in rows {
        if graph.find_node_by_name(&row.name).is_some() {
            log::warn!("duplicate guest {:?} ignored", row.name);
            continue;
        }
        if holds_friend_separator(&row.name) {
            log::warn!(
                "guest {:?} contains a friend separator; friend lists cannot name them",
                row.name
            );
        }
        let id = graph.add_node(&row.name, row.group.clone());
        pending.push((id, row.friends.as_str()));
    }

    for (id, friends) in pending {
        for token in split_friends(friends) {
            match graph.find_node_by_name(token) {
                Some(friend) if friend != id => {
                    graph.add_edge(id, friend);
                }
                Some(_) => {}
                None => log::debug!(
                    "{:?} lists unknown friend {:?}",
                    graph.node(id).name,
                    token
                ),
            }
        }
    }
    graph
}

/// `parse_roster` followed by `import_rows`.
pub fn import_roster(input: &str) -> Graph {
    let rows = parse_roster(input);
    let graph = import_rows(&rows);
    log::info!(
        "imported {} guests with {} friendships",
        graph.len(),
        graph.edges().len()
    );
    graph
}

pub fn split_friends(raw: &str) -> impl Iterator<Item = &str> {
    FRIEND_SEPARATOR_RE
        .split(raw)
        .map(unquote)
        .filter(|token| !token.is_empty())
}

/// Names containing `;` or `,` are split apart when listed as a friend.
pub fn holds_friend_separator(name: &str) -> bool {
    FRIEND_SEPARATOR_RE.is_match(name)
}

fn unquote(cell: &str) -> &str {
    let trimmed = cell.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_any_column_order() {
        let input = "Group,Name,Friends\n2,Bob,Alice\n,Alice,\"Bob; Carol\"\n";
        let rows = parse_roster(input);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Alice");
        assert_eq!(rows[0].friends, "Bob; Carol");
        assert_eq!(rows[0].group, GroupLabel::Unassigned);
        assert_eq!(rows[1].name, "Bob");
        assert_eq!(rows[1].group, GroupLabel::Group(2));
    }

    #[test]
    fn strips_bom_quotes_and_blank_lines() {
        let input = "\u{feff}'Name','Friends'\n\n  'Zoe' , 'amy'  \n\n\"amy\",\n";
        let rows = parse_roster(input);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["amy", "Zoe"]);
        assert_eq!(rows[1].friends, "amy");
    }

    #[test]
    fn rows_without_names_are_dropped() {
        let rows = parse_roster("Name,Group\n,3\nDan,1\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Dan");
    }

    #[test]
    fn missing_name_column_yields_nothing() {
        assert!(parse_roster("Guest,Friends\nDan,\n").is_empty());
        assert!(parse_roster("").is_empty());
    }

    #[test]
    fn group_with_trailing_garbage_is_unassigned() {
        let rows = parse_roster("Name,Group\nEve,7abc\nFay,Full\nGus,None\n");
        assert_eq!(rows[0].group, GroupLabel::Unassigned);
        assert_eq!(rows[1].group, GroupLabel::Full);
        assert_eq!(rows[2].group, GroupLabel::Unassigned);
    }

    #[test]
    fn friends_resolve_case_insensitively() {
        let graph = import_roster("Name,Friends\nAlice,BOB; carol ; nobody\nBob,alice\nCarol,Alice\n");
        let alice = graph.find_node_by_name("alice").unwrap();
        let bob = graph.find_node_by_name("bob").unwrap();
        let carol = graph.find_node_by_name("carol").unwrap();
        assert_eq!(graph.edges().len(), 2);
        assert!(graph.is_connected(alice, bob));
        assert!(graph.is_connected(alice, carol));
        assert!(!graph.is_connected(bob, carol));
    }

    #[test]
    fn self_references_and_duplicates_are_ignored() {
        let rows = vec![
            RosterRow {
                name: "Ann".into(),
                friends: "ann, Ben".into(),
                group: GroupLabel::Group(1),
            },
            RosterRow {
                name: "Ben".into(),
                friends: String::new(),
                group: GroupLabel::Unassigned,
            },
            RosterRow {
                name: "ANN".into(),
                friends: "Ben".into(),
                group: GroupLabel::Group(5),
            },
        ];
        let graph = import_rows(&rows);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges().len(), 1);
        let ann = graph.find_node_by_name("Ann").unwrap();
        assert_eq!(graph.node(ann).group, GroupLabel::Group(1));
    }

    #[test]
    fn unbalanced_quote_stays_on_its_line() {
        let rows = parse_roster("Name,Friends,Group\nAlice,\"Bob,1\nBob,Alice,2\nCarol,,3\nDave,,4\n");
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol", "Dave"]);
        assert_eq!(rows[1].friends, "Alice");
        assert_eq!(rows[1].group, GroupLabel::Group(2));
        assert_eq!(rows[3].group, GroupLabel::Group(4));
    }

    #[test]
    fn doubled_quotes_survive_line_parsing() {
        let rows = parse_roster("Name,Friends,Group\r\n\"Bob \"\"B\"\"\",\"\",\"3\"\r\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Bob \"B\"");
        assert_eq!(rows[0].group, GroupLabel::Group(3));
    }

    #[test]
    fn names_with_separators_cannot_be_befriended() {
        assert!(holds_friend_separator("Smith, John"));
        assert!(holds_friend_separator("Doe; Jane"));
        assert!(!holds_friend_separator("Mary-Jane O'Neil"));

        let graph = import_roster("Name,Friends\n\"Smith, John\",\"Doe; Jane\"\n\"Doe; Jane\",\n");
        assert_eq!(graph.len(), 2);
        assert!(graph.find_node_by_name("smith, john").is_some());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn friend_tokens_split_on_both_separators() {
        let tokens: Vec<&str> = split_friends(" a ;b,, 'c' ;").collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }
}
