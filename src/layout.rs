pub mod text;

use serde::Serialize;
use std::cmp::Ordering;

use crate::ir::{Graph, GroupLabel, Point};

/// Drawing area the grid is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub cols: usize,
    pub rows: usize,
}

/// Near-square grid for `count` cells whose aspect follows the bounds.
pub fn grid_shape(count: usize, bounds: Bounds) -> Option<GridShape> {
    if count == 0 {
        return None;
    }
    let aspect = (bounds.width / bounds.height) as f64;
    let cols = ((count as f64 * aspect).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    Some(GridShape { cols, rows })
}

/// Cell centers for `count` items laid out left-to-right, top-to-bottom.
pub fn grid_positions(count: usize, bounds: Bounds) -> Vec<Point> {
    let Some(shape) = grid_shape(count, bounds) else {
        return Vec::new();
    };
    let cell_w = bounds.width / shape.cols as f32;
    let cell_h = bounds.height / shape.rows as f32;
    (0..count)
        .map(|i| Point {
            x: (i % shape.cols) as f32 * cell_w + cell_w / 2.0,
            y: (i / shape.cols) as f32 * cell_h + cell_h / 2.0,
        })
        .collect()
}

/// Places every node on the grid following the graph's display order.
pub fn apply_grid_layout(graph: &mut Graph, bounds: Bounds) {
    let order = graph.order().to_vec();
    let positions = grid_positions(order.len(), bounds);
    for (id, position) in order.into_iter().zip(positions) {
        graph.node_mut(id).position = position;
    }
}

/// Reorders the display order by group, then by name. Integer groups come
/// first in ascending order; sentinels and free-form labels share the last
/// rank so that only their names decide among them.
pub fn sort_by_group(graph: &mut Graph) {
    let mut order = graph.order().to_vec();
    order.sort_by(|a, b| {
        let left = graph.node(*a);
        let right = graph.node(*b);
        group_rank(&left.group)
            .cmp(&group_rank(&right.group))
            .then_with(|| compare_names(&left.name, &right.name))
    });
    graph.set_order(order);
}

/// Sort by group and lay the grid out again.
pub fn regroup(graph: &mut Graph, bounds: Bounds) {
    sort_by_group(graph);
    apply_grid_layout(graph, bounds);
}

fn group_rank(group: &GroupLabel) -> u64 {
    match group {
        GroupLabel::Group(id) => u64::from(*id),
        _ => u64::MAX,
    }
}

/// Case-insensitive name ordering with a byte-order tie break.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_follows_aspect_ratio() {
        let bounds = Bounds {
            width: 400.0,
            height: 100.0,
        };
        // ceil(sqrt(8 * 4)) = 6 columns, ceil(8 / 6) = 2 rows.
        assert_eq!(grid_shape(8, bounds), Some(GridShape { cols: 6, rows: 2 }));
        assert_eq!(grid_shape(0, bounds), None);
    }

    #[test]
    fn positions_are_cell_centers() {
        let bounds = Bounds {
            width: 200.0,
            height: 200.0,
        };
        let points = grid_positions(4, bounds);
        assert_eq!(
            points,
            vec![
                Point { x: 50.0, y: 50.0 },
                Point { x: 150.0, y: 50.0 },
                Point { x: 50.0, y: 150.0 },
                Point { x: 150.0, y: 150.0 },
            ]
        );
    }

    #[test]
    fn layout_is_deterministic() {
        let bounds = Bounds::default();
        assert_eq!(grid_positions(37, bounds), grid_positions(37, bounds));
        assert!(grid_positions(0, bounds).is_empty());
    }

    #[test]
    fn wide_bounds_leave_spare_columns() {
        let bounds = Bounds {
            width: 300.0,
            height: 120.0,
        };
        // ceil(sqrt(2.5)) = 2 columns even for a single node.
        assert_eq!(grid_positions(1, bounds), vec![Point { x: 75.0, y: 60.0 }]);
    }

    #[test]
    fn sort_by_group_puts_sentinels_last() {
        let mut graph = Graph::new();
        let zed = graph.add_node("Zed", GroupLabel::Group(1));
        let amy = graph.add_node("amy", GroupLabel::Full);
        let bea = graph.add_node("Bea", GroupLabel::Group(2));
        let abe = graph.add_node("Abe", GroupLabel::Group(1));
        let cat = graph.add_node("Cat", GroupLabel::Unassigned);
        sort_by_group(&mut graph);
        assert_eq!(graph.order(), &[abe, zed, bea, amy, cat]);
    }

    #[test]
    fn regroup_relayouts_in_new_order() {
        let mut graph = Graph::new();
        let b = graph.add_node("B", GroupLabel::Group(2));
        let a = graph.add_node("A", GroupLabel::Group(1));
        let bounds = Bounds {
            width: 200.0,
            height: 100.0,
        };
        regroup(&mut graph, bounds);
        assert_eq!(graph.node(a).position, Point { x: 50.0, y: 50.0 });
        assert_eq!(graph.node(b).position, Point { x: 150.0, y: 50.0 });
    }
}
