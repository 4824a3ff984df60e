//! Editing state for an interactive front end: selection, click-to-connect,
//! dragging, manual regrouping and guest search. The optimizer never looks
//! at any of this.

use rand::Rng;

use crate::ir::{Graph, GroupLabel, NodeId, Point};
use crate::layout::{Bounds, apply_grid_layout, regroup};
use crate::optimizer::{OptimizeReport, Optimizer, RandomizeReport};
use crate::parser::import_roster;

/// Pointer travel, in either axis, that turns a press into a drag.
pub const DRAG_THRESHOLD: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(NodeId),
    Connected(NodeId, NodeId),
    Disconnected(NodeId, NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Pressed {
        node: NodeId,
        origin: Point,
        grab_offset: Point,
        dragging: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    graph: Graph,
    bounds: Bounds,
    selected: Option<NodeId>,
    gesture: Gesture,
}

impl Session {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            graph: Graph::new(),
            bounds,
            selected: None,
            gesture: Gesture::Idle,
        }
    }

    /// Replaces the graph and lays it out on a fresh grid.
    pub fn load(&mut self, mut graph: Graph) {
        apply_grid_layout(&mut graph, self.bounds);
        self.graph = graph;
        self.selected = None;
        self.gesture = Gesture::Idle;
    }

    pub fn load_roster(&mut self, input: &str) {
        self.load(import_roster(input));
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// First node in display order whose box contains `point`. Where boxes
    /// overlap this is the one drawn underneath.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.graph
            .nodes()
            .find(|(_, node)| node.contains(point))
            .map(|(id, _)| id)
    }

    pub fn pointer_down(&mut self, point: Point) -> Option<NodeId> {
        let Some(node) = self.node_at(point) else {
            self.gesture = Gesture::Idle;
            return None;
        };
        let position = self.graph.node(node).position;
        self.gesture = Gesture::Pressed {
            node,
            origin: point,
            grab_offset: Point {
                x: point.x - position.x,
                y: point.y - position.y,
            },
            dragging: false,
        };
        Some(node)
    }

    /// Returns `true` when the pressed node moved.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let Gesture::Pressed {
            node,
            origin,
            grab_offset,
            ref mut dragging,
        } = self.gesture
        else {
            return false;
        };
        if (point.x - origin.x).abs() > DRAG_THRESHOLD || (point.y - origin.y).abs() > DRAG_THRESHOLD {
            *dragging = true;
        }
        if !*dragging {
            return false;
        }
        self.graph.node_mut(node).position = Point {
            x: point.x - grab_offset.x,
            y: point.y - grab_offset.y,
        };
        true
    }

    /// Ends the gesture. A press that never became a drag counts as a click.
    pub fn pointer_up(&mut self) -> Option<ClickOutcome> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Pressed {
                node,
                dragging: false,
                ..
            } => Some(self.click(node)),
            _ => None,
        }
    }

    /// Selects `node`, or toggles the friendship between it and the node
    /// already selected.
    pub fn click(&mut self, node: NodeId) -> ClickOutcome {
        match self.selected {
            Some(selected) if selected != node => {
                self.selected = None;
                if self.graph.toggle_edge(selected, node) {
                    ClickOutcome::Connected(selected, node)
                } else {
                    ClickOutcome::Disconnected(selected, node)
                }
            }
            _ => {
                self.selected = Some(node);
                ClickOutcome::Selected(node)
            }
        }
    }

    /// Sets a node's group from user text. Capacity limits do not apply.
    pub fn reassign(&mut self, node: NodeId, input: &str) -> GroupLabel {
        let group = GroupLabel::parse_manual(input);
        log::debug!("{:?} reassigned to {}", self.graph.node(node).name, group);
        self.graph.set_group(node, group.clone());
        group
    }

    /// First node, in display order, whose name contains `query` ignoring
    /// case. The match becomes the selection.
    pub fn find_guest(&mut self, query: &str) -> Option<NodeId> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let found = self
            .graph
            .nodes()
            .find(|(_, node)| node.name.to_lowercase().contains(&needle))
            .map(|(id, _)| id);
        if found.is_some() {
            self.selected = found;
        }
        found
    }

    pub fn randomize<R: Rng>(&mut self, optimizer: &mut Optimizer<R>) -> RandomizeReport {
        optimizer.randomize(&mut self.graph)
    }

    pub fn optimize<R: Rng>(&mut self, optimizer: &mut Optimizer<R>) -> OptimizeReport {
        optimizer.optimize(&mut self.graph)
    }

    /// Sorts by group and re-lays the grid so groups sit together.
    pub fn regroup(&mut self) {
        regroup(&mut self.graph, self.bounds);
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        apply_grid_layout(&mut self.graph, bounds);
    }
}
