use crate::ir::{Graph, GroupLabel};
use crate::layout::Bounds;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub name: String,
    pub group: GroupLabel,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub friends: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub a: String,
    pub b: String,
}

impl LayoutDump {
    pub fn from_graph(graph: &Graph, bounds: Bounds) -> Self {
        let nodes = graph
            .nodes()
            .map(|(id, node)| NodeDump {
                name: node.name.clone(),
                group: node.group.clone(),
                x: node.position.x,
                y: node.position.y,
                width: node.size.width,
                height: node.size.height,
                friends: graph
                    .neighbors(id)
                    .iter()
                    .map(|friend| graph.node(*friend).name.clone())
                    .collect(),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                a: graph.node(edge.a).name.clone(),
                b: graph.node(edge.b).name.clone(),
            })
            .collect();

        LayoutDump {
            width: bounds.width,
            height: bounds.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, graph: &Graph, bounds: Bounds) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_graph(graph, bounds);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::apply_grid_layout;

    #[test]
    fn dump_serializes_groups_as_text() {
        let mut graph = Graph::new();
        let a = graph.add_node("A", GroupLabel::Group(3));
        let b = graph.add_node("B", GroupLabel::Full);
        graph.add_edge(a, b);
        let bounds = Bounds {
            width: 200.0,
            height: 100.0,
        };
        apply_grid_layout(&mut graph, bounds);

        let value = serde_json::to_value(LayoutDump::from_graph(&graph, bounds)).unwrap();
        assert_eq!(value["nodes"][0]["group"], "3");
        assert_eq!(value["nodes"][1]["group"], "Full");
        assert_eq!(value["nodes"][0]["friends"][0], "B");
        assert_eq!(value["nodes"][1]["x"], 150.0);
        assert_eq!(value["edges"][0]["a"], "A");
    }
}
