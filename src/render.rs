use crate::config::RenderConfig;
use crate::ir::{Graph, NodeId};
use crate::layout::Bounds;
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Draws friendships as lines and guests as boxes colored by group.
pub fn render_svg(
    graph: &Graph,
    bounds: Bounds,
    theme: &Theme,
    config: &RenderConfig,
    selected: Option<NodeId>,
) -> String {
    let mut svg = String::new();
    let width = bounds.width.max(1.0);
    let height = bounds.height.max(1.0);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    );

    for edge in graph.edges() {
        let from = graph.node(edge.a).position;
        let to = graph.node(edge.b).position;
        let _ = write!(
            svg,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
            from.x, from.y, to.x, to.y, theme.line_color
        );
    }

    for (id, node) in graph.nodes() {
        let is_selected = selected == Some(id);
        let (fill, stroke, stroke_width) = if is_selected {
            (theme.selected_fill.clone(), theme.selected_border.clone(), 3.0)
        } else {
            (theme.group_fill(&node.group), theme.group_border(&node.group), 1.5)
        };
        let x = node.position.x - node.size.width / 2.0;
        let y = node.position.y - node.size.height / 2.0;
        let _ = write!(
            svg,
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{r}\" ry=\"{r}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
            node.size.width,
            node.size.height,
            r = config.corner_radius,
        );

        let name_y = if config.show_groups {
            node.position.y - 5.0
        } else {
            node.position.y
        };
        let _ = write!(
            svg,
            "<text x=\"{:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            node.position.x,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&node.name)
        );
        if config.show_groups {
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" font-style=\"italic\" fill=\"{}\">Group: {}</text>",
                node.position.x,
                node.position.y + 8.0,
                escape_xml(&theme.font_family),
                theme.group_font_size,
                theme.secondary_text_color,
                escape_xml(&node.group.to_string())
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, bounds: Bounds) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(bounds.width, bounds.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid preview size {}x{}", bounds.width, bounds.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
