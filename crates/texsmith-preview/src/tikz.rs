//! Best-effort TikZ rendering.
//!
//! The preview cannot run a TikZ engine; instead, simple `\node` and
//! `\draw` coordinate declarations are pattern-matched into an inline SVG
//! sketch. Anything richer falls back to a labeled placeholder handled by
//! the caller.

use crate::escape_html;
use regex::Regex;
use std::sync::LazyLock;

static RE_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\node(?:\[[^\]]*\])?\s*(?:\([A-Za-z0-9_]+\))?\s*at\s*\(\s*(-?[0-9.]+)\s*,\s*(-?[0-9.]+)\s*\)\s*\{([^}]*)\}",
    )
    .expect("valid tikz node regex")
});

static RE_EDGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\draw(?:\[[^\]]*\])?\s*\(\s*(-?[0-9.]+)\s*,\s*(-?[0-9.]+)\s*\)\s*--\s*\(\s*(-?[0-9.]+)\s*,\s*(-?[0-9.]+)\s*\)",
    )
    .expect("valid tikz edge regex")
});

/// Pixels per TikZ coordinate unit.
const SCALE: f64 = 48.0;

/// Canvas padding in pixels.
const PAD: f64 = 24.0;

struct Node {
    x: f64,
    y: f64,
    label: String,
}

struct Edge {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// Renders the node/edge declarations of a `tikzpicture` body to an
/// inline SVG sketch.
///
/// Returns `None` when no declaration could be pattern-matched; the
/// caller substitutes its placeholder markup instead.
#[must_use]
pub fn render_tikz(body: &str) -> Option<String> {
    let nodes: Vec<Node> = RE_NODE
        .captures_iter(body)
        .filter_map(|cap| {
            Some(Node {
                x: cap[1].parse().ok()?,
                y: cap[2].parse().ok()?,
                label: cap[3].trim().to_string(),
            })
        })
        .collect();

    let edges: Vec<Edge> = RE_EDGE
        .captures_iter(body)
        .filter_map(|cap| {
            Some(Edge {
                x1: cap[1].parse().ok()?,
                y1: cap[2].parse().ok()?,
                x2: cap[3].parse().ok()?,
                y2: cap[4].parse().ok()?,
            })
        })
        .collect();

    if nodes.is_empty() && edges.is_empty() {
        return None;
    }

    // Bounding box over everything drawn, y flipped into screen space.
    let xs = nodes
        .iter()
        .map(|n| n.x)
        .chain(edges.iter().flat_map(|e| [e.x1, e.x2]));
    let ys = nodes
        .iter()
        .map(|n| n.y)
        .chain(edges.iter().flat_map(|e| [e.y1, e.y2]));
    let min_x = xs.clone().fold(f64::INFINITY, f64::min);
    let max_x = xs.fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.clone().fold(f64::INFINITY, f64::min);
    let max_y = ys.fold(f64::NEG_INFINITY, f64::max);

    let width = (max_x - min_x) * SCALE + PAD * 2.0;
    let height = (max_y - min_y) * SCALE + PAD * 2.0;
    let tx = |x: f64| (x - min_x) * SCALE + PAD;
    let ty = |y: f64| (max_y - y) * SCALE + PAD;

    let mut svg = format!(
        "<svg class=\"tikz-sketch\" viewBox=\"0 0 {width:.0} {height:.0}\" \
         width=\"{width:.0}\" height=\"{height:.0}\" xmlns=\"http://www.w3.org/2000/svg\">"
    );

    for edge in &edges {
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" \
             stroke=\"currentColor\" stroke-width=\"1.5\"/>",
            tx(edge.x1),
            ty(edge.y1),
            tx(edge.x2),
            ty(edge.y2)
        ));
    }

    for node in &nodes {
        let cx = tx(node.x);
        let cy = ty(node.y);
        svg.push_str(&format!(
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"16\" fill=\"none\" \
             stroke=\"currentColor\" stroke-width=\"1.5\"/>"
        ));
        if !node.label.is_empty() {
            svg.push_str(&format!(
                "<text x=\"{cx:.1}\" y=\"{:.1}\" text-anchor=\"middle\" \
                 font-size=\"12\">{}</text>",
                cy + 4.0,
                escape_html(&node.label)
            ));
        }
    }

    svg.push_str("</svg>");
    Some(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_and_edges_become_svg() {
        let body = r"\node at (0,0) {A}; \node at (2,0) {B}; \draw (0,0) -- (2,0);";
        let svg = render_tikz(body).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.contains(">A</text>"));
    }

    #[test]
    fn test_unmatched_body_returns_none() {
        assert!(render_tikz(r"\fill[red] (0,0) rectangle (1,1);").is_none());
    }

    #[test]
    fn test_node_labels_escaped() {
        let svg = render_tikz(r"\node at (0,0) {a<b};").unwrap();
        assert!(svg.contains("a&lt;b"));
    }
}
