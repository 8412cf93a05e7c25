//! Math rendering for the preview pane.
//!
//! Formulas render to MathML via the pure-Rust `latex2mathml` converter.
//! A formula that fails to render is replaced inline with a visible error
//! marker carrying the raw source; one bad formula never aborts the rest
//! of the preview.

use crate::escape_html;
use latex2mathml::{latex_to_mathml, DisplayStyle};

/// Renders an inline (`$...$`) formula.
#[must_use]
pub fn render_inline_math(formula: &str) -> String {
    render(formula, DisplayStyle::Inline)
}

/// Renders a display (`$$...$$` / `equation`) formula.
#[must_use]
pub fn render_display_math(formula: &str) -> String {
    render(formula, DisplayStyle::Block)
}

fn render(formula: &str, style: DisplayStyle) -> String {
    match latex_to_mathml(formula, style) {
        Ok(mathml) => mathml,
        Err(e) => {
            log::warn!("math render failed for '{formula}': {e}");
            format!(
                "<span class=\"render-error\" title=\"{}\">{}</span>",
                escape_html(&e.to_string()),
                escape_html(formula)
            )
        }
    }
}
