//! Source normalization ahead of the structural pass.
//!
//! Normalization removes text that carries no content payload: comments,
//! preamble commands, page-layout no-ops, and wrapper environments
//! (`titlepage`, `center`, `figure`). It deliberately does NOT touch
//! inline formatting commands; those are re-detected structurally per line
//! by [`crate::inline::parse_inline_spans`], and stripped to plain text
//! where structure demands it by [`crate::inline::strip_inline_markup`].
//! Keeping the two passes separate is what prevents embedded braces from
//! confusing the line splitter.

use regex::Regex;
use std::sync::LazyLock;

static RE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^\\])[ \t]*%.*$").expect("valid comment regex"));

static RE_PREAMBLE_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:documentclass|usepackage)(?:\[[^\]]*\])?\{[^}]*\}")
        .expect("valid preamble cmd regex")
});

static RE_NOOP_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:centering|vfill|hfill|newpage|clearpage|pagebreak|noindent|maketitle|tableofcontents)\b")
        .expect("valid noop cmd regex")
});

static RE_WRAPPER_ENV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:begin|end)\{(?:titlepage|center|figure\*?)\}(?:\[[^\]]*\])?")
        .expect("valid wrapper env regex")
});

/// Strips `%` comments to end of line, tolerating escaped `\%`.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    RE_COMMENT.replace_all(text, "$1").to_string()
}

/// Removes commands and environment wrappers that carry no content.
///
/// `\begin{figure}` / `\end{figure}` lines are wrappers: the
/// `\includegraphics` and `\caption` inside them survive and are picked up
/// by the structural pass.
#[must_use]
pub fn strip_noop_commands(text: &str) -> String {
    let text = RE_PREAMBLE_CMD.replace_all(text, "");
    let text = RE_WRAPPER_ENV.replace_all(&text, "");
    RE_NOOP_CMD.replace_all(&text, "").to_string()
}

/// The full normalization pass: comments, then no-op commands.
#[must_use]
pub fn normalize(text: &str) -> String {
    strip_noop_commands(&strip_comments(text))
}

/// Isolates the document body.
///
/// Returns the substring between `\begin{document}` and `\end{document}`
/// when both (or either) are present; otherwise the full input.
#[must_use]
pub fn extract_body(source: &str) -> &str {
    let start = source
        .find(r"\begin{document}")
        .map_or(0, |p| p + r"\begin{document}".len());
    let end = source.find(r"\end{document}").unwrap_or(source.len());
    if start <= end {
        &source[start..end]
    } else {
        source
    }
}
