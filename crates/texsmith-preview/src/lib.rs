//! # texsmith-preview
//!
//! One-way, best-effort LaTeX → HTML rendering for the live preview
//! pane.
//!
//! The renderer shares the command catalogue of the round-trip engine
//! but is deliberately decoupled from it: preview output is never parsed
//! back, so it is allowed to be lossy. Math renders to MathML through
//! the pure-Rust `latex2mathml` converter, simple TikZ node/edge
//! pictures become inline SVG sketches, and anything the pane cannot
//! faithfully render degrades to a labeled placeholder. A failure in any
//! single construct is replaced with an inline error marker and never
//! aborts the rest of the document.
//!
//! ```rust
//! use texsmith_preview::PreviewRenderer;
//!
//! let html = PreviewRenderer::new().render("\\section{Intro}\nSome \\textbf{bold} text.");
//! assert!(html.contains("<h1"));
//! assert!(html.contains("<strong>bold</strong>"));
//! ```

pub mod math;
pub mod tikz;

use math::{render_display_math, render_inline_math};
use regex::Regex;
use std::sync::LazyLock;
use texsmith_latex::normalize::{extract_body, normalize};
use texsmith_latex::patterns::{
    command_arg, font_size_block, match_caption, match_display_math, match_env_begin,
    match_heading, match_includegraphics, tabular_col_spec, EnvBegin, RE_AUTHOR_CMD, RE_DATE_CMD,
    RE_TITLE_CMD,
};
use texsmith_latex::strip_inline_markup;
use tikz::render_tikz;

/// Inline formatting command → HTML tag rules, applied innermost-first.
static FORMAT_RULES: LazyLock<Vec<(Regex, &'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"\\textbf\{([^{}]*)\}").expect("valid bold rule"),
            "<strong>",
            "</strong>",
        ),
        (
            Regex::new(r"\\(?:textit|emph)\{([^{}]*)\}").expect("valid italic rule"),
            "<em>",
            "</em>",
        ),
        (
            Regex::new(r"\\underline\{([^{}]*)\}").expect("valid underline rule"),
            "<u>",
            "</u>",
        ),
        (
            Regex::new(r"\\texttt\{([^{}]*)\}").expect("valid code rule"),
            "<code>",
            "</code>",
        ),
        (
            Regex::new(r"\\textsf\{([^{}]*)\}").expect("valid sans rule"),
            "<span class=\"font-sans\">",
            "</span>",
        ),
        (
            Regex::new(r"\\textrm\{([^{}]*)\}").expect("valid serif rule"),
            "<span class=\"font-serif\">",
            "</span>",
        ),
    ]
});

static RE_RESIDUAL_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\*?").expect("valid residual cmd regex"));

/// Escapes HTML-special characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// LaTeX → HTML preview renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PreviewRenderer;

impl PreviewRenderer {
    /// Creates a new renderer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders LaTeX source to a displayable HTML fragment.
    ///
    /// Rendering is total: unrecognized constructs degrade to placeholders
    /// or plain text, and per-construct failures become inline error
    /// markers.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let mut out = String::from("<div class=\"texsmith-preview\">\n");

        render_metadata_header(source, &mut out);

        let body = extract_body(source);
        let normalized = normalize(body);
        let lines: Vec<&str> = normalized.lines().collect();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim();
            if line.is_empty() || is_consumed_line(line) {
                i += 1;
                continue;
            }

            if let Some((level, arg)) = match_heading(line) {
                out.push_str(&format!(
                    "<h{level} class=\"preview-heading\">{}</h{level}>\n",
                    render_inline(&arg)
                ));
                i += 1;
                continue;
            }

            if let Some(env) = match_env_begin(line) {
                i = render_environment(&lines, i, &env, &mut out);
                continue;
            }

            if line.starts_with("$$") {
                i = render_display_block(&lines, i, &mut out);
                continue;
            }

            if let Some(url) = match_includegraphics(line) {
                out.push_str(&format!(
                    "<figure class=\"preview-figure\"><img src=\"{}\" alt=\"\"/></figure>\n",
                    escape_html(&url)
                ));
                if let Some(caption) = match_caption(line) {
                    push_caption(&caption, &mut out);
                }
                i += 1;
                continue;
            }

            if let Some(caption) = match_caption(line) {
                push_caption(&caption, &mut out);
                i += 1;
                continue;
            }

            if line.starts_with(r"\end{") {
                i += 1;
                continue;
            }

            let rendered = render_inline(line);
            if !rendered.trim().is_empty() {
                out.push_str(&format!("<p>{rendered}</p>\n"));
            }
            i += 1;
        }

        out.push_str("</div>\n");
        out
    }
}

/// Document header from the metadata catalogue (explicit commands first,
/// then the font-size title-page convention).
fn render_metadata_header(source: &str, out: &mut String) {
    let title = command_arg(source, &RE_TITLE_CMD)
        .map(|c| c.arg)
        .or_else(|| font_size_block(source, "Huge"));
    let author = command_arg(source, &RE_AUTHOR_CMD)
        .map(|c| c.arg)
        .or_else(|| font_size_block(source, "Large"));
    let date = command_arg(source, &RE_DATE_CMD)
        .map(|c| c.arg)
        .or_else(|| font_size_block(source, "large"));

    if title.is_none() && author.is_none() && date.is_none() {
        return;
    }

    out.push_str("<header class=\"doc-header\">\n");
    if let Some(title) = title {
        out.push_str(&format!(
            "<h1 class=\"doc-title\">{}</h1>\n",
            escape_html(&strip_inline_markup(&title))
        ));
    }
    if let Some(author) = author {
        out.push_str(&format!(
            "<div class=\"doc-author\">{}</div>\n",
            escape_html(&strip_inline_markup(&author))
        ));
    }
    if let Some(date) = date {
        out.push_str(&format!(
            "<div class=\"doc-date\">{}</div>\n",
            escape_html(&strip_inline_markup(&date))
        ));
    }
    out.push_str("</header>\n");
}

/// Lines consumed by the header pass.
fn is_consumed_line(line: &str) -> bool {
    let t = line.trim_start();
    (t.starts_with(r"\title") && !t.starts_with(r"\titlepage"))
        || t.starts_with(r"\author")
        || t.starts_with(r"\date")
}

fn push_caption(raw: &str, out: &mut String) {
    out.push_str(&format!(
        "<div class=\"preview-caption\">{}</div>\n",
        escape_html(&strip_inline_markup(raw))
    ));
}

/// Inline text rendering: math segments render to MathML, the rest is
/// escaped and mapped through the formatting rules.
#[must_use]
pub fn render_inline(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        let (before, after) = rest.split_at(pos);
        out.push_str(&render_formatted(before));

        let double = after.starts_with("$$");
        let open = if double { 2 } else { 1 };
        let delim = if double { "$$" } else { "$" };
        if let Some(close) = after[open..].find(delim) {
            let formula = after[open..open + close].trim();
            out.push_str(&if double {
                render_display_math(formula)
            } else {
                render_inline_math(formula)
            });
            rest = &after[open + close + open..];
        } else {
            // Lone dollar: literal.
            out.push_str(&render_formatted(after));
            rest = "";
        }
    }

    out.push_str(&render_formatted(rest));
    out
}

fn render_formatted(text: &str) -> String {
    // LaTeX escapes first, on the raw text.
    let mut unescaped = text.to_string();
    for (esc, plain) in [
        (r"\%", "%"),
        (r"\&", "&"),
        (r"\#", "#"),
        (r"\_", "_"),
        (r"\{", "{"),
        (r"\}", "}"),
    ] {
        unescaped = unescaped.replace(esc, plain);
    }

    let mut result = escape_html(&unescaped);

    // Innermost-first replacement: [^{}] arguments match only leaf
    // commands, so nesting resolves over the iterations.
    for _ in 0..10 {
        let mut changed = false;
        for (re, open, close) in FORMAT_RULES.iter() {
            let replacement = format!("{open}$1{close}");
            let replaced = re.replace_all(&result, replacement.as_str());
            if let std::borrow::Cow::Owned(s) = replaced {
                result = s;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Whatever command survived has no HTML mapping; drop it along with
    // grouping braces.
    result = RE_RESIDUAL_CMD.replace_all(&result, "").to_string();
    result.replace(['{', '}'], "")
}

/// Collects environment content through the matching `\end{name}`.
fn collect_environment(lines: &[&str], start: usize, env: &EnvBegin) -> (String, usize) {
    let end_marker = format!("\\end{{{}}}", env.name);
    if let Some(pos) = env.rest.find(&end_marker) {
        return (env.rest[..pos].to_string(), start + 1);
    }

    let mut content = env.rest.clone();
    let mut j = start + 1;
    while j < lines.len() {
        if let Some(pos) = lines[j].find(&end_marker) {
            content.push('\n');
            content.push_str(&lines[j][..pos]);
            return (content, j + 1);
        }
        content.push('\n');
        content.push_str(lines[j]);
        j += 1;
    }
    (content, j)
}

#[allow(clippy::too_many_lines)] // one arm per environment kind
fn render_environment(lines: &[&str], i: usize, env: &EnvBegin, out: &mut String) -> usize {
    match env.name.as_str() {
        "itemize" | "enumerate" => {
            let (content, next) = collect_environment(lines, i, env);
            let tag = if env.name == "itemize" { "ul" } else { "ol" };
            let items: Vec<String> = content
                .split(r"\item")
                .skip(1)
                .map(|part| render_inline(part.replace('\n', " ").trim()))
                .filter(|html| !html.trim().is_empty())
                .collect();
            if !items.is_empty() {
                out.push_str(&format!("<{tag}>\n"));
                for item in items {
                    out.push_str(&format!("<li>{item}</li>\n"));
                }
                out.push_str(&format!("</{tag}>\n"));
            }
            next
        }
        "description" => {
            let (content, next) = collect_environment(lines, i, env);
            out.push_str("<dl>\n");
            for part in content.split(r"\item").skip(1) {
                let part = part.replace('\n', " ");
                let part = part.trim();
                if let Some(rest) = part.strip_prefix('[') {
                    if let Some(close) = rest.find(']') {
                        out.push_str(&format!(
                            "<dt>{}</dt>\n<dd>{}</dd>\n",
                            render_inline(&rest[..close]),
                            render_inline(rest[close + 1..].trim())
                        ));
                        continue;
                    }
                }
                if !part.is_empty() {
                    out.push_str(&format!("<dd>{}</dd>\n", render_inline(part)));
                }
            }
            out.push_str("</dl>\n");
            next
        }
        "tabular" | "tabular*" => {
            let rest = tabular_col_spec(&env.rest).map_or_else(|| env.rest.clone(), |(_, r)| r);
            let inner = EnvBegin {
                name: env.name.clone(),
                rest,
            };
            let (content, next) = collect_environment(lines, i, &inner);
            out.push_str("<table class=\"preview-table\">\n");
            for chunk in content.split(r"\\") {
                let row = chunk
                    .replace(r"\hline", "")
                    .replace(r"\toprule", "")
                    .replace(r"\midrule", "")
                    .replace(r"\bottomrule", "");
                let row = row.trim();
                if row.is_empty() {
                    continue;
                }
                out.push_str("<tr>");
                for cell in row.split('&') {
                    out.push_str(&format!("<td>{}</td>", render_inline(cell.trim())));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
            next
        }
        "equation" | "equation*" | "displaymath" => {
            let (content, next) = collect_environment(lines, i, env);
            out.push_str(&format!(
                "<div class=\"equation\">{}</div>\n",
                render_display_math(content.trim())
            ));
            next
        }
        "tikzpicture" => {
            let (content, next) = collect_environment(lines, i, env);
            match render_tikz(&content) {
                Some(svg) => out.push_str(&format!("{svg}\n")),
                None => out.push_str(
                    "<div class=\"unsupported\">[TikZ picture]</div>\n",
                ),
            }
            next
        }
        "verbatim" | "lstlisting" => {
            let (content, next) = collect_environment(lines, i, env);
            out.push_str(&format!(
                "<pre class=\"preview-verbatim\">{}</pre>\n",
                escape_html(content.trim_matches('\n'))
            ));
            next
        }
        other => {
            // No faithful rendering for this environment: labeled
            // placeholder, content skipped.
            let (_, next) = collect_environment(lines, i, env);
            out.push_str(&format!(
                "<div class=\"unsupported\">[{} environment]</div>\n",
                escape_html(other)
            ));
            next
        }
    }
}

fn render_display_block(lines: &[&str], start: usize, out: &mut String) -> usize {
    let first = lines[start].trim();
    if let Some(formula) = match_display_math(first) {
        out.push_str(&format!(
            "<div class=\"equation\">{}</div>\n",
            render_display_math(&formula)
        ));
        return start + 1;
    }

    let mut formula = first[2..].trim().to_string();
    let mut j = start + 1;
    while j < lines.len() {
        if let Some(pos) = lines[j].find("$$") {
            if !lines[j][..pos].trim().is_empty() {
                formula.push(' ');
                formula.push_str(lines[j][..pos].trim());
            }
            j += 1;
            break;
        }
        if !lines[j].trim().is_empty() {
            if !formula.is_empty() {
                formula.push(' ');
            }
            formula.push_str(lines[j].trim());
        }
        j += 1;
    }

    out.push_str(&format!(
        "<div class=\"equation\">{}</div>\n",
        render_display_math(&formula)
    ));
    j
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        PreviewRenderer::new().render(source)
    }

    #[test]
    fn test_heading_renders_tag_for_level() {
        let html = render("\\section{One}\n\\subsection{Two}");
        assert!(html.contains("<h1 class=\"preview-heading\">One</h1>"));
        assert!(html.contains("<h2 class=\"preview-heading\">Two</h2>"));
    }

    #[test]
    fn test_inline_formatting_maps_to_tags() {
        let html = render(r"Mix \textbf{bold} \textit{italic} \texttt{mono}.");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<code>mono</code>"));
    }

    #[test]
    fn test_nested_formatting_resolves() {
        let html = render(r"\textbf{outer \textit{inner}}");
        assert!(html.contains("<strong>outer <em>inner</em></strong>"));
    }

    #[test]
    fn test_lists_render() {
        let html = render("\\begin{itemize}\n\\item A\n\\item B\n\\end{itemize}");
        assert!(html.contains("<ul>"));
        assert_eq!(html.matches("<li>").count(), 2);

        let html = render(r"\begin{enumerate}\item One\end{enumerate}");
        assert!(html.contains("<ol>"));
    }

    #[test]
    fn test_description_renders_definition_list() {
        let html = render("\\begin{description}\n\\item[term] meaning\n\\end{description}");
        assert!(html.contains("<dt>term</dt>"));
        assert!(html.contains("<dd>meaning</dd>"));
    }

    #[test]
    fn test_table_renders() {
        let html = render("\\begin{tabular}{|c|c|}\n\\hline\na & b \\\\\n\\hline\n\\end{tabular}");
        assert!(html.contains("<table class=\"preview-table\">"));
        assert!(html.contains("<td>a</td><td>b</td>"));
    }

    #[test]
    fn test_inline_math_renders_mathml() {
        let html = render("energy $E = mc^2$ equivalence");
        assert!(html.contains("<math"));
        assert!(html.contains("energy "));
    }

    #[test]
    fn test_bad_math_yields_inline_error_only() {
        let html = render(r"before $\frac{bad$ after");
        assert!(html.contains("render-error"));
        // The rest of the line still rendered.
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn test_equation_environment_renders_block() {
        let html = render("\\begin{equation}\nx^2\n\\end{equation}");
        assert!(html.contains("class=\"equation\""));
        assert!(html.contains("<math"));
    }

    #[test]
    fn test_tikz_sketch_or_placeholder() {
        let html = render(
            "\\begin{tikzpicture}\n\\node at (0,0) {A};\n\\draw (0,0) -- (1,0);\n\\end{tikzpicture}",
        );
        assert!(html.contains("<svg"));

        let html = render("\\begin{tikzpicture}\n\\pgfmathparse{1}\n\\end{tikzpicture}");
        assert!(html.contains("[TikZ picture]"));
    }

    #[test]
    fn test_unknown_environment_placeholder() {
        let html = render("\\begin{minipage}\ninner\n\\end{minipage}");
        assert!(html.contains("[minipage environment]"));
        assert!(!html.contains("inner"));
    }

    #[test]
    fn test_image_and_caption() {
        let html = render(
            "\\begin{figure}\n\\includegraphics[width=0.5\\textwidth]{fig/a.png}\n\\caption{The caption}\n\\end{figure}",
        );
        assert!(html.contains("<img src=\"fig/a.png\""));
        assert!(html.contains("The caption"));
    }

    #[test]
    fn test_metadata_header() {
        let html = render("\\title{Doc Title}\n\\author{Someone}\n\\begin{document}\nBody.\n\\end{document}");
        assert!(html.contains("<h1 class=\"doc-title\">Doc Title</h1>"));
        assert!(html.contains("<div class=\"doc-author\">Someone</div>"));
        // Metadata commands do not leak into the body.
        assert_eq!(html.matches("Doc Title").count(), 1);
    }

    #[test]
    fn test_html_escaped_in_text() {
        let html = render("a < b & c > d");
        assert!(html.contains("a &lt; b &amp; c &gt; d"));
    }

    #[test]
    fn test_verbatim_preserved() {
        let html = render("\\begin{verbatim}\nlet x = 1;\n\\end{verbatim}");
        assert!(html.contains("<pre class=\"preview-verbatim\">let x = 1;</pre>"));
    }
}
