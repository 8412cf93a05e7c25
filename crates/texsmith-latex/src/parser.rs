//! LaTeX source → structured document.
//!
//! The parse pipeline, in order:
//!
//! 1. metadata extraction (before any cleanup, because the font-size
//!    title-page markers would not survive normalization),
//! 2. normalization (comments, no-op commands, wrapper environments),
//! 3. body isolation between `\begin{document}` / `\end{document}`,
//! 4. a line-oriented structural pass producing typed blocks,
//! 5. an empty-document fallback paragraph,
//! 6. a top-level catch: parsing never throws past this boundary. On an
//!    unexpected failure the result is a document whose body is a single
//!    paragraph reporting the parse error; the source text stays
//!    authoritative elsewhere.

use crate::inline::{parse_inline_spans, strip_inline_markup};
use crate::normalize::{extract_body, normalize};
use crate::patterns::{
    command_arg, font_size_block, match_caption, match_display_math, match_env_begin,
    match_heading, match_includegraphics, tabular_col_spec, EnvBegin, RE_AUTHOR_CMD, RE_DATE_CMD,
    RE_TITLE_CMD,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use texsmith_core::{
    default_date, Block, Document, ListItem, TableCell, TableRow, TextSpan, DEFAULT_AUTHOR,
    DEFAULT_TITLE,
};

/// Body text of the placeholder block emitted when the structural pass
/// fails unexpectedly.
const PARSE_ERROR_TEXT: &str =
    "Unable to parse the document structure. The original source is preserved.";

/// LaTeX → [`Document`] parser.
///
/// Parsing is total: malformed constructs degrade to plain text and an
/// unexpected failure in the structural pass is caught and surfaced as a
/// single error paragraph. `parse` never panics and never returns an
/// error value.
///
/// # Examples
///
/// ```rust
/// use texsmith_latex::LatexParser;
///
/// let doc = LatexParser::new().parse(r"\section{Intro} Hello.");
/// assert_eq!(doc.body()[0].plain_text(), "Intro");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LatexParser;

impl LatexParser {
    /// Creates a new parser.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses LaTeX source into a structured document.
    #[must_use]
    pub fn parse(&self, source: &str) -> Document {
        let (title, author, date) = extract_metadata(source);

        let body = catch_unwind(AssertUnwindSafe(|| parse_body(source))).unwrap_or_else(|_| {
            log::error!("structural pass panicked; emitting error placeholder block");
            vec![Block::text(PARSE_ERROR_TEXT)]
        });

        Document::new(title, author, date, body)
    }
}

/// Cleans a metadata argument; `\today` resolves to the current date.
fn clean_metadata_arg(raw: &str) -> String {
    if raw.contains(r"\today") {
        return default_date();
    }
    strip_inline_markup(raw)
}

/// The metadata pass.
///
/// For each of title, author, and date (in that fixed order): the
/// font-size title-page heuristic applies first and an explicit
/// `\title`/`\author`/`\date` command, when present and non-empty,
/// overwrites it — last applied wins. Each field independently falls back
/// heuristic → default.
fn extract_metadata(source: &str) -> (String, String, String) {
    let mut title = font_size_block(source, "Huge").map(|s| strip_inline_markup(&s));
    let mut author = font_size_block(source, "Large").map(|s| strip_inline_markup(&s));
    let mut date = font_size_block(source, "large").map(|s| strip_inline_markup(&s));

    for (slot, re) in [
        (&mut title, &*RE_TITLE_CMD),
        (&mut author, &*RE_AUTHOR_CMD),
        (&mut date, &*RE_DATE_CMD),
    ] {
        if let Some(cap) = command_arg(source, re) {
            let value = clean_metadata_arg(&cap.arg);
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
    }

    (
        title.filter(|v| !v.is_empty()).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        date.filter(|v| !v.is_empty()).unwrap_or_else(default_date),
    )
}

/// Lines that the metadata pass already consumed; they must not reappear
/// as body paragraphs.
fn is_metadata_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(r"\title") && !trimmed.starts_with(r"\titlepage")
        || trimmed.starts_with(r"\author")
        || trimmed.starts_with(r"\date")
}

/// The structural pass: one logical line at a time.
fn parse_body(source: &str) -> Vec<Block> {
    let body = extract_body(source);
    let normalized = normalize(body);
    let lines: Vec<&str> = normalized.lines().collect();

    let mut blocks: Vec<Block> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }

        if let Some((level, arg)) = match_heading(line) {
            blocks.push(Block::heading(level, strip_inline_markup(&arg)));
            i += 1;
            continue;
        }

        if let Some(env) = match_env_begin(line) {
            i = dispatch_environment(&lines, i, &env, &mut blocks);
            continue;
        }

        if line.starts_with("$$") {
            i = scan_display_math(&lines, i, &mut blocks);
            continue;
        }

        if let Some(url) = match_includegraphics(line) {
            let caption = match_caption(line).map(|c| strip_inline_markup(&c));
            blocks.push(Block::Image { url, caption });
            i += 1;
            continue;
        }

        if let Some(raw) = match_caption(line) {
            attach_caption(&mut blocks, &strip_inline_markup(&raw));
            i += 1;
            continue;
        }

        if line.starts_with(r"\end{") || is_metadata_line(line) {
            i += 1;
            continue;
        }

        let spans = parse_inline_spans(line);
        if !spans.iter().all(|s| s.text.trim().is_empty()) {
            blocks.push(Block::paragraph(spans));
        }
        i += 1;
    }

    blocks
}

/// Routes an environment opener to its scanner. Unrecognized environments
/// contribute no block themselves; their content falls through to the
/// line pass.
fn dispatch_environment(
    lines: &[&str],
    i: usize,
    env: &EnvBegin,
    blocks: &mut Vec<Block>,
) -> usize {
    match env.name.as_str() {
        "itemize" | "enumerate" => {
            let (content, next) = scan_environment(lines, i, env);
            let items = parse_list_items(&content);
            // An empty list produces no block.
            if !items.is_empty() {
                blocks.push(if env.name == "itemize" {
                    Block::BulletList { items }
                } else {
                    Block::NumberedList { items }
                });
            }
            next
        }
        "description" => {
            let (content, next) = scan_environment(lines, i, env);
            let items = parse_description_items(&content);
            if !items.is_empty() {
                blocks.push(Block::BulletList { items });
            }
            next
        }
        "tabular" | "tabular*" => {
            let (col_spec, rest) = match tabular_col_spec(&env.rest) {
                Some((spec, rest)) => (Some(spec), rest),
                None => (None, env.rest.clone()),
            };
            let inner = EnvBegin {
                name: env.name.clone(),
                rest,
            };
            let (content, next) = scan_environment(lines, i, &inner);
            if let Some(table) = parse_table(&content, col_spec) {
                blocks.push(table);
            }
            next
        }
        "equation" | "equation*" | "displaymath" => {
            let (content, next) = scan_environment(lines, i, env);
            let formula = content.trim().to_string();
            if !formula.is_empty() {
                blocks.push(Block::Equation { formula });
            }
            next
        }
        _ => {
            log::debug!("skipping unrecognized environment '{}'", env.name);
            i + 1
        }
    }
}

/// Collects environment content from the opening line through the
/// matching `\end{name}`.
///
/// Content may start on the opening line and the entire environment may
/// sit on a single line. An unterminated environment consumes the rest of
/// the body — the leniency policy, since the user may simply not have
/// typed `\end{...}` yet.
fn scan_environment(lines: &[&str], start: usize, env: &EnvBegin) -> (String, usize) {
    let end_marker = format!("\\end{{{}}}", env.name);

    if let Some(pos) = env.rest.find(&end_marker) {
        return (env.rest[..pos].to_string(), start + 1);
    }

    let mut content = env.rest.clone();
    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j];
        if let Some(pos) = line.find(&end_marker) {
            content.push('\n');
            content.push_str(&line[..pos]);
            return (content, j + 1);
        }
        content.push('\n');
        content.push_str(line);
        j += 1;
    }
    (content, j)
}

/// Splits list content on `\item` and builds items.
fn parse_list_items(content: &str) -> Vec<ListItem> {
    let mut items = Vec::new();
    for (idx, part) in content.split(r"\item").enumerate() {
        // Text before the first \item is environment options, not an item.
        if idx == 0 {
            continue;
        }
        let part = strip_leading_option(part.trim());
        let flattened = part.replace('\n', " ");
        let spans = parse_inline_spans(flattened.trim());
        let item = ListItem::new(spans);
        if !item.is_empty() {
            items.push(item);
        }
    }
    items
}

/// Splits description content on `\item`, reading the `[term] definition`
/// bracket convention. Terms render as bold runs; the definition follows
/// as plain text.
fn parse_description_items(content: &str) -> Vec<ListItem> {
    let mut items = Vec::new();
    for (idx, part) in content.split(r"\item").enumerate() {
        if idx == 0 {
            continue;
        }
        let part = part.trim().replace('\n', " ");
        let (term, definition) = match split_bracket_term(&part) {
            Some((t, d)) => (t, d),
            None => (String::new(), part.clone()),
        };

        let mut spans: Vec<TextSpan> = Vec::new();
        if !term.is_empty() {
            spans.push(TextSpan::styled(
                strip_inline_markup(&term),
                true,
                false,
                false,
                false,
                None,
            ));
        }
        let definition = definition.trim();
        if !definition.is_empty() {
            let text = if term.is_empty() {
                definition.to_string()
            } else {
                format!(": {definition}")
            };
            spans.extend(parse_inline_spans(&text));
        }

        let item = ListItem::new(spans);
        if !item.is_empty() {
            items.push(item);
        }
    }
    items
}

/// Reads a leading `[term]` bracket off a description item.
fn split_bracket_term(part: &str) -> Option<(String, String)> {
    let rest = part.strip_prefix('[')?;
    let close = rest.find(']')?;
    Some((rest[..close].to_string(), rest[close + 1..].to_string()))
}

/// Drops a leading `[...]` option argument (list markers, row spacing).
fn strip_leading_option(part: &str) -> &str {
    if let Some(rest) = part.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            return rest[close + 1..].trim_start();
        }
    }
    part
}

/// Parses tabular content: `\\` separates rows, `&` separates cells,
/// `\hline` (and booktabs rules) are separators, not row content.
fn parse_table(content: &str, col_spec: Option<String>) -> Option<Block> {
    let mut rows = Vec::new();

    for chunk in content.split(r"\\") {
        let cleaned = chunk
            .replace(r"\hline", "")
            .replace(r"\toprule", "")
            .replace(r"\midrule", "")
            .replace(r"\bottomrule", "");
        let trimmed = strip_leading_option(cleaned.trim());
        if trimmed.is_empty() {
            continue;
        }

        let cells: Vec<TableCell> = split_cells(trimmed)
            .into_iter()
            .map(|cell| TableCell::new(parse_inline_spans(cell.trim())))
            .collect();
        rows.push(TableRow::new(cells));
    }

    if rows.is_empty() {
        None
    } else {
        Some(Block::table(rows, col_spec))
    }
}

/// Splits a row on unescaped `&` column separators.
fn split_cells(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in row.chars() {
        if c == '&' && !escaped {
            cells.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        escaped = c == '\\' && !escaped;
    }
    cells.push(current);
    cells
}

/// Collects a `$$ ... $$` display equation, single- or multi-line.
fn scan_display_math(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let first = lines[start].trim();
    if let Some(formula) = match_display_math(first) {
        if !formula.is_empty() {
            blocks.push(Block::Equation { formula });
        }
        return start + 1;
    }

    let after = &first[2..];
    if let Some(pos) = after.find("$$") {
        // Closing delimiter on the same line; trailing text is dropped.
        let formula = after[..pos].trim().to_string();
        if !formula.is_empty() {
            blocks.push(Block::Equation { formula });
        }
        return start + 1;
    }

    let mut formula = after.trim().to_string();
    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j];
        if let Some(pos) = line.find("$$") {
            if !line[..pos].trim().is_empty() {
                if !formula.is_empty() {
                    formula.push(' ');
                }
                formula.push_str(line[..pos].trim());
            }
            j += 1;
            break;
        }
        if !line.trim().is_empty() {
            if !formula.is_empty() {
                formula.push(' ');
            }
            formula.push_str(line.trim());
        }
        j += 1;
    }

    if !formula.is_empty() {
        blocks.push(Block::Equation { formula });
    }
    j
}

/// Attaches a caption to the most recent uncaptioned image block; a
/// caption with no such image is dropped.
fn attach_caption(blocks: &mut [Block], text: &str) {
    if let Some(Block::Image { caption, .. }) = blocks.last_mut() {
        if caption.is_none() {
            *caption = Some(text.to_string());
            return;
        }
    }
    log::debug!("caption with no preceding image dropped: {text}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        LatexParser::new().parse(source)
    }

    #[test]
    fn test_metadata_explicit_commands() {
        let doc = parse("\\title{My Document}\n\\author{John Doe}\n\\date{2025-01-15}\n\\begin{document}\nContent here.\n\\end{document}");
        assert_eq!(doc.title(), "My Document");
        assert_eq!(doc.author(), "John Doe");
        assert_eq!(doc.date(), "2025-01-15");
    }

    #[test]
    fn test_metadata_defaults() {
        let doc = parse("Just a paragraph.");
        assert_eq!(doc.title(), DEFAULT_TITLE);
        assert_eq!(doc.author(), DEFAULT_AUTHOR);
        assert_eq!(doc.date(), default_date());
    }

    #[test]
    fn test_metadata_font_size_heuristic() {
        let doc = parse("\\begin{titlepage}\n{\\Huge Thesis Title}\n{\\Large A. Student}\n{\\large June 2024}\n\\end{titlepage}");
        assert_eq!(doc.title(), "Thesis Title");
        assert_eq!(doc.author(), "A. Student");
        assert_eq!(doc.date(), "June 2024");
    }

    #[test]
    fn test_metadata_explicit_overwrites_heuristic() {
        // Last applied in fixed extraction order wins: the explicit
        // command overwrites the font-size block, wherever it appears.
        let doc = parse("{\\Huge Heuristic Title}\n\\title{Explicit Title}\n");
        assert_eq!(doc.title(), "Explicit Title");
    }

    #[test]
    fn test_metadata_today_resolves() {
        let doc = parse(r"\date{\today}");
        assert_eq!(doc.date(), default_date());
    }

    #[test]
    fn test_metadata_empty_date_falls_back() {
        let doc = parse(r"\date{}");
        assert_eq!(doc.date(), default_date());
    }

    #[test]
    fn test_heading_levels() {
        let doc = parse("\\section{One}\n\\subsection{Two}\n\\subparagraph{Five}");
        let body = doc.body();
        assert!(matches!(body[0], Block::Heading { level: 1, .. }));
        assert!(matches!(body[1], Block::Heading { level: 2, .. }));
        assert!(matches!(body[2], Block::Heading { level: 5, .. }));
    }

    #[test]
    fn test_heading_markup_stripped() {
        let doc = parse(r"\section{The \textbf{Bold} Era}");
        assert_eq!(doc.body()[0].plain_text(), "The Bold Era");
    }

    #[test]
    fn test_single_line_itemize() {
        let doc = parse(r"\begin{itemize}\item A\item B\end{itemize}");
        match &doc.body()[0] {
            Block::BulletList { items } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].text(), "A");
                assert_eq!(items[1].text(), "B");
            }
            other => panic!("expected bullet list, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_line_enumerate() {
        let doc = parse("\\begin{enumerate}\n\\item First step\n\\item Second step\n\\end{enumerate}");
        match &doc.body()[0] {
            Block::NumberedList { items } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].text(), "First step");
            }
            other => panic!("expected numbered list, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_list_produces_no_block() {
        let doc = parse("\\begin{itemize}\n\\end{itemize}");
        // Only the invariant fallback paragraph remains.
        assert_eq!(doc.body_len(), 1);
        assert!(matches!(doc.body()[0], Block::Paragraph { ref spans } if spans.is_empty()));
    }

    #[test]
    fn test_description_terms_bold() {
        let doc = parse("\\begin{description}\n\\item[alpha] the first letter\n\\end{description}");
        match &doc.body()[0] {
            Block::BulletList { items } => {
                assert_eq!(items.len(), 1);
                assert!(items[0].spans[0].bold);
                assert_eq!(items[0].spans[0].text, "alpha");
                assert_eq!(items[0].text(), "alpha: the first letter");
            }
            other => panic!("expected bullet list, got {other:?}"),
        }
    }

    #[test]
    fn test_table_col_spec_preserved() {
        let doc = parse("\\begin{tabular}{|c|r|}\\hline a & b \\\\\\hline\\end{tabular}");
        match &doc.body()[0] {
            Block::Table {
                rows,
                cols,
                col_spec,
            } => {
                assert_eq!(col_spec.as_deref(), Some("|c|r|"));
                assert_eq!(*cols, 2);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].cells[0].text(), "a");
                assert_eq!(rows[0].cells[1].text(), "b");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_table_hline_is_separator_not_content() {
        let doc = parse(
            "\\begin{tabular}{cc}\n\\hline\nh1 & h2 \\\\\n\\hline\nc1 & c2 \\\\\n\\hline\n\\end{tabular}",
        );
        match &doc.body()[0] {
            Block::Table { rows, .. } => assert_eq!(rows.len(), 2),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_escaped_ampersand_stays_in_cell() {
        let doc = parse("\\begin{tabular}{c}\nTom \\& Jerry \\\\\n\\end{tabular}");
        match &doc.body()[0] {
            Block::Table { rows, cols, .. } => {
                assert_eq!(*cols, 1);
                assert_eq!(rows[0].cells[0].text(), "Tom & Jerry");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_equation_environment() {
        let doc = parse("\\begin{equation}\nE = mc^2\n\\end{equation}");
        match &doc.body()[0] {
            Block::Equation { formula } => assert_eq!(formula, "E = mc^2"),
            other => panic!("expected equation, got {other:?}"),
        }
    }

    #[test]
    fn test_display_math_dollars() {
        let doc = parse("$$ a^2 + b^2 = c^2 $$");
        match &doc.body()[0] {
            Block::Equation { formula } => assert_eq!(formula, "a^2 + b^2 = c^2"),
            other => panic!("expected equation, got {other:?}"),
        }
    }

    #[test]
    fn test_figure_image_with_caption() {
        let doc = parse(
            "\\begin{figure}[h]\n\\centering\n\\includegraphics[width=0.8\\textwidth]{plot.png}\n\\caption{Results over time}\n\\end{figure}",
        );
        match &doc.body()[0] {
            Block::Image { url, caption } => {
                assert_eq!(url, "plot.png");
                assert_eq!(caption.as_deref(), Some("Results over time"));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_paragraph_with_inline_styles() {
        let doc = parse(r"Some \textbf{bold} and \textit{italic} text.");
        match &doc.body()[0] {
            Block::Paragraph { spans } => {
                assert_eq!(spans.len(), 5);
                assert!(spans[1].bold);
                assert!(spans[3].italic);
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_command_tolerated() {
        let doc = parse(r"\textbf{Hello");
        match &doc.body()[0] {
            Block::Paragraph { spans } => {
                assert_eq!(spans.len(), 1);
                assert_eq!(spans[0].text, "Hello");
                assert!(!spans[0].bold);
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_source_yields_fallback_paragraph() {
        let doc = parse("");
        assert_eq!(doc.body_len(), 1);
        assert!(matches!(doc.body()[0], Block::Paragraph { .. }));
    }

    #[test]
    fn test_comments_stripped() {
        let doc = parse("real text % not this\n% nor this line");
        assert_eq!(doc.body_len(), 1);
        assert_eq!(doc.body()[0].plain_text(), "real text");
    }

    #[test]
    fn test_unterminated_environment_consumes_to_end() {
        let doc = parse("\\begin{itemize}\n\\item only one\nstray");
        match &doc.body()[0] {
            Block::BulletList { items } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].text(), "only one stray");
            }
            other => panic!("expected bullet list, got {other:?}"),
        }
    }

    #[test]
    fn test_preamble_not_parsed_as_body() {
        let doc = parse(
            "\\documentclass{report}\n\\usepackage{amsmath}\n\\begin{document}\nOnly this.\n\\end{document}",
        );
        assert_eq!(doc.body_len(), 1);
        assert_eq!(doc.body()[0].plain_text(), "Only this.");
    }
}
