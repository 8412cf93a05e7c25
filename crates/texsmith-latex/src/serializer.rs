//! Structured document → LaTeX source.
//!
//! Serialization is deterministic and total: every valid [`Document`]
//! value produces a LaTeX string, and every block variant has exactly one
//! mapping. Running the parser over serializer output and serializing
//! again reproduces the first output byte for byte — the round-trip fixed
//! point the visual editor relies on when switching surfaces.

use texsmith_core::{
    default_date, Block, Document, ListItem, TableRow, TextSpan, DEFAULT_AUTHOR, DEFAULT_TITLE,
};

/// The fixed document preamble.
///
/// Package order is part of the output contract (category order: layout,
/// math, graphics, tables, formatting, advanced layout) so that emitted
/// documents stay diffable across sessions.
pub const PREAMBLE: &str = "\\documentclass[12pt,a4paper,twoside]{report}\n\
\\usepackage{geometry}\n\
\\usepackage[utf8]{inputenc}\n\
\\usepackage{amsmath}\n\
\\usepackage{amssymb}\n\
\\usepackage{graphicx}\n\
\\usepackage{tikz}\n\
\\usepackage{rotating}\n\
\\usepackage{booktabs}\n\
\\usepackage{longtable}\n\
\\usepackage{colortbl}\n\
\\usepackage{titling}\n\
\\usepackage{setspace}\n\
\\usepackage{titlesec}\n\
\\usepackage{enumitem}\n\
\\usepackage{fancyhdr}\n\
\\usepackage{helvet}\n\
\\usepackage[table]{xcolor}\n\
\\usepackage{stackengine}\n\
\\usepackage{pdflscape}\n\
\\usepackage{standalone}\n\
\\usepackage{typearea}\n";

/// [`Document`] → LaTeX serializer.
///
/// # Examples
///
/// ```rust
/// use texsmith_core::{Block, Document};
/// use texsmith_latex::LatexSerializer;
///
/// let doc = Document::new("T", "A", "D", vec![Block::heading(1, "Intro")]);
/// let latex = LatexSerializer::new().serialize(&doc);
/// assert!(latex.contains("\\section{Intro}"));
/// assert!(latex.ends_with("\\end{document}\n"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LatexSerializer;

impl LatexSerializer {
    /// Creates a new serializer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Serializes a document to compilable LaTeX.
    #[must_use]
    pub fn serialize(&self, doc: &Document) -> String {
        let mut out = String::with_capacity(PREAMBLE.len() + doc.char_count() * 2);

        out.push_str(PREAMBLE);

        // Metadata falls back to the parser's defaults when a slot is
        // empty, so the emitted document always compiles standalone.
        let title = non_empty_or(doc.title(), DEFAULT_TITLE);
        let author = non_empty_or(doc.author(), DEFAULT_AUTHOR);
        let date = doc.date().trim();
        let date = if date.is_empty() {
            default_date()
        } else {
            date.to_string()
        };

        out.push_str(&format!("\\title{{{}}}\n", escape_latex(&title)));
        out.push_str(&format!("\\author{{{}}}\n", escape_latex(&author)));
        out.push_str(&format!("\\date{{{}}}\n", escape_latex(&date)));
        out.push_str("\n\\begin{document}\n\\maketitle\n");

        for block in doc.body() {
            if let Some(rendered) = serialize_block(block) {
                out.push('\n');
                out.push_str(&rendered);
                out.push('\n');
            }
        }

        out.push_str("\n\\end{document}\n");
        out
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escapes LaTeX special characters in plain text.
///
/// `$...$` / `$$...$$` math regions pass through verbatim: the parser
/// carries inline math untouched inside runs, and escaping a formula's
/// subscripts would corrupt it.
#[must_use]
pub fn escape_latex(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' {
            let double = i + 1 < bytes.len() && bytes[i + 1] == b'$';
            let (open, delim) = if double { (2, "$$") } else { (1, "$") };
            if let Some(close) = text[i + open..].find(delim) {
                let end = i + open + close + open;
                out.push_str(&text[i..end]);
                i = end;
                continue;
            }
        }
        let c = text[i..].chars().next().expect("in-bounds char");
        match c {
            '%' => out.push_str(r"\%"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            _ => out.push(c),
        }
        i += c.len_utf8();
    }

    out
}

/// Serializes inline runs, wrapping each span in the commands for its
/// active attributes.
///
/// The wrapping order is fixed and deterministic, outermost first:
/// font family, bold, italic, underline, code. The parser combines the
/// same attributes regardless of nesting order, so any input order
/// normalizes to this one after a single round trip.
fn serialize_spans(spans: &[TextSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        let mut piece = escape_latex(&span.text);
        if span.code {
            piece = format!("\\texttt{{{piece}}}");
        }
        if span.underline {
            piece = format!("\\underline{{{piece}}}");
        }
        if span.italic {
            piece = format!("\\textit{{{piece}}}");
        }
        if span.bold {
            piece = format!("\\textbf{{{piece}}}");
        }
        if let Some(font) = &span.font {
            piece = match font.as_str() {
                "rm" => format!("{{\\rmfamily {piece}}}"),
                "sf" => format!("{{\\sffamily {piece}}}"),
                "tt" => format!("{{\\ttfamily {piece}}}"),
                name => format!("{{\\fontfamily{{{name}}}\\selectfont {piece}}}"),
            };
        }
        out.push_str(&piece);
    }
    out
}

fn serialize_list(env: &str, items: &[ListItem]) -> String {
    let mut out = format!("\\begin{{{env}}}\n");
    for item in items {
        out.push_str("\\item ");
        out.push_str(&serialize_spans(&item.spans));
        out.push('\n');
    }
    out.push_str(&format!("\\end{{{env}}}"));
    out
}

fn serialize_table(rows: &[TableRow], cols: usize, col_spec: Option<&str>) -> String {
    // The author's original column spec wins; otherwise synthesize a
    // centered spec sized to the widest row.
    let spec = col_spec.map_or_else(|| format!("|{}", "c|".repeat(cols.max(1))), str::to_string);

    let mut out = format!("\\begin{{tabular}}{{{spec}}}\n\\hline\n");
    for row in rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| serialize_spans(&cell.spans))
            .collect();
        out.push_str(&cells.join(" & "));
        out.push_str(" \\\\\n\\hline\n");
    }
    out.push_str("\\end{tabular}");
    out
}

/// Maps one block to its LaTeX construct.
///
/// Returns `None` for metadata blocks (emitted in the preamble) and for
/// empty paragraphs, which serialize to nothing so that reparsing yields
/// the same block sequence.
fn serialize_block(block: &Block) -> Option<String> {
    match block {
        Block::Metadata { .. } => None,
        Block::Paragraph { spans } => {
            if spans.iter().all(|s| s.text.trim().is_empty()) {
                None
            } else {
                Some(serialize_spans(spans))
            }
        }
        Block::Heading { level, text } => {
            let command = match level {
                1 => "section",
                2 => "subsection",
                3 => "subsubsection",
                4 => "paragraph",
                _ => "subparagraph",
            };
            Some(format!("\\{command}{{{}}}", escape_latex(text)))
        }
        Block::BulletList { items } => Some(serialize_list("itemize", items)),
        Block::NumberedList { items } => Some(serialize_list("enumerate", items)),
        Block::Table {
            rows,
            cols,
            col_spec,
        } => Some(serialize_table(rows, *cols, col_spec.as_deref())),
        Block::Image { url, caption } => {
            let mut out = String::from("\\begin{figure}[h]\n\\centering\n");
            out.push_str(&format!(
                "\\includegraphics[width=0.8\\textwidth]{{{url}}}\n"
            ));
            if let Some(caption) = caption {
                out.push_str(&format!("\\caption{{{}}}\n", escape_latex(caption)));
            }
            out.push_str("\\end{figure}");
            Some(out)
        }
        Block::Equation { formula } => Some(format!(
            "\\begin{{equation}}\n{formula}\n\\end{{equation}}"
        )),
    }
}
