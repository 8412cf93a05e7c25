//! # texsmith-html
//!
//! One-way importer from the visual editor's HTML (a contenteditable DOM
//! fragment) into the structured document model.
//!
//! The import is a plain tree walk with tag dispatch: block-level
//! elements map to [`Block`] variants, inline elements push style flags
//! onto a format stack that annotates the text runs beneath them. An
//! explicit [`ImportContext`] value is threaded through the walk —
//! tracking seen captions and consumed metadata lines — instead of
//! closures over mutable sets, so the importer is testable in isolation
//! per input.
//!
//! This path is deliberately outside the round-trip contract: it feeds
//! the model (and from there the LaTeX serializer) but nothing ever
//! renders back into it.

use scraper::{ElementRef, Html};
use std::collections::HashSet;
use texsmith_core::{
    Block, Document, ListItem, Result, TableCell, TableRow, TexsmithError, TextSpan,
    merge_adjacent_spans,
};

/// Inline style flags active at a point of the walk.
///
/// Tags push flags on entry and pop them on exit; a text node snapshots
/// the full combined set into its span.
#[derive(Debug, Clone, Default, PartialEq)]
struct FormatStack {
    bold: bool,
    italic: bool,
    underline: bool,
    code: bool,
    font: Option<String>,
}

impl FormatStack {
    fn with_tag(&self, tag: &str) -> Self {
        let mut next = self.clone();
        match tag {
            "b" | "strong" => next.bold = true,
            "i" | "em" | "var" => next.italic = true,
            "u" | "ins" => next.underline = true,
            "code" | "kbd" | "samp" | "tt" => next.code = true,
            _ => {}
        }
        next
    }

    fn span(&self, text: String) -> TextSpan {
        TextSpan {
            text,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            code: self.code,
            font: self.font.clone(),
        }
    }
}

/// Mutable import state threaded through the walk.
///
/// Keeps the walk free of hidden singleton state: what has been consumed
/// is visible in one value.
#[derive(Debug, Clone, Default)]
pub struct ImportContext {
    /// Caption texts already attached; the editor DOM can render the
    /// same caption twice (figcaption plus alt), and the second
    /// occurrence must not duplicate.
    seen_captions: HashSet<String>,
    /// Title slot consumed by a `doc-title` element.
    title: Option<String>,
    /// Author slot consumed by a `doc-author` element.
    author: Option<String>,
    /// Date slot consumed by a `doc-date` element.
    date: Option<String>,
}

impl ImportContext {
    /// Fresh context for one import.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// HTML → [`Document`] importer.
///
/// # Examples
///
/// ```rust
/// use texsmith_html::HtmlImporter;
///
/// let doc = HtmlImporter::new()
///     .import("<h1>Intro</h1><p>Some <strong>bold</strong> text.</p>")
///     .unwrap();
/// assert_eq!(doc.body().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HtmlImporter;

impl HtmlImporter {
    /// Creates a new importer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Imports an HTML fragment into a document.
    ///
    /// # Errors
    ///
    /// Returns [`TexsmithError::ImportError`] when the payload is empty —
    /// the surface must never replace a document with nothing by
    /// accident.
    pub fn import(&self, html: &str) -> Result<Document> {
        if html.trim().is_empty() {
            return Err(TexsmithError::ImportError(
                "empty visual-editor payload".to_string(),
            ));
        }

        let fragment = Html::parse_fragment(html);
        let mut ctx = ImportContext::new();
        let mut blocks = Vec::new();

        walk_children(fragment.root_element(), &mut ctx, &mut blocks);
        log::debug!("imported {} block(s) from visual editor", blocks.len());

        Ok(Document::new(
            ctx.title.unwrap_or_else(|| texsmith_core::DEFAULT_TITLE.to_string()),
            ctx.author.unwrap_or_else(|| texsmith_core::DEFAULT_AUTHOR.to_string()),
            ctx.date.unwrap_or_else(texsmith_core::default_date),
            blocks,
        ))
    }
}

/// Walks the element's children, dispatching block-level tags.
fn walk_children(el: ElementRef<'_>, ctx: &mut ImportContext, blocks: &mut Vec<Block>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            // Stray top-level text becomes its own paragraph.
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                blocks.push(Block::text(trimmed.to_string()));
            }
            continue;
        }
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        dispatch_element(element, ctx, blocks);
    }
}

#[allow(clippy::too_many_lines)] // tag dispatch table
fn dispatch_element(el: ElementRef<'_>, ctx: &mut ImportContext, blocks: &mut Vec<Block>) {
    let tag = el.value().name();
    let class = el.value().attr("class").unwrap_or("");

    // Metadata lines rendered by the surface carry marker classes; the
    // first occurrence fills the slot, repeats fall through as content.
    if class.split_whitespace().any(|c| c == "doc-title") && ctx.title.is_none() {
        ctx.title = Some(element_text(el));
        return;
    }
    if class.split_whitespace().any(|c| c == "doc-author") && ctx.author.is_none() {
        ctx.author = Some(element_text(el));
        return;
    }
    if class.split_whitespace().any(|c| c == "doc-date") && ctx.date.is_none() {
        ctx.date = Some(element_text(el));
        return;
    }

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag.as_bytes()[1] - b'0';
            blocks.push(Block::heading(level, element_text(el)));
        }
        "p" | "blockquote" | "address" | "summary" => {
            let spans = inline_spans(el);
            if !spans.iter().all(|s| s.text.trim().is_empty()) {
                blocks.push(Block::paragraph(spans));
            }
        }
        "ul" | "ol" => {
            let items = import_list_items(el);
            if !items.is_empty() {
                blocks.push(if tag == "ul" {
                    Block::BulletList { items }
                } else {
                    Block::NumberedList { items }
                });
            }
        }
        "table" => {
            if let Some(table) = import_table(el) {
                blocks.push(table);
            }
        }
        "figure" => import_figure(el, ctx, blocks),
        "img" => import_img(el, ctx, blocks),
        "pre" => {
            let text = element_text(el);
            if !text.is_empty() {
                blocks.push(Block::paragraph(vec![TextSpan::styled(
                    text, false, false, false, true, None,
                )]));
            }
        }
        "br" | "hr" | "script" | "style" => {}
        // Containers (div, section, article, html) recurse transparently.
        _ => walk_children(el, ctx, blocks),
    }
}

/// Collapsed plain text of an element.
fn element_text(el: ElementRef<'_>) -> String {
    let joined: String = el.text().collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collects inline runs beneath an element, carrying the format stack.
fn inline_spans(el: ElementRef<'_>) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    collect_spans(el, &FormatStack::default(), &mut spans);
    merge_adjacent_spans(spans)
}

fn collect_spans(el: ElementRef<'_>, stack: &FormatStack, spans: &mut Vec<TextSpan>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                spans.push(stack.span(collapsed));
            }
            continue;
        }
        if let Some(element) = ElementRef::wrap(child) {
            let tag = element.value().name();
            if tag == "br" {
                spans.push(stack.span(" ".to_string()));
                continue;
            }
            collect_spans(element, &stack.with_tag(tag), spans);
        }
    }
}

/// Collapses whitespace runs to single spaces without trimming the
/// edges, so adjacent inline elements keep their separating space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_ws = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            in_ws = false;
            out.push(c);
        }
    }
    out
}

fn import_list_items(el: ElementRef<'_>) -> Vec<ListItem> {
    let mut items = Vec::new();
    for child in el.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        if element.value().name() != "li" {
            continue;
        }
        let item = ListItem::new(inline_spans(element));
        if !item.is_empty() {
            items.push(item);
        }
    }
    items
}

fn import_table(el: ElementRef<'_>) -> Option<Block> {
    let tr = scraper::Selector::parse("tr").expect("valid tr selector");
    let cell_sel = scraper::Selector::parse("td, th").expect("valid cell selector");

    let mut rows = Vec::new();
    for row_el in el.select(&tr) {
        let cells: Vec<TableCell> = row_el
            .select(&cell_sel)
            .map(|cell| TableCell::new(inline_spans(cell)))
            .collect();
        if !cells.is_empty() {
            rows.push(TableRow::new(cells));
        }
    }

    if rows.is_empty() {
        None
    } else {
        Some(Block::table(rows, None))
    }
}

fn import_figure(el: ElementRef<'_>, ctx: &mut ImportContext, blocks: &mut Vec<Block>) {
    let img_sel = scraper::Selector::parse("img").expect("valid img selector");
    let figcaption_sel = scraper::Selector::parse("figcaption").expect("valid figcaption selector");

    let Some(img) = el.select(&img_sel).next() else {
        // A figure without an image degrades to its text content.
        let text = element_text(el);
        if !text.is_empty() {
            blocks.push(Block::text(text));
        }
        return;
    };

    let url = img.value().attr("src").unwrap_or_default().to_string();
    let caption = el
        .select(&figcaption_sel)
        .next()
        .map(element_text)
        .or_else(|| img.value().attr("alt").map(str::to_string))
        .filter(|c| !c.is_empty())
        .filter(|c| ctx.seen_captions.insert(c.clone()));

    blocks.push(Block::Image { url, caption });
}

fn import_img(el: ElementRef<'_>, ctx: &mut ImportContext, blocks: &mut Vec<Block>) {
    let url = el.value().attr("src").unwrap_or_default().to_string();
    let caption = el
        .value()
        .attr("alt")
        .map(str::to_string)
        .filter(|c| !c.is_empty())
        .filter(|c| ctx.seen_captions.insert(c.clone()));
    blocks.push(Block::Image { url, caption });
}
