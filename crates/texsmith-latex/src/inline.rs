//! Inline formatting: the strip/re-detect pair.
//!
//! Two deliberately separate passes share the same command catalogue:
//!
//! - [`strip_inline_markup`] flattens formatting commands to their bare
//!   text content. It is applied where the model stores plain text
//!   (heading and metadata arguments) and wherever embedded braces must
//!   not confuse structural splitting.
//! - [`parse_inline_spans`] re-detects the same commands structurally and
//!   produces flat [`TextSpan`] runs with combined attribute sets.
//!
//! Both tolerate unterminated commands: a missing closing brace degrades
//! to bare text content, never to visible markup and never to an error.

use crate::patterns::{extract_braced_arg, lenient_braced_arg};
use regex::Regex;
use std::sync::LazyLock;
use texsmith_core::{merge_adjacent_spans, TextSpan};

static RE_STYLED_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(textbf|textit|emph|underline|texttt|textrm|textsf)\s*\{")
        .expect("valid styled cmd regex")
});

static RE_GROUP_SWITCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*\\(rmfamily|sffamily|ttfamily|bfseries|itshape|Huge|huge|LARGE|Large|large|normalsize|small|footnotesize|scriptsize|tiny)\b\s*")
        .expect("valid group switch regex")
});

static RE_FONTFAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\fontfamily\s*\{[^}]*\}\s*(?:\\selectfont)?\s*").expect("valid fontfamily regex")
});

static RE_REF_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:cite|ref|label|pageref|eqref|vspace|hspace|bibliography)\s*\{[^}]*\}")
        .expect("valid ref cmd regex")
});

static RE_SIMPLE_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\*?").expect("valid simple cmd regex"));

static RE_MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid whitespace regex"));

/// Flattens all recognized inline formatting to bare text.
///
/// Nested commands are handled by repetition: each round inlines the
/// first remaining `\cmd{...}` occurrence, so `\textbf{\textit{x}}`
/// resolves to `x`. Unterminated commands fall back to the leniency
/// policy and still surrender their text content.
#[must_use]
pub fn strip_inline_markup(text: &str) -> String {
    let mut result = text.to_string();

    // Inline \cmd{X} -> X until none remain. Each round removes at least
    // the command token, so this terminates.
    while let Some(m) = RE_STYLED_CMD.find(&result) {
        let (arg, next) = lenient_braced_arg(&result, m.end() - 1);
        let mut rebuilt = String::with_capacity(result.len());
        rebuilt.push_str(&result[..m.start()]);
        rebuilt.push_str(&arg);
        rebuilt.push_str(&result[next.min(result.len())..]);
        result = rebuilt;
    }

    // {\sffamily X} / {\Large X} style group switches -> X.
    while let Some(m) = RE_GROUP_SWITCH.find(&result) {
        let (body, resume) = match extract_braced_arg(&result, m.start()) {
            Some((group, next)) => {
                let offset = m.end() - m.start() - 1;
                (group.get(offset..).unwrap_or("").to_string(), next)
            }
            None => {
                // Unterminated group: the rest of the line is the body.
                let tail = &result[m.end()..];
                let cut = tail.find('\n').unwrap_or(tail.len());
                (tail[..cut].to_string(), m.end() + cut)
            }
        };
        let mut rebuilt = String::with_capacity(result.len());
        rebuilt.push_str(&result[..m.start()]);
        rebuilt.push_str(body.trim());
        rebuilt.push_str(&result[resume.min(result.len())..]);
        result = rebuilt;
    }

    result = RE_FONTFAMILY.replace_all(&result, "").to_string();

    // Line breaks become spaces, escapes become their characters.
    result = result.replace(r"\\", " ");
    for (esc, plain) in [
        (r"\%", "%"),
        (r"\&", "&"),
        (r"\#", "#"),
        (r"\_", "_"),
        (r"\{", "{"),
        (r"\}", "}"),
        (r"\$", "$"),
    ] {
        result = result.replace(esc, plain);
    }

    // Citations and cross-references drop with their arguments; other
    // unknown commands drop alone, surrendering any braced content.
    result = RE_REF_CMD.replace_all(&result, "").to_string();
    result = RE_SIMPLE_CMD.replace_all(&result, " ").to_string();
    result = result.replace(['{', '}'], "");

    RE_MULTI_SPACE.replace_all(&result, " ").trim().to_string()
}

/// Style accumulator threaded through the span scanner.
#[derive(Debug, Clone, Default, PartialEq)]
struct StyleState {
    bold: bool,
    italic: bool,
    underline: bool,
    code: bool,
    font: Option<String>,
}

impl StyleState {
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

    fn with_command(&self, word: &str) -> Self {
        let mut next = self.clone();
        match word {
            "textbf" => next.bold = true,
            "textit" | "emph" => next.italic = true,
            "underline" => next.underline = true,
            "texttt" => next.code = true,
            "textrm" => next.font = Some("rm".to_string()),
            "textsf" => next.font = Some("sf".to_string()),
            _ => {}
        }
        next
    }

    fn with_switch(&self, word: &str) -> Self {
        let mut next = self.clone();
        match word {
            "rmfamily" => next.font = Some("rm".to_string()),
            "sffamily" => next.font = Some("sf".to_string()),
            "ttfamily" => next.font = Some("tt".to_string()),
            "bfseries" => next.bold = true,
            "itshape" => next.italic = true,
            _ => {}
        }
        next
    }
}

const STYLE_COMMANDS: [&str; 7] = [
    "textbf",
    "textit",
    "emph",
    "underline",
    "texttt",
    "textrm",
    "textsf",
];

const SWITCH_COMMANDS: [&str; 5] = ["rmfamily", "sffamily", "ttfamily", "bfseries", "itshape"];

/// Commands whose argument is an identifier, not content; both passes
/// drop these together with their argument.
const DROP_ARG_COMMANDS: [&str; 8] = [
    "cite",
    "ref",
    "label",
    "pageref",
    "eqref",
    "vspace",
    "hspace",
    "bibliography",
];

/// Re-detects inline formatting and produces flat spans.
///
/// Overlapping styles split the text into multiple spans, each carrying
/// the full combined attribute set; adjacent spans with identical
/// attributes are merged so the output is canonical.
///
/// # Examples
///
/// ```rust
/// use texsmith_latex::parse_inline_spans;
///
/// let spans = parse_inline_spans(r"plain \textbf{bold \textit{both}} tail");
/// assert_eq!(spans.len(), 4);
/// assert!(spans[1].bold && !spans[1].italic);
/// assert!(spans[2].bold && spans[2].italic);
/// ```
#[must_use]
pub fn parse_inline_spans(text: &str) -> Vec<TextSpan> {
    let mut out = Vec::new();
    scan(text, &StyleState::default(), &mut out);
    merge_adjacent_spans(out)
}

fn flush(buf: &mut String, style: &StyleState, out: &mut Vec<TextSpan>) {
    if !buf.is_empty() {
        out.push(style.span(std::mem::take(buf)));
    }
}

#[allow(clippy::too_many_lines)] // one scanner, one state machine
fn scan(text: &str, style: &StyleState, out: &mut Vec<TextSpan>) {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut buf = String::new();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\\' => {
                let rest = &text[i + 1..];
                let first = rest.chars().next();
                match first {
                    // Escaped specials become their literal character.
                    Some(c @ ('%' | '&' | '#' | '_' | '{' | '}' | '$')) => {
                        buf.push(c);
                        i += 1 + c.len_utf8();
                    }
                    // Forced line break reads as a space inside a run.
                    Some('\\') => {
                        buf.push(' ');
                        i += 2;
                    }
                    Some(c) if c.is_ascii_alphabetic() => {
                        let word: String =
                            rest.chars().take_while(char::is_ascii_alphabetic).collect();
                        let mut j = i + 1 + word.len();
                        if STYLE_COMMANDS.contains(&word.as_str()) {
                            while j < len && bytes[j] == b' ' {
                                j += 1;
                            }
                            if j < len && bytes[j] == b'{' {
                                if let Some((arg, next)) = extract_braced_arg(text, j) {
                                    flush(&mut buf, style, out);
                                    scan(&arg, &style.with_command(&word), out);
                                    i = next;
                                    continue;
                                }
                                // Unterminated: bare text content, styling dropped.
                                let (arg, next) = lenient_braced_arg(text, j);
                                flush(&mut buf, style, out);
                                scan(&arg, style, out);
                                i = next;
                                continue;
                            }
                            // Command without argument carries nothing.
                            i = j;
                            continue;
                        }
                        if j < len && bytes[j] == b'*' {
                            j += 1;
                        }
                        if DROP_ARG_COMMANDS.contains(&word.as_str()) {
                            // Identifier argument: dropped with the command.
                            while j < len && bytes[j] == b' ' {
                                j += 1;
                            }
                            if j < len && bytes[j] == b'{' {
                                let (_, next) = lenient_braced_arg(text, j);
                                j = next;
                            }
                        }
                        // Other unknown commands drop alone; their braced
                        // content (if any) survives as a plain group.
                        i = j;
                    }
                    // Lone trailing backslash.
                    _ => {
                        i += 1;
                    }
                }
            }
            b'{' => {
                if let Some((switch, body, next)) = font_group(text, i) {
                    flush(&mut buf, style, out);
                    scan(&body, &switch_style(style, &switch), out);
                    i = next;
                } else if let Some((arg, next)) = extract_braced_arg(text, i) {
                    // Plain grouping braces are dropped, content kept.
                    flush(&mut buf, style, out);
                    scan(&arg, style, out);
                    i = next;
                } else {
                    // Unmatched open brace: dropped.
                    i += 1;
                }
            }
            b'}' => {
                // Stray close brace: dropped.
                i += 1;
            }
            b'$' => {
                // Inline/display math is carried verbatim, delimiters
                // included; the model does not interpret formulas inside
                // paragraph runs.
                let double = i + 1 < len && bytes[i + 1] == b'$';
                let (open_len, delim) = if double { (2, "$$") } else { (1, "$") };
                if let Some(close) = text[i + open_len..].find(delim) {
                    let end = i + open_len + close + open_len;
                    buf.push_str(&text[i..end]);
                    i = end;
                } else {
                    buf.push('$');
                    i += 1;
                }
            }
            _ => {
                let c = text[i..].chars().next().expect("in-bounds char");
                buf.push(c);
                i += c.len_utf8();
            }
        }
    }

    flush(&mut buf, style, out);
}

/// Describes the style switch a `{...}` group opens with, if any.
enum GroupSwitch {
    Word(String),
    FontFamily(String),
}

fn switch_style(style: &StyleState, switch: &GroupSwitch) -> StyleState {
    match switch {
        GroupSwitch::Word(w) => style.with_switch(w),
        GroupSwitch::FontFamily(name) => {
            let mut next = style.clone();
            next.font = Some(name.clone());
            next
        }
    }
}

/// Recognizes `{\sffamily ...}` group switches and
/// `{\fontfamily{F}\selectfont ...}` wrappers at `brace_pos`.
///
/// Returns the switch, the group body with the switch command removed,
/// and the position after the closing brace. Unbalanced groups are not
/// treated as switches; the caller falls through to plain-group handling.
fn font_group(text: &str, brace_pos: usize) -> Option<(GroupSwitch, String, usize)> {
    let (content, next) = extract_braced_arg(text, brace_pos)?;
    let trimmed = content.trim_start();

    for word in SWITCH_COMMANDS {
        if let Some(body) = trimmed.strip_prefix(&format!("\\{word}")) {
            // Require a word boundary so \ttfamilyx is not a switch.
            if body.chars().next().is_none_or(|c| !c.is_ascii_alphabetic()) {
                return Some((
                    GroupSwitch::Word(word.to_string()),
                    body.trim_start().to_string(),
                    next,
                ));
            }
        }
    }

    if let Some(after) = trimmed.strip_prefix("\\fontfamily") {
        let after = after.trim_start();
        if after.starts_with('{') {
            let (name, after_name) = lenient_braced_arg(after, 0);
            let mut body = &after[after_name.min(after.len())..];
            body = body.trim_start();
            if let Some(stripped) = body.strip_prefix("\\selectfont") {
                body = stripped;
            }
            return Some((
                GroupSwitch::FontFamily(name.trim().to_string()),
                body.trim_start().to_string(),
                next,
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_plain_passthrough() {
        assert_eq!(strip_inline_markup("just text"), "just text");
    }

    #[test]
    fn test_strip_bold_italic() {
        assert_eq!(
            strip_inline_markup(r"a \textbf{b} and \textit{c}"),
            "a b and c"
        );
    }

    #[test]
    fn test_strip_nested_commands() {
        assert_eq!(strip_inline_markup(r"\textbf{\textit{x}}"), "x");
    }

    #[test]
    fn test_strip_incomplete_command() {
        // Missing closing brace still surrenders the text.
        assert_eq!(strip_inline_markup(r"\textbf{Hello"), "Hello");
    }

    #[test]
    fn test_strip_group_switch() {
        assert_eq!(strip_inline_markup(r"{\Huge My Title}"), "My Title");
        assert_eq!(strip_inline_markup(r"{\sffamily sans}"), "sans");
    }

    #[test]
    fn test_strip_unescapes_specials() {
        assert_eq!(strip_inline_markup(r"50\% \& counting"), "50% & counting");
    }

    #[test]
    fn test_strip_drops_citation_with_argument() {
        assert_eq!(strip_inline_markup(r"see \cite{knuth} here"), "see here");
    }

    #[test]
    fn test_spans_citation_dropped_with_argument() {
        let spans = parse_inline_spans(r"see \cite{knuth} here");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "see  here");
    }

    #[test]
    fn test_spans_plain() {
        let spans = parse_inline_spans("hello world");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hello world");
        assert!(!spans[0].has_styling());
    }

    #[test]
    fn test_spans_bold_run() {
        let spans = parse_inline_spans(r"a \textbf{b} c");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].text, "b");
        assert!(spans[1].bold);
        assert_eq!(spans[2].text, " c");
    }

    #[test]
    fn test_spans_nested_styles_combine() {
        let spans = parse_inline_spans(r"\textbf{bold \underline{deep}}");
        assert_eq!(spans.len(), 2);
        assert!(spans[0].bold && !spans[0].underline);
        assert!(spans[1].bold && spans[1].underline);
        assert_eq!(spans[1].text, "deep");
    }

    #[test]
    fn test_spans_incomplete_command_plain() {
        let spans = parse_inline_spans(r"\textbf{Hello");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello");
        assert!(!spans[0].bold, "unterminated command must not style");
    }

    #[test]
    fn test_spans_font_family_switch() {
        let spans = parse_inline_spans(r"{\sffamily sans} serif");
        assert_eq!(spans[0].font.as_deref(), Some("sf"));
        assert_eq!(spans[0].text, "sans");
        assert!(spans[1].font.is_none());
    }

    #[test]
    fn test_spans_fontfamily_selectfont() {
        let spans = parse_inline_spans(r"{\fontfamily{ptm}\selectfont Times text}");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].font.as_deref(), Some("ptm"));
        assert_eq!(spans[0].text, "Times text");
    }

    #[test]
    fn test_spans_adjacent_same_style_merged() {
        let spans = parse_inline_spans(r"\textbf{a}\textbf{b}");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "ab");
        assert!(spans[0].bold);
    }

    #[test]
    fn test_spans_inline_math_verbatim() {
        let spans = parse_inline_spans(r"energy $E = mc^2$ formula");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "energy $E = mc^2$ formula");
    }

    #[test]
    fn test_spans_escapes() {
        let spans = parse_inline_spans(r"100\% \_done\_");
        assert_eq!(spans[0].text, "100% _done_");
    }

    #[test]
    fn test_spans_unknown_command_dropped() {
        let spans = parse_inline_spans(r"x \relax y");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "x  y");
    }

    #[test]
    fn test_spans_vspace_argument_dropped() {
        let spans = parse_inline_spans(r"x \vspace{2mm} y");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "x  y");
    }

    #[test]
    fn test_spans_plain_group_braces_dropped() {
        let spans = parse_inline_spans("a {grouped} b");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "a grouped b");
    }
}
