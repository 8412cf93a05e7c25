//! Low-level extractors for the fixed catalogue of LaTeX command and
//! environment forms.
//!
//! Each extractor is a pure function from input text to an optional match;
//! none of them errors on malformed input. The deliberate leniency policy:
//! a command with a missing closing brace degrades to "everything up to
//! end-of-line or the next command is the argument" instead of failing,
//! because user-typed LaTeX is frequently transiently malformed while
//! editing. Callers that get no match fall through to plain-text handling.

use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// Pre-compiled regex patterns using std::sync::LazyLock (Rust 1.80+)
// =============================================================================

// -- Metadata commands --
pub static RE_TITLE_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\title\s*\{").expect("valid title regex"));
pub static RE_AUTHOR_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\author\s*\{").expect("valid author regex"));
pub static RE_DATE_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\date\s*\{").expect("valid date regex"));

// -- Sectioning commands, one capture for the command word --
static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\\(chapter|section|subsection|subsubsection|paragraph|subparagraph)\*?\s*\{")
        .expect("valid heading regex")
});

// -- Environment delimiters --
static RE_ENV_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\\begin\{([a-zA-Z]+\*?)\}").expect("valid begin regex"));
static RE_ENV_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\{([a-zA-Z]+\*?)\}").expect("valid end regex"));

// -- Graphics --
static RE_INCLUDEGRAPHICS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\includegraphics\s*(?:\[[^\]]*\])?\s*\{").expect("valid includegraphics regex")
});
static RE_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\caption\s*\{").expect("valid caption regex"));

// -- Math --
static RE_DISPLAY_MATH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*\$\$(.*?)\$\$\s*$").expect("valid display math regex"));

// -- Title-page font-size convention --
static RE_SIZE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*\\(Huge|LARGE|Large|large)\b\s*").expect("valid size regex"));

/// A command match: the byte span of the full construct in the source and
/// the (raw, uncleaned) argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Byte offset of the start of the construct.
    pub start: usize,
    /// Byte offset one past the end of the construct.
    pub end: usize,
    /// The captured argument, braces excluded.
    pub arg: String,
}

/// Extracts a braced argument with nested-brace support.
///
/// `start_pos` must point at the opening `{`. Returns the content inside
/// the braces and the position after the closing brace, or `None` when the
/// braces never balance.
#[must_use]
pub fn extract_braced_arg(source: &str, start_pos: usize) -> Option<(String, usize)> {
    let bytes = source.as_bytes();
    if start_pos >= bytes.len() || bytes[start_pos] != b'{' {
        return None;
    }

    let mut depth = 0i32;
    for (i, &byte) in bytes.iter().enumerate().skip(start_pos) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((source[start_pos + 1..i].to_string(), i + 1));
                }
            }
            _ => {}
        }
    }

    None // Unmatched braces
}

/// Reads a braced argument, degrading on unbalanced braces.
///
/// When the closing brace is missing, the argument is everything from the
/// opening brace up to end-of-line or the next `\command`, whichever comes
/// first. Always succeeds; this is the leniency policy shared by every
/// extractor.
#[must_use]
pub fn lenient_braced_arg(source: &str, brace_pos: usize) -> (String, usize) {
    if let Some((arg, next)) = extract_braced_arg(source, brace_pos) {
        return (arg, next);
    }

    let tail = &source[brace_pos + 1..];
    let mut cut = tail.len();
    if let Some(nl) = tail.find('\n') {
        cut = cut.min(nl);
    }
    if let Some(cmd) = tail.find('\\') {
        cut = cut.min(cmd);
    }
    (tail[..cut].to_string(), brace_pos + 1 + cut)
}

/// Finds the first occurrence of a command (matched by `re`, which must
/// end at the opening brace) and extracts its argument leniently.
#[must_use]
pub fn command_arg(source: &str, re: &Regex) -> Option<Captured> {
    let m = re.find(source)?;
    let brace_pos = m.end() - 1;
    let (arg, end) = lenient_braced_arg(source, brace_pos);
    Some(Captured {
        start: m.start(),
        end,
        arg,
    })
}

/// Extracts the first `{\Huge ...}` / `{\Large ...}` / `{\large ...}`
/// title-page block for the given size command word.
///
/// These font-size groups are the conventional title/author/date markers
/// on hand-written title pages; the metadata pass consumes them before
/// normalization would destroy them.
#[must_use]
pub fn font_size_block(source: &str, size: &str) -> Option<String> {
    for cap in RE_SIZE_BLOCK.captures_iter(source) {
        if &cap[1] != size {
            continue;
        }
        let m = cap.get(0).expect("group 0 always exists");
        // The group opens at the brace the match started on.
        let (content, _) = lenient_braced_arg(source, m.start());
        // Drop the size command itself from the captured group body.
        let body = content
            .trim_start()
            .trim_start_matches(&format!("\\{size}"))
            .trim();
        if !body.is_empty() {
            return Some(body.to_string());
        }
    }
    None
}

/// Matches a sectioning command at the start of a line.
///
/// Returns the heading level (1–5; `\chapter` clamps to 1) and the raw
/// argument text.
#[must_use]
pub fn match_heading(line: &str) -> Option<(u8, String)> {
    let cap = RE_HEADING.captures(line)?;
    let level = match &cap[1] {
        "chapter" | "section" => 1,
        "subsection" => 2,
        "subsubsection" => 3,
        "paragraph" => 4,
        "subparagraph" => 5,
        _ => return None,
    };
    let m = cap.get(0).expect("group 0 always exists");
    let (arg, _) = lenient_braced_arg(line, m.end() - 1);
    Some((level, arg))
}

/// An environment opener found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBegin {
    /// Environment name, `*` suffix included.
    pub name: String,
    /// Text on the same line after the `\begin{...}` (and, for `tabular`,
    /// after its column-spec argument).
    pub rest: String,
}

/// Matches `\begin{name}` at the start of a line.
#[must_use]
pub fn match_env_begin(line: &str) -> Option<EnvBegin> {
    let cap = RE_ENV_BEGIN.captures(line)?;
    let m = cap.get(0).expect("group 0 always exists");
    Some(EnvBegin {
        name: cap[1].to_string(),
        rest: line[m.end()..].to_string(),
    })
}

/// Returns `true` if the line contains `\end{name}`.
#[must_use]
pub fn has_env_end(line: &str, name: &str) -> bool {
    RE_ENV_END
        .captures_iter(line)
        .any(|cap| &cap[1] == name)
}

/// Extracts the column-spec argument of a `tabular` opener.
///
/// Returns the verbatim column spec (brace-matched, so `p{3cm}` columns
/// survive) and the remainder of the line after it. An optional
/// `[...]`-style width/position argument between the environment name and
/// the spec is skipped.
#[must_use]
pub fn tabular_col_spec(rest: &str) -> Option<(String, String)> {
    let mut pos = 0;
    let bytes = rest.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    // Skip an optional [t]/[width] argument.
    if pos < bytes.len() && bytes[pos] == b'[' {
        let close = rest[pos..].find(']')?;
        pos += close + 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
    }
    if pos >= bytes.len() || bytes[pos] != b'{' {
        return None;
    }
    let (spec, next) = lenient_braced_arg(rest, pos);
    Some((spec, rest[next.min(rest.len())..].to_string()))
}

/// Matches an `\includegraphics` command anywhere in the line, returning
/// the image location.
#[must_use]
pub fn match_includegraphics(line: &str) -> Option<String> {
    let m = RE_INCLUDEGRAPHICS.find(line)?;
    let (url, _) = lenient_braced_arg(line, m.end() - 1);
    Some(url.trim().to_string())
}

/// Matches a `\caption` command anywhere in the line, returning the raw
/// caption text.
#[must_use]
pub fn match_caption(line: &str) -> Option<String> {
    command_arg(line, &RE_CAPTION).map(|c| c.arg)
}

/// Matches a single-line `$$...$$` display equation.
#[must_use]
pub fn match_display_math(line: &str) -> Option<String> {
    RE_DISPLAY_MATH_LINE
        .captures(line)
        .map(|cap| cap[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_braced_arg_nested() {
        let src = r"\title{Outer {inner} text} rest";
        let brace = src.find('{').unwrap();
        let (arg, next) = extract_braced_arg(src, brace).unwrap();
        assert_eq!(arg, "Outer {inner} text");
        assert_eq!(&src[next..], " rest");
    }

    #[test]
    fn test_extract_braced_arg_unmatched_returns_none() {
        let src = r"\textbf{never closed";
        assert!(extract_braced_arg(src, src.find('{').unwrap()).is_none());
    }

    #[test]
    fn test_lenient_arg_degrades_to_end_of_line() {
        let src = "\\textbf{Hello\nnext line";
        let (arg, _) = lenient_braced_arg(src, src.find('{').unwrap());
        assert_eq!(arg, "Hello");
    }

    #[test]
    fn test_lenient_arg_stops_at_next_command() {
        let src = r"\textbf{Hello \section{Intro}";
        let (arg, _) = lenient_braced_arg(src, src.find('{').unwrap());
        assert_eq!(arg, "Hello ");
    }

    #[test]
    fn test_command_arg_title() {
        let cap = command_arg(r"\title{My Paper} etc", &RE_TITLE_CMD).unwrap();
        assert_eq!(cap.arg, "My Paper");
        assert_eq!(cap.start, 0);
    }

    #[test]
    fn test_title_regex_does_not_match_titlepage() {
        assert!(command_arg(r"\titlepage{x}", &RE_TITLE_CMD).is_none());
    }

    #[test]
    fn test_font_size_block_huge() {
        let src = "\\begin{titlepage}\n{\\Huge My Thesis}\n{\\Large J. Smith}\n";
        assert_eq!(font_size_block(src, "Huge").unwrap(), "My Thesis");
        assert_eq!(font_size_block(src, "Large").unwrap(), "J. Smith");
        assert!(font_size_block(src, "large").is_none());
    }

    #[test]
    fn test_match_heading_levels() {
        assert_eq!(match_heading(r"\section{Intro}").unwrap(), (1, "Intro".to_string()));
        assert_eq!(
            match_heading(r"  \subsubsection{Deep}").unwrap(),
            (3, "Deep".to_string())
        );
        assert_eq!(
            match_heading(r"\subparagraph{Tiny}").unwrap(),
            (5, "Tiny".to_string())
        );
        // Chapters clamp into the model's 1-5 range.
        assert_eq!(match_heading(r"\chapter{One}").unwrap(), (1, "One".to_string()));
        assert!(match_heading("plain text").is_none());
    }

    #[test]
    fn test_match_heading_starred() {
        assert_eq!(
            match_heading(r"\section*{Unnumbered}").unwrap(),
            (1, "Unnumbered".to_string())
        );
    }

    #[test]
    fn test_env_begin_end() {
        let begin = match_env_begin(r"\begin{itemize} trailing").unwrap();
        assert_eq!(begin.name, "itemize");
        assert_eq!(begin.rest, " trailing");
        assert!(has_env_end(r"\item x \end{itemize}", "itemize"));
        assert!(!has_env_end(r"\end{enumerate}", "itemize"));
    }

    #[test]
    fn test_tabular_col_spec_verbatim() {
        let begin = match_env_begin(r"\begin{tabular}{|c|r|} a & b \\").unwrap();
        let (spec, rest) = tabular_col_spec(&begin.rest).unwrap();
        assert_eq!(spec, "|c|r|");
        assert_eq!(rest, r" a & b \\");
    }

    #[test]
    fn test_tabular_col_spec_with_p_column() {
        let (spec, _) = tabular_col_spec(r"{|l|p{3cm}|}").unwrap();
        assert_eq!(spec, "|l|p{3cm}|");
    }

    #[test]
    fn test_tabular_col_spec_skips_position_arg() {
        let (spec, _) = tabular_col_spec(r"[t]{cc}").unwrap();
        assert_eq!(spec, "cc");
    }

    #[test]
    fn test_includegraphics_with_options() {
        assert_eq!(
            match_includegraphics(r"\includegraphics[width=0.8\textwidth]{figs/plot.png}").unwrap(),
            "figs/plot.png"
        );
        assert_eq!(
            match_includegraphics(r"\includegraphics{logo}").unwrap(),
            "logo"
        );
    }

    #[test]
    fn test_display_math_line() {
        assert_eq!(match_display_math("$$ x^2 $$").unwrap(), "x^2");
        assert!(match_display_math("text $x$ more").is_none());
    }
}
