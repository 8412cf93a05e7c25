//! # texsmith-latex
//!
//! The bidirectional LaTeX ⟷ structured-document conversion engine behind
//! the texsmith visual editor.
//!
//! Two transforms share one fixed command catalogue:
//!
//! - [`LatexParser`] turns raw LaTeX source into a
//!   [`texsmith_core::Document`] — a flat sequence of typed blocks with
//!   inline style runs.
//! - [`LatexSerializer`] emits compilable LaTeX from a document,
//!   re-wrapping the fixed preamble.
//!
//! ## Supported constructs
//!
//! | Construct | LaTeX forms |
//! |-----------|-------------|
//! | Metadata | `\title{}`, `\author{}`, `\date{}`, `{\Huge}`/`{\Large}`/`{\large}` title-page blocks |
//! | Headings | `\chapter` … `\subparagraph` (model levels 1–5) |
//! | Inline styles | `\textbf`, `\textit`, `\emph`, `\underline`, `\texttt`, `\textrm`, `\textsf`, family switches |
//! | Lists | `itemize`, `enumerate`, `description` (`[term] definition`) |
//! | Tables | `tabular`/`tabular*` with verbatim column-spec retention |
//! | Math | `$...$` (verbatim in runs), `$$...$$`, `equation` |
//! | Images | `\includegraphics` + `figure`/`\caption` |
//!
//! ## Leniency
//!
//! User-typed LaTeX is frequently transiently malformed while editing, so
//! parsing is total: an unterminated command surrenders its text up to
//! end-of-line or the next command, unrecognized constructs degrade to
//! plain text, and an unexpected failure in the structural pass is caught
//! and surfaced as a single error paragraph. Full grammar compliance is a
//! non-goal — no macro expansion, no package semantics beyond the
//! catalogue above.
//!
//! ## Round-trip contract
//!
//! For any document `D` produced by the parser, `parse(serialize(D))`
//! reproduces the same block sequence, and `serialize` is a fixed point
//! after one iteration: `serialize(parse(serialize(D))) ==
//! serialize(D)`. The integration tests pin both properties.
//!
//! ## Quick start
//!
//! ```rust
//! use texsmith_latex::{LatexParser, LatexSerializer};
//!
//! let doc = LatexParser::new().parse("\\section{Intro}\nSome \\textbf{bold} text.");
//! let latex = LatexSerializer::new().serialize(&doc);
//! assert!(latex.contains(r"\section{Intro}"));
//! assert!(latex.contains(r"\textbf{bold}"));
//! ```

pub mod inline;
pub mod normalize;
pub mod parser;
pub mod patterns;
pub mod serializer;

pub use inline::{parse_inline_spans, strip_inline_markup};
pub use parser::LatexParser;
pub use serializer::{escape_latex, LatexSerializer, PREAMBLE};
