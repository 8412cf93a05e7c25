//! texsmith CLI - LaTeX document conversion and inspection tool
//!
//! Converts LaTeX documents through the structured model (HTML preview,
//! JSON model dump, normalized LaTeX), inspects document structure, and
//! diffs two sources line by line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use texsmith_latex::{LatexParser, LatexSerializer};
use texsmith_preview::PreviewRenderer;
use texsmith_versioning::{diff_lines, DiffKind};

#[derive(Parser)]
#[command(
    name = "texsmith",
    version,
    about = "LaTeX document conversion and inspection",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a LaTeX document to another representation
    Convert {
        /// Input .tex file
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        to: OutputFormat,

        /// Output path (defaults to the input path with a new extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Show metadata and a block census for a document
    Info {
        /// Input .tex file
        input: PathBuf,
    },
    /// Positional line diff between two documents
    Diff {
        /// Old version
        old: PathBuf,
        /// New version
        new: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// HTML preview fragment
    Html,
    /// Structured document model as JSON
    Json,
    /// Normalized LaTeX (parse + re-serialize)
    Tex,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Tex => "tex",
        }
    }
}

/// Derives "report.html" from "report.tex" for the chosen format,
/// keeping the input's directory.
fn smart_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    input.with_file_name(format!(
        "{}.{}",
        stem.to_string_lossy(),
        format.extension()
    ))
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn run_convert(
    input: &Path,
    to: OutputFormat,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<()> {
    let source = read_input(input)?;

    let rendered = match to {
        OutputFormat::Html => PreviewRenderer::new().render(&source),
        OutputFormat::Json => {
            let doc = LatexParser::new().parse(&source);
            serde_json::to_string_pretty(&doc).context("failed to serialize document model")?
        }
        OutputFormat::Tex => {
            let doc = LatexParser::new().parse(&source);
            LatexSerializer::new().serialize(&doc)
        }
    };

    if stdout {
        println!("{rendered}");
        return Ok(());
    }

    let output = output.unwrap_or_else(|| smart_output_path(input, to));
    fs::write(&output, &rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "{} {} -> {}",
        "converted".green().bold(),
        input.display(),
        output.display()
    );
    Ok(())
}

fn run_info(input: &Path) -> Result<()> {
    let source = read_input(input)?;
    let doc = LatexParser::new().parse(&source);

    println!("{}", "Document".bold());
    println!("  title:  {}", doc.title());
    println!("  author: {}", doc.author());
    println!("  date:   {}", doc.date());
    println!("  chars:  {}", doc.char_count());

    let mut census: Vec<(&'static str, usize)> = Vec::new();
    for block in doc.body() {
        let label = block.kind_label();
        match census.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => census.push((label, 1)),
        }
    }

    println!("{}", "Blocks".bold());
    for (label, count) in census {
        println!("  {label}: {count}");
    }
    Ok(())
}

fn run_diff(old: &Path, new: &Path) -> Result<()> {
    let old_text = read_input(old)?;
    let new_text = read_input(new)?;

    let entries = diff_lines(&old_text, &new_text);
    if entries.is_empty() {
        println!("{}", "no differences".green());
        return Ok(());
    }

    for entry in &entries {
        match entry.kind {
            DiffKind::Added => {
                println!("{:>5} {} {}", entry.line, "+".green().bold(), entry.new.green());
            }
            DiffKind::Removed => {
                println!("{:>5} {} {}", entry.line, "-".red().bold(), entry.old.red());
            }
            DiffKind::Modified => {
                println!("{:>5} {} {}", entry.line, "-".red().bold(), entry.old.red());
                println!("{:>5} {} {}", entry.line, "+".green().bold(), entry.new.green());
            }
        }
    }
    println!(
        "{} line(s) differ",
        entries.len().to_string().yellow().bold()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            to,
            output,
            stdout,
        } => run_convert(&input, to, output, stdout),
        Commands::Info { input } => run_info(&input),
        Commands::Diff { old, new } => run_diff(&old, &new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_output_path() {
        let path = smart_output_path(Path::new("notes/report.tex"), OutputFormat::Html);
        assert_eq!(path, Path::new("notes/report.html"));

        let path = smart_output_path(Path::new("report.tex"), OutputFormat::Json);
        assert_eq!(path, Path::new("report.json"));
    }

    #[test]
    fn test_convert_tex_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.tex");
        fs::write(&input, "\\section{Hi}\ntext body\n").unwrap();
        let output = dir.path().join("out.tex");

        run_convert(&input, OutputFormat::Tex, Some(output.clone()), false).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("\\documentclass"));
        assert!(written.contains("\\section{Hi}"));
    }

    #[test]
    fn test_convert_html() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.tex");
        fs::write(&input, "\\section{Hi}\n").unwrap();
        let output = dir.path().join("out.html");

        run_convert(&input, OutputFormat::Html, Some(output.clone()), false).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("<h1"));
    }

    #[test]
    fn test_missing_input_errors() {
        let err = run_info(Path::new("/nonexistent/file.tex")).unwrap_err();
        assert!(err.to_string().contains("file.tex"));
    }
}
