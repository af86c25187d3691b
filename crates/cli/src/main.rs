use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::Parser;
use selectio_core::{BackendKind, Document, SelectorList};

/// Output format for extracted values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Lines,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lines" | "text" => Ok(Self::Lines),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: lines, json", s)),
        }
    }
}

/// Query HTML documents with CSS selectors or XPath expressions
#[derive(Parser, Debug)]
#[command(name = "selectio")]
#[command(version = "0.1.0")]
#[command(about = "Query HTML documents with CSS selectors or XPath", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// CSS selector (supports ::text and ::attr(name) pseudo-elements)
    #[arg(short, long, value_name = "SELECTOR", conflicts_with = "xpath")]
    css: Option<String>,

    /// XPath expression (translated to CSS; common patterns only)
    #[arg(short, long, value_name = "EXPR")]
    xpath: Option<String>,

    /// Parser backend (html5ever, dom-query)
    #[arg(short, long, default_value = "html5ever", value_name = "BACKEND")]
    backend: BackendKind,

    /// Print only the first match
    #[arg(long)]
    first: bool,

    /// Output format (lines, json)
    #[arg(short, long, default_value = "lines", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report progress on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(input: &str, verbose: bool) -> anyhow::Result<String> {
    if input == "-" {
        if verbose {
            eprintln!("reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        if verbose {
            eprintln!("reading from file {}", input);
        }
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn render(values: &[String], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Lines => Ok(values.join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(values).context("Failed to serialize results"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let html = read_input(&args.input, args.verbose)?;

    if args.verbose {
        eprintln!("parsing with {} backend ({} bytes)", args.backend, html.len());
    }
    let doc = Document::parse(&html, args.backend);

    let results: SelectorList<'_> = match (&args.css, &args.xpath) {
        (Some(css), None) => doc.css(css)?,
        (None, Some(xpath)) => doc.xpath(xpath)?,
        _ => bail!("Exactly one of --css or --xpath is required"),
    };

    if args.verbose {
        eprintln!("{} match(es)", results.len());
    }

    let mut values = results.getall();
    if args.first {
        values.truncate(1);
    }

    let rendered = render(&values, args.format)?;

    match args.output {
        Some(path) => {
            fs::write(&path, rendered).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            if args.verbose {
                eprintln!("output written to {}", path.display());
            }
        }
        None => {
            if !rendered.is_empty() || args.format == OutputFormat::Json {
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}
