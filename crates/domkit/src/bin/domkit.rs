// ABOUTME: CLI binary for domkit.
// ABOUTME: Sanitizes HTML files and runs distance, relative and ancestor queries against them.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser, Subcommand};
use domkit::{
    decode_bytes, distance, find_ancestor, find_relatives_with, parse_document, read_html_file,
    sanitize_document, sanitize_html, Document, NodeId, SanitizeOptions, Selector,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "domkit")]
#[command(about = "Sanitize HTML and query elements by tree distance")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove scripts, event handlers and unsafe attributes
    Sanitize {
        /// HTML file, or - for stdin
        file: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Treat the input as a fragment instead of a full document
        #[arg(long = "fragment")]
        fragment: bool,

        /// Leave boolean attributes with junk values untouched
        #[arg(long = "keep-invalid-booleans")]
        keep_invalid_booleans: bool,
    },

    /// Print the selector matches nearest to an origin element
    Relatives {
        file: PathBuf,

        /// Selector for the origin element (first match is used)
        #[arg(long = "origin")]
        origin: String,

        /// Selector for candidate elements
        #[arg(long = "selector")]
        selector: String,

        /// Selector for the element to search within (default: whole document)
        #[arg(long = "context")]
        context: Option<String>,

        #[arg(long = "json")]
        json: bool,
    },

    /// Print the tree distance between two elements
    Distance {
        file: PathBuf,

        #[arg(long = "from")]
        from: String,

        #[arg(long = "to")]
        to: String,

        #[arg(long = "json")]
        json: bool,
    },

    /// Print the nearest inclusive ancestor matching a selector
    Ancestor {
        file: PathBuf,

        #[arg(long = "origin")]
        origin: String,

        #[arg(long = "selector")]
        selector: String,

        #[arg(long = "json")]
        json: bool,
    },
}

#[derive(Serialize)]
struct ElementOutput {
    tag: String,
    html: String,
}

#[derive(Serialize)]
struct DistanceOutput {
    distance: Option<usize>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path != Path::new("-") {
        return read_html_file(path).with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("failed to read stdin")?;
    Ok(decode_bytes(&buf, None))
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    Ok(parse_document(&read_input(path)?))
}

fn parse_selector(css: &str) -> anyhow::Result<Selector> {
    Ok(Selector::parse(css)?)
}

/// First element matching `css`, or an error naming the selector.
fn locate(doc: &Document, css: &str, what: &str) -> anyhow::Result<NodeId> {
    parse_selector(css)?
        .select_first(doc, doc.root())
        .ok_or_else(|| anyhow!("{} selector {:?} matched nothing", what, css))
}

fn element_output(doc: &Document, id: NodeId) -> ElementOutput {
    ElementOutput {
        tag: doc
            .element(id)
            .map(|el| el.name().to_string())
            .unwrap_or_default(),
        html: doc.outer_html(id),
    }
}

fn print_elements(doc: &Document, ids: &[NodeId], json: bool) -> anyhow::Result<()> {
    if json {
        let out: Vec<ElementOutput> = ids.iter().map(|id| element_output(doc, *id)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for id in ids {
            println!("{}", doc.outer_html(*id));
        }
    }
    Ok(())
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Sanitize {
            file,
            output,
            fragment,
            keep_invalid_booleans,
        } => {
            let options = SanitizeOptions::builder()
                .sanitize_boolean_attributes(!keep_invalid_booleans)
                .build();
            let input = read_input(&file)?;
            let cleaned = if fragment {
                sanitize_html(&input, &options)
            } else {
                let mut doc = parse_document(&input);
                sanitize_document(&mut doc, &options);
                doc.html()
            };

            match output {
                Some(path) => fs::write(&path, &cleaned)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", cleaned),
            }
        }

        Command::Relatives {
            file,
            origin,
            selector,
            context,
            json,
        } => {
            let doc = load_document(&file)?;
            let selector = parse_selector(&selector)?;
            let origin = locate(&doc, &origin, "origin")?;
            let context = context
                .map(|css| locate(&doc, &css, "context"))
                .transpose()?;
            let matches = find_relatives_with(&doc, origin, &selector, context);
            print_elements(&doc, &matches, json)?;
        }

        Command::Distance { file, from, to, json } => {
            let doc = load_document(&file)?;
            let from = locate(&doc, &from, "from")?;
            let to = locate(&doc, &to, "to")?;
            let result = distance(&doc, from, to);
            if json {
                println!(
                    "{}",
                    serde_json::to_string(&DistanceOutput { distance: result })?
                );
            } else {
                match result {
                    Some(d) => println!("{}", d),
                    None => println!("disconnected"),
                }
            }
        }

        Command::Ancestor {
            file,
            origin,
            selector,
            json,
        } => {
            let doc = load_document(&file)?;
            parse_selector(&selector)?;
            let origin = locate(&doc, &origin, "origin")?;
            let found = find_ancestor(&doc, origin, selector.as_str());
            if json {
                let out = found.map(|id| element_output(&doc, id));
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if let Some(id) = found {
                println!("{}", doc.outer_html(id));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
