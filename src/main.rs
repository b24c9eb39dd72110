use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use wiktionary_articles::{
    build_tag_tree, extract_tags, language_name, split_language_sections, ArticleIndex,
    ArticleSource, DumpConfig, Result, SectionTag, TagNode,
};

#[derive(Parser)]
#[command(name = "wiktionary-articles")]
#[command(about = "Look up single articles in a Wiktionary multistream dump and split them into sections")]
struct Args {
    /// Multistream index file (.txt.bz2)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Multistream archive file (.xml.bz2)
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    /// YAML file with index_path / archive_path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quiet mode - no progress spinner, warnings only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the raw <page> markup of an article
    Article {
        title: String,
    },
    /// List the language sections of an article
    Sections {
        title: String,
    },
    /// Print the heading tags of an article as JSON lines
    Tags {
        title: String,

        /// Only this language section (e.g. English)
        #[arg(long)]
        language: Option<String>,

        /// Keep heading nesting instead of a flat list
        #[arg(long)]
        tree: bool,
    },
    /// Summarize the index file
    Stats,
}

#[derive(Serialize)]
struct TagLine<'a> {
    language: &'a str,
    #[serde(flatten)]
    tag: &'a SectionTag,
}

#[derive(Serialize)]
struct TreeLine<'a> {
    language: &'a str,
    tags: &'a [TagNode],
}

fn init_logging(quiet: bool) {
    let level = if quiet {
        Level::WARN
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging already initialized");
    }
}

fn load_index(config: &DumpConfig, quiet: bool) -> Result<ArticleIndex> {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };
    pb.set_message(format!("Loading {}", config.index_path.display()));

    let index = ArticleIndex::load_with(&config.index_path, |lines| {
        pb.set_message(format!("Index lines: {}", lines));
    });
    pb.finish_and_clear();
    index
}

fn fetch(config: &DumpConfig, quiet: bool, title: &str) -> Result<String> {
    let index = load_index(config, quiet)?;
    let record = index.require(title)?;
    let source = ArticleSource::new(&config.archive_path);
    debug!(
        "{:?} is article {} in stream at offset {} of {}",
        record.title,
        record.article_id,
        record.byte_offset,
        source.archive_path().display()
    );
    source.get_article(record)
}

fn wanted(section: &str, language: Option<&str>) -> bool {
    match language {
        Some(wanted) => language_name(section).is_some_and(|name| name.eq_ignore_ascii_case(wanted)),
        None => true,
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => DumpConfig::load(path)?,
        None => DumpConfig::default(),
    }
    .with_overrides(args.index.clone(), args.archive.clone());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &args.command {
        Command::Article { title } => {
            let article = fetch(&config, args.quiet, title)?;
            writeln!(out, "{}", article)?;
        }

        Command::Sections { title } => {
            let article = fetch(&config, args.quiet, title)?;
            for section in split_language_sections(&article) {
                writeln!(
                    out,
                    "{}\t{} bytes\t{} tags",
                    language_name(section).unwrap_or("?"),
                    section.len(),
                    extract_tags(section).len()
                )?;
            }
        }

        Command::Tags { title, language, tree } => {
            let article = fetch(&config, args.quiet, title)?;
            for section in split_language_sections(&article) {
                if !wanted(section, language.as_deref()) {
                    continue;
                }
                let name = language_name(section).unwrap_or("?");
                if *tree {
                    let nodes = build_tag_tree(section);
                    let line = TreeLine { language: name, tags: &nodes };
                    writeln!(out, "{}", to_json(&line)?)?;
                } else {
                    for tag in extract_tags(section) {
                        let line = TagLine { language: name, tag: &tag };
                        writeln!(out, "{}", to_json(&line)?)?;
                    }
                }
            }
        }

        Command::Stats => {
            let start_time = Instant::now();
            let index = load_index(&config, args.quiet)?;
            let elapsed = start_time.elapsed();

            writeln!(out, "============================================================")?;
            writeln!(out, "Index: {}", config.index_path.display())?;
            writeln!(out, "Records: {}", index.len())?;
            writeln!(out, "Malformed lines: {}", index.skipped())?;
            writeln!(out, "Streams: {}", index.distinct_streams())?;
            writeln!(
                out,
                "Avg articles/stream: {:.2}",
                index.len() as f64 / index.distinct_streams().max(1) as f64
            )?;
            writeln!(out, "Time: {}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)?;
            writeln!(out, "============================================================")?;
        }
    }

    out.flush()?;
    Ok(())
}

fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn main() {
    let args = Args::parse();
    init_logging(args.quiet);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_absent() { 2 } else { 1 });
    }
}
