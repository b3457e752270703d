//! docfeed CLI - document archive server tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfeed::store::PROPERTY_VALUE_LIMIT;
use docfeed::{
    render, Archive, ArchiveOptions, DirectorySource, FileStore, JsonFormat, Mime, RenderOptions,
    Request,
};

#[derive(Parser)]
#[command(name = "docfeed")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Serve a document archive as Markdown, JSON and RSS", long_about = None)]
struct Cli {
    /// Directory holding document folders
    #[arg(long, global = true, value_name = "DIR", env = "DOCFEED_DOCS", default_value = "docs")]
    docs: PathBuf,

    /// Published folder id
    #[arg(long, global = true, value_name = "ID", env = "DOCFEED_FOLDER", default_value = "published")]
    folder: String,

    /// Cache tier file
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "DOCFEED_CACHE_FILE",
        default_value = ".docfeed/cache.json"
    )]
    cache_file: PathBuf,

    /// Durable store file
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "DOCFEED_STORE_FILE",
        default_value = ".docfeed/store.json"
    )]
    store_file: PathBuf,

    /// Render documents one at a time
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a request: list, single document, or feed
    Get {
        /// Document id (lists the folder if omitted)
        #[arg(value_name = "ID")]
        id: Option<String>,

        /// Output format; "rss" returns the feed
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the RSS feed
    Feed {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Cache the document list and the newest articles
    Precache,

    /// Remove the document list and articles from the cache
    ClearCache,

    /// Repack the feed buckets from the cached list
    Repack,

    /// Render a document file to Markdown
    Render {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print rendering statistics
        #[arg(long)]
        stats: bool,

        /// Print the rendered article as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the operation journal
    Logs,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Get { id, output }) => cmd_get(&cli, id.clone(), output.clone()),
        Some(Commands::Feed { output }) => cmd_feed(&cli, output.as_deref()),
        Some(Commands::Precache) => cmd_precache(&cli),
        Some(Commands::ClearCache) => cmd_clear_cache(&cli),
        Some(Commands::Repack) => cmd_repack(&cli),
        Some(Commands::Render {
            input,
            output,
            stats,
            json,
        }) => cmd_render(input, output.as_deref(), *stats, *json),
        Some(Commands::Logs) => cmd_logs(&cli),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: docfeed <COMMAND>".yellow());
            println!("       docfeed --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn open_archive(cli: &Cli) -> Result<Archive, Box<dyn std::error::Error>> {
    let cache = FileStore::open(&cli.cache_file)?;
    let store = FileStore::open(&cli.store_file)?.with_value_limit(PROPERTY_VALUE_LIMIT);
    let options = ArchiveOptions::new(cli.folder.clone()).with_parallel(!cli.sequential);

    Ok(Archive::from_source(
        Arc::new(DirectorySource::new(&cli.docs)),
        Arc::new(cache),
        Arc::new(store),
        options,
    ))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_get(
    cli: &Cli,
    id: Option<String>,
    output: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(cli)?;
    let response = archive.handle(&Request { id, output });

    log::debug!("Response content type: {}", response.mime.as_str());
    if response.mime == Mime::Json {
        // Re-indent for the terminal; the payload itself stays as stored.
        match serde_json::from_str::<serde_json::Value>(&response.body) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{}", response.body),
        }
    } else {
        println!("{}", response.body);
    }
    Ok(())
}

fn cmd_feed(cli: &Cli, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(cli)?;
    write_or_print(output, &archive.feed_xml())
}

fn cmd_precache(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(cli)?;

    let pb = spinner("Rendering articles...");
    let report = archive.precache_all();
    pb.finish_and_clear();
    let report = report?;

    println!("{}", "Pre-cache complete".green().bold());
    println!("  {} {} listed", "├─".dimmed(), report.listed);
    println!("  {} {} cached", "├─".dimmed(), report.cached);
    println!("  {} {} oversized", "├─".dimmed(), report.oversized);
    println!("  {} {} failed", "└─".dimmed(), report.failed);
    Ok(())
}

fn cmd_clear_cache(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(cli)?;
    let removed = archive.clear_cache_all()?;
    println!("{} {} keys", "Cleared".green(), removed);
    Ok(())
}

fn cmd_repack(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(cli)?;

    let pb = spinner("Packing feed...");
    let report = archive.repack_feed();
    pb.finish_and_clear();

    if !report.committed {
        println!(
            "{}",
            "Feed not updated (see `docfeed logs` for details)".yellow()
        );
        return Ok(());
    }

    println!("{}", "Feed repacked".green().bold());
    println!("  {} {} articles", "├─".dimmed(), report.articles);
    println!("  {} {} buckets", "├─".dimmed(), report.buckets);
    println!("  {} {} truncated", "├─".dimmed(), report.truncated);
    println!("  {} {} dropped", "└─".dimmed(), report.dropped);
    if report.exhausted {
        println!("{}", "Total size budget reached; later articles left out".yellow());
    }
    Ok(())
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    stats: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = RenderOptions::new().with_stats(stats);

    if json {
        let id = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let article = docfeed::render_article(input, id, &options)?;
        return write_or_print(output, &render::to_json(&article, JsonFormat::Pretty)?);
    }

    let result = docfeed::to_markdown_with_options(input, &options)?;
    write_or_print(output, &result.content)?;

    if stats {
        let s = &result.stats;
        eprintln!();
        eprintln!("{}", "Content Statistics".cyan().bold());
        eprintln!("{}", "─".repeat(40).dimmed());
        eprintln!("{}: {}", "Headings".bold(), s.heading_count);
        eprintln!("{}: {}", "Paragraphs".bold(), s.paragraph_count);
        eprintln!("{}: {}", "List items".bold(), s.list_item_count);
        eprintln!("{}: {}", "Tables".bold(), s.table_count);
        eprintln!("{}: {}", "Rules".bold(), s.rule_count);
        eprintln!("{}: {}", "Fallbacks".bold(), s.fallback_count);
        eprintln!("{}: {}", "Skipped inline".bold(), s.skipped_inline_count);
        eprintln!("{}: {}", "Words".bold(), s.word_count);
        eprintln!("{}: {}", "Characters".bold(), s.char_count);
    }
    Ok(())
}

fn cmd_logs(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(cli)?;
    let contents = archive.journal().contents();
    if contents.is_empty() {
        println!("{}", "No journal entries".dimmed());
    } else {
        print!("{}", contents);
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfeed".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document archive to Markdown and RSS");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docfeed".dimmed());
    println!("License: MIT");
}
