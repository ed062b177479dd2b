use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use pypo_core::{
    Bookmark, DEFAULT_MAX_CONTENT_LENGTH, DownloadConfig, Downloader, ExtractionResult, Extractor, OutputFormat,
    Readability, ReadabilityConfig,
};
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch a page and print the article pypo would store for it
#[derive(Parser, Debug)]
#[command(name = "pypo")]
#[command(author = "pypo contributors")]
#[command(version)]
#[command(about = "Fetch a page and print the article pypo would store for it", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (markdown, html, text, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: OutputFormat,

    /// URL the page belongs to when reading a file or stdin (default: INPUT)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Maximum number of bytes to download
    #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_LENGTH, value_name = "BYTES")]
    max_length: u64,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Minimum character threshold for content candidates
    #[arg(long, default_value = "500", value_name = "NUM")]
    char_threshold: usize,

    /// Strip images from output
    #[arg(long)]
    no_images: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn is_remote(&self) -> bool {
        self.input.starts_with("http://") || self.input.starts_with("https://")
    }

    fn download_config(&self) -> DownloadConfig {
        let mut builder = DownloadConfig::builder()
            .max_content_length(self.max_length)
            .timeout(self.timeout)
            .accept_invalid_certs(self.insecure);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        builder.build()
    }

    fn extractor(&self) -> Extractor {
        let config = ReadabilityConfig::builder()
            .char_threshold(self.char_threshold)
            .preserve_images(!self.no_images)
            .build();
        Extractor::new().with_readability(Readability::with_config(config))
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Downloads the bookmark and extracts it, falling back to the bare link when
/// the download fails.
async fn extract_remote(
    args: &Args, bookmark: &Bookmark, extractor: &Extractor, timings: &mut Vec<(&'static str, Duration)>,
) -> anyhow::Result<ExtractionResult> {
    if args.verbose {
        echo::print_step(1, 3, &format!("Fetching {}", bookmark.url.bright_white().underline()));
    }

    let downloader = Downloader::with_config(args.download_config()).context("Failed to set up HTTP client")?;

    let started = Instant::now();
    let download = downloader.download(&bookmark.url).await;
    timings.push(("Download", started.elapsed()));

    let download = match download {
        Ok(download) => download,
        Err(err) => {
            echo::print_warning(&format!("Download failed: {err}"));
            return Ok(ExtractionResult::fallback(&bookmark.url));
        }
    };

    if args.verbose {
        echo::print_field("Content-Type", download.content_type());
        echo::print_field("Size", &echo::format_size(download.raw_bytes().map_or(0, <[u8]>::len)));
        echo::print_step(2, 3, "Extracting article");
    }

    let started = Instant::now();
    let result = extractor.parse_download(bookmark, &download);
    timings.push(("Extract", started.elapsed()));

    Ok(result)
}

/// Reads HTML from a file or stdin and extracts it.
fn extract_local(
    args: &Args, bookmark: &Bookmark, extractor: &Extractor, timings: &mut Vec<(&'static str, Duration)>,
) -> anyhow::Result<ExtractionResult> {
    let bytes = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 3, "Reading from stdin");
        }
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).context("Failed to read from stdin")?;
        buffer
    } else {
        if args.verbose {
            echo::print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        fs::read(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if args.verbose {
        echo::print_field("Size", &echo::format_size(bytes.len()));
        echo::print_step(2, 3, "Extracting article");
    }

    let text = String::from_utf8_lossy(&bytes);
    let started = Instant::now();
    let result = extractor.parse(bookmark, "text/html", Some(text.as_ref()), Some(bytes.as_slice()));
    timings.push(("Extract", started.elapsed()));

    Ok(result)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let total = Instant::now();
    let mut timings = Vec::new();
    let extractor = args.extractor();

    tracing::debug!(input = %args.input, remote = args.is_remote(), format = ?args.format, "starting");

    let result = if args.is_remote() {
        let bookmark = Bookmark::new(args.input.clone());
        extract_remote(&args, &bookmark, &extractor, &mut timings).await?
    } else {
        let bookmark = Bookmark::new(args.url.clone().unwrap_or_else(|| args.input.clone()));
        extract_local(&args, &bookmark, &extractor, &mut timings)?
    };

    let output = result.to_format(args.format);

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        echo::print_field("Format", &format!("{:?}", args.format));
        echo::print_extraction_details(&result);
        echo::print_timing_summary(total.elapsed(), &timings);
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{output}");
        }
    }

    Ok(())
}
