//! answer-engine: command line entry point
//!
//! Searches the web for a query, looks up media, and streams a cited answer
//! to stdout. Logs go to stderr.

use answer_engine::{
    answer::{AnswerStreamer, OpenAiClient, StreamUpdate, VectorSnippet},
    config::{Credentials, Settings},
    media::MediaFetcher,
    network::HttpClient,
    search::Dispatcher,
};
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

struct Args {
    config: Option<PathBuf>,
    snippets: Option<PathBuf>,
    media: bool,
    query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Starting answer-engine v{}", answer_engine::VERSION);

    let settings = load_settings(args.config.as_deref())?;
    let credentials = Credentials::from_env();
    info!("Search provider: {}", settings.search.provider);

    let snippets = match args.snippets {
        Some(ref path) => load_snippets(path)?,
        None => Vec::new(),
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctrl_c.cancel();
        }
    });

    let client = HttpClient::with_settings(&settings.outgoing)?;

    let dispatcher = Dispatcher::from_settings(client.clone(), &settings, &credentials);
    let results = dispatcher
        .get_search_results_cancellable(&args.query, &cancel)
        .await?;

    if args.media {
        let fetcher = MediaFetcher::from_settings(client.clone(), &settings, &credentials);
        let (images, videos) = tokio::join!(
            fetcher.get_images_cancellable(&args.query, &cancel),
            fetcher.get_videos_cancellable(&args.query, &cancel),
        );
        match images {
            Ok(images) => info!("{} images", images.len()),
            Err(e) => warn!("Image lookup failed: {}", e),
        }
        match videos {
            Ok(Some(videos)) => info!("{} videos", videos.len()),
            Ok(None) => info!("No video results"),
            Err(e) => warn!("Video lookup failed: {}", e),
        }
    }

    let transport = OpenAiClient::from_settings(client, &settings.inference, &credentials)?;
    let streamer = AnswerStreamer::new(Arc::new(transport), settings.inference.model.clone());

    let mut stdout = std::io::stdout();
    let mut sink = move |update: StreamUpdate| {
        let written = match update {
            StreamUpdate::Delta(text) => write!(stdout, "{}", text),
            StreamUpdate::End => writeln!(stdout),
        };
        if written.and_then(|_| stdout.flush()).is_err() {
            warn!("Failed to write to stdout");
        }
    };

    streamer
        .stream_answer(&args.query, &snippets, &results, &mut sink, &cancel)
        .await?;

    Ok(())
}

/// Parse command line arguments; `None` when only help/version was requested
fn parse_args() -> Result<Option<Args>> {
    let mut args = Args {
        config: None,
        snippets: None,
        media: true,
        query: String::new(),
    };
    let mut words = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("answer-engine {}", answer_engine::VERSION);
                return Ok(None);
            }
            "-c" | "--config" => {
                args.config = Some(iter.next().context("--config needs a path")?.into());
            }
            "-s" | "--snippets" => {
                args.snippets = Some(iter.next().context("--snippets needs a path")?.into());
            }
            "--no-media" => args.media = false,
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        print_usage();
        bail!("no query given");
    }
    args.query = words.join(" ");
    Ok(Some(args))
}

/// Load settings from file or use defaults
fn load_settings(explicit: Option<&std::path::Path>) -> Result<Settings> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("ANSWER_ENGINE_SETTINGS_PATH") {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(PathBuf::from("settings.yml"));
    candidates.push(PathBuf::from("config/settings.yml"));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("answer-engine/settings.yml"));
    }

    let mut settings = match candidates.iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => {
            if let Some(path) = explicit {
                bail!("settings file not found: {}", path.display());
            }
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };
    settings.merge_env();
    Ok(settings)
}

/// Read vector-store snippets from a JSON array file
fn load_snippets(path: &std::path::Path) -> Result<Vec<VectorSnippet>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading snippets from {}", path.display()))?;
    let snippets: Vec<VectorSnippet> = serde_json::from_str(&content)?;
    info!("Loaded {} vector snippets", snippets.len());
    Ok(snippets)
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
answer-engine v{}
Web search plus a cited, streamed LLM answer

USAGE:
    answer-engine [OPTIONS] <QUERY>...

OPTIONS:
    -c, --config <FILE>      Path to settings.yml
    -s, --snippets <FILE>    JSON array of vector-store snippets to cite
        --no-media           Skip image and video lookups
    -h, --help               Print help information
    -V, --version            Print version information

ENVIRONMENT VARIABLES:
    ANSWER_ENGINE_SETTINGS_PATH        Path to settings.yml
    ANSWER_ENGINE_SEARCH_PROVIDER      brave | serper | google
    ANSWER_ENGINE_PAGE_COUNT           Results requested from the provider
    ANSWER_ENGINE_INFERENCE_MODEL      Model identifier
    ANSWER_ENGINE_INFERENCE_BASE_URL   OpenAI-compatible endpoint
    ANSWER_ENGINE_USE_LOCAL_INFERENCE  Use Ollama on localhost (true/false)
    ANSWER_ENGINE_REQUEST_TIMEOUT      Provider request timeout in seconds
    BRAVE_SEARCH_API_KEY, GOOGLE_SEARCH_API_KEY, GOOGLE_CX,
    SERPER_API, INFERENCE_API_KEY      Credentials
"#,
        answer_engine::VERSION
    );
}
