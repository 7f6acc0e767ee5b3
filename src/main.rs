//! # sitechat CLI
//!
//! Command-line host for the site assistant.
//!
//! - `crawl`: crawl a site and print or save what was collected
//! - `ask`: crawl the site and answer a single question
//! - `chat`: crawl the site, then answer questions in a loop
//!
//! The OpenRouter API key is read from `OPENROUTER_API_KEY`.

mod logging;
mod telemetry;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sitechat::chat::{DEFAULT_MODEL, OpenRouterClient, OpenRouterOptions};
use sitechat::config::SiteProfile;
use sitechat::context::{ContextOptions, assemble_context};
use sitechat::crawler::{CrawlEvent, CrawlerConfig, DEFAULT_MAX_PAGES, DEFAULT_RATE_LIMIT_MS};
use sitechat::session::Session;
use std::io::Write;
use std::path::PathBuf;
use telemetry::OtelGuard;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

#[derive(Parser)]
#[command(author, version, about = "Chat with an assistant that has read a website", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl the site, then chat about it interactively
    Chat(ChatArgs),

    /// Crawl a website and show or save the extracted text
    Crawl(CrawlArgs),

    /// Crawl the site and answer one question
    Ask(AskArgs),
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Site to crawl (defaults to the configured site)
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of pages to crawl
    #[arg(short = 'p', long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Model to query
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,
}

#[derive(Args, Debug)]
struct ChatArgs {
    #[command(flatten)]
    site: SiteArgs,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// Question to ask
    #[arg(required = true)]
    question: String,

    #[command(flatten)]
    site: SiteArgs,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// URL to crawl
    #[arg(required = true)]
    url: String,

    /// Maximum number of pages to crawl
    #[arg(short = 'p', long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Delay between requests in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_RATE_LIMIT_MS)]
    rate: u64,

    /// Save the crawl as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the assembled model context instead of a page list
    #[arg(long)]
    context: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The chat REPL owns the terminal, so it logs to a file instead.
    let mut _otel: Option<OtelGuard> = None;
    if matches!(cli.command, Some(Commands::Chat(_))) {
        logging::setup_chat_logging()?;
    } else {
        _otel = Some(telemetry::init_tracing_subscriber()?);
    }

    match cli.command {
        Some(Commands::Chat(args)) => chat_command(args).await?,
        Some(Commands::Crawl(args)) => crawl_command(args).await?,
        Some(Commands::Ask(args)) => ask_command(args).await?,
        None => {
            let _ = Cli::parse_from(["sitechat", "--help"]);
        }
    }

    Ok(())
}

fn profile_for(url: Option<String>) -> SiteProfile {
    match url {
        Some(url) => SiteProfile::builder().base_url(url).build(),
        None => SiteProfile::default(),
    }
}

fn build_session(site: SiteArgs) -> anyhow::Result<Session<OpenRouterClient>> {
    let profile = profile_for(site.url);
    let client =
        OpenRouterClient::with_options(OpenRouterOptions::for_site(&profile).with_model(site.model))?;
    let config = CrawlerConfig::builder().max_pages(site.max_pages).build();

    let mut session = Session::new(client, profile, config)?;
    session.set_api_key(std::env::var(API_KEY_VAR).unwrap_or_default());
    if !session.has_api_key() {
        eprintln!("{} is not set; questions will not be sent to the model.", API_KEY_VAR);
    }
    Ok(session)
}

/// Spawn a task drawing a progress bar from crawl events
///
/// The task ends once the returned sender and all its clones are dropped.
fn spawn_progress(max_pages: usize) -> anyhow::Result<(mpsc::Sender<CrawlEvent>, JoinHandle<()>)> {
    let (sender, mut receiver) = mpsc::channel(100);

    let progress_bar = ProgressBar::new(max_pages as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let handle = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                CrawlEvent::Started { base_url, .. } => {
                    progress_bar.set_message(format!("Crawling {}", base_url));
                }
                CrawlEvent::Visiting { url, visited, .. } => {
                    progress_bar.set_position(visited as u64);
                    progress_bar.set_message(url);
                }
                CrawlEvent::PageFailed { url, error } => {
                    progress_bar.println(format!("Failed {}: {}", url, error));
                }
                CrawlEvent::PageSkipped { .. } => {}
                CrawlEvent::Finished { visited, collected } => {
                    progress_bar.finish_with_message(format!(
                        "Visited {} pages, collected {}",
                        visited, collected
                    ));
                }
            }
        }
    });

    Ok((sender, handle))
}

/// Crawl (or re-crawl) the session's site behind a progress bar
async fn crawl_session(session: &mut Session<OpenRouterClient>, force: bool) -> anyhow::Result<usize> {
    let (sender, progress) = spawn_progress(session.max_pages())?;
    let pages = session.crawl(force, Some(sender)).await?.len();
    let _ = progress.await;
    Ok(pages)
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    println!("Crawling {}...", args.url);

    let config = CrawlerConfig::builder()
        .max_pages(args.max_pages)
        .rate_limit_ms(args.rate)
        .build();
    let crawler = sitechat::crawler::Crawler::new(config)?;

    let (sender, progress) = spawn_progress(args.max_pages)?;
    let crawl = crawler.crawl_with_progress(&args.url, Some(sender)).await?;
    let _ = progress.await;

    println!("Collected {} of {} visited pages", crawl.len(), crawl.visited);

    if args.context {
        let options =
            ContextOptions::default().with_source(crawl.base_url.trim_end_matches('/'));
        println!("{}", assemble_context(&crawl, &options));
    } else {
        for url in crawl.urls() {
            println!("  {}", url);
        }
    }

    if let Some(output_file) = args.output {
        let json = serde_json::to_string_pretty(&crawl)?;
        tokio::fs::write(&output_file, json).await?;
        println!("Saved crawled content to {}", output_file.display());
    }

    Ok(())
}

#[instrument]
async fn ask_command(args: AskArgs) -> anyhow::Result<()> {
    let mut session = build_session(args.site)?;
    crawl_session(&mut session, false).await?;

    let reply = session.ask(&args.question).await;
    sitechat::format_markdown(&reply)?;
    Ok(())
}

async fn chat_command(args: ChatArgs) -> anyhow::Result<()> {
    let mut session = build_session(args.site)?;
    let site_name = session.orchestrator().profile().site_name.clone();

    println!("Loading {}...", session.base_url());
    match crawl_session(&mut session, false).await {
        Ok(pages) => println!("Ready: {} pages of {} loaded.", pages, site_name),
        Err(err) => {
            error!("Initial crawl failed: {}", err);
            println!("Could not load the site ({}). Try /recrawl.", err);
        }
    }
    println!("Ask a question, or use /clear, /recrawl, /exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                session.clear_conversation();
                println!("Conversation cleared.");
            }
            "/recrawl" => match crawl_session(&mut session, true).await {
                Ok(pages) => println!("Re-crawled {} pages.", pages),
                Err(err) => {
                    error!("Re-crawl failed: {}", err);
                    println!("Re-crawl failed: {}", err);
                }
            },
            question => {
                info!("Question received");
                let reply = session.ask(question).await;
                if let Err(err) = sitechat::format_markdown(&reply) {
                    error!("Failed to render reply: {}", err);
                    println!("{}", reply);
                }
            }
        }
    }

    Ok(())
}
