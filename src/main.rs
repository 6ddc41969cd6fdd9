use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use showpull::{
    DEFAULT_WATERMARK_FILE, DirectoryQueue, DownloadQueue, InterestSet, NoopReporter,
    PollOptions, ProgressEvent, ProgressReporter, Quality, ReqwestClient, Resolver,
    SharedProgressReporter, TransmissionQueue, Watermark, parse_interval, poll_once,
    transmission_url,
};

// Emoji with fallback for terminals without Unicode support
static TV: Emoji<'_, '_> = Emoji("📺 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[-] ");
static CLOCK: Emoji<'_, '_> = Emoji("🕒 ", "[*] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Watch the episode feed and queue new episodes of followed shows
#[derive(Parser, Debug)]
#[command(name = "showpull")]
#[command(about = "Watch the episode feed and queue new episodes of followed shows")]
#[command(version)]
struct Args {
    /// Session token of the site account (sent as the lf_session cookie)
    #[arg(long, env = "LOST_FILM_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    /// Base URL of the site
    #[arg(long, env = "SITE_URL", default_value = "https://www.lostfilm.tv")]
    site_url: Url,

    /// Feed URL (defaults to <site>/rss.xml)
    #[arg(long, env = "FEED_URL")]
    feed_url: Option<String>,

    /// Original names of the shows to download, comma separated
    #[arg(long = "interest", env = "INTEREST_CONTENT", value_delimiter = ',')]
    interest: Vec<String>,

    /// Directory the torrent client should download into
    #[arg(long, env = "DOWNLOAD_PATH", default_value = "/downloads/complete/tvShows")]
    download_path: String,

    /// Requested quality: SD, HD or FullHD
    #[arg(long, env = "DOWNLOAD_QUALITY", default_value = "FullHD")]
    quality: String,

    /// Time between checks, e.g. 10m or 1h30m
    #[arg(long, env = "JOB_INTERVAL_MINUTES", default_value = "10m", value_parser = parse_interval)]
    interval: Duration,

    /// File holding the publication time of the newest processed episode
    #[arg(long, env = "WATERMARK_FILE", default_value = DEFAULT_WATERMARK_FILE)]
    watermark_file: PathBuf,

    /// Transmission host; without it torrent files are saved into the download path
    #[arg(long, env = "TRANSMISSION_HOST")]
    transmission_host: Option<String>,

    #[arg(long, env = "TRANSMISSION_PROTOCOL", default_value = "http")]
    transmission_protocol: String,

    #[arg(long, env = "TRANSMISSION_PORT", default_value = "9091")]
    transmission_port: u16,

    #[arg(long, env = "TRANSMISSION_USERNAME", default_value = "")]
    transmission_username: String,

    #[arg(long, env = "TRANSMISSION_PASSWORD", default_value = "", hide_env_values = true)]
    transmission_password: String,

    #[arg(long, env = "TRANSMISSION_RPC_PATH", default_value = "/transmission/rpc")]
    transmission_rpc_path: String,

    /// Run a single check and exit
    #[arg(long)]
    once: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Progress reporter printing to the terminal, with a spinner for the running check
struct TerminalReporter {
    spinner: ProgressBar,
}

impl TerminalReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self { spinner }
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::TickStarted { watermark } => {
                self.spinner.set_message(format!(
                    "{CLOCK}Checking for episodes newer than {}",
                    watermark.format("%Y-%m-%d %H:%M").to_string().cyan()
                ));
            }

            ProgressEvent::FetchingFeed { url } => {
                self.spinner
                    .set_message(format!("{SEARCH}Fetching feed: {}", url.cyan()));
            }

            ProgressEvent::FeedFailed { error } => {
                self.spinner.println(format!(
                    "{FAILURE}{} {}",
                    "Feed unavailable:".red().bold(),
                    error.red()
                ));
            }

            ProgressEvent::FeedParsed {
                total_entries,
                episodes,
                new_episodes,
            } => {
                self.spinner.set_message(format!(
                    "{TV}{} entries, {} episodes, {} new",
                    total_entries.to_string().cyan(),
                    episodes.to_string().cyan(),
                    new_episodes.to_string().yellow()
                ));
            }

            ProgressEvent::EpisodeSkipped { episode } => {
                self.spinner
                    .println(format!("  {SKIP}{}", episode.dimmed()));
            }

            ProgressEvent::DispatchStarting { episode } => {
                self.spinner
                    .set_message(format!("{DOWNLOAD}Resolving {}", episode.bold()));
            }

            ProgressEvent::DispatchCompleted { episode } => {
                self.spinner
                    .println(format!("  {SUCCESS}{}", episode.green()));
            }

            ProgressEvent::DispatchFailed { episode, error } => {
                self.spinner.println(format!(
                    "  {FAILURE}{} - {}",
                    episode.red(),
                    error.dimmed()
                ));
            }

            ProgressEvent::WatermarkAdvanced { .. } => {}

            ProgressEvent::WatermarkPersistFailed { error } => {
                self.spinner
                    .println(format!("{WARNING}{}", error.yellow()));
            }

            ProgressEvent::TickCompleted {
                dispatched_count,
                skipped_count,
                failed_count,
            } => {
                self.spinner.println(format!(
                    "{} {} queued, {} skipped, {} failed",
                    "Check complete:".bold().green(),
                    dispatched_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                ));
                self.spinner.set_message("Waiting for the next check");
            }
        }
    }
}

fn build_queue(args: &Args) -> Result<Box<dyn DownloadQueue>> {
    let Some(host) = &args.transmission_host else {
        return Ok(Box::new(DirectoryQueue));
    };

    let rpc_url = transmission_url(
        &args.transmission_protocol,
        host,
        args.transmission_port,
        &args.transmission_rpc_path,
    )
    .context("Invalid Transmission endpoint")?;

    let mut queue = TransmissionQueue::new(rpc_url);
    if !args.transmission_username.is_empty() {
        queue = queue.with_credentials(&args.transmission_username, &args.transmission_password);
    }
    Ok(Box::new(queue))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            TV,
            "showpull".bold().magenta(),
            "- New episode watcher".dimmed()
        );
    }

    let quality = Quality::from_config(&args.quality);
    if quality == Quality::Unknown {
        eprintln!(
            "{WARNING}{}",
            format!("Unrecognised quality '{}', expected SD, HD or FullHD", args.quality).yellow()
        );
    }

    let interest = InterestSet::new(&args.interest);
    if interest.is_empty() {
        eprintln!("{WARNING}{}", "No shows to follow, nothing will be downloaded".yellow());
    }

    let client = Arc::new(
        ReqwestClient::with_session(&args.site_url, &args.token)
            .context("Failed to create HTTP client")?,
    );
    let resolver = Resolver::new(client.clone(), args.site_url.clone());
    let queue = build_queue(&args)?;

    let options = PollOptions {
        feed_url: args.feed_url.clone().unwrap_or_else(|| {
            format!("{}/rss.xml", args.site_url.as_str().trim_end_matches('/'))
        }),
        quality,
        interest,
        download_path: args.download_path.clone(),
    };

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(TerminalReporter::new())
    };

    let mut watermark = Watermark::new(&args.watermark_file);

    loop {
        let result = poll_once(
            &client,
            &resolver,
            queue.as_ref(),
            &mut watermark,
            &options,
            &reporter,
        )
        .await;

        if args.once {
            result.context("Check failed")?;
            break;
        }

        // Failures were reported; the next tick retries
        tokio::select! {
            _ = tokio::time::sleep(args.interval) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
