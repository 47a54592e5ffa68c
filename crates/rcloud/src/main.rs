use anyhow::{Context, anyhow};
use clap::Parser;
use rcloud_e::{BrowserOptions, WebDriverSession};
use rcloud_engine::cli::{OutputHandlers, StdinPrompt};
use rcloud_engine::config::schema::BrowserConfig;
use rcloud_engine::config::{Command, ConfigLoader, Overrides, RunConfig};
use rcloud_engine::driver::SessionDriver;
use rcloud_engine::orchestrator::{self, RunContext, RunOutcome};
use rcloud_engine::transfer::HttpFetcher;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rcloud",
    version,
    about = "List, download and delete phonostar radiocloud recordings"
)]
struct Args {
    /// What to do with the matching recordings: list, download or delete
    #[arg(default_value = "list")]
    command: Command,

    /// Only act on recordings whose title matches this regular expression
    #[arg(short, long)]
    regex: Option<String>,

    /// Delete each recording after it was downloaded
    #[arg(short = 'd', long)]
    delete_after_download: bool,

    #[arg(short, long)]
    user: Option<String>,

    #[arg(short, long)]
    password: Option<String>,

    /// Config file (default: ./rcloud.yaml, then ~/.rcloud/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Download directory
    #[arg(long)]
    dir: Option<PathBuf>,

    #[arg(long)]
    geckodriver_path: Option<PathBuf>,

    #[arg(long)]
    firefox_path: Option<PathBuf>,

    /// External WebDriver server. If not provided, geckodriver is launched automatically.
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    debug: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn browser_config(&self, file: &BrowserConfig) -> BrowserConfig {
        let mut browser = file.clone();
        if let Some(url) = &self.webdriver_url {
            browser.webdriver_url = Some(url.clone());
        }
        if let Some(path) = &self.geckodriver_path {
            browser.geckodriver_path = Some(path.clone());
        }
        if let Some(path) = &self.firefox_path {
            browser.firefox_path = Some(path.clone());
        }
        browser
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            user: self.user.clone(),
            password: self.password.clone(),
            download_dir: self.dir.clone(),
            regex: self.regex.clone(),
            delete_after_download: self.delete_after_download,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the listing.
    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let file = ConfigLoader::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    let config = RunConfig::resolve(args.command, args.overrides(), &file)
        .context("Invalid configuration")?;
    let output = OutputHandlers::stdio();
    let mut prompt = StdinPrompt::new();

    if config.command == Command::Delete && config.regex.is_none() {
        let confirmed = prompt.confirm(
            &[
                "No filter given: this deletes ALL recordings.",
                "Press enter to continue or ctrl+c to cancel",
            ],
            output,
        )
        .await?;
        if !confirmed {
            (output.out)("Cancelled.");
            return Ok(());
        }
    }

    let options = BrowserOptions::from_config(&args.browser_config(&file.browser), args.debug);
    let mut session = WebDriverSession::new(options);
    if let Err(e) = session.launch().await {
        let _ = session.close().await;
        return Err(e).context("Failed to launch browser");
    }

    let mut fetcher = HttpFetcher::new();
    let result = tokio::select! {
        result = orchestrator::run(
            RunContext {
                driver: &mut session,
                fetcher: &mut fetcher,
                prompt: &mut prompt,
                output,
            },
            &config,
        ) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    if let Err(e) = session.close().await {
        warn!("Failed to close browser: {}", e);
    }

    match result {
        None => Err(anyhow!("Interrupted")),
        Some(Ok(RunOutcome::NothingToDo)) => Ok(()),
        Some(Ok(RunOutcome::Completed(report))) => {
            let failures = report.failures();
            if failures > 0 {
                (output.err)(&format!(
                    "{} of {} recordings could not be processed.",
                    failures,
                    report.items.len()
                ));
            }
            info!("Done: {} {} item(s)", report.command, report.items.len());
            Ok(())
        }
        Some(Err(e)) => Err(e.into()),
    }
}
