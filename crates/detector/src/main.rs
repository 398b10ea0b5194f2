//! Privacy Guard - run the privacy detector against a saved page.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use detector::{Alert, AnalysisBridge, DetectorConfig, PrivacyGuard};
use dom::Window;
use html_parser::{HtmlParser, ParseOptions};

/// Privacy Guard - detect privacy-sensitive pages and report their signals
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analysis endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Analysis request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Remove the alert after this many milliseconds
    #[arg(long, global = true)]
    auto_dismiss_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a saved page and run the page-ready check
    Scan {
        /// HTML file
        file: PathBuf,

        /// URL the page was served from
        #[arg(long)]
        url: String,

        /// Cookie string visible to the page
        #[arg(long, default_value = "")]
        cookie: String,
    },
    /// Run the diagnostic check, bypassing the dispatch gate
    Trigger {
        /// HTML file
        file: PathBuf,

        /// URL the page was served from
        #[arg(long)]
        url: String,

        /// Cookie string visible to the page
        #[arg(long, default_value = "")]
        cookie: String,

        /// URL reported to the analysis service instead of the page URL
        #[arg(long)]
        override_url: Option<String>,
    },
    /// Check that the analysis service is up
    Health,
}

impl Args {
    fn detector_config(&self) -> Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DetectorConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if self.auto_dismiss_ms.is_some() {
            config.auto_dismiss_ms = self.auto_dismiss_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_page(file: &PathBuf, url: &str, cookie: &str) -> Result<Arc<Window>> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let url = Url::parse(url).with_context(|| format!("invalid page URL {}", url))?;
    let document = HtmlParser::new(ParseOptions::new(url).cookie(cookie)).parse(&html)?;
    Ok(Arc::new(Window::new(document)))
}

fn print_alert(alert: &Alert) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&alert.report)?);
    if let Some(markup) = alert.overlay.markup() {
        println!("{}", markup);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.detector_config()?;
    info!("Privacy Guard v{}", detector::VERSION);

    match &args.command {
        Command::Scan { file, url, cookie } => {
            let window = load_page(file, url, cookie)?;
            let guard = PrivacyGuard::with_http(window.clone(), &config)?;

            guard.install();
            window.load_complete();
            guard.settle().await;

            match guard.last_alert() {
                Some(alert) => print_alert(&alert)?,
                None => println!("Page is not privacy-sensitive; no alert shown."),
            }
        }
        Command::Trigger {
            file,
            url,
            cookie,
            override_url,
        } => {
            let window = load_page(file, url, cookie)?;
            window.load_complete();
            let guard = PrivacyGuard::with_http(window, &config)?;

            let alert = guard.manual_trigger(override_url.clone()).await?;
            print_alert(&alert)?;
        }
        Command::Health => {
            let bridge = AnalysisBridge::from_config(&config)?;
            let health = bridge
                .health()
                .await
                .with_context(|| format!("analysis service at {} unreachable", config.endpoint))?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.is_healthy() {
                anyhow::bail!("analysis service reports status {:?}", health.status);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_args() {
        let args = Args::parse_from([
            "privacy-detector",
            "scan",
            "page.html",
            "--url",
            "https://example.com/login",
            "--cookie",
            "a=1; b=2",
        ]);
        match args.command {
            Command::Scan { file, url, cookie } => {
                assert_eq!(file, PathBuf::from("page.html"));
                assert_eq!(url, "https://example.com/login");
                assert_eq!(cookie, "a=1; b=2");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_overrides() {
        let args = Args::parse_from([
            "privacy-detector",
            "--endpoint",
            "http://localhost:9000/analyze_url",
            "trigger",
            "page.html",
            "--url",
            "https://example.com/",
            "--timeout-ms",
            "500",
            "--auto-dismiss-ms",
            "8000",
        ]);
        let config = args.detector_config().unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/analyze_url");
        assert_eq!(config.request_timeout_ms, 500);
        assert_eq!(config.auto_dismiss_ms, Some(8000));
        assert!(matches!(args.command, Command::Trigger { override_url: None, .. }));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = Args::parse_from(["privacy-detector", "--timeout-ms", "0", "health"]);
        assert!(args.detector_config().is_err());
    }
}
