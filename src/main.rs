//! news-digest binary entrypoint.
//! Scrapes the short-news page, writes a reflowed digest, compresses it under
//! every codec configuration and mails the smallest artifact.
//!
//! Runs must not overlap: the last-headline marker is read and rewritten
//! without locking. Schedule one run at a time (cron, systemd timer).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest::config::size::parse_ceiling;
use news_digest::config::source::{load_selectors, DEFAULT_SOURCE_URL};
use news_digest::config::{parse_cutoff, MailConfig, RunConfig, Secret, NO_CUTOFF};
use news_digest::marker::FileMarkerStore;
use news_digest::notify::email::SmtpMailer;
use news_digest::source::html::HtmlNewsSource;
use news_digest::{MailTemplate, Pipeline, Width};

/// Scrape short news, rewrite them in a size-aware format and mail a
/// compressed copy. Open the attachment with 7-Zip or the matching tool.
#[derive(Parser, Debug)]
#[command(name = "news-digest")]
#[command(version)]
struct Cli {
    /// Email address to send the news to
    #[arg(long, env = "NOTIFY_EMAIL_TO")]
    to_mail: Option<String>,

    /// SMTP login; also used as the sending address
    #[arg(long, env = "SMTP_USER")]
    server_username: Option<String>,

    /// SMTP password (for Gmail an app password)
    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    server_password: Option<String>,

    /// Implicit-TLS SMTP server
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    smtp_ssl: String,

    /// Display name in the "From:" field
    #[arg(long, default_value = "DR News Compressed Service")]
    from_str: String,

    /// Mail subject
    #[arg(long, default_value = "DR News compressed")]
    subject_str: String,

    /// Only include news newer than the last heading sent
    #[arg(short = 'o', long, default_value_t = true, action = ArgAction::Set)]
    only_new: bool,

    /// Characters per line in the digest; -1 means no limit
    #[arg(short = 'c', long, default_value_t = -1, allow_negative_numbers = true)]
    char_per_line: i64,

    /// Separator character repeated between items
    #[arg(short = 's', long, default_value = "-")]
    sep_char: String,

    /// Send the mail when the compressed digest fits
    #[arg(short = 'm', long, default_value_t = true, action = ArgAction::Set)]
    send: bool,

    /// Stop sending from this day on (YYYYMMDD); FFFFFFFF disables the cutoff
    #[arg(short = 'e', long, default_value = NO_CUTOFF)]
    end_date: String,

    /// Largest compressed size that will be sent, e.g. 100KB (1 KB = 1000 B)
    #[arg(short = 'b', long, default_value = "100KB")]
    max_bytes: String,

    /// Capture the page on the first call and replay it afterwards
    #[arg(short = 'd', long)]
    debug: bool,

    /// Passphrase for the encrypted codec variants
    #[arg(long, env = "DIGEST_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    source_url: String,

    /// TOML or JSON file overriding the page selectors
    #[arg(long)]
    source_config: Option<PathBuf>,

    /// Header label in front of the run timestamp
    #[arg(long, default_value = "Nyheder fra DR")]
    title: String,

    #[arg(long, default_value = "news.txt")]
    digest_file: PathBuf,

    #[arg(long, default_value = "last.txt")]
    marker_file: PathBuf,

    #[arg(long, default_value = "compress")]
    compress_dir: PathBuf,

    #[arg(long, default_value = "debug_dr_nyheder.html")]
    debug_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let width = Width::from_columns(self.char_per_line)?;
        let ceiling_bytes = parse_ceiling(&self.max_bytes)?;
        tracing::info!(ceiling_bytes, from = %self.max_bytes, "max size set");

        Ok(RunConfig {
            source_url: self.source_url.clone(),
            selectors: load_selectors(self.source_config.as_deref())?,
            only_new: self.only_new,
            width,
            separator: RunConfig::separator_line(&self.sep_char, width),
            title: self.title.clone(),
            send: self.send,
            cutoff: parse_cutoff(&self.end_date)?,
            ceiling_bytes,
            debug_cache: self.debug.then(|| self.debug_cache.clone()),
            digest_path: self.digest_file.clone(),
            marker_path: self.marker_file.clone(),
            compress_dir: self.compress_dir.clone(),
            passphrase: self.passphrase.clone().map(Secret::new),
            ..RunConfig::default()
        })
    }

    fn mail_config(&self) -> Result<MailConfig> {
        Ok(MailConfig {
            smtp_host: self.smtp_ssl.clone(),
            username: self
                .server_username
                .clone()
                .context("--server-username (or SMTP_USER) is required when sending")?,
            password: Secret::new(
                self.server_password
                    .clone()
                    .context("--server-password (or SMTP_PASS) is required when sending")?,
            ),
            from_name: self.from_str.clone(),
            to: self
                .to_mail
                .clone()
                .context("--to-mail (or NOTIFY_EMAIL_TO) is required when sending")?,
            subject: self.subject_str.clone(),
            body: "News from DR nyheder. Uncompress with 7zip".to_string(),
        })
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("news_digest=debug,info")
        } else {
            EnvFilter::new("news_digest=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let now = chrono::Local::now();
    tracing::info!(started = %now.to_rfc3339(), "script running");

    let cfg = cli.run_config()?;
    if cfg.debug_cache.is_some() {
        tracing::warn!("running in debug mode; news are not refreshed once captured");
    }
    if cfg.only_new {
        tracing::info!("only new news are used; a repeated heading hides older unseen news");
    }

    let source = HtmlNewsSource::from_url(cfg.source_url.clone(), cfg.selectors.clone())
        .with_debug_cache(cfg.debug_cache.clone());
    let store = FileMarkerStore::new(cfg.marker_path.clone());

    let mut pipeline = Pipeline::new(cfg.clone(), Box::new(source), Box::new(store));
    if cfg.send {
        let mail = cli.mail_config()?;
        let template = MailTemplate {
            subject: mail.subject.clone(),
            body: mail.body.clone(),
        };
        pipeline = pipeline.with_mailer(Box::new(SmtpMailer::new(&mail)?), template);
    }

    let report = pipeline.run(now).await?;
    tracing::info!(
        outcome = ?report.outcome(),
        decision = report.decision.label(),
        fetched = report.fetched,
        new_items = report.new_items,
        candidates = report.trials.len(),
        sent = report.sent,
        "run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_digest::UnitConversionError;
    use serial_test::serial;

    const ENV_KEYS: [&str; 5] = [
        "NOTIFY_EMAIL_TO",
        "SMTP_USER",
        "SMTP_PASS",
        "SMTP_HOST",
        "DIGEST_PASSPHRASE",
    ];

    fn clear_env() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    #[serial]
    fn defaults_map_to_run_config() {
        clear_env();
        let cfg = Cli::try_parse_from(["news-digest"])
            .unwrap()
            .run_config()
            .unwrap();
        assert_eq!(cfg.width, Width::Unbounded);
        assert_eq!(cfg.separator, "-".repeat(60));
        assert_eq!(cfg.ceiling_bytes, 100_000);
        assert_eq!(cfg.cutoff, None);
        assert!(cfg.only_new && cfg.send);
        assert!(cfg.debug_cache.is_none());
        assert!(cfg.passphrase.is_none());
    }

    #[test]
    #[serial]
    fn short_flags_override() {
        clear_env();
        let cli = Cli::try_parse_from([
            "news-digest", "-c", "40", "-s", "=", "-e", "20300101", "-b", "2MB", "-d", "-m",
            "false", "-o", "false",
        ])
        .unwrap();
        let cfg = cli.run_config().unwrap();
        assert_eq!(cfg.width, Width::Columns(40));
        assert_eq!(cfg.separator, "=".repeat(40));
        assert_eq!(cfg.cutoff, chrono::NaiveDate::from_ymd_opt(2030, 1, 1));
        assert_eq!(cfg.ceiling_bytes, 2_000_000);
        assert_eq!(cfg.debug_cache, Some(PathBuf::from("debug_dr_nyheder.html")));
        assert!(!cfg.send);
        assert!(!cfg.only_new);
    }

    #[test]
    #[serial]
    fn bad_values_fail_before_fetch() {
        clear_env();
        let err = Cli::try_parse_from(["news-digest", "-b", "100XB"])
            .unwrap()
            .run_config()
            .unwrap_err();
        assert!(err.downcast_ref::<UnitConversionError>().is_some());

        let cli = Cli::try_parse_from(["news-digest", "-c", "1"]).unwrap();
        assert!(cli.run_config().is_err());
    }

    #[test]
    #[serial]
    fn mail_settings_come_from_env() {
        clear_env();
        let cli = Cli::try_parse_from(["news-digest"]).unwrap();
        assert!(cli.mail_config().is_err());

        std::env::set_var("SMTP_USER", "sender@example.com");
        std::env::set_var("SMTP_PASS", "app-password");
        std::env::set_var("NOTIFY_EMAIL_TO", "reader@example.com");
        let mail = Cli::try_parse_from(["news-digest"])
            .unwrap()
            .mail_config()
            .unwrap();
        clear_env();

        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.username, "sender@example.com");
        assert_eq!(mail.password.expose(), "app-password");
        assert_eq!(mail.to, "reader@example.com");
        assert_eq!(mail.from_name, "DR News Compressed Service");
    }
}
