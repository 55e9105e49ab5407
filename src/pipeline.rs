// src/pipeline.rs
//! One run: cutoff → fetch → dedup → format → write → trial → gate → send.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::compress::{prepare_output_dir, select_best, CompressionTrial, TrialResult};
use crate::config::RunConfig;
use crate::dedup::select_new;
use crate::digest::DigestFormatter;
use crate::dispatch::{check_cutoff, decide, DispatchDecision};
use crate::marker::MarkerStore;
use crate::notify::{Mailer, OutgoingMail};
use crate::source::NewsSource;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_runs_total", "Pipeline runs started.");
        describe_counter!("digest_items_total", "New items written into digests.");
        describe_counter!("codec_trials_total", "Codec configurations attempted.");
        describe_counter!(
            "codec_failures_total",
            "Codec configurations skipped because they failed."
        );
        describe_counter!("digest_sent_total", "Digests handed to the mailer.");
        describe_counter!(
            "source_fetch_errors_total",
            "News page requests that failed before a response."
        );
        describe_gauge!(
            "digest_best_size_bytes",
            "Size of the smallest artifact of the last run."
        );
    });
}

/// Subject and body text for the dispatch mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailTemplate {
    pub subject: String,
    pub body: String,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    PastCutoff,
    NoNewItems,
    Sent,
    SkippedTooLarge,
    /// The gate allowed sending but `send` is off.
    Withheld,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub decision: DispatchDecision,
    /// Items returned by the source before dedup.
    pub fetched: usize,
    pub new_items: usize,
    pub trials: Vec<TrialResult>,
    /// The mailer was actually invoked.
    pub sent: bool,
}

impl RunReport {
    pub fn outcome(&self) -> RunOutcome {
        match &self.decision {
            DispatchDecision::SkipPastCutoff => RunOutcome::PastCutoff,
            DispatchDecision::SkipNoNewItems => RunOutcome::NoNewItems,
            DispatchDecision::SkipTooLarge { .. } => RunOutcome::SkippedTooLarge,
            DispatchDecision::Send(_) if self.sent => RunOutcome::Sent,
            DispatchDecision::Send(_) => RunOutcome::Withheld,
        }
    }

    fn early(decision: DispatchDecision, fetched: usize) -> Self {
        Self {
            decision,
            fetched,
            new_items: 0,
            trials: Vec::new(),
            sent: false,
        }
    }
}

pub struct Pipeline {
    cfg: RunConfig,
    source: Box<dyn NewsSource>,
    store: Box<dyn MarkerStore>,
    mailer: Option<(Box<dyn Mailer>, MailTemplate)>,
}

impl Pipeline {
    pub fn new(cfg: RunConfig, source: Box<dyn NewsSource>, store: Box<dyn MarkerStore>) -> Self {
        Self {
            cfg,
            source,
            store,
            mailer: None,
        }
    }

    pub fn with_mailer(mut self, mailer: Box<dyn Mailer>, template: MailTemplate) -> Self {
        self.mailer = Some((mailer, template));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.cfg
    }

    pub async fn run(&self, now: DateTime<Local>) -> Result<RunReport> {
        ensure_metrics_described();
        counter!("digest_runs_total").increment(1);
        let cfg = &self.cfg;

        if cfg.send && self.mailer.is_none() {
            bail!("sending is enabled but no mailer is configured");
        }

        if let Some(decision) = check_cutoff(cfg.cutoff, &now) {
            tracing::info!(cutoff = ?cfg.cutoff, "current day is on or after the end date");
            return Ok(RunReport::early(decision, 0));
        }

        prepare_output_dir(&cfg.compress_dir)?;

        let fetched = self
            .source
            .fetch()
            .await
            .with_context(|| format!("fetching news from {}", self.source.name()))?;
        let fetched_len = fetched.len();
        let last = self.store.read_last_heading()?;
        let batch = select_new(fetched, last.as_deref(), cfg.only_new, self.store.as_ref())?;

        let formatter = DigestFormatter::new(cfg.width, cfg.separator.clone(), cfg.title.clone());
        let Some(digest) = formatter.format(&batch, &now.fixed_offset()) else {
            tracing::info!(fetched = fetched_len, "no new news found");
            return Ok(RunReport::early(DispatchDecision::SkipNoNewItems, fetched_len));
        };
        tracing::info!(new_items = digest.items, fetched = fetched_len, "new news found");
        counter!("digest_items_total").increment(digest.items as u64);
        digest.write_to(&cfg.digest_path)?;

        let trial = CompressionTrial::new(&cfg.compress_dir, &cfg.digest_path)
            .with_passphrase(cfg.passphrase.clone());
        let trials = trial.trial_all(digest.as_bytes(), &cfg.codecs).await;
        let best = select_best(&trials)?.clone();
        tracing::info!(
            codec = %best.codec_name,
            size_bytes = best.size_bytes,
            candidates = trials.len(),
            "best compression picked"
        );
        gauge!("digest_best_size_bytes").set(best.size_bytes as f64);

        let decision = decide(&best, cfg.ceiling_bytes, cfg.cutoff, &now);
        let sent = self.dispatch(&decision).await?;

        Ok(RunReport {
            decision,
            fetched: fetched_len,
            new_items: digest.items,
            trials,
            sent,
        })
    }

    async fn dispatch(&self, decision: &DispatchDecision) -> Result<bool> {
        match decision {
            DispatchDecision::Send(best) => {
                let Some((mailer, template)) = self.mailer.as_ref().filter(|_| self.cfg.send) else {
                    tracing::info!(artifact = %best.path.display(), "sending disabled, artifact kept");
                    return Ok(false);
                };
                mailer
                    .send(&OutgoingMail {
                        subject: template.subject.clone(),
                        body: template.body.clone(),
                        attachment: best.path.clone(),
                    })
                    .await?;
                counter!("digest_sent_total").increment(1);
                Ok(true)
            }
            DispatchDecision::SkipTooLarge {
                size_bytes,
                ceiling_bytes,
            } => {
                tracing::warn!(
                    size_bytes,
                    ceiling_bytes,
                    "compressed digest is too big to send"
                );
                Ok(false)
            }
            other => {
                tracing::info!(decision = other.label(), "nothing to send");
                Ok(false)
            }
        }
    }
}
