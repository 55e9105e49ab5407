//! dispatch.rs: decide whether the winning artifact goes out.
//!
//! Run states: Start → cutoff check → PastCutoff (terminal) | Fetching →
//! NoNewItems (terminal) | Compressing → Deciding → Sent | SkippedTooLarge.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::compress::TrialResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchDecision {
    Send(TrialResult),
    SkipTooLarge { size_bytes: u64, ceiling_bytes: u64 },
    SkipPastCutoff,
    SkipNoNewItems,
}

impl DispatchDecision {
    pub fn label(&self) -> &'static str {
        match self {
            DispatchDecision::Send(_) => "send",
            DispatchDecision::SkipTooLarge { .. } => "skip_too_large",
            DispatchDecision::SkipPastCutoff => "skip_past_cutoff",
            DispatchDecision::SkipNoNewItems => "skip_no_new_items",
        }
    }
}

/// True when `now` falls on or after the cutoff day (in `now`'s own zone).
pub fn past_cutoff<Tz: TimeZone>(cutoff: Option<NaiveDate>, now: &DateTime<Tz>) -> bool {
    cutoff.is_some_and(|day| now.date_naive() >= day)
}

/// Start-of-run gate, checked before any fetch or compression work.
pub fn check_cutoff<Tz: TimeZone>(
    cutoff: Option<NaiveDate>,
    now: &DateTime<Tz>,
) -> Option<DispatchDecision> {
    past_cutoff(cutoff, now).then_some(DispatchDecision::SkipPastCutoff)
}

pub fn decide<Tz: TimeZone>(
    best: &TrialResult,
    ceiling_bytes: u64,
    cutoff: Option<NaiveDate>,
    now: &DateTime<Tz>,
) -> DispatchDecision {
    if past_cutoff(cutoff, now) {
        return DispatchDecision::SkipPastCutoff;
    }
    if best.size_bytes > ceiling_bytes {
        return DispatchDecision::SkipTooLarge {
            size_bytes: best.size_bytes,
            ceiling_bytes,
        };
    }
    DispatchDecision::Send(best.clone())
}
