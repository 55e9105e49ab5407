//! reflow.rs: hard-wrap text to a fixed column width.
//!
//! Wrapping is greedy and single pass. Original line breaks are dropped first,
//! so paragraphs are fully re-flowed; a word is only split (with a trailing
//! hyphen) when no space exists in the current line. A run of spaces at a
//! break is swallowed whole, so no line is empty or starts with a space.
//!
//! Reflow is NOT idempotent: running it over its own output joins the emitted
//! lines back into one paragraph and may pick different break points.

use anyhow::{bail, Result};

/// Column budget for reflowed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// No wrapping; the `-1` sentinel on the command line.
    Unbounded,
    Columns(usize),
}

impl Width {
    /// Map the CLI value: `-1` is unbounded, anything else must be >= 2.
    pub fn from_columns(n: i64) -> Result<Self> {
        match n {
            -1 => Ok(Width::Unbounded),
            n if n >= 2 => Ok(Width::Columns(n as usize)),
            other => bail!("line width must be -1 (unbounded) or at least 2, got {other}"),
        }
    }

    pub fn is_bounded(self) -> bool {
        matches!(self, Width::Columns(_))
    }

    /// Width used for separator lines; unbounded digests still get 60 columns.
    pub fn separator_len(self) -> usize {
        match self {
            Width::Unbounded => 60,
            Width::Columns(n) => n,
        }
    }
}

pub fn reflow(text: &str, width: Width) -> String {
    let text = text.replace('\n', " ");
    let n = match width {
        Width::Columns(n) if n >= 2 => n,
        _ => return text,
    };

    let mut lines: Vec<String> = Vec::new();
    let mut buf: Vec<char> = Vec::with_capacity(n);
    // index into `buf` of the latest space
    let mut last_space: Option<usize> = None;

    for c in text.chars() {
        // spaces left over from a break do not open the next line
        if c == ' ' && buf.is_empty() && !lines.is_empty() {
            continue;
        }
        buf.push(c);
        if c == ' ' {
            last_space = Some(buf.len() - 1);
        }
        if buf.len() < n {
            continue;
        }
        match last_space.take() {
            Some(at) => {
                let carry = buf.split_off(at + 1);
                while buf.last() == Some(&' ') {
                    buf.pop();
                }
                if !buf.is_empty() {
                    lines.push(buf.iter().collect());
                }
                buf = carry;
            }
            None => {
                let carry = buf.split_off(n - 1);
                let mut line: String = buf.iter().collect();
                line.push('-');
                lines.push(line);
                buf = carry;
            }
        }
    }
    if !buf.is_empty() {
        lines.push(buf.into_iter().collect());
    }
    lines.join("\n")
}
