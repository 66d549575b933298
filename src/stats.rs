// ── Number statistics ─────────────────────────────────────────────────────────
//
// Recomputed from scratch on every edit of the scratchpad.  Every maximal run
// of ASCII digits in the text counts as one unsigned number; everything else is
// a separator.  Pure Rust, no Win32.

use std::fmt;

/// Shown instead of figures when fewer than two numbers were found.
pub(crate) const NOT_ENOUGH_NUMBERS: &str = "Not enough numbers detected (need at least 2).";

/// Summary of the numbers found in a piece of text.
///
/// `average` and `max_deviation` are only meaningful when
/// [`is_sufficient`](Self::is_sufficient) is `true`; otherwise they are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Statistics {
    pub(crate) min: u64,
    pub(crate) max: u64,
    pub(crate) sum: u64,
    pub(crate) count: u64,
    pub(crate) average: u64,
    pub(crate) max_deviation: u64,
}

impl Statistics {
    /// Scan `text` left to right and summarise every digit-run.
    ///
    /// Numbers wider than `u64` wrap silently, as does the sum.
    pub(crate) fn from_text(text: &str) -> Self {
        let mut stats = Self { min: u64::MAX, ..Self::default() };

        let mut current: Option<u64> = None;
        for c in text.chars() {
            // `to_digit(10)` only accepts ASCII '0'..='9'.
            match c.to_digit(10) {
                Some(d) => {
                    let n = current.unwrap_or(0);
                    current = Some(n.wrapping_mul(10).wrapping_add(u64::from(d)));
                }
                None => {
                    if let Some(n) = current.take() {
                        stats.push(n);
                    }
                }
            }
        }
        if let Some(n) = current {
            stats.push(n);
        }

        if stats.is_sufficient() {
            let average = (stats.sum as f64 / stats.count as f64).round() as u64;
            stats.average = average;
            stats.max_deviation = stats
                .max
                .saturating_sub(average)
                .max(average.saturating_sub(stats.min));
        } else if stats.count == 0 {
            stats.min = 0;
        }

        stats
    }

    /// At least two numbers are needed for an average to mean anything.
    pub(crate) fn is_sufficient(&self) -> bool {
        self.count >= 2
    }

    fn push(&mut self, n: u64) {
        self.count += 1;
        self.min = self.min.min(n);
        self.max = self.max.max(n);
        self.sum = self.sum.wrapping_add(n);
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_sufficient() {
            return f.write_str(NOT_ENOUGH_NUMBERS);
        }
        write!(
            f,
            "Avg={} +-{}, Min={}, Max={}, Sum={}, nNumbers={}",
            self.average, self.max_deviation, self.min, self.max, self.sum, self.count
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
