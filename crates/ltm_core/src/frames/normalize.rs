//! Default-rate conversion for frame logs.
//!
//! Changing a recording's default rate would silently change how long every
//! plain entry lasts. Conversion compensates per entry instead of resampling:
//! entry count and order never change, only the declared duration does.

use super::entry::FrameEntry;
use super::error::{FrameError, FrameResult};
use super::log::FrameLog;
use super::rate::Rate;

/// Rewrite `entries` recorded at default rate `from` so they keep their
/// real-time duration under default rate `to`.
///
/// - an entry without override gains an override equal to `from`;
/// - an entry whose override numerator equals `to.num` loses it (it now
///   runs at the new default);
/// - any other override is left as is.
///
/// Both rates must have denominator 1.
pub fn convert_rate(entries: &[FrameEntry], from: Rate, to: Rate) -> FrameResult<Vec<FrameEntry>> {
    if !from.is_integer() || !to.is_integer() {
        return Err(FrameError::UnsupportedRateConfiguration { from, to });
    }

    if from == to {
        return Ok(entries.to_vec());
    }

    let mut injected = 0usize;
    let mut stripped = 0usize;

    let converted = entries
        .iter()
        .map(|entry| match entry.rate() {
            Some(rate) if rate.num == to.num => {
                stripped += 1;
                entry.with_rate(None)
            }
            Some(_) => entry.clone(),
            None => {
                injected += 1;
                entry.with_rate(Some(from))
            }
        })
        .collect();

    tracing::debug!(
        "Converted {} entries {} -> {} ({} overrides injected, {} stripped)",
        entries.len(),
        from,
        to,
        injected,
        stripped
    );

    Ok(converted)
}

impl FrameLog {
    /// Log-level form of [`convert_rate`].
    pub fn convert_rate(&self, from: Rate, to: Rate) -> FrameResult<FrameLog> {
        Ok(FrameLog::from_entries(convert_rate(self.entries(), from, to)?))
    }
}
