//! Indexed, line-oriented frame log.
//!
//! Entries are addressed 1-based, matching the frame numbers a replay tool
//! displays. Order is load-bearing: entry `i` covers the elapsed time after
//! entries `1..i`.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use super::entry::FrameEntry;
use super::error::{FrameError, FrameResult};
use super::rate::Rate;

/// Ordered sequence of frame entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameLog {
    entries: Vec<FrameEntry>,
}

impl FrameLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from parsed entries.
    pub fn from_entries(entries: Vec<FrameEntry>) -> Self {
        Self { entries }
    }

    /// Read every line of `reader` as an entry.
    pub fn load<R: BufRead>(reader: R) -> FrameResult<Self> {
        let mut entries = Vec::new();
        for line in reader.lines() {
            entries.push(FrameEntry::parse(&line?));
        }
        Ok(Self { entries })
    }

    /// Parse a log held in memory.
    pub fn parse(content: &str) -> Self {
        Self {
            entries: content.lines().map(FrameEntry::parse).collect(),
        }
    }

    /// Write every entry followed by a newline.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> FrameResult<()> {
        for entry in &self.entries {
            writeln!(writer, "{}", entry.render())?;
        }
        Ok(())
    }

    /// Render the whole log.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            output.push_str(&entry.render());
            output.push('\n');
        }
        output
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[FrameEntry] {
        &self.entries
    }

    /// Entry at 1-based `index`.
    pub fn get(&self, index: usize) -> Option<&FrameEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Mutable entry at 1-based `index`.
    pub fn get_mut(&mut self, index: usize) -> FrameResult<&mut FrameEntry> {
        let len = self.entries.len();
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get_mut(i))
            .ok_or(FrameError::out_of_range(index, len))
    }

    /// Replace the entry at 1-based `index`, returning the old one.
    pub fn replace(&mut self, index: usize, entry: FrameEntry) -> FrameResult<FrameEntry> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, entry))
    }

    /// Append an entry, returning its 1-based index.
    pub fn append(&mut self, entry: FrameEntry) -> usize {
        self.entries.push(entry);
        self.entries.len()
    }

    /// Append every entry of `other` in order.
    pub fn extend(&mut self, other: FrameLog) {
        self.entries.extend(other.entries);
    }

    /// Index of the final non-blank entry, scanning backward from the end.
    pub fn last_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| !entry.is_blank())
            .map(|i| i + 1)
    }

    /// Re-render the final entry through `transform` and insert the result
    /// as a new entry right after it.
    ///
    /// The original final entry is kept. Trailing blank lines stay trailing.
    /// Returns the 1-based index of the new entry.
    pub fn rewrite_last_entry<F>(&mut self, transform: F) -> FrameResult<usize>
    where
        F: FnOnce(&FrameEntry) -> FrameEntry,
    {
        let last = self.last_index().ok_or(FrameError::EmptyLog)?;
        let rewritten = transform(&self.entries[last - 1]);
        self.entries.insert(last, rewritten);
        Ok(last + 1)
    }

    /// Number of entries carrying an override.
    pub fn override_count(&self) -> usize {
        self.entries.iter().filter(|e| e.rate().is_some()).count()
    }

    /// Whether every entry advances at `default` (no overrides).
    pub fn is_constant_rate(&self) -> bool {
        self.override_count() == 0
    }

    /// Total elapsed time in microseconds for the given default rate.
    ///
    /// Entries are grouped by rate and rounded down once at the end.
    pub fn elapsed_micros(&self, default: Rate) -> u64 {
        let mut counts: HashMap<Rate, u128> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.effective_rate(default)).or_default() += 1;
        }

        // Nanosecond precision per rate group.
        let nanos: u128 = counts
            .iter()
            .map(|(rate, count)| {
                count * rate.den as u128 * 1_000_000_000 / rate.num as u128
            })
            .sum();
        (nanos / 1_000) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "|K|\n|K20:ff1b|\n|K|T30:1|\n";

    #[test]
    fn loads_and_renders_identically() {
        let log = FrameLog::load(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.render(), SAMPLE);

        let mut out = Vec::new();
        log.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }

    #[test]
    fn indices_are_one_based() {
        let log = FrameLog::parse(SAMPLE);
        assert!(log.get(0).is_none());
        assert_eq!(log.get(1).unwrap().payload(), "|K|");
        assert_eq!(log.get(3).unwrap().rate(), Some(Rate::integer(30)));
        assert!(log.get(4).is_none());
    }

    #[test]
    fn replace_returns_previous() {
        let mut log = FrameLog::parse(SAMPLE);
        let old = log.replace(2, FrameEntry::parse("|K1|")).unwrap();
        assert_eq!(old.payload(), "|K20:ff1b|");
        assert_eq!(log.get(2).unwrap().payload(), "|K1|");

        assert!(matches!(
            log.replace(9, FrameEntry::parse("|K|")),
            Err(FrameError::EntryOutOfRange { index: 9, len: 3 })
        ));
    }

    #[test]
    fn append_returns_new_index() {
        let mut log = FrameLog::parse(SAMPLE);
        assert_eq!(log.append(FrameEntry::parse("|K2|")), 4);
    }

    #[test]
    fn rewrite_last_entry_keeps_original() {
        let mut log = FrameLog::parse("|K|\n|K5|\n");
        let index = log
            .rewrite_last_entry(|last| last.with_rate(Some(Rate::from_micros(500).unwrap())))
            .unwrap();

        assert_eq!(index, 3);
        assert_eq!(log.render(), "|K|\n|K5|\n|K5|T1000000:500|\n");
    }

    #[test]
    fn rewrite_last_entry_skips_trailing_blank_lines() {
        let mut log = FrameLog::parse("|K|\n|K5|\n\n");
        let index = log.rewrite_last_entry(|last| last.clone()).unwrap();
        assert_eq!(index, 3);
        assert_eq!(log.render(), "|K|\n|K5|\n|K5|\n\n");
    }

    #[test]
    fn rewrite_last_entry_on_empty_log_fails() {
        let mut log = FrameLog::new();
        assert!(matches!(
            log.rewrite_last_entry(|e| e.clone()),
            Err(FrameError::EmptyLog)
        ));
    }

    #[test]
    fn elapsed_time_counts_overrides() {
        let log = FrameLog::parse("|K|\n|K|\n|K|T1000000:500|\n");
        // Two 50 fps entries (20000us each) plus one 500us entry.
        assert_eq!(log.elapsed_micros(Rate::integer(50)), 40_500);
        assert_eq!(log.override_count(), 1);
        assert!(!log.is_constant_rate());
    }
}
