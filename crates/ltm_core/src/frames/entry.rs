//! Single frame log entries and the rate-override token.
//!
//! An entry is an opaque input payload (`|K...|M...|`) optionally followed by
//! a rate override, `T<num>:<den>|`, closed by the same `|` delimiter that
//! ends every payload field:
//!
//! ```text
//! |K20:ff1b|M0:0:A:.....|
//! |K20:ff1b|M0:0:A:.....|T60000000:1007680|
//! ```

use super::rate::{parse_digits, Rate};

/// Field delimiter of the input format.
pub const FIELD_DELIMITER: char = '|';

/// Tag that opens a rate override after a delimiter.
const RATE_TAG: char = 'T';

/// Split a raw line into its payload and optional rate override.
///
/// Anything that does not form a complete, non-zero `|T<num>:<den>|` tail
/// stays part of the payload, so unknown content round-trips untouched.
pub fn parse_override(line: &str) -> (&str, Option<Rate>) {
    let Some(marker) = line.rfind("|T") else {
        return (line, None);
    };

    // Payload keeps its closing delimiter.
    let payload = &line[..marker + 1];
    let token = &line[marker + 2..];

    let Some(body) = token.strip_suffix(FIELD_DELIMITER) else {
        return (line, None);
    };
    let Some((num, den)) = body.split_once(':') else {
        return (line, None);
    };

    match (parse_digits(num), parse_digits(den)) {
        (Some(num), Some(den)) if num > 0 && den > 0 => (payload, Some(Rate { num, den })),
        _ => (line, None),
    }
}

/// Render a payload with an optional rate override.
pub fn render_override(payload: &str, rate: Option<Rate>) -> String {
    match rate {
        Some(rate) => format!("{}{}{}{}", payload, RATE_TAG, rate, FIELD_DELIMITER),
        None => payload.to_string(),
    }
}

/// One recorded input entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    payload: String,
    rate: Option<Rate>,
}

impl FrameEntry {
    /// Create an entry from a payload and optional override.
    pub fn new(payload: impl Into<String>, rate: Option<Rate>) -> Self {
        Self {
            payload: payload.into(),
            rate,
        }
    }

    /// Parse a raw line (without its newline).
    pub fn parse(line: &str) -> Self {
        let (payload, rate) = parse_override(line);
        Self::new(payload, rate)
    }

    /// The input payload without any override.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The per-entry rate override, if any.
    pub fn rate(&self) -> Option<Rate> {
        self.rate
    }

    /// Rate this entry actually advances time at.
    pub fn effective_rate(&self, default: Rate) -> Rate {
        self.rate.unwrap_or(default)
    }

    /// Replace the override.
    pub fn set_rate(&mut self, rate: Option<Rate>) {
        self.rate = rate;
    }

    /// Copy with a different override.
    pub fn with_rate(&self, rate: Option<Rate>) -> Self {
        Self::new(self.payload.clone(), rate)
    }

    /// Whether the payload is blank.
    pub fn is_blank(&self) -> bool {
        self.payload.trim().is_empty() && self.rate.is_none()
    }

    /// Render back to a raw line (without newline).
    pub fn render(&self) -> String {
        render_override(&self.payload, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_entry() {
        let (payload, rate) = parse_override("|K20:ff1b|M0:0:A:.....|");
        assert_eq!(payload, "|K20:ff1b|M0:0:A:.....|");
        assert_eq!(rate, None);
    }

    #[test]
    fn parses_override() {
        let (payload, rate) = parse_override("|K|T60000000:1007680|");
        assert_eq!(payload, "|K|");
        assert_eq!(rate, Some(Rate { num: 60_000_000, den: 1_007_680 }));
    }

    #[test]
    fn override_round_trips() {
        let payloads = ["|K|", "|K20:ff1b|M0:0:A:.....|", "|", "|F1|K61|"];
        for payload in payloads {
            for rate in [Rate::integer(60), Rate { num: 1_000_000, den: 34_471 }] {
                let line = render_override(payload, Some(rate));
                assert_eq!(parse_override(&line), (payload, Some(rate)));
            }
        }
    }

    #[test]
    fn unchanged_lines_render_byte_identical() {
        let lines = [
            "|K20:ff1b|M0:0:A:.....|",
            "|K|T30:1|",
            "|K|T30:1",     // unterminated token
            "|K|Tx:1|",     // non-numeric
            "|K|T0:1|",     // zero numerator
            "|K|T60:|",     // missing denominator
            "",
        ];
        for line in lines {
            assert_eq!(FrameEntry::parse(line).render(), line);
        }
    }

    #[test]
    fn malformed_token_stays_in_payload() {
        let entry = FrameEntry::parse("|K|T60|");
        assert_eq!(entry.payload(), "|K|T60|");
        assert_eq!(entry.rate(), None);
    }

    #[test]
    fn only_trailing_token_is_an_override() {
        let entry = FrameEntry::parse("|K|T30:1|M1|");
        assert_eq!(entry.rate(), None);
        assert_eq!(entry.payload(), "|K|T30:1|M1|");
    }

    #[test]
    fn effective_rate_falls_back_to_default() {
        let plain = FrameEntry::parse("|K|");
        let timed = FrameEntry::parse("|K|T30:1|");
        assert_eq!(plain.effective_rate(Rate::integer(60)), Rate::integer(60));
        assert_eq!(timed.effective_rate(Rate::integer(60)), Rate::integer(30));
    }
}
