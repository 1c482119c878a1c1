//! Element-set parsing.
//!
//! Constellation files arrive as consecutive 3-line blocks: a name line
//! followed by the two fixed-column NORAD element lines. The heavy lifting
//! (column layout, checksums) belongs to the external `sgp4` parser; this
//! module only does the grouping and the per-satellite info extraction.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{OrbitalError, Result};

/// One unparsed 3-line block from a constellation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElementSet {
    pub name_line: String,
    pub line1: String,
    pub line2: String,
}

/// Identity fields of one satellite entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SatelliteInfo {
    pub name: String,
    /// International designator, e.g. "98067A".
    pub designator: String,
    /// NORAD catalog number; unique within one constellation file.
    pub norad_id: u64,
}

/// A successfully parsed element set together with its identity fields.
pub struct ParsedElementSet {
    pub info: SatelliteInfo,
    pub elements: sgp4::Elements,
}

impl std::fmt::Debug for ParsedElementSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedElementSet")
            .field("info", &self.info)
            .field(
                "elements",
                &format_args!("<sgp4::Elements #{}>", self.elements.norad_id),
            )
            .finish()
    }
}

impl RawElementSet {
    /// Hand the block to the external parser.
    pub fn parse(&self) -> Result<ParsedElementSet> {
        let elements = sgp4::Elements::from_tle(
            Some(self.name_line.trim().to_string()),
            self.line1.as_bytes(),
            self.line2.as_bytes(),
        )
        .map_err(|e| OrbitalError::InvalidTle(format!("{:?}", e)))?;

        // The designator occupies columns 10-17 of line 1.
        let designator = self
            .line1
            .get(9..17)
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        let info = SatelliteInfo {
            name: self.name_line.trim().to_string(),
            designator,
            norad_id: elements.norad_id,
        };

        Ok(ParsedElementSet { info, elements })
    }
}

/// Parse the raw text of one constellation file.
///
/// Malformed or truncated 3-line groups are skipped, never fatal; an
/// empty or unusable file yields an empty list.
pub fn parse_element_sets(text: &str) -> Vec<ParsedElementSet> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();

    let mut sets = Vec::with_capacity(lines.len() / 3);

    for group in lines.chunks(3) {
        let [name_line, line1, line2] = match group {
            [a, b, c] => [*a, *b, *c],
            _ => {
                warn!("dropping truncated element-set group of {} line(s)", group.len());
                continue;
            }
        };

        let raw = RawElementSet {
            name_line: name_line.to_string(),
            line1: line1.to_string(),
            line2: line2.to_string(),
        };

        match raw.parse() {
            Ok(parsed) => sets.push(parsed),
            Err(e) => warn!("skipping malformed element set '{}': {}", name_line.trim(), e),
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_BLOCK: &str = "ISS (ZARYA)\n\
        1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992\n\
        2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008\n";

    #[test]
    fn parses_single_block() {
        let sets = parse_element_sets(ISS_BLOCK);
        assert_eq!(sets.len(), 1);

        let info = &sets[0].info;
        assert_eq!(info.name, "ISS (ZARYA)");
        assert_eq!(info.designator, "98067A");
        assert_eq!(info.norad_id, 25544);
    }

    #[test]
    fn skips_malformed_group_keeps_valid_ones() {
        let text = format!(
            "{}BROKEN SAT\n1 garbage line that is not an element line\n2 also garbage\n{}",
            ISS_BLOCK, ISS_BLOCK
        );
        let sets = parse_element_sets(&text);
        assert_eq!(sets.len(), 2);
        assert!(sets.iter().all(|s| s.info.norad_id == 25544));
    }

    #[test]
    fn truncated_final_group_is_dropped() {
        let text = format!("{}LONELY NAME LINE\n", ISS_BLOCK);
        let sets = parse_element_sets(&text);
        assert_eq!(sets.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(parse_element_sets("").is_empty());
        assert!(parse_element_sets("\n\n\n").is_empty());
    }

    #[test]
    fn blank_separator_lines_are_ignored() {
        let text = format!("\n{}\n{}", ISS_BLOCK, ISS_BLOCK);
        assert_eq!(parse_element_sets(&text).len(), 2);
    }
}
