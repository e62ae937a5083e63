//! Triplet extraction from raw TLE text
//!
//! Scans a block of non-blank lines for `(name, line1, line2)` triplets.
//! Misaligned or malformed lines never fail the scan: the window slides one
//! line forward until valid triplets line up again.

use std::iter::FusedIterator;

use tle_common::TleRecord;

/// Minimum length of a TLE data line after trailing whitespace is removed
pub const MIN_TLE_LINE_LEN: usize = 68;

/// Split raw text into trimmed, non-blank lines.
///
/// This is the caller-side filter the extractor expects: blank lines between
/// triplets are dropped here, not skipped by the scan.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// True when `line` can be TLE line 1 (prefix and length only, no checksum)
pub fn is_line1(line: &str) -> bool {
    is_data_line(line, "1 ")
}

/// True when `line` can be TLE line 2 (prefix and length only, no checksum)
pub fn is_line2(line: &str) -> bool {
    is_data_line(line, "2 ")
}

fn is_data_line(line: &str, prefix: &str) -> bool {
    line.starts_with(prefix) && line.trim_end().len() >= MIN_TLE_LINE_LEN
}

/// Lazy scan over a slice of lines, yielding one [`TleRecord`] per triplet.
///
/// The scan borrows its input, so a fresh extractor over the same lines
/// always yields the same records.
pub struct TripletExtractor<'a, S> {
    group: &'a str,
    lines: &'a [S],
    cursor: usize,
}

impl<'a, S: AsRef<str>> TripletExtractor<'a, S> {
    pub fn new(group: &'a str, lines: &'a [S]) -> Self {
        Self {
            group,
            lines,
            cursor: 0,
        }
    }

    /// Start another scan of the same input from the first line
    pub fn rescan(&self) -> Self {
        Self::new(self.group, self.lines)
    }
}

impl<'a, S: AsRef<str>> Iterator for TripletExtractor<'a, S> {
    type Item = TleRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor + 2 < self.lines.len() {
            let name = self.lines[self.cursor].as_ref();
            let line1 = self.lines[self.cursor + 1].as_ref();
            let line2 = self.lines[self.cursor + 2].as_ref();

            if is_line1(line1) && is_line2(line2) {
                self.cursor += 3;
                return Some(TleRecord::new(
                    self.group,
                    name.trim(),
                    line1.trim_end(),
                    line2.trim_end(),
                ));
            }

            tracing::trace!(
                "Resynchronizing {} at line {}: {:?}",
                self.group,
                self.cursor,
                name
            );
            self.cursor += 1;
        }

        // Fewer than three lines left: a trailing partial triplet is dropped.
        self.cursor = self.lines.len();
        None
    }
}

impl<'a, S: AsRef<str>> FusedIterator for TripletExtractor<'a, S> {}

/// Extract every triplet from pre-split lines
pub fn extract_triplets<'a, S: AsRef<str>>(
    group: &'a str,
    lines: &'a [S],
) -> TripletExtractor<'a, S> {
    TripletExtractor::new(group, lines)
}

/// Split `text` and collect all of its triplets, tagged with `group`
pub fn extract_from_text(text: &str, group: &str) -> Vec<TleRecord> {
    let lines = split_lines(text);
    extract_triplets(group, &lines).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_NAME: &str = "ISS (ZARYA)";
    const ISS_L1: &str = "1 25544U 98067A   23245.54791667  .00016717  00000-0  10270-3 0  9993";
    const ISS_L2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.50377579413340";
    const OBJ_NAME: &str = "2023-132A";
    const OBJ_L1: &str = "1 57754U 23132A   23245.65206230 -.00000128  00000+0  00000+0 0  9999";
    const OBJ_L2: &str = "2 57754  19.2862  21.4741 5934257 346.7698 165.0186  4.18358561    14";

    #[test]
    fn test_line_predicates() {
        assert!(is_line1(ISS_L1));
        assert!(is_line2(ISS_L2));
        assert!(!is_line1(ISS_L2));
        assert!(!is_line2(ISS_L1));
        assert!(!is_line1("1 25544U 98067A"));
        assert!(!is_line1(&format!(" {}", ISS_L1)));
    }

    #[test]
    fn test_wrong_checksum_is_still_accepted() {
        let bad_checksum = format!("{}0", &ISS_L1[..68]);
        assert_ne!(bad_checksum, ISS_L1);
        assert!(is_line1(&bad_checksum));
    }

    #[test]
    fn test_extract_aligned_triplets() {
        let lines = [ISS_NAME, ISS_L1, ISS_L2, OBJ_NAME, OBJ_L1, OBJ_L2];
        let records: Vec<_> = extract_triplets("stations", &lines).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], TleRecord::new("stations", ISS_NAME, ISS_L1, ISS_L2));
        assert_eq!(records[1], TleRecord::new("stations", OBJ_NAME, OBJ_L1, OBJ_L2));
    }

    #[test]
    fn test_resynchronizes_after_garbage() {
        let text = format!(
            "HEADER JUNK\nmore junk\n{ISS_NAME}\n{ISS_L1}\n{ISS_L2}\n\n   \n# comment\n1 short line\n{OBJ_NAME}\n{OBJ_L1}\n{OBJ_L2}\n"
        );
        let records = extract_from_text(&text, "mixed");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, ISS_NAME);
        assert_eq!(records[1].name, OBJ_NAME);
        assert_eq!(records[1].line2, OBJ_L2);
    }

    #[test]
    fn test_trailing_partial_triplet_is_dropped() {
        let lines = [ISS_NAME, ISS_L1, ISS_L2, OBJ_NAME, OBJ_L1];
        let records: Vec<_> = extract_triplets("g", &lines).collect();
        assert_eq!(records.len(), 1);

        let empty: [&str; 0] = [];
        assert_eq!(extract_triplets("g", &empty).count(), 0);
    }

    #[test]
    fn test_rescan_yields_same_records() {
        let lines = vec![ISS_NAME.to_string(), ISS_L1.to_string(), ISS_L2.to_string()];
        let mut first = extract_triplets("g", &lines);
        let again = first.rescan();

        let a: Vec<_> = first.by_ref().collect();
        let b: Vec<_> = again.collect();
        assert_eq!(a, b);
        assert_eq!(first.next(), None);
    }

    #[test]
    fn test_name_and_lines_are_trimmed() {
        let text = format!("{OBJ_NAME}     \r\n{OBJ_L1}  \r\n{OBJ_L2}\r\n");
        let records = extract_from_text(&text, "g");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, OBJ_NAME);
        assert_eq!(records[0].line1, OBJ_L1);
    }

    #[test]
    fn test_split_lines_drops_blank_lines() {
        let lines = split_lines("a\r\n\r\n  \nb\n\t\nc");
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
