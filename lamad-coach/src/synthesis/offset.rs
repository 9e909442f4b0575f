//! Playback offset selection over a timestamp index.

use crate::models::TimestampEntry;
use crate::vocabulary::{contains_phrase, normalize};

/// Number of query keywords found as whole words in an entry's
/// description or keywords.
pub fn overlap(entry: &TimestampEntry, keywords: &[String]) -> usize {
    let mut text = normalize(&entry.description);
    for keyword in &entry.keywords {
        text.push(' ');
        text.push_str(&normalize(keyword));
    }

    keywords
        .iter()
        .filter(|k| contains_phrase(&text, &normalize(k)))
        .count()
}

/// Offset of the entry sharing the most keywords with the query.
///
/// The earliest entry wins ties. `None` when there are no keywords or no
/// entry shares any.
pub fn optimal_offset(index: &[TimestampEntry], keywords: &[String]) -> Option<u32> {
    if keywords.is_empty() {
        return None;
    }

    let mut best: Option<(usize, u32)> = None;
    for entry in index {
        let hits = overlap(entry, keywords);
        if hits > 0 && best.map_or(true, |(most, _)| hits > most) {
            best = Some((hits, entry.offset_secs));
        }
    }

    best.map(|(_, offset)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::keywords;

    fn index() -> Vec<TimestampEntry> {
        vec![
            TimestampEntry::new(0, "Introduction"),
            TimestampEntry::new(95, "Breaking posture"),
            TimestampEntry::new(240, "Locking the triangle").with_keywords(["finish", "angle"]),
            TimestampEntry::new(410, "Common triangle mistakes"),
        ]
    }

    #[test]
    fn test_best_overlap() {
        let kw = keywords("how do I finish the triangle from closed guard");
        assert_eq!(optimal_offset(&index(), &kw), Some(240));
    }

    #[test]
    fn test_earliest_wins_ties() {
        let kw = vec!["triangle".to_string()];
        assert_eq!(optimal_offset(&index(), &kw), Some(240));
    }

    #[test]
    fn test_no_overlap_or_keywords() {
        assert_eq!(optimal_offset(&index(), &["berimbolo".to_string()]), None);
        assert_eq!(optimal_offset(&index(), &[]), None);
        assert_eq!(optimal_offset(&[], &["triangle".to_string()]), None);
    }

    #[test]
    fn test_overlap_reads_entry_keywords() {
        let entry = TimestampEntry::new(10, "Setup").with_keywords(["Angle", "hip escape"]);
        assert_eq!(overlap(&entry, &["angle".to_string(), "escape".to_string()]), 2);
    }

    #[test]
    fn test_overlap_is_whole_word() {
        let entry = TimestampEntry::new(30, "Vanguard entries");
        assert_eq!(overlap(&entry, &["guard".to_string()]), 0);
        assert_eq!(overlap(&entry, &["vanguard".to_string()]), 1);
    }
}
