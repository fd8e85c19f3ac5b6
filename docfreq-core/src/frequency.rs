//! Word counting and top-N selection

use std::collections::HashMap;

use crate::report::FrequencyEntry;

/// Number of entries kept in a report
pub const TOP_WORDS: usize = 10;

/// Count every whitespace-separated token of a document
///
/// Tokens are compared byte for byte: no case folding and no punctuation
/// stripping. The returned entries are in order of first occurrence.
pub fn count_words(document: &str) -> Vec<FrequencyEntry> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for word in document.split_whitespace() {
        match positions.get(word) {
            Some(&idx) => entries[idx].count += 1,
            None => {
                positions.insert(word, entries.len());
                entries.push(FrequencyEntry::new(word, 1));
            }
        }
    }

    entries
}

/// Keep the `n` most frequent entries, highest count first
///
/// Equal counts keep their input order, so entries produced by
/// [`count_words`] tie-break on first occurrence in the document.
pub fn top_words(mut entries: Vec<FrequencyEntry>, n: usize) -> Vec<FrequencyEntry> {
    // sort_by is stable
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
}
