use super::model::{Dataset, Emotion};

// ---------------------------------------------------------------------------
// Scans over the dataset
// ---------------------------------------------------------------------------

/// Per-label counts indexed by label id.
pub type LabelCounts = [usize; Emotion::COUNT];

/// Tally every record by label in a single pass.
pub fn label_counts(dataset: &Dataset) -> LabelCounts {
    let mut counts = [0usize; Emotion::COUNT];
    for record in dataset.records() {
        counts[record.label.label_id() as usize] += 1;
    }
    counts
}

/// Return the indices of the first `limit` records whose text contains
/// `needle`, ignoring case, in dataset order.
///
/// Plain substring containment: no tokenization and no ranking.
pub fn matching_indices(dataset: &Dataset, needle: &str, limit: usize) -> Vec<usize> {
    let needle = needle.to_lowercase();
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| record.text.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .take(limit)
        .collect()
}

/// `100 * count / total`, rounded to two decimals. Zero when `total` is 0.
///
/// Rounds the exact binary value of the percentage through decimal
/// formatting, so 572/16000 (stored as 3.5749999...) gives 3.57. Scaling by
/// 100 before `round` would push it to 3.58.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    format!("{pct:.2}").parse().unwrap_or(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn dataset(rows: &[(&str, Emotion)]) -> Dataset {
        Dataset::from_records(
            rows.iter()
                .map(|(text, label)| Record {
                    text: text.to_string(),
                    label: *label,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn matches_ignore_case_and_keep_order() {
        let ds = dataset(&[
            ("I feel HAPPY today", Emotion::Joy),
            ("nothing here", Emotion::Sadness),
            ("so unhappy", Emotion::Sadness),
            ("happy happy", Emotion::Joy),
        ]);
        assert_eq!(matching_indices(&ds, "Happy", 10), vec![0, 2, 3]);
        assert_eq!(matching_indices(&ds, "happy", 2), vec![0, 2]);
        assert!(matching_indices(&ds, "zzz", 10).is_empty());
    }

    #[test]
    fn counts_include_empty_labels() {
        let ds = dataset(&[("a", Emotion::Joy), ("b", Emotion::Joy), ("c", Emotion::Fear)]);
        assert_eq!(label_counts(&ds), [0, 2, 0, 0, 1, 0]);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(5362, 16000), 33.51);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_the_stored_value_not_a_rescaled_one() {
        assert_eq!(percentage(572, 16000), 3.57);
        assert_eq!(percentage(100, 16000), 0.62);
        assert_eq!(percentage(12, 16000), 0.07);
    }
}
