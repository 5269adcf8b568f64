//! Label tallies and majority voting.

/// Count label occurrences, preserving the order in which each label first appears.
pub(crate) fn tally(labels: impl IntoIterator<Item = usize>) -> Vec<(usize, usize)> {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
}

/// Return the most frequent label.
///
/// Ties go to the label encountered first. Returns `None` for an empty input.
#[must_use]
pub fn majority_label(labels: impl IntoIterator<Item = usize>) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (label, count) in tally(labels) {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label)
}
