use strsim::levenshtein;

/// Return the closest candidate within the edit-distance bound, or `None`.
///
/// The bound scales with the needle length so that short names do not match
/// half the namespace: up to 1 edit for needles of three characters or
/// fewer, 2 edits otherwise. Ties break by distance, then candidate length,
/// then lexicographically, so the result is deterministic regardless of
/// candidate order.
pub fn closest<'a, I>(needle: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }

    let max_dist = match needle.len() {
        0..=3 => 1,
        _ => 2,
    };

    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|c| !c.is_empty() && *c != needle)
        .map(|c| (levenshtein(needle, c), c))
        .filter(|(d, _)| *d <= max_dist)
        .collect();

    scored.sort_by(|(da, a), (db, b)| da.cmp(db).then(a.len().cmp(&b.len())).then(a.cmp(b)));
    scored.first().map(|(_, s)| (*s).to_string())
}
