/// Clip a diff to at most `max_size` characters.
///
/// Counts Unicode scalar values, never snaps to a word or line boundary and
/// never pads a diff that is already short enough.
pub fn truncate(diff: &str, max_size: usize) -> &str {
    match diff.char_indices().nth(max_size) {
        Some((cutoff, _)) => &diff[..cutoff],
        None => diff,
    }
}
