//! Path helpers.
//!
//! Paths are `/`-separated. Empty segments are dropped, and `.` / `..` are
//! ordinary names: no normalization happens anywhere in the tree.

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join `input` onto `cwd` unless it is already absolute.
pub fn join(cwd: &str, input: &str) -> String {
    if input.starts_with('/') {
        input.to_string()
    } else if cwd.ends_with('/') {
        format!("{cwd}{input}")
    } else {
        format!("{cwd}/{input}")
    }
}

/// The canonical spelling of a path: leading `/`, single separators, no
/// trailing `/` (except for the root).
pub fn canonical(path: &str) -> String {
    let segs = segments(path);
    if segs.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segs.join("/"))
    }
}

/// Split a path into its parent segments and final name.
///
/// Returns `None` for paths with no segments (the root).
pub fn split_parent(path: &str) -> Option<(Vec<&str>, &str)> {
    let mut segs = segments(path);
    let name = segs.pop()?;
    Some((segs, name))
}
