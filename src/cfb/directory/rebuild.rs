//! Normalizes the directory model after a mutation: drops stray unknown
//! slots, injects missing parent storages, sorts by the CFB name-comparison
//! rule, then reassigns the red-black tree links.
//!
//! The tree this produces is a degenerate right-spine, not a balanced
//! red-black tree — that is deliberate: the reference compound files this
//! crate targets depend on this exact link pattern for byte-identical
//! output, and real-world readers tolerate it even though it violates the
//! red-black invariants on paper.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::entry::{Color, Entry, Kind, NOSTREAM};

/// `dirname("/foo/bar") == "/foo/"`: the parent storage path of `path`,
/// stripping repeated trailing slashes first.
pub(crate) fn dirname(path: &str) -> String {
    if path.ends_with('/') {
        let stripped = &path[..path.len() - 1];
        if stripped.contains('/') {
            dirname(stripped)
        } else {
            path.to_string()
        }
    } else {
        match path.rfind('/') {
            Some(idx) => path[..=idx].to_string(),
            None => path.to_string(),
        }
    }
}

/// `filename("/foo/bar/baz///") == "baz"`: the last path segment, ignoring
/// any trailing slashes.
pub(crate) fn filename(path: &str) -> String {
    let mut stripped = path;
    while stripped.ends_with('/') {
        stripped = &stripped[..stripped.len() - 1];
    }
    match stripped.rfind('/') {
        Some(idx) => stripped[idx + 1..].to_string(),
        None => stripped.to_string(),
    }
}

/// The CFB red-black-tree key: segment-length-then-lexicographic, shorter
/// path wins ties.
pub(crate) fn namecmp(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let a_segs: Vec<&str> = a.split('/').collect();
    let b_segs: Vec<&str> = b.split('/').collect();

    for (sa, sb) in a_segs.iter().zip(b_segs.iter()) {
        match sa.len().cmp(&sb.len()) {
            Ordering::Equal => {}
            other => return other,
        }
        match sa.cmp(sb) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    a_segs.len().cmp(&b_segs.len())
}

fn needs_gc(entries: &[Entry]) -> bool {
    let mut seen_typed = false;
    for entry in entries.iter().rev() {
        if entry.kind == Kind::Unknown {
            if seen_typed {
                return true;
            }
        } else {
            seen_typed = true;
            if entry.left != NOSTREAM && entry.left == entry.right {
                return true;
            }
            let bad_link = |v: i32| v != NOSTREAM && (v < 0 || v as usize >= entries.len());
            if bad_link(entry.left) || bad_link(entry.right) || bad_link(entry.child) {
                return true;
            }
        }
    }
    false
}

/// Re-derives the directory model in place. `add` always forces a rebuild;
/// a plain `write()` only rebuilds when the cheap structural scan finds
/// something wrong.
pub(crate) fn rebuild(entries: &mut Vec<Entry>, full_paths: &mut Vec<String>, force: bool) {
    if !force && !needs_gc(entries) {
        return;
    }

    let root = entries[0].clone();
    // Root is never re-sorted among its descendants.
    let mut pairs: Vec<(String, Entry)> = entries
        .iter()
        .cloned()
        .zip(full_paths.iter().cloned())
        .skip(1)
        .filter(|(entry, _)| entry.kind != Kind::Unknown)
        .map(|(entry, path)| (path, entry))
        .collect();

    let mut known_paths: HashSet<String> = pairs.iter().map(|(path, _)| path.clone()).collect();
    let default_ct = NaiveDate::from_ymd_opt(1987, 1, 19).unwrap().and_hms_opt(0, 0, 0).unwrap();

    let mut frontier: Vec<String> = pairs.iter().map(|(path, _)| path.clone()).collect();
    while let Some(path) = frontier.pop() {
        let parent = dirname(&path);
        if parent == "/" || known_paths.contains(&parent) {
            continue;
        }
        known_paths.insert(parent.clone());
        let storage = Entry::new_storage(&filename(&parent), Some(default_ct));
        pairs.push((parent.clone(), storage));
        frontier.push(parent);
    }

    pairs.sort_by(|(a, _), (b, _)| namecmp(a, b));

    for (_, entry) in pairs.iter_mut() {
        entry.left = NOSTREAM;
        entry.right = NOSTREAM;
        entry.child = NOSTREAM;
        entry.color = Color::Black;
        entry.size = entry.content.as_ref().map(|c| c.len() as u64).unwrap_or(0);
        entry.start = 0;
    }

    let n = pairs.len();
    let mut new_root = root;
    new_root.child = if n > 1 { 1 } else { NOSTREAM };
    new_root.size = 0;
    new_root.start = NOSTREAM;

    entries.clear();
    full_paths.clear();
    entries.push(new_root);
    full_paths.push("Root Entry/".to_string());
    for (path, entry) in pairs {
        entries.push(entry);
        full_paths.push(path);
    }

    for i in 1..entries.len() {
        if entries[i].is_storage() {
            let path_i = full_paths[i].clone();
            let mut child = NOSTREAM;
            for j in (i + 1)..entries.len() {
                if dirname(&full_paths[j]) == path_i {
                    child = j as i32;
                    break;
                }
            }
            entries[i].child = child;

            let parent_i = dirname(&path_i);
            let mut right = NOSTREAM;
            for j in (i + 1)..entries.len() {
                if dirname(&full_paths[j]) == parent_i {
                    right = j as i32;
                    break;
                }
            }
            entries[i].right = right;
        } else if i + 1 < entries.len() && dirname(&full_paths[i]) == dirname(&full_paths[i + 1]) {
            entries[i].right = (i + 1) as i32;
        }
    }
}
