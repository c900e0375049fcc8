//! Unified diff parsing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Maps each file in a unified diff to the new-side lines it adds.
///
/// Context lines are not included. A file whose hunks only delete lines
/// appears with an empty set; deleted files do not appear.
#[must_use]
pub fn parse_unified_diff(diff: &str) -> BTreeMap<PathBuf, BTreeSet<usize>> {
    let mut files: BTreeMap<PathBuf, BTreeSet<usize>> = BTreeMap::new();
    let mut current: Option<PathBuf> = None;
    let mut hunk: Option<Hunk> = None;

    for line in diff.lines() {
        if let Some(h) = hunk.as_mut() {
            if let Some(file) = current.as_ref() {
                match line.as_bytes().first() {
                    Some(b'+') => {
                        files.entry(file.clone()).or_default().insert(h.new_line);
                        h.new_line += 1;
                        h.new_left = h.new_left.saturating_sub(1);
                    }
                    Some(b' ') => {
                        h.new_line += 1;
                        h.new_left = h.new_left.saturating_sub(1);
                        h.old_left = h.old_left.saturating_sub(1);
                    }
                    Some(b'-') => h.old_left = h.old_left.saturating_sub(1),
                    // "\ No newline at end of file"
                    Some(b'\\') => {}
                    _ => hunk = None,
                }
                if hunk.as_ref().is_some_and(|h| h.new_left == 0 && h.old_left == 0) {
                    hunk = None;
                }
                continue;
            }
        }

        if let Some(path) = line.strip_prefix("+++ ") {
            let path = path.trim_end();
            current = if path == "/dev/null" {
                None
            } else {
                let path = path.strip_prefix("b/").unwrap_or(path);
                files.entry(PathBuf::from(path)).or_default();
                Some(PathBuf::from(path))
            };
        } else if line.starts_with("@@") {
            hunk = parse_hunk_header(line).filter(|h| h.new_left > 0 || h.old_left > 0);
        }
    }
    files
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hunk {
    new_line: usize,
    new_left: usize,
    old_left: usize,
}

/// Parses `@@ -old_start,old_count +new_start,new_count @@`.
fn parse_hunk_header(header: &str) -> Option<Hunk> {
    let mut parts = header.split_whitespace().skip(1);
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    let (_, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;
    Some(Hunk {
        new_line: new_start,
        new_left: new_count,
        old_left: old_count,
    })
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    let mut it = range.splitn(2, ',');
    let start = it.next()?.parse().ok()?;
    let count = match it.next() {
        Some(c) => c.parse().ok()?,
        None => 1,
    };
    Some((start, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[usize]) -> BTreeSet<usize> {
        v.iter().copied().collect()
    }

    #[test]
    fn test_parse_hunk_header() {
        assert_eq!(
            parse_hunk_header("@@ -1,5 +1,10 @@"),
            Some(Hunk {
                new_line: 1,
                new_left: 10,
                old_left: 5
            })
        );
        assert_eq!(parse_hunk_header("@@ -10 +15,3 @@ fn").unwrap().new_line, 15);
        assert_eq!(parse_hunk_header("@@ -0,0 +1 @@").unwrap().new_left, 1);
        assert_eq!(parse_hunk_header("@@ garbage"), None);
    }

    #[test]
    fn zero_context_diff() {
        let diff = "\
--- a/a.cpp
+++ b/a.cpp
@@ -2 +2 @@
-old
+new
@@ -9,0 +10,2 @@
+x
+y
";
        let files = parse_unified_diff(diff);
        assert_eq!(files[&PathBuf::from("a.cpp")], lines(&[2, 10, 11]));
    }

    #[test]
    fn context_lines_are_excluded() {
        let diff = "\
+++ b/a.cpp
@@ -1,3 +1,4 @@
 keep
+added
 keep
 keep
";
        let files = parse_unified_diff(diff);
        assert_eq!(files[&PathBuf::from("a.cpp")], lines(&[2]));
    }

    #[test]
    fn added_line_looking_like_header_stays_in_hunk() {
        let diff = "\
+++ b/a.cpp
@@ -0,0 +1,2 @@
+++counter;
+x;
";
        let files = parse_unified_diff(diff);
        assert_eq!(files.len(), 1);
        assert_eq!(files[&PathBuf::from("a.cpp")], lines(&[1, 2]));
    }

    #[test]
    fn deletion_only_file_has_no_lines() {
        let diff = "\
+++ b/a.cpp
@@ -4,2 +3,0 @@
-gone
-gone
";
        let files = parse_unified_diff(diff);
        assert!(files[&PathBuf::from("a.cpp")].is_empty());
    }
}
