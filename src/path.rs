//! Path string helpers shared by the encoder and the decoder.
//!
//! Archive paths are plain UTF-8 strings joined with `/`.  Nothing here
//! touches the filesystem.

/// Separator used for every path written into an archive.
pub const SEPARATOR: char = '/';

/// Collapse every run of two or more `/` into a single `/`.
pub fn dedup_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        let is_sep = c == SEPARATOR;
        if !(is_sep && prev_sep) {
            out.push(c);
        }
        prev_sep = is_sep;
    }
    out
}

/// Rewrite the first `root_len` bytes of `stored` to `new_root`.
///
/// The result is `new_root + "/" + stored[root_len..]` with duplicate
/// slashes collapsed.  An empty `new_root` means "extract where it was
/// packed" and returns `stored` untouched.  A trailing separator left over
/// when the remainder is empty is dropped, so the archived root maps onto
/// `new_root` itself.
///
/// Returns `None` if `stored` is shorter than `root_len` or the split would
/// land inside a multi-byte character.
pub fn substitute_root(stored: &str, root_len: usize, new_root: &str) -> Option<String> {
    if new_root.is_empty() {
        return Some(stored.to_owned());
    }
    let rest = stored.get(root_len..)?;

    let mut joined = String::with_capacity(new_root.len() + 1 + rest.len());
    joined.push_str(new_root);
    joined.push(SEPARATOR);
    joined.push_str(rest);

    let mut out = dedup_slashes(&joined);
    if out.len() > 1 && out.ends_with(SEPARATOR) {
        out.pop();
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dedup_collapses_every_run() {
        assert_eq!(dedup_slashes("a//b///c"), "a/b/c");
        assert_eq!(dedup_slashes("//abs////x/"), "/abs/x/");
        assert_eq!(dedup_slashes("plain"), "plain");
        assert_eq!(dedup_slashes(""), "");
    }

    #[test]
    fn substitute_replaces_root() {
        let stored = "A/x/y.txt";
        assert_eq!(substitute_root(stored, "A".len(), "B").as_deref(), Some("B/x/y.txt"));
    }

    #[test]
    fn substitute_handles_trailing_slash_on_either_side() {
        assert_eq!(substitute_root("docs/a.txt", "docs/".len(), "out/").as_deref(), Some("out/a.txt"));
        assert_eq!(substitute_root("docs/a.txt", "docs".len(), "out/").as_deref(), Some("out/a.txt"));
    }

    #[test]
    fn substitute_maps_root_entry_onto_new_root() {
        assert_eq!(substitute_root("docs", 4, "out").as_deref(), Some("out"));
        assert_eq!(substitute_root("report.txt", 10, "copy.txt").as_deref(), Some("copy.txt"));
        assert_eq!(substitute_root("docs", 4, "/").as_deref(), Some("/"));
    }

    #[test]
    fn empty_new_root_keeps_stored_path() {
        assert_eq!(substitute_root("docs//a.txt", 4, "").as_deref(), Some("docs//a.txt"));
    }

    #[test]
    fn substitute_rejects_short_or_split_paths() {
        assert_eq!(substitute_root("ab", 3, "x"), None);
        // 'é' is two bytes; offset 1 is inside it.
        assert_eq!(substitute_root("é/a", 1, "x"), None);
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent(s in "[a-c/]{0,32}") {
            let once = dedup_slashes(&s);
            prop_assert_eq!(dedup_slashes(&once), once.clone());
            prop_assert!(!once.contains("//"));
        }

        #[test]
        fn dedup_only_removes_separators(s in "[a-c/]{0,32}") {
            let out = dedup_slashes(&s);
            let strip = |p: &str| p.chars().filter(|c| *c != SEPARATOR).collect::<String>();
            prop_assert_eq!(strip(&out), strip(&s));
        }

        #[test]
        fn substitute_keeps_relative_tail(
            root in "[a-z]{1,8}",
            tail in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            new_root in "[a-z]{1,8}",
        ) {
            let stored = format!("{root}/{tail}");
            let out = substitute_root(&stored, root.len(), &new_root).unwrap();
            prop_assert_eq!(out, format!("{new_root}/{tail}"));
        }
    }
}
