//! Name collation for the A-Z and Z-A sorts.
//!
//! Names compare on a primary key that ignores accents and case, so
//! `Évernote` files under E. Names equal on that key compare
//! case-insensitively with accents kept, then on their raw text with
//! lowercase ahead of uppercase. The order is total: two names compare
//! `Equal` only when they are identical.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compares two names in dictionary order.
///
/// ```
/// use std::cmp::Ordering;
/// use tooldir_query::collate::compare_names;
///
/// assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
/// assert_eq!(compare_names("Évernote", "Zotero"), Ordering::Less);
/// assert_eq!(compare_names("obsidian", "Obsidian"), Ordering::Less);
/// ```
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary(a)
        .cmp(primary(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

/// Base letters only: decomposed, combining marks dropped, lowercased.
fn primary(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}
