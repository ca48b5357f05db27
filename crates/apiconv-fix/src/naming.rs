//! Convention name heuristics
//!
//! Pure functions deriving a generic convention identifier from a concrete
//! one by looking for a lower→upper case boundary. Classification uses
//! `char::is_uppercase`/`char::is_lowercase`, so non-ASCII identifiers work;
//! indices are character indices, never byte offsets.

/// True when a lower→upper case transition starts at `chars[i]`
#[inline]
fn is_boundary(chars: &[char], i: usize) -> bool {
    chars[i].is_uppercase() && chars[i - 1].is_lowercase()
}

/// Leading segment of an operation name
///
/// `PostItem` → `Post`. Names shorter than two characters, or without a
/// boundary, are returned unchanged.
#[must_use]
pub fn convention_operation_name(name: &str) -> String {
    first_boundary(name).map_or_else(|| name.to_string(), |i| name.chars().take(i).collect())
}

/// Trailing segment of a parameter name, in parameter casing
///
/// `userName` → `name`. The suffix starts at the rightmost boundary and its
/// first character is lower-cased. Same fallback as
/// [`convention_operation_name`].
#[must_use]
pub fn convention_parameter_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < 2 {
        return name.to_string();
    }

    match (1..chars.len()).rev().find(|&i| is_boundary(&chars, i)) {
        Some(i) => {
            let mut suffix: String = chars[i].to_lowercase().collect();
            suffix.extend(&chars[i + 1..]);
            suffix
        }
        None => name.to_string(),
    }
}

/// Position of the first boundary, as a character index
#[must_use]
pub fn first_boundary(name: &str) -> Option<usize> {
    let chars: Vec<char> = name.chars().collect();
    (1..chars.len()).find(|&i| is_boundary(&chars, i))
}

/// Character positions of every boundary, left to right
#[must_use]
pub fn boundaries(name: &str) -> Vec<usize> {
    let chars: Vec<char> = name.chars().collect();
    (1..chars.len()).filter(|&i| is_boundary(&chars, i)).collect()
}
