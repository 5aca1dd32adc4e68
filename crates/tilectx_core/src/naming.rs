//! Name generation for cloned layers and contexts

use std::collections::HashSet;

/// Create a name for a clone of `name` that is not in `taken`
///
/// Tries `"<name> (Clone)"` first, then `"<name> (Clone #1)"`, `"<name> (Clone #2)"`, ...
pub fn clone_name<'a>(name: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();

    let candidate = format!("{name} (Clone)");
    if !taken.contains(candidate.as_str()) {
        return candidate;
    }

    (1u32..)
        .map(|n| format!("{name} (Clone #{n})"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| format!("{name} (Clone)"))
}
