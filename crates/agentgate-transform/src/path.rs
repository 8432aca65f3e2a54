//! Dot-notation extraction paths for provider response bodies.
//!
//! Supports an optional `$.` prefix, object keys, `[index]` and `[*]`
//! array access, and bare numeric segments (`choices.0.message`). A
//! wildcard takes the first element, so "first match" always means
//! document order.

use serde_json::Value;

/// Evaluate `path` against `root`, returning the first match.
///
/// A malformed or non-matching path yields `None`; path problems are never
/// fatal to the caller.
pub fn eval_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = path.trim().trim_start_matches("$.");
    if normalized.is_empty() {
        return None;
    }

    let mut current = root;
    for part in normalized.split('.') {
        if part.is_empty() {
            return None;
        }
        current = step(current, part)?;
    }
    Some(current)
}

fn step<'a>(current: &'a Value, part: &str) -> Option<&'a Value> {
    let Some(bracket) = part.find('[') else {
        return step_plain(current, part);
    };

    let key = &part[..bracket];
    let index = part[bracket + 1..].strip_suffix(']')?;

    let mut current = current;
    if !key.is_empty() {
        current = current.as_object()?.get(key)?;
    }
    step_index(current, index)
}

fn step_plain<'a>(current: &'a Value, part: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(part),
        // Bare numeric and `*` segments address arrays too.
        Value::Array(_) => step_index(current, part),
        _ => None,
    }
}

fn step_index<'a>(current: &'a Value, index: &str) -> Option<&'a Value> {
    let arr = current.as_array()?;
    if index == "*" {
        return arr.first();
    }
    arr.get(index.parse::<usize>().ok()?)
}
