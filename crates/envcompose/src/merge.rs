//! Deep-merges two [`Tree`]s: objects recurse key-wise, arrays and scalars
//! are replaced wholesale by the later value. Always returns a fresh tree;
//! neither input is mutated or aliased.

use serde_json::{Map, Value};

use crate::tree::Tree;

/// Merges `next` onto `base`.
///
/// - Absent `next` (`None`) clones `base`.
/// - Two arrays: `next` wins outright (arrays replace, never concatenate).
/// - Two plain objects: recursive key-wise merge, `base`-first ordering
///   with `next`'s new keys appended in `next`'s order.
/// - Anything else: `next` wins outright.
#[must_use]
pub fn merge(base: &Tree, next: Option<&Tree>) -> Tree {
    let Some(next) = next else {
        return base.clone();
    };

    match (base, next) {
        (Value::Object(base_map), Value::Object(next_map)) => Value::Object(merge_objects(base_map, next_map)),
        (Value::Array(_), Value::Array(_)) => next.clone(),
        _ => next.clone(),
    }
}

fn merge_objects(base: &Map<String, Value>, next: &Map<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();

    for (key, base_value) in base {
        let merged = match next.get(key) {
            Some(next_value) => merge(base_value, Some(next_value)),
            None => base_value.clone(),
        };
        result.insert(key.clone(), merged);
    }

    for (key, next_value) in next {
        if !result.contains_key(key) {
            result.insert(key.clone(), next_value.clone());
        }
    }

    result
}

/// Folds an ordered sequence of trees left-to-right: `fold([a, b, c]) =
/// merge(merge(a, b), c)`.
#[must_use]
pub fn merge_all(trees: &[Tree]) -> Tree {
    let mut iter = trees.iter();
    let Some(first) = iter.next() else {
        return Value::Object(Map::new());
    };
    let mut acc = first.clone();
    for tree in iter {
        acc = merge(&acc, Some(tree));
    }
    acc
}
