//! The recursive value type shared by every stage of the pipeline.
//!
//! A [`Tree`] is what [`crate::loader::SourceLoader`] produces, what
//! [`crate::merge::TreeMerger`] combines, and what
//! [`crate::placeholder::PlaceholderResolver`] rewrites in place. It is a
//! type alias over [`serde_json::Value`] rather than a bespoke enum: every
//! structured format this crate reads (JSON, YAML, INI) already has a
//! faithful mapping onto JSON's data model, and representing it that way
//! means the merger, resolver, and schema adapter all get `serde`'s
//! ecosystem (path-aware deserialization, `json!`-style test fixtures) for
//! free instead of a parallel one.

/// The recursive sum of scalars, arrays, and ordered mappings used
/// internally between loading, merging, and validation.
///
/// `Tree::Object` preserves insertion order (the `serde_json` crate is
/// built with the `preserve_order` feature), which is required for the
/// merger's documented "base-first, then new keys from `next`" key
/// ordering.
pub type Tree = serde_json::Value;

/// Returns `true` if `value` is a "plain object": a JSON object, as opposed
/// to an array, `null`, or a scalar.
///
/// The spec's data model explicitly distinguishes these three scalar
/// shapes from arrays and objects; this predicate is the one place that
/// distinction is made so every caller (loader, merger, composer) agrees
/// on it.
#[must_use]
pub fn is_plain_object(value: &Tree) -> bool {
    value.is_object()
}

/// Clones `value`, or produces an empty object if `value` is `None`.
#[must_use]
pub fn clone_or_empty_object(value: Option<&Tree>) -> Tree {
    value.cloned().unwrap_or_else(|| Tree::Object(serde_json::Map::new()))
}
