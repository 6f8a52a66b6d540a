//! Field paths such as `items[0].qty`.
//!
//! A path is a dotted list of keys where any key may carry one or more
//! `[n]` index suffixes. Paths address values inside the single JSON object
//! the form store owns, and they double as field names for array items.

use std::fmt;

use serde_json::{Map, Value};

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Parse a path. Malformed index suffixes are kept as part of the key.
#[must_use]
pub fn parse(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            continue;
        }
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        let mut indices = Vec::new();
        let mut malformed = false;
        while !rest.is_empty() {
            let Some(close) = rest.find(']') else {
                malformed = true;
                break;
            };
            match rest[1..close].parse::<usize>() {
                Ok(i) if rest.starts_with('[') => indices.push(i),
                _ => {
                    malformed = true;
                    break;
                }
            }
            rest = &rest[close + 1..];
        }
        if malformed {
            segments.push(PathSegment::Key(part.to_string()));
            continue;
        }
        if !key.is_empty() {
            segments.push(PathSegment::Key(key.to_string()));
        }
        segments.extend(indices.into_iter().map(PathSegment::Index));
    }
    segments
}

/// Name of item `index`'s child field inside array `array`.
#[must_use]
pub fn item_path(array: &str, index: usize, child: &str) -> String {
    format!("{array}[{index}].{child}")
}

/// Split a dotted name into `(parent, rest)`; `None` for undotted names.
#[must_use]
pub fn split_parent(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
}

/// Read the value at `path`, if every step exists.
#[must_use]
pub fn get<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    parse(path)
        .iter()
        .try_fold(root, |node, segment| match segment {
            PathSegment::Key(k) => node.as_object()?.get(k),
            PathSegment::Index(i) => node.as_array()?.get(*i),
        })
}

/// Furthest a write may land past the end of an existing array.
pub const MAX_INDEX_GAP: usize = 1024;

/// Write `value` at `path`, creating intermediate objects and arrays.
///
/// A step whose container has the wrong shape is replaced by one of the
/// right shape. Arrays are padded with `null` up to the written index.
/// Returns `false` and leaves `root` untouched when an index lies more than
/// [`MAX_INDEX_GAP`] past the end of its array.
pub fn set(root: &mut Value, path: &str, value: Value) -> bool {
    let segments = parse(path);
    if !within_reach(root, &segments) {
        return false;
    }
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return true;
    };
    let mut node = root;
    for (pos, segment) in parents.iter().enumerate() {
        let next_is_index = matches!(segments[pos + 1], PathSegment::Index(_));
        node = step_mut(node, segment, next_is_index);
    }
    *step_mut(node, last, false) = value;
    true
}

/// Mutable reference to the array at `path`, created empty when missing.
/// `None` under the same index limit as [`set`].
pub fn array_mut<'v>(root: &'v mut Value, path: &str) -> Option<&'v mut Vec<Value>> {
    let segments = parse(path);
    if !within_reach(root, &segments) {
        return None;
    }
    let mut node = root;
    for (pos, segment) in segments.iter().enumerate() {
        let next_is_index = segments
            .get(pos + 1)
            .is_some_and(|s| matches!(s, PathSegment::Index(_)));
        node = step_mut(node, segment, next_is_index);
    }
    if !node.is_array() {
        *node = Value::Array(Vec::new());
    }
    match node {
        Value::Array(items) => Some(items),
        _ => unreachable!("node was just coerced to an array"),
    }
}

/// Every index segment is at most [`MAX_INDEX_GAP`] past the end of the
/// array it would index, counting missing arrays as empty.
fn within_reach(root: &Value, segments: &[PathSegment]) -> bool {
    let mut node = Some(root);
    for segment in segments {
        node = match segment {
            PathSegment::Key(k) => node.and_then(|n| n.as_object()?.get(k)),
            PathSegment::Index(i) => {
                let len = node.and_then(Value::as_array).map_or(0, Vec::len);
                if i.saturating_sub(len) > MAX_INDEX_GAP {
                    return false;
                }
                node.and_then(|n| n.as_array()?.get(*i))
            }
        };
    }
    true
}

fn step_mut<'v>(node: &'v mut Value, segment: &PathSegment, child_is_index: bool) -> &'v mut Value {
    let empty_child = || {
        if child_is_index {
            Value::Array(Vec::new())
        } else {
            Value::Null
        }
    };
    match segment {
        PathSegment::Key(k) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                unreachable!("node was just coerced to an object")
            };
            map.entry(k.clone()).or_insert_with(empty_child)
        }
        PathSegment::Index(i) => {
            if !node.is_array() {
                *node = Value::Array(Vec::new());
            }
            let Value::Array(items) = node else {
                unreachable!("node was just coerced to an array")
            };
            if items.len() <= *i {
                items.resize(*i + 1, Value::Null);
            }
            &mut items[*i]
        }
    }
}
