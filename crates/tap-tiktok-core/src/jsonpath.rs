//! Fixed JSON path selectors over response bodies.
//!
//! Paths are declared as constants, e.g. `$.data.list[*]`:
//!
//! ```rust
//! use serde_json::json;
//! use tap_tiktok_core::jsonpath::{JsonPath, Segment};
//!
//! const RECORDS: JsonPath =
//!     JsonPath::new(&[Segment::Key("data"), Segment::Key("list"), Segment::Wildcard]);
//!
//! let body = json!({ "data": { "list": [{ "id": 1 }, { "id": 2 }] } });
//! assert_eq!(RECORDS.select(&body).len(), 2);
//! assert_eq!(RECORDS.to_string(), "$.data.list[*]");
//! ```

use std::fmt::{Display, Formatter};

use serde_json::Value;

/// One step of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Object member lookup.
    Key(&'static str),
    /// Every element of an array, or every value of an object.
    Wildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonPath {
    segments: &'static [Segment],
}

impl JsonPath {
    pub const fn new(segments: &'static [Segment]) -> Self {
        Self { segments }
    }

    /// All values matched by the path, in document order.
    pub fn select<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        let mut current = vec![root];
        for segment in self.segments {
            let mut next = Vec::with_capacity(current.len());
            for value in current {
                match (segment, value) {
                    (Segment::Key(key), Value::Object(map)) => {
                        if let Some(child) = map.get(*key) {
                            next.push(child);
                        }
                    }
                    (Segment::Wildcard, Value::Array(items)) => next.extend(items.iter()),
                    (Segment::Wildcard, Value::Object(map)) => next.extend(map.values()),
                    _ => {}
                }
            }
            current = next;
        }
        current
    }

    /// First match, if any.
    pub fn first<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.select(root).into_iter().next()
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("$")?;
        for segment in self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Wildcard => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}
