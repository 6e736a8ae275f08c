use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute map shared by nodes and marks.
///
/// Ordered so that serialization and debug output are stable.
pub type Attrs = BTreeMap<String, Value>;

/// An inline annotation attached to a text leaf: emphasis, a link, a diff
/// marker, and so on.
///
/// Two marks are equal when their type names and attribute maps are equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    /// Build a mark without consulting a schema.
    ///
    /// Prefer [`Schema::mark`](crate::Schema::mark), which rejects unknown
    /// mark types and fills default attributes.
    pub fn new(mark_type: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs,
        }
    }

    /// Returns `true` if this mark has the given type name.
    pub fn is(&self, mark_type: &str) -> bool {
        self.mark_type == mark_type
    }

    /// Look up a single attribute.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attrs.is_empty() {
            return write!(f, "{}", self.mark_type);
        }
        write!(f, "{}(", self.mark_type)?;
        for (i, (k, v)) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}
