//! Paths to (possibly nested) columns of a schema.

use std::fmt::{Display, Formatter};

/// A path to a column, one name per nesting level, e.g. `["user", "address", "street"]`.
///
/// List elements and map keys/values appear as the synthetic segments `element`, `key` and
/// `value`, so `tags.element` names the element of the `tags` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnName {
    path: Vec<String>,
}

impl ColumnName {
    /// Creates a new column name from the given path components.
    pub fn new<A>(iter: impl IntoIterator<Item = A>) -> Self
    where
        A: Into<String>,
    {
        Self {
            path: iter.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty path, which names the root of a schema.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new column name one level below this one.
    pub fn child(&self, name: impl Into<String>) -> ColumnName {
        let mut path = self.path.clone();
        path.push(name.into());
        Self { path }
    }
}

impl Display for ColumnName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            return write!(f, "<root>");
        }
        for (i, name) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            // names that would make the dotted form ambiguous are quoted
            if name.is_empty() || name.contains(['.', '`']) {
                write!(f, "`{}`", name.replace('`', "``"))?;
            } else {
                write!(f, "{name}")?;
            }
        }
        Ok(())
    }
}
