//! Variables and scopes.
//!
//! # Variables
//!
//! Bound variables are nameless in the [core language][crate::core]. Each
//! occurrence is a [de Bruijn index][Index], counting the binders between the
//! occurrence and the binder that introduced it. Names are only kept on the
//! binders themselves, for rendering.
//!
//! # Scopes
//!
//! While parsing, names are resolved to indices against a [`Scope`]. Scopes are
//! persistent: pushing a name returns a new scope and leaves the original
//! untouched, so sibling alternatives of the grammar can never observe each
//! other's bindings.

use std::fmt;

/// Underlying variable representation.
type RawVar = u32;

/// A [de Bruijn index], which represents a variable counting the number of
/// binders between a variable occurrence and the binder that introduced the
/// variable.
///
/// For example:
///
/// | Representation    | Example (K combinator) |
/// | ----------------- | ---------------------- |
/// | Named             | `(x) => (y) => x`      |
/// | de Bruijn indices | `(_) => (_) => 1`      |
///
/// [de Bruijn index]: https://en.wikipedia.org/wiki/De_Bruijn_index
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(RawVar);

impl Index {
    pub const fn new(raw: u32) -> Index {
        Index(raw)
    }

    /// The last variable to be bound in the environment.
    pub const fn last() -> Index {
        Index(0)
    }

    /// Returns the previously bound variable, relative to this one.
    pub const fn prev(self) -> Index {
        Index(self.0.saturating_add(1))
    }

    /// Offset the index by `delta`, saturating at the bounds of the raw
    /// representation.
    pub const fn shift(self, delta: i32) -> Index {
        Index(self.0.saturating_add_signed(delta))
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index(")?;
        self.0.fmt(f)?;
        write!(f, ")")
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An iterator over indices, listed from the most recently bound.
pub fn indices() -> impl Iterator<Item = Index> {
    (0..).map(Index)
}

/// An ordered stack of bound names, innermost last.
#[derive(Clone)]
pub struct Scope {
    names: rpds::Vector<String>,
}

impl Scope {
    /// Construct a new, empty scope.
    pub fn new() -> Scope {
        Scope {
            names: rpds::Vector::new(),
        }
    }

    /// The number of names bound in the scope.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bind `name` as the new innermost entry, returning the extended scope.
    pub fn push(&self, name: impl Into<String>) -> Scope {
        Scope {
            names: self.names.push_back(name.into()),
        }
    }

    /// Resolve `name` to its distance from the innermost entry. The innermost
    /// binding wins when a name is shadowed.
    pub fn lookup(&self, name: &str) -> Option<Index> {
        self.names
            .iter()
            .rev()
            .zip(indices())
            .find_map(|(entry, index)| (entry == name).then_some(index))
    }

    /// The name bound at `index`, if the scope is deep enough.
    pub fn name(&self, index: Index) -> Option<&str> {
        let level = self.names.len().checked_sub(index.0 as usize + 1)?;
        self.names.get(level).map(String::as_str)
    }
}

impl Default for Scope {
    fn default() -> Scope {
        Scope::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_counts_from_innermost() {
        let scope = Scope::new().push("x").push("y");

        assert_eq!(scope.lookup("y"), Some(Index::new(0)));
        assert_eq!(scope.lookup("x"), Some(Index::new(1)));
        assert_eq!(scope.lookup("z"), None);
    }

    #[test]
    fn lookup_prefers_shadowing_binder() {
        let scope = Scope::new().push("x").push("y").push("x");

        assert_eq!(scope.lookup("x"), Some(Index::last()));
        assert_eq!(scope.lookup("y"), Some(Index::last().prev()));
    }

    #[test]
    fn push_leaves_original_untouched() {
        let outer = Scope::new().push("a");
        let left = outer.push("b");
        let right = outer.push("c");

        assert_eq!(outer.len(), 1);
        assert_eq!(left.lookup("c"), None);
        assert_eq!(right.lookup("b"), None);
        assert_eq!(right.lookup("a"), Some(Index::new(1)));
    }

    #[test]
    fn name_is_inverse_of_lookup() {
        let scope = Scope::new().push("x").push("y");

        assert_eq!(scope.name(Index::new(0)), Some("y"));
        assert_eq!(scope.name(Index::new(1)), Some("x"));
        assert_eq!(scope.name(Index::new(2)), None);
    }

    #[test]
    fn shift_saturates() {
        assert_eq!(Index::new(3).shift(2), Index::new(5));
        assert_eq!(Index::new(1).shift(-3), Index::new(0));
        assert_eq!(Index::new(u32::MAX).shift(1), Index::new(u32::MAX));
    }
}
