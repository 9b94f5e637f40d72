use std::fmt::Display;

/// A reference to a declared union or record within a [`Typespace`](crate::Typespace).
///
/// Using this in a different `Typespace` than its maker
/// will most likely resolve to the wrong type or to nothing at all.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TypeRef(
    /// The index into the specific `Typespace`'s list of types.
    pub u32,
);

impl TypeRef {
    /// Returns the index into the specific `Typespace`'s list of types.
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // For example: `&42`.
        write!(f, "&{}", self.0)
    }
}
