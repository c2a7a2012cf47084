//! C++ access specifiers.

use std::fmt;

/// Declared access of a class member or base class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn is_public(self) -> bool {
        self == Access::Public
    }

    pub fn is_private(self) -> bool {
        self == Access::Private
    }

    /// The more restrictive of two access levels.
    pub fn restrict(self, other: Access) -> Access {
        self.max(other)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_picks_narrower() {
        assert_eq!(Access::Public.restrict(Access::Protected), Access::Protected);
        assert_eq!(Access::Private.restrict(Access::Public), Access::Private);
    }
}
