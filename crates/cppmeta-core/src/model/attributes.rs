//! Attribute bitsets for metamodel records.

use bitflags::bitflags;

use crate::Access;

bitflags! {
    /// Class-level attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassAttributes: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const FINAL = 1 << 3;
        const ABSTRACT = 1 << 4;
        const STATIC = 1 << 5;
        /// Synthesized class with no C++ counterpart (namespace, global).
        const FAKE = 1 << 6;
        const DEPRECATED = 1 << 7;
        /// Generic template kept in the template registry.
        const TEMPLATE = 1 << 8;
        /// Concrete class built from a template.
        const TEMPLATE_INSTANTIATION = 1 << 9;
        /// Members were flattened in from a template base.
        const HAS_HIDDEN_BASE = 1 << 10;
        /// Declared with `Q_OBJECT`.
        const QOBJECT = 1 << 11;
        /// Iterator class synthesized for a concrete container.
        const SYNTHESIZED_ITERATOR = 1 << 12;
    }
}

bitflags! {
    /// Function-level attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionAttributes: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const VIRTUAL = 1 << 3;
        const STATIC = 1 << 4;
        const CONST = 1 << 5;
        const FINAL = 1 << 6;
        const ABSTRACT = 1 << 7;
        const OVERRIDE = 1 << 8;
        const DEPRECATED = 1 << 9;
        const EXPLICIT = 1 << 10;
        const DELETED = 1 << 11;
        const NOEXCEPT = 1 << 12;
        /// A type failed to translate; kept for diagnostics only.
        const INVALID = 1 << 13;
        const CONVERSION_OPERATOR = 1 << 14;
        const PROPERTY_READER = 1 << 15;
        const PROPERTY_WRITER = 1 << 16;
        const PROPERTY_RESETTER = 1 << 17;
        const PROPERTY_NOTIFY = 1 << 18;
        /// Demoted because a synthesized capability subsumes it.
        const HIDDEN = 1 << 19;
        /// Cloned from a template base class.
        const INHERITED_FROM_TEMPLATE = 1 << 20;
        /// Produced by function template instantiation.
        const TEMPLATE_INSTANTIATION = 1 << 21;
        /// Copy-constructor shaped.
        const COPY_CONSTRUCTOR = 1 << 22;
        /// Removed by a type-system modification.
        const REMOVED = 1 << 23;
    }
}

bitflags! {
    /// Field-level attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldAttributes: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const CONST = 1 << 4;
        const MUTABLE = 1 << 5;
        const INHERITED_FROM_TEMPLATE = 1 << 6;
    }
}

macro_rules! access_flags {
    ($ty:ident) => {
        impl $ty {
            /// Flags for an access level.
            pub fn from_access(access: Access) -> Self {
                match access {
                    Access::Public => Self::PUBLIC,
                    Access::Protected => Self::PROTECTED,
                    Access::Private => Self::PRIVATE,
                }
            }

            /// Access level encoded in these flags, public when none is set.
            pub fn access(self) -> Access {
                if self.contains(Self::PRIVATE) {
                    Access::Private
                } else if self.contains(Self::PROTECTED) {
                    Access::Protected
                } else {
                    Access::Public
                }
            }

            /// Replace the access bits.
            pub fn set_access(&mut self, access: Access) {
                self.remove(Self::PUBLIC | Self::PROTECTED | Self::PRIVATE);
                self.insert(Self::from_access(access));
            }
        }
    };
}

access_flags!(ClassAttributes);
access_flags!(FunctionAttributes);
access_flags!(FieldAttributes);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_round_trip() {
        let mut attrs = FunctionAttributes::from_access(Access::Public) | FunctionAttributes::CONST;
        assert_eq!(attrs.access(), Access::Public);
        attrs.set_access(Access::Private);
        assert_eq!(attrs.access(), Access::Private);
        assert!(attrs.contains(FunctionAttributes::CONST));
        assert!(!attrs.contains(FunctionAttributes::PUBLIC));
    }

    #[test]
    fn empty_is_public() {
        assert_eq!(FieldAttributes::empty().access(), Access::Public);
    }
}
