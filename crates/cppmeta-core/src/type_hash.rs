//! Deterministic identities for type spellings and template instances.
//!
//! A template instance is keyed by folding its argument hashes into the
//! template's hash. Requesting the same instantiation twice yields the same
//! key, so instances are never compared member by member.
//!
//! # Examples
//!
//! ```
//! use cppmeta_core::TypeHash;
//!
//! let list = TypeHash::from_name("QList");
//! let int = TypeHash::from_name("int");
//! let a = TypeHash::from_template_instance(list, &[int]);
//! let b = TypeHash::from_template_instance(list, &[int]);
//! assert_eq!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Seed folded into every name hash.
const NAME_SEED: u64 = 0x2fac10b63a6cc57c;

/// Multiplier between folded argument hashes.
const FOLD: u64 = 0x4bc94d6bd06053ad;

/// One marker per argument position, so `QMap<int, QString>` and
/// `QMap<QString, int>` differ.
const POSITION: [u64; 8] = [
    0x9e3779b97f4a7c15,
    0xbf58476d1ce4e5b9,
    0x94d049bb133111eb,
    0xd6e8feb86659fd93,
    0xe7037ed1a0b428db,
    0xc6a4a7935bd1e995,
    0x8648dbbc94d49b8d,
    0xa2b48b2c69e0d657,
];

/// Identity of a type spelling or of a template instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Hash of a qualified name or canonical type spelling.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(NAME_SEED ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of `template` instantiated with `args`, in order.
    pub fn from_template_instance(template: TypeHash, args: &[TypeHash]) -> Self {
        let folded = args.iter().enumerate().fold(template.0, |hash, (i, arg)| {
            let marker = POSITION[i % POSITION.len()].wrapping_add((i / POSITION.len()) as u64);
            hash.wrapping_mul(FOLD).wrapping_add(marker ^ arg.0)
        });
        TypeHash(folded)
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
