//! Rejection vocabulary shared by the database and the reject log.

use std::fmt;

/// Why a declaration was left out of the metamodel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectReason {
    /// No type entry exists for it.
    NotInTypeSystem,
    IsPrivate,
    /// Free function the database does not accept.
    IsGlobal,
    /// Explicitly rejected or generation disabled.
    GenerationDisabled,
    /// Mapped to an entry that is not a class.
    RedefinedToNotClass,
    UnmatchedReturnType,
    UnmatchedArgumentType,
}

impl RejectReason {
    pub const ALL: [RejectReason; 7] = [
        RejectReason::NotInTypeSystem,
        RejectReason::IsPrivate,
        RejectReason::IsGlobal,
        RejectReason::GenerationDisabled,
        RejectReason::RedefinedToNotClass,
        RejectReason::UnmatchedReturnType,
        RejectReason::UnmatchedArgumentType,
    ];

    /// Report heading.
    pub const fn description(self) -> &'static str {
        match self {
            RejectReason::NotInTypeSystem => "Not in type system",
            RejectReason::IsPrivate => "Private",
            RejectReason::IsGlobal => "Global",
            RejectReason::GenerationDisabled => "Generation disabled",
            RejectReason::RedefinedToNotClass => "Type redefined to not be a class",
            RejectReason::UnmatchedReturnType => "Unmatched return type",
            RejectReason::UnmatchedArgumentType => "Unmatched argument type",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Which log a rejection is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectCategory {
    Class,
    Function,
    Field,
    Enum,
}

impl RejectCategory {
    pub const ALL: [RejectCategory; 4] = [
        RejectCategory::Class,
        RejectCategory::Function,
        RejectCategory::Field,
        RejectCategory::Enum,
    ];

    /// Default report file name.
    pub const fn report_name(self) -> &'static str {
        match self {
            RejectCategory::Class => "mjb_rejected_classes.log",
            RejectCategory::Function => "mjb_rejected_functions.log",
            RejectCategory::Field => "mjb_rejected_fields.log",
            RejectCategory::Enum => "mjb_rejected_enums.log",
        }
    }
}
