//! Categorized, write-once log of rejected declarations.
//!
//! Entries are keyed by (signature, source file). The first reason recorded
//! for a key wins; later records for the same key are ignored. The builder
//! never reads the log back; it is handed to the caller as plain-text
//! reports.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use cppmeta_core::{RejectCategory, RejectReason};

/// One rejected declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RejectedItem {
    pub signature: String,
    pub file: String,
    pub reason: RejectReason,
}

/// Reject logs for all four categories.
#[derive(Debug, Clone, Default)]
pub struct RejectLog {
    logs: BTreeMap<RejectCategory, BTreeMap<(String, String), RejectReason>>,
}

impl RejectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejection. Returns `false` if the key was already present.
    pub fn record(
        &mut self,
        category: RejectCategory,
        signature: impl Into<String>,
        file: impl Into<String>,
        reason: RejectReason,
    ) -> bool {
        let signature = signature.into();
        let file = file.into();
        let log = self.logs.entry(category).or_default();
        if log.contains_key(&(signature.clone(), file.clone())) {
            return false;
        }
        debug!(?category, %signature, %reason, "rejected");
        log.insert((signature, file), reason);
        true
    }

    /// Items of one category, sorted by signature then file.
    pub fn items(&self, category: RejectCategory) -> Vec<RejectedItem> {
        self.logs
            .get(&category)
            .into_iter()
            .flatten()
            .map(|((signature, file), reason)| RejectedItem {
                signature: signature.clone(),
                file: file.clone(),
                reason: *reason,
            })
            .collect()
    }

    /// Reason recorded for a signature in a category, any file.
    pub fn reason_for(&self, category: RejectCategory, signature: &str) -> Option<RejectReason> {
        self.logs
            .get(&category)?
            .iter()
            .find(|((sig, _), _)| sig == signature)
            .map(|(_, reason)| *reason)
    }

    pub fn len(&self) -> usize {
        self.logs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write one category as a plain-text report grouped by reason.
    pub fn write_report(&self, category: RejectCategory, out: &mut impl Write) -> io::Result<()> {
        let items = self.items(category);
        for reason in RejectReason::ALL {
            let mut group: Vec<&RejectedItem> = items.iter().filter(|i| i.reason == reason).collect();
            if group.is_empty() {
                continue;
            }
            group.sort();
            writeln!(out, "*** {reason}")?;
            for item in group {
                if item.file.is_empty() {
                    writeln!(out, "  - {}", item.signature)?;
                } else {
                    writeln!(out, "  - {} ({})", item.signature, item.file)?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Write every category to its report file inside `dir`.
    pub fn write_reports(&self, dir: &Path) -> io::Result<()> {
        for category in RejectCategory::ALL {
            let file = File::create(dir.join(category.report_name()))?;
            let mut out = BufWriter::new(file);
            self.write_report(category, &mut out)?;
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reason_wins() {
        let mut log = RejectLog::new();
        assert!(log.record(RejectCategory::Function, "A::f()", "a.h", RejectReason::IsPrivate));
        assert!(!log.record(
            RejectCategory::Function,
            "A::f()",
            "a.h",
            RejectReason::UnmatchedReturnType
        ));
        assert_eq!(
            log.reason_for(RejectCategory::Function, "A::f()"),
            Some(RejectReason::IsPrivate)
        );
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn same_signature_in_other_file_is_separate() {
        let mut log = RejectLog::new();
        log.record(RejectCategory::Class, "Foo", "a.h", RejectReason::NotInTypeSystem);
        log.record(RejectCategory::Class, "Foo", "b.h", RejectReason::NotInTypeSystem);
        assert_eq!(log.items(RejectCategory::Class).len(), 2);
    }

    #[test]
    fn report_groups_by_reason() {
        let mut log = RejectLog::new();
        log.record(RejectCategory::Field, "B::y", "", RejectReason::IsPrivate);
        log.record(RejectCategory::Field, "A::x", "a.h", RejectReason::IsPrivate);
        log.record(RejectCategory::Field, "C::z", "", RejectReason::UnmatchedReturnType);

        let mut out = Vec::new();
        log.write_report(RejectCategory::Field, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "*** Private\n  - A::x (a.h)\n  - B::y\n\n*** Unmatched return type\n  - C::z\n\n"
        );
    }

    #[test]
    fn empty_category_writes_nothing() {
        let log = RejectLog::new();
        let mut out = Vec::new();
        log.write_report(RejectCategory::Enum, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
