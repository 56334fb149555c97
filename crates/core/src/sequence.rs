//! Reference sequences: human-readable record numbering.
//!
//! Records such as quotations carry a reference string (`QS00001`, …) assigned
//! once from a named sequence. The generator itself is a domain *service*: the
//! trait lives here, the host application decides how counters are persisted.

use std::collections::HashMap;

/// Generator of unique reference strings, keyed by a named code.
///
/// Returns `None` when no sequence is registered for `code`; callers keep
/// their placeholder reference in that case.
pub trait SequenceGenerator {
    fn next_by_code(&mut self, code: &str) -> Option<String>;
}

/// Per-code format of generated references.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SequenceFormat {
    prefix: String,
    padding: usize,
    next: u64,
}

/// In-memory sequence generator.
///
/// Deterministic and free of IO; suitable for tests and single-process
/// embedding. Counters are gapless per code: every call advances by one.
#[derive(Debug, Default)]
pub struct InMemorySequenceGenerator {
    sequences: HashMap<String, SequenceFormat>,
}

impl InMemorySequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sequence under `code` with a `prefix` and zero-`padding`
    /// width (e.g. prefix `"QS"`, padding 5 yields `QS00001`).
    pub fn register(&mut self, code: impl Into<String>, prefix: impl Into<String>, padding: usize) {
        self.sequences.insert(
            code.into(),
            SequenceFormat {
                prefix: prefix.into(),
                padding,
                next: 1,
            },
        );
    }
}

impl SequenceGenerator for InMemorySequenceGenerator {
    fn next_by_code(&mut self, code: &str) -> Option<String> {
        let seq = self.sequences.get_mut(code)?;
        let value = seq.next;
        seq.next += 1;
        Some(format!(
            "{}{:0width$}",
            seq.prefix,
            value,
            width = seq.padding
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_sequence_yields_padded_gapless_values() {
        let mut generator = InMemorySequenceGenerator::new();
        generator.register("quotation.sale", "QS", 5);

        assert_eq!(generator.next_by_code("quotation.sale").unwrap(), "QS00001");
        assert_eq!(generator.next_by_code("quotation.sale").unwrap(), "QS00002");
        assert_eq!(generator.next_by_code("quotation.sale").unwrap(), "QS00003");
    }

    #[test]
    fn unregistered_code_yields_none() {
        let mut generator = InMemorySequenceGenerator::new();
        assert_eq!(generator.next_by_code("missing.code"), None);
    }

    #[test]
    fn codes_advance_independently() {
        let mut generator = InMemorySequenceGenerator::new();
        generator.register("quotation.sale", "QS", 5);
        generator.register("invoice", "INV", 3);

        assert_eq!(generator.next_by_code("quotation.sale").unwrap(), "QS00001");
        assert_eq!(generator.next_by_code("invoice").unwrap(), "INV001");
        assert_eq!(generator.next_by_code("quotation.sale").unwrap(), "QS00002");
    }
}
