//! Comparator

use tracing::debug;

use super::reader::{ReadOutcome, canonicalize};
use super::writer::coerce;
use crate::Result;
use crate::value::{CanonicalValue, DeclaredValue, ValueKind};

/// Canonical form of a declared value.
///
/// Defined as the canonicalization of what the Writer would store, which
/// makes write-then-read agree with this by construction.
pub fn canonical_declared(kind: ValueKind, declared: &DeclaredValue) -> Result<CanonicalValue> {
    Ok(canonicalize(&coerce(kind, declared)?))
}

/// Whether the current value satisfies the declaration.
///
/// Absent values and declarations that cannot be coerced are never
/// compliant; otherwise kind and canonical data must match exactly.
pub fn is_compliant(current: &ReadOutcome, kind: ValueKind, declared: &DeclaredValue) -> bool {
    let ReadOutcome::Present(current) = current else {
        return false;
    };
    match canonical_declared(kind, declared) {
        Ok(expected) => *current == expected,
        Err(e) => {
            debug!(error = %e, "Declared value cannot be canonicalized");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(value: CanonicalValue) -> ReadOutcome {
        ReadOutcome::Present(value)
    }

    #[test]
    fn absent_is_never_compliant() {
        assert!(!is_compliant(&ReadOutcome::Absent, ValueKind::String, &"".into()));
    }

    #[test]
    fn numeric_compares_as_logical_integer() {
        let current = present(CanonicalValue::integer(ValueKind::DWord, 1));
        assert!(is_compliant(&current, ValueKind::DWord, &DeclaredValue::Integer(1)));
        assert!(is_compliant(&current, ValueKind::DWord, &"1".into()));
        assert!(!is_compliant(&current, ValueKind::DWord, &DeclaredValue::Integer(0)));
    }

    #[test]
    fn multi_string_list_matches_pipe_joined() {
        let current = present(CanonicalValue::text(ValueKind::MultiString, "A|B"));
        let declared = DeclaredValue::List(vec!["A".into(), "B".into()]);
        assert!(is_compliant(&current, ValueKind::MultiString, &declared));
        assert!(is_compliant(&current, ValueKind::MultiString, &"A|B".into()));
    }

    #[test]
    fn binary_declaration_is_normalized_before_comparing() {
        let current = present(CanonicalValue::text(ValueKind::Binary, "3c,00,ff"));
        assert!(is_compliant(&current, ValueKind::Binary, &"3C,00,FF".into()));
    }

    #[test]
    fn kind_mismatch_is_non_compliant() {
        let current = present(CanonicalValue::text(ValueKind::String, "1"));
        assert!(!is_compliant(&current, ValueKind::DWord, &DeclaredValue::Integer(1)));
    }

    #[test]
    fn strings_compare_exactly() {
        let current = present(CanonicalValue::text(ValueKind::String, "https://x"));
        assert!(is_compliant(&current, ValueKind::String, &"https://x".into()));
        assert!(!is_compliant(&current, ValueKind::String, &"https://X".into()));
    }

    #[test]
    fn malformed_declaration_is_non_compliant() {
        let current = present(CanonicalValue::text(ValueKind::Binary, "3c"));
        assert!(!is_compliant(&current, ValueKind::Binary, &"3".into()));
    }
}
