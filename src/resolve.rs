//! Column-synonym resolver.
//!
//! Maps arbitrarily-named source columns onto the canonical schema via a
//! priority-ordered pattern table. Matching is a regex *search* over the
//! case- and accent-folded label, and pattern priority strictly dominates
//! column order: a later pattern is never preferred over an earlier one,
//! even when the earlier pattern's hit looks like a worse semantic fit.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

use crate::text;

/// One canonical field with its candidate label patterns, in priority order.
pub struct SynonymRule {
    pub canonical: &'static str,
    pub patterns: &'static [&'static str],
}

/// The fixed synonym table, evaluated in this order when building the
/// column mapping for a batch.
pub const SYNONYM_RULES: &[SynonymRule] = &[
    SynonymRule {
        canonical: "marca",
        patterns: &[r"\bmarca\b", r"\bbrand\b", "costruttor", r"\bcasa\b"],
    },
    SynonymRule {
        canonical: "modello",
        patterns: &[r"\bmodello\b", r"\bmodel\b"],
    },
    SynonymRule {
        canonical: "versione",
        patterns: &[r"\bversione\b", "allestiment", r"\btrim\b", "variante"],
    },
    SynonymRule {
        canonical: "prezzo",
        patterns: &["prezz", "listino", "price"],
    },
    SynonymRule {
        canonical: "capacita_batteria_kwh",
        patterns: &["batteria.*kwh", "capacita.*kwh", "kwh.*batter"],
    },
];

/// Returns the index of the first label matching `patterns`, honoring the
/// priority contract: every label is tried against the first pattern before
/// the second pattern is considered at all.
pub fn find_first_column(labels: &[String], patterns: &[&str]) -> Result<Option<usize>> {
    find_first_column_skipping(labels, patterns, &HashSet::new())
}

fn find_first_column_skipping(
    labels: &[String],
    patterns: &[&str],
    claimed: &HashSet<usize>,
) -> Result<Option<usize>> {
    let keys: Vec<String> = labels.iter().map(|l| text::match_key(l)).collect();
    for pattern in patterns {
        let re = Regex::new(pattern)
            .with_context(|| format!("Compiling synonym pattern '{pattern}'"))?;
        for (idx, key) in keys.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            if re.is_match(key) {
                return Ok(Some(idx));
            }
        }
    }
    Ok(None)
}

/// Builds the rename mapping for a batch: `(column index, canonical name)`
/// pairs. A canonical already present verbatim among the labels is left
/// alone, and a source column claimed by one canonical is never claimed by
/// another, so the mapping is one-to-one by construction.
pub fn build_column_mapping(labels: &[String]) -> Result<Vec<(usize, &'static str)>> {
    let mut mapping = Vec::new();
    let mut claimed = HashSet::new();
    for rule in SYNONYM_RULES {
        if labels.iter().any(|l| l == rule.canonical) {
            continue;
        }
        if let Some(idx) = find_first_column_skipping(labels, rule.patterns, &claimed)? {
            debug!("Resolved column '{}' -> '{}'", labels[idx], rule.canonical);
            claimed.insert(idx);
            mapping.push((idx, rule.canonical));
        }
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn resolution_is_case_and_accent_insensitive() {
        for label in ["Marca", "MARCA", "márca"] {
            let cols = labels(&[label, "other"]);
            let found = find_first_column(&cols, &[r"\bmarca\b"]).expect("resolve");
            assert_eq!(found, Some(0), "label {label:?}");
        }
    }

    #[test]
    fn pattern_priority_beats_column_order() {
        // Only the later column matches P1; an earlier column matches P2.
        let cols = labels(&["variante", "allestimento"]);
        let found = find_first_column(&cols, &["allestiment", "variante"]).expect("resolve");
        assert_eq!(found, Some(1));
    }

    #[test]
    fn unmatched_patterns_resolve_to_none() {
        let cols = labels(&["colore", "cambio"]);
        assert_eq!(find_first_column(&cols, &[r"\bmarca\b"]).expect("resolve"), None);
    }

    #[test]
    fn mapping_skips_canonicals_already_present() {
        let cols = labels(&["marca", "model", "trim", "listino"]);
        let mapping = build_column_mapping(&cols).expect("mapping");
        assert_eq!(mapping, vec![(1, "modello"), (2, "versione"), (3, "prezzo")]);
    }

    #[test]
    fn mapping_never_claims_a_column_twice() {
        // "modello versione" matches both identity rules; once modello claims
        // it, the versione rule must look at the remaining columns.
        let cols = labels(&["brand", "modello versione", "variante"]);
        let mapping = build_column_mapping(&cols).expect("mapping");
        assert_eq!(
            mapping,
            vec![(0, "marca"), (1, "modello"), (2, "versione")]
        );
    }
}
