#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Jurisdiction code → display label mapping.
//!
//! Labels are purely presentational: every filter and aggregation in
//! the pipeline runs on [`Jurisdiction`] codes, and a missing label
//! falls back to the raw code rather than blocking anything. The map
//! is an explicit value passed into the reporting layer, not a
//! process-wide global, so tests can use arbitrary label sets without
//! touching the environment.

use std::collections::BTreeMap;

use zone_map_models::Jurisdiction;

/// Parsed jurisdiction label map.
///
/// Built from a `code:label` list such as `10:Bellevue,20:Gretna`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JurisdictionLabels {
    labels: BTreeMap<u32, String>,
}

impl JurisdictionLabels {
    /// Parses a `10:Bellevue,20:Gretna,...` mapping string.
    ///
    /// Entries without a `:`, or with a non-numeric code, are skipped;
    /// a malformed entry never fails the whole map.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut labels = BTreeMap::new();
        for part in raw.split(',') {
            let part = part.trim();
            let Some((code, label)) = part.split_once(':') else {
                continue;
            };
            let Ok(code) = code.trim().parse::<u32>() else {
                continue;
            };
            let label = label.trim();
            if !label.is_empty() {
                labels.insert(code, label.to_string());
            }
        }
        Self { labels }
    }

    /// Display label for a jurisdiction.
    ///
    /// Unmapped codes render as `Jurisdiction {code}` and the unknown
    /// variant as `Unknown`, so display never blocks on configuration.
    #[must_use]
    pub fn label(&self, jurisdiction: Jurisdiction) -> String {
        match jurisdiction {
            Jurisdiction::Coded(code) => self
                .labels
                .get(&code)
                .cloned()
                .unwrap_or_else(|| format!("Jurisdiction {code}")),
            Jurisdiction::Unknown => "Unknown".to_string(),
        }
    }

    /// Number of configured labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether any labels are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mapping_string() {
        let labels = JurisdictionLabels::parse("10:Bellevue,20:Gretna");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.label(Jurisdiction::Coded(10)), "Bellevue");
        assert_eq!(labels.label(Jurisdiction::Coded(20)), "Gretna");
    }

    #[test]
    fn skips_malformed_entries() {
        let labels = JurisdictionLabels::parse("10:Bellevue,garbage,abc:Papillion, 30 : La Vista ");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.label(Jurisdiction::Coded(30)), "La Vista");
    }

    #[test]
    fn unmapped_code_falls_back_to_raw_code() {
        let labels = JurisdictionLabels::parse("10:Bellevue");
        assert_eq!(labels.label(Jurisdiction::Coded(99)), "Jurisdiction 99");
    }

    #[test]
    fn unknown_jurisdiction_has_fixed_label() {
        let labels = JurisdictionLabels::default();
        assert_eq!(labels.label(Jurisdiction::Unknown), "Unknown");
    }

    #[test]
    fn empty_string_parses_to_empty_map() {
        assert!(JurisdictionLabels::parse("").is_empty());
    }
}
