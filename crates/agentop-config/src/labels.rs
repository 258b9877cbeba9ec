//! Label filters — wildcard patterns for labels that must not be propagated.
//!
//! A filter is written with `*` as the only wildcard. Everything else is
//! literal, so `app.kubernetes.io/*` becomes the regex `app\.kubernetes\.io/.*`.
//! Like any unanchored regex, a filter matches when it occurs anywhere in
//! the label key.

use regex::{Regex, RegexSet};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone)]
pub struct LabelsFilter {
    patterns: Vec<String>,
    set: RegexSet,
}

impl LabelsFilter {
    /// Convert wildcard filters into regexes and compile them.
    pub fn from_wildcards<S: AsRef<str>>(filters: &[S]) -> ConfigResult<Self> {
        let patterns: Vec<String> = filters
            .iter()
            .map(|f| wildcard_to_regex(f.as_ref()))
            .collect();

        for pattern in &patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidLabelsFilter {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let set = RegexSet::new(&patterns).map_err(|source| ConfigError::InvalidLabelsFilter {
            pattern: patterns.join("|"),
            source,
        })?;

        Ok(Self { patterns, set })
    }

    /// The filters as regex strings.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `label` matches any filter.
    pub fn is_filtered(&self, label: &str) -> bool {
        self.set.is_match(label)
    }

    /// Whether no filter is configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for LabelsFilter {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }
}

fn wildcard_to_regex(filter: &str) -> String {
    filter
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_conversion_quotes_metacharacters() {
        assert_eq!(wildcard_to_regex("app.kubernetes.io/*"), r"app\.kubernetes\.io/.*");
        assert_eq!(wildcard_to_regex("release"), "release");
        assert_eq!(wildcard_to_regex("*.hash"), r".*\.hash");
    }

    #[test]
    fn matches_labels() {
        let filter = LabelsFilter::from_wildcards(&["app.kubernetes.io/*", "pod-template-hash"]).unwrap();
        assert!(filter.is_filtered("app.kubernetes.io/name"));
        assert!(filter.is_filtered("pod-template-hash"));
        assert!(!filter.is_filtered("app"));
        assert!(!filter.is_filtered("appXkubernetes.io/name"));
        assert_eq!(filter.patterns().len(), 2);
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = LabelsFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.is_filtered("anything"));

        let filter = LabelsFilter::from_wildcards::<&str>(&[]).unwrap();
        assert!(!filter.is_filtered("anything"));
    }
}
