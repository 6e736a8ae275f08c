use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Sequence diff algorithm used for sentence diffs and similarity scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for similar::Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => similar::Algorithm::Myers,
            DiffAlgorithm::Patience => similar::Algorithm::Patience,
            DiffAlgorithm::Lcs => similar::Algorithm::Lcs,
        }
    }
}

/// What happens to the style marks of text leaves that go through the
/// sentence diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMarkPolicy {
    /// Emitted sentences carry only their diff mark.
    #[default]
    Discard,
    /// A sentence lying inside a single source leaf keeps that leaf's marks.
    PreserveWithinLeaf,
}

/// Tuning knobs for a diff run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Algorithm for sentence-level diffs.
    pub algorithm: DiffAlgorithm,
    /// Deadline for a single sentence diff, in milliseconds. When it expires
    /// the diff degrades to a coarser (still correct) result.
    pub timeout_ms: Option<u64>,
    /// Treatment of existing marks on re-diffed text.
    pub text_marks: TextMarkPolicy,
    /// Cap on distinct sentences per text run, below the Unicode scalar
    /// space that bounds it anyway.
    pub max_sentence_symbols: Option<usize>,
}

impl DiffConfig {
    /// Load a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> DiffResult<Self> {
        toml::from_str(s).map_err(|e| DiffError::Config(e.to_string()))
    }

    /// The sentence diff deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Set the text mark policy.
    pub fn with_text_marks(mut self, policy: TextMarkPolicy) -> Self {
        self.text_marks = policy;
        self
    }

    /// Set the diff algorithm.
    pub fn with_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Configure a similar text diff the way this config asks for.
    pub(crate) fn text_diff_config(&self) -> similar::TextDiffConfig {
        let mut config = similar::TextDiff::configure();
        config.algorithm(self.algorithm.into());
        if let Some(timeout) = self.timeout() {
            config.timeout(timeout);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiffConfig::default();
        assert_eq!(c.algorithm, DiffAlgorithm::Myers);
        assert_eq!(c.text_marks, TextMarkPolicy::Discard);
        assert!(c.timeout().is_none());
        assert!(c.max_sentence_symbols.is_none());
    }

    #[test]
    fn toml_overrides_some_keys() {
        let c = DiffConfig::from_toml_str(
            r#"
            algorithm = "patience"
            timeout_ms = 250
            text_marks = "preserve_within_leaf"
            "#,
        )
        .unwrap();
        assert_eq!(c.algorithm, DiffAlgorithm::Patience);
        assert_eq!(c.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(c.text_marks, TextMarkPolicy::PreserveWithinLeaf);
        assert!(c.max_sentence_symbols.is_none());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = DiffConfig::from_toml_str("algorithm = \"bogus\"").unwrap_err();
        assert!(matches!(err, DiffError::Config(_)));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DiffConfig::from_toml_str("").unwrap(), DiffConfig::default());
    }
}
