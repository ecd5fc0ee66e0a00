// Prompt length classification
//
// Two independent schemes:
// - LengthThreshold: used by the aggregator, looks at the prompt text itself
// - NameSubstring: used by the report, looks for "short"/"medium"/"long" in a
//   test or configuration name
//
// The aggregator never produces "medium", and a report bucket is decided by
// the configuration name rather than by the recorded prompt_length column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt length class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptClass {
    Short,
    Medium,
    Long,
}

impl PromptClass {
    /// All classes in display order
    pub const ALL: [PromptClass; 3] = [PromptClass::Short, PromptClass::Medium, PromptClass::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptClass::Short => "short",
            PromptClass::Medium => "medium",
            PromptClass::Long => "long",
        }
    }
}

impl fmt::Display for PromptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy for deriving a [`PromptClass`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptClassifier {
    /// Text longer than `threshold` characters is long, anything else short
    LengthThreshold { threshold: usize },

    /// First of "short", "medium", "long" contained in the name wins
    NameSubstring,
}

impl PromptClassifier {
    /// Character threshold used by the aggregator
    pub const DEFAULT_THRESHOLD: usize = 50;

    /// Length-threshold classifier with an explicit threshold
    pub fn length_threshold(threshold: usize) -> Self {
        PromptClassifier::LengthThreshold { threshold }
    }

    /// Classify `input`. Only `NameSubstring` can fail to match.
    pub fn classify(&self, input: &str) -> Option<PromptClass> {
        match self {
            PromptClassifier::LengthThreshold { threshold } => {
                if input.chars().count() > *threshold {
                    Some(PromptClass::Long)
                } else {
                    Some(PromptClass::Short)
                }
            }
            PromptClassifier::NameSubstring => PromptClass::ALL
                .into_iter()
                .find(|class| input.contains(class.as_str())),
        }
    }
}

impl Default for PromptClassifier {
    fn default() -> Self {
        PromptClassifier::LengthThreshold {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_threshold_boundary() {
        let classifier = PromptClassifier::default();
        assert_eq!(classifier.classify("hi"), Some(PromptClass::Short));
        assert_eq!(classifier.classify(&"x".repeat(50)), Some(PromptClass::Short));
        assert_eq!(classifier.classify(&"x".repeat(51)), Some(PromptClass::Long));
        assert_eq!(classifier.classify(""), Some(PromptClass::Short));
    }

    #[test]
    fn test_length_threshold_counts_characters() {
        let classifier = PromptClassifier::length_threshold(3);
        assert_eq!(classifier.classify("你好吗"), Some(PromptClass::Short));
        assert_eq!(classifier.classify("你好吗?"), Some(PromptClass::Long));
    }

    #[test]
    fn test_name_substring() {
        let classifier = PromptClassifier::NameSubstring;
        assert_eq!(classifier.classify("p32_n100_dp_long"), Some(PromptClass::Long));
        assert_eq!(classifier.classify("medium_p8"), Some(PromptClass::Medium));
        assert_eq!(classifier.classify("short"), Some(PromptClass::Short));
        assert_eq!(classifier.classify("p4_n50"), None);
    }

    #[test]
    fn test_name_substring_prefers_short_over_long() {
        let classifier = PromptClassifier::NameSubstring;
        assert_eq!(classifier.classify("short_then_long"), Some(PromptClass::Short));
    }
}
