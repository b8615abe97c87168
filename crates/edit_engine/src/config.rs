//! Editor configuration
//!
//! Every section falls back to its defaults when missing from a settings
//! file, so partial files stay loadable across versions.

use doc_model::NodeType;
use serde::{Deserialize, Serialize};

/// Top-level editor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EditorConfig {
    pub auto_direction: AutoDirectionConfig,
    pub footnotes: FootnoteConfig,
    pub slash: SlashConfig,
    pub history: HistoryConfig,
}

/// Direction correction for paragraphs and headings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoDirectionConfig {
    pub enabled: bool,
    /// Node types whose `dir` attribute follows their text
    pub target_types: Vec<NodeType>,
    /// Share of strong characters needed to pick a direction
    pub threshold: f64,
}

impl Default for AutoDirectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_types: vec![NodeType::Paragraph, NodeType::Heading],
            threshold: text_engine::DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FootnoteConfig {
    /// Keep numbering and definitions consistent with the references
    pub enabled: bool,
    /// How long a reference stays highlighted after navigating back to it
    pub highlight_duration_ms: u64,
}

impl Default for FootnoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            highlight_duration_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlashConfig {
    pub enabled: bool,
    pub trigger: char,
    /// Characters before the cursor searched for the trigger
    pub max_lookback: usize,
}

impl Default for SlashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger: '/',
            max_lookback: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
    /// Typing closer together than this undoes as one step
    pub batch_threshold_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            batch_threshold_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.auto_direction.enabled);
        assert_eq!(
            config.auto_direction.target_types,
            vec![NodeType::Paragraph, NodeType::Heading]
        );
        assert_eq!(config.auto_direction.threshold, 0.3);
        assert_eq!(config.footnotes.highlight_duration_ms, 2000);
        assert_eq!(config.slash.trigger, '/');
        assert_eq!(config.slash.max_lookback, 100);
        assert_eq!(config.history.max_entries, 100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r##"{"slash": {"trigger": "#"}, "history": {"max_entries": 5}}"##)
                .unwrap();
        assert_eq!(config.slash.trigger, '#');
        assert_eq!(config.slash.max_lookback, 100);
        assert_eq!(config.history.max_entries, 5);
        assert!(config.footnotes.enabled);
    }

    #[test]
    fn test_roundtrip() {
        let config = EditorConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: EditorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
