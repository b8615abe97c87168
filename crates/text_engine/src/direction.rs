//! Text direction classification
//!
//! This is a heuristic, not the Unicode Bidirectional Algorithm: characters
//! are bucketed by code-point range and a script wins when its share of the
//! non-whitespace characters exceeds the threshold. RTL is checked first, so
//! mixed text where both scripts pass the threshold reads as RTL.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Share of non-whitespace characters a script needs to claim the text
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Hebrew, Arabic, Syriac, Thaana, Arabic Extended-A, Arabic Presentation Forms A and B
const RTL_RANGES: [RangeInclusive<char>; 7] = [
    '\u{0590}'..='\u{05FF}',
    '\u{0600}'..='\u{06FF}',
    '\u{0700}'..='\u{074F}',
    '\u{0780}'..='\u{07BF}',
    '\u{08A0}'..='\u{08FF}',
    '\u{FB50}'..='\u{FDFF}',
    '\u{FE70}'..='\u{FEFF}',
];

/// Basic Latin letters, Latin-1 Supplement letters, Latin Extended-A/B, Latin Extended Additional
const LTR_RANGES: [RangeInclusive<char>; 5] = [
    'A'..='Z',
    'a'..='z',
    '\u{00C0}'..='\u{00FF}',
    '\u{0100}'..='\u{024F}',
    '\u{1E00}'..='\u{1EFF}',
];

/// Result of classifying a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Rtl,
    Ltr,
    Neutral,
}

impl TextDirection {
    /// Value for an HTML `dir` attribute; `None` for neutral text
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            TextDirection::Rtl => Some("rtl"),
            TextDirection::Ltr => Some("ltr"),
            TextDirection::Neutral => None,
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "rtl" => Some(TextDirection::Rtl),
            "ltr" => Some(TextDirection::Ltr),
            _ => None,
        }
    }
}

/// Character counts behind a classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptCounts {
    pub rtl: usize,
    pub ltr: usize,
    /// Non-whitespace characters
    pub total: usize,
}

pub fn is_rtl_char(c: char) -> bool {
    RTL_RANGES.iter().any(|range| range.contains(&c))
}

pub fn is_ltr_char(c: char) -> bool {
    LTR_RANGES.iter().any(|range| range.contains(&c))
}

pub fn count_scripts(text: &str) -> ScriptCounts {
    let mut counts = ScriptCounts::default();
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        counts.total += 1;
        if is_rtl_char(c) {
            counts.rtl += 1;
        } else if is_ltr_char(c) {
            counts.ltr += 1;
        }
    }
    counts
}

/// Classify with the default 0.3 threshold
pub fn classify(text: &str) -> TextDirection {
    DirectionClassifier::default().classify(text)
}

/// Direction classifier with a configurable threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionClassifier {
    threshold: f64,
}

impl DirectionClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, text: &str) -> TextDirection {
        let text = text.trim();
        if text.is_empty() {
            return TextDirection::Neutral;
        }

        let counts = count_scripts(text);
        let total = counts.total.max(1) as f64;

        if counts.rtl as f64 / total > self.threshold {
            TextDirection::Rtl
        } else if counts.ltr as f64 / total > self.threshold {
            TextDirection::Ltr
        } else {
            TextDirection::Neutral
        }
    }
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
