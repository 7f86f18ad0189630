use serde::{Deserialize, Serialize};

use crate::style::Color;

/// Rich (multi-style) text.
///
/// `text` holds the full string content; `runs` carries style overrides for
/// ranges of it.
///
/// ## Indexing
/// Run `start`/`end` offsets are **Unicode scalar value** (`char`) indices
/// into `text`, not UTF-8 byte offsets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub text: String,
    pub runs: Vec<RichTextRun>,
}

impl RichText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    pub fn plain_text(&self) -> &str {
        &self.text
    }

    pub fn is_plain(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Build rich text from styled segments, computing run offsets.
    pub fn from_segments(segments: impl IntoIterator<Item = (String, RichTextRunStyle)>) -> Self {
        let mut text = String::new();
        let mut runs = Vec::new();
        let mut cursor = 0usize;

        for (segment_text, style) in segments {
            let start = cursor;
            cursor += segment_text.chars().count();
            let end = cursor;
            text.push_str(&segment_text);
            runs.push(RichTextRun { start, end, style });
        }

        Self { text, runs }
    }
}

/// A style override applied to a `char` range of the text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextRun {
    pub start: usize,
    pub end: usize,
    pub style: RichTextRunStyle,
}

/// Per-run style overrides; `None` fields inherit from the cell style.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextRunStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_pt: Option<f32>,
}
