//! Tool call outcomes and their host-facing form.

use serde::{Deserialize, Serialize};

/// One content item returned by a provider tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl ContentItem {
    /// Creates a text item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            data: None,
        }
    }

    /// Creates a data item.
    #[must_use]
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            text: None,
            data: Some(data.into()),
        }
    }

    /// Returns the string this item contributes to a flattened response.
    ///
    /// Text wins whenever present, even when empty; `data` is used only
    /// when there is no text at all.
    #[must_use]
    pub fn rendered(&self) -> &str {
        self.text
            .as_deref()
            .or(self.data.as_deref())
            .unwrap_or_default()
    }
}

/// Normalized result of a provider tool call.
///
/// Provider-reported failures are carried in `is_error`; they are data, not
/// faults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallOutcome {
    #[serde(default)]
    content: Option<Vec<ContentItem>>,
    #[serde(default, rename = "isError")]
    is_error: bool,
}

impl ToolCallOutcome {
    /// Creates an outcome with the given content items.
    #[must_use]
    pub const fn new(content: Vec<ContentItem>, is_error: bool) -> Self {
        Self {
            content: Some(content),
            is_error,
        }
    }

    /// Creates an outcome with no content list at all.
    #[must_use]
    pub const fn without_content(is_error: bool) -> Self {
        Self {
            content: None,
            is_error,
        }
    }

    /// Creates a failed outcome carrying a single text message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(vec![ContentItem::text(message)], true)
    }

    /// Returns the content items, if any were reported.
    #[must_use]
    pub fn content(&self) -> Option<&[ContentItem]> {
        self.content.as_deref()
    }

    /// Returns whether the provider reported a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// Flattens the content into newline-joined text.
    ///
    /// A missing content list yields an empty string.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.content()
            .unwrap_or_default()
            .iter()
            .map(ContentItem::rendered)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A content block in the shape the host expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostContentBlock {
    /// Plain text.
    Text {
        /// Block text.
        text: String,
    },
}

/// Response handed back to the host for one tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostToolResponse {
    content: Vec<HostContentBlock>,
    #[serde(rename = "isError")]
    is_error: bool,
}

impl HostToolResponse {
    /// Creates a response with a single text block.
    #[must_use]
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: vec![HostContentBlock::Text { text: text.into() }],
            is_error,
        }
    }

    /// Returns the content blocks.
    #[must_use]
    pub fn content(&self) -> &[HostContentBlock] {
        &self.content
    }

    /// Returns the text of the first block, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|block| match block {
            HostContentBlock::Text { text } => text.as_str(),
        })
    }

    /// Returns whether the tool execution failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }
}

impl From<&ToolCallOutcome> for HostToolResponse {
    fn from(outcome: &ToolCallOutcome) -> Self {
        Self::text(outcome.joined_text(), outcome.is_error())
    }
}

impl From<ToolCallOutcome> for HostToolResponse {
    fn from(outcome: ToolCallOutcome) -> Self {
        Self::from(&outcome)
    }
}
