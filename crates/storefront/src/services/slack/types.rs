//! Slack Block Kit types for building rich messages.
//!
//! A subset of Block Kit covering the read-only notifications the storefront
//! sends. See: <https://api.slack.com/block-kit>

use serde::Serialize;

/// Payload accepted by an incoming webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    /// Plain text fallback shown in notifications.
    pub text: String,
    /// Message blocks.
    pub blocks: Vec<Block>,
}

/// Block Kit block types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Header block with large text.
    Header { text: PlainText },
    /// Section block with text and/or a two-column field grid.
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
    },
    /// Context block with small muted text.
    Context { elements: Vec<ContextElement> },
    /// Divider block (horizontal line).
    Divider,
}

impl Block {
    /// Section with a single markdown paragraph.
    #[must_use]
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Section {
            text: Some(Text::mrkdwn(text)),
            fields: Vec::new(),
        }
    }

    /// Section laid out as `*label*\nvalue` fields.
    #[must_use]
    pub fn fields<I, L, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: AsRef<str>,
        V: AsRef<str>,
    {
        Self::Section {
            text: None,
            fields: pairs
                .into_iter()
                .map(|(label, value)| {
                    Text::mrkdwn(format!("*{}*\n{}", label.as_ref(), value.as_ref()))
                })
                .collect(),
        }
    }

    /// Context line with markdown text.
    #[must_use]
    pub fn context(text: impl Into<String>) -> Self {
        Self::Context {
            elements: vec![ContextElement::Mrkdwn { text: text.into() }],
        }
    }
}

/// Text object types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Plain text (no formatting).
    PlainText { text: String, emoji: bool },
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Plain text object (for headers).
#[derive(Debug, Clone, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Context block elements.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    /// Markdown text in context.
    Mrkdwn { text: String },
    /// Plain text in context.
    PlainText { text: String, emoji: bool },
}
