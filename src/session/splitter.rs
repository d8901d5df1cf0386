//! Reasoning/answer separation for assistant text.
//!
//! The backend may wrap its reasoning in a delimited block ahead of the final
//! answer. While streaming, the block can be open without its close marker
//! having arrived yet; that state is kept distinct so the answer is never
//! confused with text inside the block.

/// Delimiters of a reasoning block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningMarkers {
    /// Start of the block
    pub open: String,
    /// End of a header following `open` that is not part of the reasoning
    pub header_end: Option<String>,
    /// End of the block
    pub close: String,
}

impl ReasoningMarkers {
    /// A plain open/close pair with no header.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            header_end: None,
            close: close.into(),
        }
    }

    /// Collapsible `<details>` block with a `<summary>` header.
    pub fn dify() -> Self {
        Self {
            open: "<details style=".to_string(),
            header_end: Some("</summary>".to_string()),
            close: "</details>".to_string(),
        }
    }

    /// `<think>...</think>` tags.
    pub fn think_tags() -> Self {
        Self::new("<think>", "</think>")
    }
}

impl Default for ReasoningMarkers {
    fn default() -> Self {
        Self::dify()
    }
}

/// Result of splitting assistant text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedContent {
    /// No reasoning block
    NoBlock { answer: String },
    /// Block opened, close marker not seen yet
    OpenBlockPending { reasoning: String },
    /// Complete block followed by the answer
    ClosedBlock { reasoning: String, answer: String },
}

impl ParsedContent {
    pub fn has_reasoning_block(&self) -> bool {
        !matches!(self, ParsedContent::NoBlock { .. })
    }

    pub fn reasoning_text(&self) -> Option<&str> {
        match self {
            ParsedContent::NoBlock { .. } => None,
            ParsedContent::OpenBlockPending { reasoning }
            | ParsedContent::ClosedBlock { reasoning, .. } => Some(reasoning),
        }
    }

    /// The answer; `None` while the reasoning block is still open.
    pub fn answer_text(&self) -> Option<&str> {
        match self {
            ParsedContent::NoBlock { answer } | ParsedContent::ClosedBlock { answer, .. } => {
                Some(answer)
            }
            ParsedContent::OpenBlockPending { .. } => None,
        }
    }
}

impl Default for ParsedContent {
    fn default() -> Self {
        ParsedContent::NoBlock {
            answer: String::new(),
        }
    }
}

/// Split assistant text into reasoning and answer.
pub fn split_assistant(text: &str, markers: &ReasoningMarkers) -> ParsedContent {
    let Some(open_at) = text.find(&markers.open) else {
        return ParsedContent::NoBlock {
            answer: text.trim().to_string(),
        };
    };

    let inner_start = open_at + markers.open.len();
    let close_at = text[inner_start..]
        .find(&markers.close)
        .map(|offset| inner_start + offset);
    let inner_end = close_at.unwrap_or(text.len());
    let inner = &text[inner_start..inner_end];

    let reasoning = match &markers.header_end {
        None => inner,
        // Header still incomplete (or missing): nothing to show yet.
        Some(header_end) => match inner.find(header_end.as_str()) {
            Some(at) => &inner[at + header_end.len()..],
            None => "",
        },
    }
    .trim()
    .to_string();

    match close_at {
        None => ParsedContent::OpenBlockPending { reasoning },
        Some(close_at) => ParsedContent::ClosedBlock {
            reasoning,
            answer: text[close_at + markers.close.len()..].trim().to_string(),
        },
    }
}

/// User text never carries a reasoning block.
pub fn split_user(text: &str) -> ParsedContent {
    ParsedContent::NoBlock {
        answer: text.trim().to_string(),
    }
}

/// Memoising splitter for one message.
///
/// The text of a streaming message only grows, and the split is re-run on
/// every fragment; an unchanged input returns the previous result.
#[derive(Debug, Clone, Default)]
pub struct ContentSplitter {
    markers: ReasoningMarkers,
    last_input: Option<String>,
    last: ParsedContent,
}

impl ContentSplitter {
    pub fn new(markers: ReasoningMarkers) -> Self {
        Self {
            markers,
            last_input: None,
            last: ParsedContent::default(),
        }
    }

    pub fn markers(&self) -> &ReasoningMarkers {
        &self.markers
    }

    pub fn split(&mut self, text: &str) -> &ParsedContent {
        if self.last_input.as_deref() != Some(text) {
            self.last = split_assistant(text, &self.markers);
            self.last_input = Some(text.to_string());
        }
        &self.last
    }

    /// Forget the memoised input, e.g. when a new turn starts.
    pub fn reset(&mut self) {
        self.last_input = None;
        self.last = ParsedContent::default();
    }
}
