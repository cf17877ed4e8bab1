//! Failure report types
//!
//! A `FailureReport` is the immutable description of an uncaught failure:
//! source location, normalized message, optional query text, and an ordered
//! stack trace. `RequestContext` carries the per-request fields that are
//! appended to the rendered body but never participate in the dedup
//! signature.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the whitespace runs and markup line breaks that are collapsed
/// out of failure messages at construction time.
static MESSAGE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\r\n]+|<br />").expect("message break pattern is valid"));

/// Immutable description of an uncaught failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Source file the failure originated in
    file: String,

    /// Line within the source file
    line: u32,

    /// Failure message, normalized (tabs/newlines collapsed to spaces)
    message: String,

    /// Query text attached to database failures
    query: Option<String>,

    /// Ordered stack frames, outermost last
    frames: Vec<StackFrame>,
}

impl FailureReport {
    /// Creates a report for a failure at the given source location.
    ///
    /// The message is normalized on the way in: runs of tabs, carriage
    /// returns, newlines, and `<br />` markers collapse to single spaces.
    pub fn new(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: normalize_message(&message.into()),
            query: None,
            frames: Vec::new(),
        }
    }

    /// Attaches the query text of a database failure.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Attaches the stack trace, outermost frame last.
    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }

    /// Source file the failure originated in
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line within the source file
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Normalized failure message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Query text, if this was a database failure
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The stack trace
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }
}

/// One frame of a failure's stack trace.
///
/// A frame may carry a source location, a calling context (free function or
/// method), or both; rendering emits a line per populated part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Source location as (file, line)
    pub location: Option<(String, u32)>,

    /// Type the called function belongs to, when it is a method
    pub class: Option<String>,

    /// Name of the called function
    pub function: Option<String>,
}

impl StackFrame {
    /// Frame with only a source location.
    pub fn at(file: impl Into<String>, line: u32) -> Self {
        Self {
            location: Some((file.into(), line)),
            ..Self::default()
        }
    }

    /// Frame for a free function call.
    pub fn in_function(function: impl Into<String>) -> Self {
        Self {
            function: Some(function.into()),
            ..Self::default()
        }
    }

    /// Frame for a method call.
    pub fn in_method(class: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            function: Some(function.into()),
            ..Self::default()
        }
    }

    /// Adds a source location to this frame.
    pub fn located_at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some((file.into(), line));
        self
    }
}

/// Optional per-request environment fields.
///
/// Each field is rendered into the notification body only if present and
/// non-empty. None of them affect the dedup signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub request_uri: Option<String>,
    pub referrer: Option<String>,
    pub client_addr: Option<String>,
    pub server_addr: Option<String>,
}

impl RequestContext {
    /// Context with no fields set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    pub fn with_request_uri(mut self, value: impl Into<String>) -> Self {
        self.request_uri = Some(value.into());
        self
    }

    pub fn with_referrer(mut self, value: impl Into<String>) -> Self {
        self.referrer = Some(value.into());
        self
    }

    pub fn with_client_addr(mut self, value: impl Into<String>) -> Self {
        self.client_addr = Some(value.into());
        self
    }

    pub fn with_server_addr(mut self, value: impl Into<String>) -> Self {
        self.server_addr = Some(value.into());
        self
    }
}

/// Collapses tabs, newlines, and markup line breaks to single spaces.
fn normalize_message(raw: &str) -> String {
    MESSAGE_BREAKS.replace_all(raw, " ").into_owned()
}
