//! Transport-level responses produced by the view capability.

use vista_render::{Context, Options, RenderedOutput};

/// What a view response was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSource {
    pub template: String,
    pub context: Option<Context>,
    pub options: Options,
}

/// A rendered view ready for the host to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    pub body: String,
    pub source: ViewSource,
}

impl Response {
    /// Wraps render output in a `200 OK` response.
    pub fn view(output: RenderedOutput, source: ViewSource) -> Self {
        Self {
            status: 200,
            content_type: output.content_type,
            body: output.body,
            source,
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
