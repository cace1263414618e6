use std::fmt;
use winnow::error::ContextError;

/// The error type returned when parsing a [`Config`](crate::config::Config)
/// or a [`Trace`](crate::trace::Trace) from text fails.
///
/// Its [`Display`](fmt::Display) implementation renders the input with the
/// offending position marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    what: &'static str,
    input: String,
    span: std::ops::Range<usize>,
}

impl ParseError {
    /// `what` names the format being parsed, e.g. `"trace"`.
    pub(crate) fn from_parse(
        error: winnow::error::ParseError<&str, ContextError>,
        what: &'static str,
    ) -> Self {
        let input = error.input().to_string();
        let span = error.char_span();
        Self { what, input, span }
    }
    /// Character range of the input where parsing stopped.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.span.clone()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("invalid {} line starting here", self.what);
        let message = annotate_snippets::Level::Error
            .title(&title)
            .snippet(
                annotate_snippets::Snippet::source(&self.input)
                    .fold(true)
                    .annotation(annotate_snippets::Level::Error.span(self.span.clone())),
            );
        let renderer = annotate_snippets::Renderer::plain();
        let rendered = renderer.render(message);
        rendered.fmt(f)
    }
}

impl std::error::Error for ParseError {}
