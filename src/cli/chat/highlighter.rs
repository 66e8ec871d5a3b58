use crate::color;

/// Styles the line being composed; the input is never tokenized.
#[derive(Default)]
pub(crate) struct InputHighlighter;

impl reedline::Highlighter for InputHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> reedline::StyledText {
        reedline::StyledText {
            buffer: vec![(color::USER_TEXT.clone(), line.to_string())],
        }
    }
}
