//! Fenced code block scanning.
//!
//! A fence opens on a line starting with three backticks; the rest of that
//! line is the options string. It closes on the next line consisting solely
//! of three backticks. Scanning is a two-state walk over lines (outside /
//! inside a fence), so several blocks in one document are matched
//! separately and bodies may contain blank lines.

use std::ops::Range;

use crate::FilterError;

/// Fence marker.
const FENCE: &str = "```";

/// A fenced code block found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock<'a> {
    /// Byte range of the block in the input, from the start of the opening
    /// fence line to the end of the closing fence line (newline excluded).
    pub span: Range<usize>,
    /// 1-based line number of the opening fence.
    pub line: usize,
    /// Text following the opening fence on the same line, trimmed.
    pub options_raw: &'a str,
    /// Code between the fences, see [`strip_body`].
    pub body: String,
}

/// Scanner state.
#[derive(Clone, Copy)]
enum State<'a> {
    Outside,
    Inside {
        start: usize,
        line: usize,
        options: &'a str,
        body_start: usize,
    },
}

/// Iterator over the fenced code blocks of a text, left to right.
///
/// Yields [`FilterError::UnterminatedBlock`] and stops if the input ends
/// inside a fence.
///
/// # Example
///
/// ```
/// use octohl_filter::FenceParser;
///
/// let text = "intro\n```{\"lang\":\"ruby\"}\nputs 1\n```\noutro\n";
/// let blocks: Vec<_> = FenceParser::new(text).collect::<Result<_, _>>().unwrap();
///
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].options_raw, "{\"lang\":\"ruby\"}");
/// assert_eq!(blocks[0].body, "puts 1");
/// assert_eq!(&text[blocks[0].span.end..], "\noutro\n");
/// ```
#[derive(Debug)]
pub struct FenceParser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    done: bool,
}

impl<'a> FenceParser<'a> {
    /// Create a scanner over `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for FenceParser<'a> {
    type Item = Result<CodeBlock<'a>, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut state = State::Outside;
        while self.pos < self.input.len() {
            let start = self.pos;
            let (end, next) = match self.input[start..].find('\n') {
                Some(i) => (start + i, start + i + 1),
                None => (self.input.len(), self.input.len()),
            };
            let text = &self.input[start..end];
            self.pos = next;
            self.line += 1;

            match state {
                State::Outside => {
                    if let Some(options) = text.strip_prefix(FENCE) {
                        state = State::Inside {
                            start,
                            line: self.line,
                            options: options.trim(),
                            body_start: next,
                        };
                    }
                }
                State::Inside {
                    start: block_start,
                    line,
                    options,
                    body_start,
                } => {
                    if is_closing_fence(text) {
                        return Some(Ok(CodeBlock {
                            span: block_start..end,
                            line,
                            options_raw: options,
                            body: strip_body(&self.input[body_start..start]),
                        }));
                    }
                }
            }
        }

        self.done = true;
        match state {
            State::Inside { line, .. } => Some(Err(FilterError::UnterminatedBlock { line })),
            State::Outside => None,
        }
    }
}

/// Check if a line closes a fence: three backticks and nothing but trailing
/// whitespace.
fn is_closing_fence(line: &str) -> bool {
    line.strip_prefix(FENCE)
        .is_some_and(|rest| rest.chars().all(char::is_whitespace))
}

/// Drop leading blank lines and trailing whitespace from a block body.
///
/// Indentation of the first non-blank line is preserved.
#[must_use]
pub fn strip_body(raw: &str) -> String {
    let mut rest = raw;
    while let Some(i) = rest.find('\n') {
        if rest[..i].trim().is_empty() {
            rest = &rest[i + 1..];
        } else {
            break;
        }
    }
    rest.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks(input: &str) -> Vec<CodeBlock<'_>> {
        FenceParser::new(input)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_no_fences() {
        assert!(blocks("").is_empty());
        assert!(blocks("just some\ntext with `inline` code\n").is_empty());
    }

    #[test]
    fn test_single_block() {
        let input = "before\n```{\"lang\":\"ruby\"}\nputs 1\n```\nafter\n";
        let found = blocks(input);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].options_raw, "{\"lang\":\"ruby\"}");
        assert_eq!(found[0].body, "puts 1");
        assert_eq!(&input[found[0].span.clone()], "```{\"lang\":\"ruby\"}\nputs 1\n```");
    }

    #[test]
    fn test_empty_options() {
        let found = blocks("```\ncode\n```\n");

        assert_eq!(found[0].options_raw, "");
        assert_eq!(found[0].body, "code");
    }

    #[test]
    fn test_multiple_blocks_are_not_greedy() {
        let input = "```\na\n```\nmiddle\n```\nb\n```\n";
        let found = blocks(input);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].body, "a");
        assert_eq!(found[1].body, "b");
        assert_eq!(found[1].line, 5);
        assert_eq!(&input[found[0].span.end..found[1].span.start], "\nmiddle\n");
    }

    #[test]
    fn test_body_with_blank_lines() {
        let found = blocks("```\n\n\n  first\n\n  second\n\n```");

        assert_eq!(found[0].body, "  first\n\n  second");
    }

    #[test]
    fn test_closing_fence_with_trailing_whitespace() {
        let found = blocks("```\ncode\n```  \r\nafter");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, "code");
    }

    #[test]
    fn test_closing_fence_must_be_alone() {
        // "``` x" does not close; the later bare fence does
        let found = blocks("```\none\n``` x\ntwo\n```\n");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, "one\n``` x\ntwo");
    }

    #[test]
    fn test_fence_must_start_line() {
        assert!(blocks("text ```\ncode\n ```\n").is_empty());
    }

    #[test]
    fn test_unterminated_block() {
        let results: Vec<_> = FenceParser::new("a\n```{}\nnever closed\n").collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(FilterError::UnterminatedBlock { line: 2 })
        ));
    }

    #[test]
    fn test_unterminated_after_valid_block() {
        let mut parser = FenceParser::new("```\nok\n```\n```\nopen");

        assert!(parser.next().unwrap().is_ok());
        assert!(matches!(
            parser.next(),
            Some(Err(FilterError::UnterminatedBlock { line: 4 }))
        ));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_strip_body() {
        assert_eq!(strip_body("\n  \n\tcode\n  more  \n\n"), "\tcode\n  more");
        assert_eq!(strip_body("code"), "code");
        assert_eq!(strip_body("\n\n"), "");
    }
}
