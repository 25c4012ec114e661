//! Linear scanner splitting template text into literal runs and placeholder tokens

/// Byte range in template text
pub type Span = std::ops::Range<usize>;

/// A piece of template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied to the output unchanged
    Literal(&'a str),
    /// A `{name}` or `{name:default}` token
    Placeholder {
        name: &'a str,
        /// Text after `:`; `None` when the suffix is absent or empty
        default: Option<&'a str>,
        /// Span of the whole token including both braces
        span: Span,
    },
}

impl<'a> Segment<'a> {
    /// The exact slice of `template` this segment was read from
    pub fn source(&self, template: &'a str) -> &'a str {
        match self {
            Segment::Literal(text) => *text,
            Segment::Placeholder { span, .. } => &template[span.clone()],
        }
    }
}

/// Iterator over the segments of a template
///
/// Literal characters between placeholders are coalesced into a single
/// `Segment::Literal`, including any `{` that did not open a valid token.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    pending: Option<Segment<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            pending: None,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(segment) = self.pending.take() {
            return Some(segment);
        }
        if self.pos >= self.text.len() {
            return None;
        }

        let bytes = self.text.as_bytes();
        let literal_start = self.pos;
        let mut cursor = self.pos;

        while let Some(offset) = bytes[cursor..].iter().position(|&b| b == b'{') {
            let open = cursor + offset;
            match match_token(self.text, open) {
                Some(segment) => {
                    if let Segment::Placeholder { span, .. } = &segment {
                        self.pos = span.end;
                    }
                    if open == literal_start {
                        return Some(segment);
                    }
                    self.pending = Some(segment);
                    return Some(Segment::Literal(&self.text[literal_start..open]));
                }
                // Not a token: the brace stays literal and scanning resumes after it
                None => cursor = open + 1,
            }
        }

        self.pos = self.text.len();
        Some(Segment::Literal(&self.text[literal_start..]))
    }
}

/// Try to read a placeholder token starting at the `{` at byte `open`
fn match_token(text: &str, open: usize) -> Option<Segment<'_>> {
    let bytes = text.as_bytes();
    let name_start = open + 1;
    let name_end = name_start
        + bytes[name_start..]
            .iter()
            .position(|&b| matches!(b, b'{' | b'}' | b':'))?;
    if name_end == name_start {
        return None;
    }

    match bytes[name_end] {
        b'}' => Some(Segment::Placeholder {
            name: &text[name_start..name_end],
            default: None,
            span: open..name_end + 1,
        }),
        b':' => {
            let default_start = name_end + 1;
            let default_end = default_start
                + bytes[default_start..]
                    .iter()
                    .position(|&b| matches!(b, b'{' | b'}'))?;
            if bytes[default_end] != b'}' {
                return None;
            }
            let default = &text[default_start..default_end];
            Some(Segment::Placeholder {
                name: &text[name_start..name_end],
                default: (!default.is_empty()).then_some(default),
                span: open..default_end + 1,
            })
        }
        _ => None,
    }
}

/// Scan template text into segments
pub fn scan(text: &str) -> Scanner<'_> {
    Scanner::new(text)
}
