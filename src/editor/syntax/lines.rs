//! Line views over the document, with container prefixes stripped

/// One line of block content.
///
/// `start` is the absolute byte offset of `text` in the document; `text`
/// excludes the line terminator and any container prefix already consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub start: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    /// Leading spaces; tabs are content
    pub fn indent(&self) -> usize {
        self.text.bytes().take_while(|&b| b == b' ').count()
    }

    /// The line with its first `n` bytes removed
    pub fn advance(&self, n: usize) -> Line<'a> {
        let n = n.min(self.text.len());
        Line {
            start: self.start + n,
            text: &self.text[n..],
        }
    }

    /// The line with leading spaces and tabs removed
    pub fn trim_start(&self) -> Line<'a> {
        let ws = self.text.len() - self.text.trim_start_matches([' ', '\t']).len();
        self.advance(ws)
    }

    /// The line with trailing spaces and tabs removed
    pub fn trim_end(&self) -> Line<'a> {
        Line {
            start: self.start,
            text: self.text.trim_end_matches([' ', '\t']),
        }
    }
}

/// Lines of `doc` starting at byte offset `from`, which must be a line start
pub(crate) fn lines_from(doc: &str, from: usize) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = from;
    for raw in doc[from..].split('\n') {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        lines.push(Line { start, text });
        start += raw.len() + 1;
    }
    lines
}

/// Start of the line containing `pos`
pub(crate) fn line_start(doc: &str, pos: usize) -> usize {
    doc[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// End of the line containing `pos`, before its terminator
pub(crate) fn line_end(doc: &str, pos: usize) -> usize {
    let end = doc[pos..].find('\n').map_or(doc.len(), |i| pos + i);
    if end > pos && doc.as_bytes()[end - 1] == b'\r' { end - 1 } else { end }
}
