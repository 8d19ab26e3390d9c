//! Inline syntax of one paragraph or heading
//!
//! Constructs are collected as flat spans in a single left-to-right pass and
//! nested by containment afterwards. Anything left unmatched (emphasis
//! without a closer, brackets without a destination, lone backticks) stays
//! plain text and produces no node.

use std::ops::Range;

use super::lines::Line;
use super::tree::{SyntaxKind, SyntaxNode};

/// Longest URI scheme accepted in autolinks
const MAX_SCHEME_LEN: usize = 32;

pub(crate) fn parse_inline(segments: &[Line]) -> Vec<SyntaxNode> {
    if segments.is_empty() {
        return Vec::new();
    }
    let source = Source::new(segments);
    let flat = InlineParser::new(&source.text).run();
    let mapped = flat
        .into_iter()
        .map(|(kind, range)| (kind, source.abs(range.start)..source.abs(range.end - 1) + 1))
        .collect();
    nest(mapped)
}

/// Segment texts joined with `\n`, with a map back to document offsets
struct Source {
    text: String,
    /// Joined offset and absolute offset of each segment start
    starts: Vec<(usize, usize)>,
}

impl Source {
    fn new(segments: &[Line]) -> Self {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            starts.push((text.len(), segment.start));
            text.push_str(segment.text);
        }
        Self { text, starts }
    }

    fn abs(&self, pos: usize) -> usize {
        let idx = self.starts.partition_point(|&(joined, _)| joined <= pos).saturating_sub(1);
        let (joined, absolute) = self.starts[idx];
        absolute + (pos - joined)
    }
}

/// Build the node hierarchy from well-nested spans
fn nest(mut flat: Vec<(SyntaxKind, Range<usize>)>) -> Vec<SyntaxNode> {
    flat.sort_by(|(_, a), (_, b)| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut roots = Vec::new();
    let mut stack: Vec<SyntaxNode> = Vec::new();
    for (kind, range) in flat {
        while stack.last().is_some_and(|top| range.start >= top.range.end) {
            if let Some(done) = stack.pop() {
                attach(done, &mut stack, &mut roots);
            }
        }
        stack.push(SyntaxNode::leaf(kind, range));
    }
    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut roots);
    }
    roots
}

fn attach(node: SyntaxNode, stack: &mut [SyntaxNode], roots: &mut Vec<SyntaxNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

#[derive(Debug, Clone, Copy)]
struct Delimiter {
    start: usize,
    len: usize,
    orig_len: usize,
    ch: u8,
    can_open: bool,
    can_close: bool,
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    start: usize,
    image: bool,
    /// Delimiters from this index on lie inside the brackets
    delimiter_bottom: usize,
    active: bool,
}

struct LinkTail {
    url: Option<Range<usize>>,
    title: Option<Range<usize>>,
    end: usize,
}

struct InlineParser<'a> {
    src: &'a str,
    text: &'a [u8],
    pos: usize,
    out: Vec<(SyntaxKind, Range<usize>)>,
    delimiters: Vec<Delimiter>,
    brackets: Vec<Bracket>,
}

impl<'a> InlineParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            text: src.as_bytes(),
            pos: 0,
            out: Vec::new(),
            delimiters: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<(SyntaxKind, Range<usize>)> {
        while self.pos < self.text.len() {
            match self.text[self.pos] {
                b'\\' => self.escape(),
                b'`' => self.code_span(),
                b'<' => self.autolink(),
                b'*' | b'_' => self.delimiter_run(),
                b'!' if self.text.get(self.pos + 1) == Some(&b'[') => {
                    self.open_bracket(true);
                    self.pos += 2;
                }
                b'[' => {
                    self.open_bracket(false);
                    self.pos += 1;
                }
                b']' => self.close_bracket(),
                b'\n' => {
                    self.trailing_space_break();
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        self.process_emphasis(0);
        self.out
    }

    fn push(&mut self, kind: SyntaxKind, range: Range<usize>) {
        self.out.push((kind, range));
    }

    fn escape(&mut self) {
        match self.text.get(self.pos + 1) {
            Some(b) if b.is_ascii_punctuation() => {
                self.push(SyntaxKind::Escape, self.pos..self.pos + 2);
                self.pos += 2;
            }
            Some(b'\n') => {
                self.push(SyntaxKind::HardBreak, self.pos..self.pos + 1);
                self.pos += 1;
            }
            _ => self.pos += 1,
        }
    }

    /// Two or more spaces before a line end
    fn trailing_space_break(&mut self) {
        let mut from = self.pos;
        while from > 0 && self.text[from - 1] == b' ' {
            from -= 1;
        }
        if self.pos - from >= 2 {
            self.push(SyntaxKind::HardBreak, from..self.pos);
        }
    }

    fn run_length(&self, at: usize, ch: u8) -> usize {
        self.text[at..].iter().take_while(|&&b| b == ch).count()
    }

    fn code_span(&mut self) {
        let open = self.pos;
        let n = self.run_length(open, b'`');
        let mut i = open + n;
        while i < self.text.len() {
            if self.text[i] == b'`' {
                let run = self.run_length(i, b'`');
                if run == n {
                    self.push(SyntaxKind::InlineCode, open..i + n);
                    self.push(SyntaxKind::CodeMark, open..open + n);
                    self.push(SyntaxKind::CodeMark, i..i + n);
                    self.pos = i + n;
                    return;
                }
                i += run;
            } else {
                i += 1;
            }
        }
        self.pos = open + n;
    }

    fn autolink(&mut self) {
        let open = self.pos;
        match self.autolink_end(open + 1) {
            Some(close) => {
                self.push(SyntaxKind::Autolink, open..close + 1);
                self.push(SyntaxKind::LinkMark, open..open + 1);
                self.push(SyntaxKind::Url, open + 1..close);
                self.push(SyntaxKind::LinkMark, close..close + 1);
                self.pos = close + 1;
            }
            None => self.pos += 1,
        }
    }

    /// Index of the `>` closing a `<scheme:...>` or `<user@host>` autolink
    fn autolink_end(&self, from: usize) -> Option<usize> {
        let rest = &self.text[from..];
        let close = rest.iter().position(|&b| b == b'>')?;
        let body = &rest[..close];
        if body.iter().any(|&b| b == b'<' || b.is_ascii_whitespace() || b.is_ascii_control()) {
            return None;
        }

        let scheme_len = body
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
            .count();
        let is_uri = (2..=MAX_SCHEME_LEN).contains(&scheme_len)
            && body[0].is_ascii_alphabetic()
            && body.get(scheme_len) == Some(&b':');

        let is_email = body.iter().filter(|&&b| b == b'@').count() == 1
            && body.split(|&b| b == b'@').all(|part| {
                !part.is_empty()
                    && part
                        .iter()
                        .all(|b| b.is_ascii_alphanumeric() || b".!#$%&'*+/=?^_`{|}~-".contains(b))
            });

        (is_uri || is_email).then_some(from + close)
    }

    fn delimiter_run(&mut self) {
        let start = self.pos;
        let ch = self.text[start];
        let len = self.run_length(start, ch);
        let end = start + len;

        let before = self.src[..start].chars().next_back();
        let after = self.src[end..].chars().next();
        let before_ws = before.is_none_or(char::is_whitespace);
        let after_ws = after.is_none_or(char::is_whitespace);
        let before_punct = before.is_some_and(is_punctuation);
        let after_punct = after.is_some_and(is_punctuation);

        let left_flanking = !after_ws && (!after_punct || before_ws || before_punct);
        let right_flanking = !before_ws && (!before_punct || after_ws || after_punct);
        let (can_open, can_close) = if ch == b'*' {
            (left_flanking, right_flanking)
        } else {
            (
                left_flanking && (!right_flanking || before_punct),
                right_flanking && (!left_flanking || after_punct),
            )
        };

        if can_open || can_close {
            self.delimiters.push(Delimiter {
                start,
                len,
                orig_len: len,
                ch,
                can_open,
                can_close,
            });
        }
        self.pos = end;
    }

    fn open_bracket(&mut self, image: bool) {
        self.brackets.push(Bracket {
            start: self.pos,
            image,
            delimiter_bottom: self.delimiters.len(),
            active: true,
        });
    }

    fn close_bracket(&mut self) {
        let close = self.pos;
        self.pos += 1;
        let Some(bracket) = self.brackets.pop() else {
            return;
        };
        if !bracket.active {
            return;
        }
        let Some(tail) = parse_link_tail(self.text, close + 1) else {
            return;
        };

        self.process_emphasis(bracket.delimiter_bottom);
        self.delimiters.truncate(bracket.delimiter_bottom);

        let (kind, open_len) = if bracket.image {
            (SyntaxKind::Image, 2)
        } else {
            (SyntaxKind::Link, 1)
        };
        self.push(kind, bracket.start..tail.end);
        self.push(SyntaxKind::LinkMark, bracket.start..bracket.start + open_len);
        self.push(SyntaxKind::LinkMark, close..close + 1);
        self.push(SyntaxKind::LinkMark, close + 1..close + 2);
        if let Some(url) = tail.url {
            self.push(SyntaxKind::Url, url);
        }
        if let Some(title) = tail.title {
            self.push(SyntaxKind::LinkTitle, title);
        }
        self.push(SyntaxKind::LinkMark, tail.end - 1..tail.end);

        // Links may not contain links
        if !bracket.image {
            for open in &mut self.brackets {
                if !open.image {
                    open.active = false;
                }
            }
        }
        self.pos = tail.end;
    }

    /// Match emphasis delimiters from index `bottom` on
    fn process_emphasis(&mut self, bottom: usize) {
        let mut closer = bottom;
        while closer < self.delimiters.len() {
            let c = self.delimiters[closer];
            if !c.can_close || c.len == 0 {
                closer += 1;
                continue;
            }
            let opener = (bottom..closer).rev().find(|&o| {
                let d = &self.delimiters[o];
                d.len > 0 && d.ch == c.ch && d.can_open && !breaks_rule_of_three(d, &c)
            });
            let Some(o) = opener else {
                closer += 1;
                continue;
            };

            let used = if self.delimiters[o].len >= 2 && c.len >= 2 { 2 } else { 1 };
            let open_end = self.delimiters[o].start + self.delimiters[o].len;
            let open_from = open_end - used;
            let close_end = c.start + used;

            self.delimiters[o].len -= used;
            self.delimiters[closer].start += used;
            self.delimiters[closer].len -= used;
            for between in &mut self.delimiters[o + 1..closer] {
                between.len = 0;
            }

            let kind = if used == 2 {
                SyntaxKind::StrongEmphasis
            } else {
                SyntaxKind::Emphasis
            };
            self.push(kind, open_from..close_end);
            self.push(SyntaxKind::EmphasisMark, open_from..open_end);
            self.push(SyntaxKind::EmphasisMark, c.start..close_end);
        }
    }
}

/// Runs that can both open and close only pair when their combined length
/// is not a multiple of three, unless both are
fn breaks_rule_of_three(opener: &Delimiter, closer: &Delimiter) -> bool {
    (opener.can_close || closer.can_open)
        && (opener.orig_len + closer.orig_len) % 3 == 0
        && !(opener.orig_len % 3 == 0 && closer.orig_len % 3 == 0)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace())
}

fn skip_whitespace(text: &[u8], mut i: usize) -> usize {
    while matches!(text.get(i), Some(b' ' | b'\t' | b'\n')) {
        i += 1;
    }
    i
}

/// `(destination "title")` starting at `at`
fn parse_link_tail(text: &[u8], at: usize) -> Option<LinkTail> {
    if text.get(at) != Some(&b'(') {
        return None;
    }
    let mut i = skip_whitespace(text, at + 1);

    let url = if text.get(i) == Some(&b'<') {
        let start = i + 1;
        let mut j = start;
        loop {
            match text.get(j) {
                None | Some(b'\n' | b'<') => return None,
                Some(b'>') => break,
                Some(b'\\') => j += 2,
                Some(_) => j += 1,
            }
        }
        i = j + 1;
        (start < j).then_some(start..j)
    } else {
        let start = i;
        let mut depth = 0usize;
        while let Some(&b) = text.get(i) {
            match b {
                b'\\' if text.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
                b'(' => {
                    depth += 1;
                    i += 1;
                }
                b')' if depth == 0 => break,
                b')' => {
                    depth -= 1;
                    i += 1;
                }
                b if b.is_ascii_whitespace() || b.is_ascii_control() => break,
                _ => i += 1,
            }
        }
        if depth != 0 {
            return None;
        }
        (start < i).then_some(start..i)
    };

    let before_title = i;
    i = skip_whitespace(text, i);
    let mut title = None;
    if i > before_title
        && let Some(&open) = text.get(i).filter(|b| matches!(b, b'"' | b'\'' | b'('))
    {
        let close = if open == b'(' { b')' } else { open };
        let mut j = i + 1;
        loop {
            match text.get(j) {
                None => return None,
                Some(b'\\') => j += 2,
                Some(&b) if b == close => break,
                Some(b'(') if open == b'(' => return None,
                Some(_) => j += 1,
            }
        }
        title = Some(i..j + 1);
        i = skip_whitespace(text, j + 1);
    }

    (text.get(i) == Some(&b')')).then_some(LinkTail { url, title, end: i + 1 })
}
