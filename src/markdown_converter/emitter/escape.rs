//! Escaping of literal text so it is not reinterpreted as Markdown syntax

use std::borrow::Cow;

/// Lookup table for characters escaped anywhere in text: \ * _ ` [ ] ~ <
/// All are ASCII, so byte-level indexing is safe.
const BODY_ESCAPE_LUT: [bool; 256] = {
    let mut lut = [false; 256];
    lut[b'\\' as usize] = true;
    lut[b'*' as usize] = true;
    lut[b'_' as usize] = true;
    lut[b'`' as usize] = true;
    lut[b'[' as usize] = true;
    lut[b']' as usize] = true;
    lut[b'~' as usize] = true;
    lut[b'<' as usize] = true;
    lut
};

/// Lookup table for characters that may start a block construct: = > - + # 0-9
const LINE_START_LUT: [bool; 256] = {
    let mut lut = [false; 256];
    lut[b'=' as usize] = true;
    lut[b'>' as usize] = true;
    lut[b'-' as usize] = true;
    lut[b'+' as usize] = true;
    lut[b'#' as usize] = true;
    let mut digit = b'0';
    while digit <= b'9' {
        lut[digit as usize] = true;
        digit += 1;
    }
    lut
};

/// Escapes Markdown-significant characters in literal text.
///
/// Cases handled:
/// - Body escapes: `\` `*` `_` `` ` `` `[` `]` `~` `<` -> backslash-prefixed
/// - `&` starting an entity or numeric character reference -> `\&`
/// - Line-start `=` `>` -> backslash-prefixed (prevents setext/blockquote)
/// - Line-start `-` followed by space, tab, `-` or end -> backslash-prefixed
/// - Line-start `+` followed by space, tab or end -> backslash-prefixed
/// - Line-start `#` forming an ATX heading opener -> backslash-prefixed
/// - Line-start `N.` / `N)` followed by space, tab or end -> escaped delimiter
///
/// `at_line_start` says whether `text` begins a line of output; every `\n`
/// inside `text` starts a new one.
pub(crate) fn escape_text(text: &str, at_line_start: bool) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let needs_body_escape = bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| BODY_ESCAPE_LUT[b as usize] || (b == b'&' && is_entity_start(&text[i..])));
    let needs_line_start_escape = (at_line_start && LINE_START_LUT[bytes[0] as usize])
        || bytes
            .windows(2)
            .any(|w| w[0] == b'\n' && LINE_START_LUT[w[1] as usize]);

    if !needs_body_escape && !needs_line_start_escape {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len() + 16);
    let mut line_start = at_line_start;
    let mut rest = text;
    while !rest.is_empty() {
        let line_end = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let (line, tail) = rest.split_at(line_end);
        escape_line(line, line_start, &mut result);
        line_start = true;
        rest = tail;
    }
    Cow::Owned(result)
}

fn escape_line(line: &str, at_line_start: bool, out: &mut String) {
    let dot_idx = if at_line_start {
        index_of_ordered_item_delimiter(line)
    } else {
        None
    };
    if at_line_start && needs_leading_backslash(line) {
        out.push('\\');
    }

    let mut last_copy_idx = 0;
    for (byte_idx, ch) in line.char_indices() {
        let escape = match ch {
            c if c.is_ascii() && BODY_ESCAPE_LUT[c as usize] => true,
            '&' => is_entity_start(&line[byte_idx..]),
            _ => Some(byte_idx) == dot_idx,
        };
        if escape {
            out.push_str(&line[last_copy_idx..byte_idx]);
            out.push('\\');
            last_copy_idx = byte_idx;
        }
    }
    out.push_str(&line[last_copy_idx..]);
}

/// Whether the first character of a line must be backslash-escaped.
///
/// Characters already covered by the body table are escaped anyway.
fn needs_leading_backslash(line: &str) -> bool {
    let bytes = line.as_bytes();
    let next = bytes.get(1).copied();
    let followed_by_blank = matches!(next, None | Some(b' ' | b'\t' | b'\n' | b'\r'));
    match bytes.first() {
        Some(b'=' | b'>') => true,
        Some(b'-') => followed_by_blank || next == Some(b'-'),
        Some(b'+') => followed_by_blank,
        Some(b'#') => is_atx_heading_start(line),
        _ => false,
    }
}

/// `#` to `######` followed by whitespace or end of line
pub(crate) fn is_atx_heading_start(line: &str) -> bool {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes)
        && matches!(line.as_bytes().get(hashes), None | Some(b' ' | b'\t' | b'\n' | b'\r'))
}

/// Byte index of the `.` or `)` in a `N.` ordered list opener at line start
fn index_of_ordered_item_delimiter(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let bytes = line.as_bytes();
    match (bytes.get(digits), bytes.get(digits + 1)) {
        (Some(b'.' | b')'), None | Some(b' ' | b'\t' | b'\n' | b'\r')) => Some(digits),
        _ => None,
    }
}

/// `&name;`, `&#123;` or `&#x1F;`: text a renderer would decode as a character
fn is_entity_start(s: &str) -> bool {
    let Some(body) = s.strip_prefix('&') else {
        return false;
    };
    let Some(end) = body.find(';') else {
        return false;
    };
    let name = &body[..end];
    if let Some(num) = name.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix(['x', 'X']) {
            return (1..=6).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit());
        }
        return (1..=7).contains(&num.len()) && num.bytes().all(|b| b.is_ascii_digit());
    }
    !name.is_empty()
        && name.len() <= 32
        && name.bytes().all(|b| b.is_ascii_alphanumeric())
        && name.as_bytes()[0].is_ascii_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_body_characters() {
        assert_eq!(escape_text("5 * 3 = 15", false), r"5 \* 3 = 15");
        assert_eq!(escape_text("a_b [c] `d` ~e~ <f>", false), r"a\_b \[c\] \`d\` \~e\~ \<f>");
        assert_eq!(escape_text(r"back\slash", false), r"back\\slash");
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_text("nothing to see", true), Cow::Borrowed(_)));
    }

    #[test]
    fn escapes_only_entity_like_ampersands() {
        assert_eq!(escape_text("AT&T", false), "AT&T");
        assert_eq!(escape_text("&amp; and &#38;", false), r"\&amp; and \&#38;");
    }

    #[test]
    fn escapes_line_start_constructs() {
        assert_eq!(escape_text("# not a heading", true), r"\# not a heading");
        assert_eq!(escape_text("#hashtag", true), "#hashtag");
        assert_eq!(escape_text("- item", true), r"\- item");
        assert_eq!(escape_text("+", true), r"\+");
        assert_eq!(escape_text("> quote", true), r"\> quote");
        assert_eq!(escape_text("1. first", true), r"1\. first");
        assert_eq!(escape_text("2) second", true), r"2\) second");
        assert_eq!(escape_text("=====", true), r"\=====");
        assert_eq!(escape_text("- item", false), "- item");
    }

    #[test]
    fn escapes_after_embedded_newline() {
        assert_eq!(escape_text("a\n# b", false), "a\n\\# b");
    }
}
