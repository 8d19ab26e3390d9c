use std::collections::BTreeSet;
use std::ops::Range;

use crate::editor::syntax::lines::line_start;

use super::{Decoration, DecorationRange, DecorationSet, LineSpec};

/// `cm-has-cursor` line decoration on every line a selection range touches.
///
/// Ranges may be given in either direction; positions past the end of the
/// document are clamped.
#[must_use]
pub fn cursor_decorations(doc: &str, selection: &[Range<usize>]) -> DecorationSet {
    let mut starts = BTreeSet::new();
    for range in selection {
        let from = clamp(doc, range.start.min(range.end));
        let to = clamp(doc, range.start.max(range.end));
        let mut line = line_start(doc, from);
        starts.insert(line);
        while let Some(newline) = doc[line..].find('\n') {
            line += newline + 1;
            if line > to {
                break;
            }
            starts.insert(line);
        }
    }
    starts
        .into_iter()
        .map(|at| {
            DecorationRange::new(
                at,
                at,
                Decoration::Line(LineSpec {
                    class: "cm-has-cursor".to_string(),
                }),
            )
        })
        .collect()
}

fn clamp(doc: &str, pos: usize) -> usize {
    let mut pos = pos.min(doc.len());
    while !doc.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_each_selected_line_once() {
        let doc = "one\ntwo\nthree";
        let set = cursor_decorations(doc, &[1..1, 2..9, 12..5]);
        let lines: Vec<_> = set.iter().map(|d| d.from).collect();
        assert_eq!(lines, vec![0, 4, 8]);
    }

    #[test]
    fn cursor_at_end_of_document() {
        let doc = "a\n";
        let set = cursor_decorations(doc, &[10..10]);
        assert_eq!(set.iter().map(|d| d.from).collect::<Vec<_>>(), vec![2]);
    }
}
