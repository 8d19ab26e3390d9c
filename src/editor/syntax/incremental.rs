//! Re-parsing only the blocks an edit can affect

use tracing::trace;

use crate::editor::edit::TextEdit;

use super::block::{parse_block, skip_blank};
use super::lines::{line_start, lines_from};
use super::tree::{SyntaxNode, SyntaxTree, TreeChange, apply_delta};

impl SyntaxTree {
    /// Syntax tree of `new_doc`, which is this tree's document with `edit`
    /// applied.
    ///
    /// Parsing restarts two blocks before the edit, since an edit on a
    /// block's first line (or a table's delimiter row) can merge it into its
    /// predecessor. It stops as soon
    /// as the next block would start on a line wholly after the edit where an
    /// old block now starts; from there on the old blocks are reused, shifted.
    /// The result equals [`SyntaxTree::parse`] on `new_doc`.
    #[must_use]
    pub fn apply_edit(&self, new_doc: &str, edit: &TextEdit) -> (SyntaxTree, TreeChange) {
        let delta = edit.delta();
        let edit_end = edit.range.start + edit.insert.len();

        let touched = self.blocks.partition_point(|b| b.range.start < edit.range.start);
        let restart = touched.saturating_sub(2);
        let from = if touched == 0 {
            0
        } else {
            line_start(new_doc, self.blocks[restart].range.start)
        };

        let lines = lines_from(new_doc, from);
        let mut fresh: Vec<SyntaxNode> = Vec::new();
        let mut candidate = self.blocks.partition_point(|b| b.range.start < edit.range.end);
        let mut reused_from = None;
        let mut i = skip_blank(&lines, 0);
        while i < lines.len() {
            let line = lines[i];
            let start = line.trim_start().start;
            while candidate < self.blocks.len() && shifted_start(&self.blocks[candidate], delta) < start {
                candidate += 1;
            }
            // The whole line, including the newline before it, is unedited text
            if line.start > edit_end
                && candidate < self.blocks.len()
                && shifted_start(&self.blocks[candidate], delta) == start
            {
                reused_from = Some(candidate);
                break;
            }
            let (block, next) = parse_block(&lines, i);
            fresh.push(block);
            i = skip_blank(&lines, next);
        }

        let old_end = reused_from.unwrap_or(self.blocks.len());
        let fresh_count = fresh.len();
        let reused = self.blocks.len() - old_end;
        let mut blocks = Vec::with_capacity(restart + fresh_count + reused);
        blocks.extend_from_slice(&self.blocks[..restart]);
        blocks.extend(fresh);
        blocks.extend(self.blocks[old_end..].iter().cloned().map(|b| b.shifted(delta)));

        trace!(
            target: "markdown_bridge::editor",
            restart,
            reparsed = fresh_count,
            reused,
            "incremental parse"
        );

        let change = TreeChange {
            old_blocks: restart..old_end,
            new_blocks: restart..restart + fresh_count,
            delta,
        };
        (
            SyntaxTree {
                blocks,
                len: new_doc.len(),
            },
            change,
        )
    }
}

fn shifted_start(block: &SyntaxNode, delta: isize) -> usize {
    apply_delta(block.range.start, delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_and_compare(doc: &str, edit: TextEdit) -> TreeChange {
        let old = SyntaxTree::parse(doc);
        let mut new_doc = doc.to_string();
        edit.apply_to(&mut new_doc);
        let (incremental, change) = old.apply_edit(&new_doc, &edit);
        assert_eq!(incremental, SyntaxTree::parse(&new_doc), "edit {edit:?} on {doc:?}");
        change
    }

    #[test]
    fn typing_in_a_paragraph_reparses_locally() {
        let doc = "# One\n\nfirst\n\nsecond\n\nthird\n\nfourth";
        let change = edit_and_compare(doc, TextEdit::insert(doc.find("third").unwrap_or(0), "the "));
        assert_eq!(change.old_blocks, 1..4);
        assert_eq!(change.new_blocks, 1..4);
        assert_eq!(change.delta, 4);
    }

    #[test]
    fn breaking_a_heading_merges_into_paragraph() {
        let doc = "para\n# heading\n\nafter";
        let change = edit_and_compare(doc, TextEdit::replace(6..7, "x"));
        assert_eq!(change.new_blocks, 0..1);
    }

    #[test]
    fn opening_a_fence_swallows_the_rest() {
        let doc = "a\n\nb\n\nc\n\nd";
        edit_and_compare(doc, TextEdit::insert(3, "```\n"));
    }

    #[test]
    fn deleting_a_blank_line_joins_paragraphs() {
        let doc = "one\n\ntwo\n\nthree";
        edit_and_compare(doc, TextEdit::delete(3..4));
    }

    #[test]
    fn edit_at_document_start() {
        let doc = "- a\n- b\n\ntext";
        edit_and_compare(doc, TextEdit::insert(0, "  "));
        edit_and_compare(doc, TextEdit::delete(0..2));
    }
}
