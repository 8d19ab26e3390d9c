//! Rendered table widget

use crate::editor::syntax::{SyntaxKind, SyntaxNode};

use super::{Decoration, DecorationRange, Widget, WidgetSpec};

/// Cell texts of a header or body row, counting empty cells between pipes
fn row_cells(row: &SyntaxNode, doc: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut pending: Option<String> = None;
    let mut seen_pipe = false;
    for child in &row.children {
        match child.kind {
            SyntaxKind::TableDelimiter => {
                if seen_pipe || pending.is_some() {
                    cells.push(pending.take().unwrap_or_default());
                }
                seen_pipe = true;
            }
            SyntaxKind::TableCell => pending = Some(doc[child.range.clone()].to_string()),
            _ => {}
        }
    }
    cells.extend(pending);
    cells
}

/// Table source replaced by a block widget holding its cells
pub fn decorate_table(node: &SyntaxNode, doc: &str, emit: &mut dyn FnMut(DecorationRange)) {
    if node.kind != SyntaxKind::Table {
        return;
    }
    let Some(header) = node.child(SyntaxKind::TableHeader) else {
        return;
    };
    let rows = node
        .children
        .iter()
        .filter(|c| c.kind == SyntaxKind::TableRow)
        .map(|row| row_cells(row, doc))
        .collect();
    emit(DecorationRange::new(
        node.from(),
        node.to(),
        Decoration::Replace(WidgetSpec {
            widget: Widget::Table {
                header: row_cells(header, doc),
                rows,
            },
            // Keeps the cursor drawn against the text before the widget
            side: 1,
        }),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::syntax::SyntaxTree;

    fn decorate(doc: &str) -> Vec<DecorationRange> {
        let tree = SyntaxTree::parse(doc);
        let mut out = Vec::new();
        tree.iterate(0..doc.len(), |node| decorate_table(node, doc, &mut |d| out.push(d)));
        out
    }

    #[test]
    fn table_is_replaced_by_widget() {
        let doc = "| Name | Qty |\n|------|----:|\n| `a` | 1 |\n|  | 2 |";
        let decos = decorate(doc);
        assert_eq!(decos.len(), 1);
        assert_eq!((decos[0].from, decos[0].to), (0, doc.len()));
        let Decoration::Replace(spec) = &decos[0].decoration else {
            panic!("expected a replacing widget");
        };
        assert_eq!(
            spec.widget,
            Widget::Table {
                header: vec!["Name".into(), "Qty".into()],
                rows: vec![vec!["`a`".into(), "1".into()], vec![String::new(), "2".into()]],
            }
        );
    }

    #[test]
    fn pipe_text_without_delimiter_row_is_not_a_table() {
        assert!(decorate("a | b\nc | d").is_empty());
    }
}
