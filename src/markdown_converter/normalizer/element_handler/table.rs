use std::rc::Rc;

use log::debug;
use markup5ever_rcdom::Node;

use crate::markdown_converter::node::MdNode;

use super::super::node_util::get_node_tag_name;
use super::super::structure::{paragraph, table};
use super::{Element, Fragment, Handlers};

/// Cells of one row, each as its element's converted content
type Row = Vec<Vec<MdNode>>;

/// `<table>` becomes a pipe table.
///
/// `<thead>` rows come first and `<tfoot>` rows last. The first row is the
/// header row. A `<caption>` becomes a paragraph before the table.
pub(super) fn table_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let mut caption = Vec::new();
    let mut head: Vec<Row> = Vec::new();
    let mut body: Vec<Row> = Vec::new();
    let mut foot: Vec<Row> = Vec::new();

    for child in element.node.children.borrow().iter() {
        match get_node_tag_name(child) {
            Some("caption") => caption.extend(handlers.walk_children(child)),
            Some("thead") => collect_rows(handlers, child, &mut head),
            Some("tbody") => collect_rows(handlers, child, &mut body),
            Some("tfoot") => collect_rows(handlers, child, &mut foot),
            Some("tr") => body.push(row_cells(handlers, child)),
            _ => {}
        }
    }

    let rows: Vec<Row> = head.into_iter().chain(body).chain(foot).collect();
    debug!("Converting table with {} rows", rows.len());

    let mut fragment = Fragment::new();
    fragment.extend(paragraph(caption));
    fragment.extend(table(rows));
    (!fragment.is_empty()).then_some(fragment)
}

fn collect_rows(handlers: &dyn Handlers, section: &Rc<Node>, rows: &mut Vec<Row>) {
    for row in section.children.borrow().iter() {
        if get_node_tag_name(row) == Some("tr") {
            rows.push(row_cells(handlers, row));
        }
    }
}

fn row_cells(handlers: &dyn Handlers, row: &Rc<Node>) -> Row {
    row.children
        .borrow()
        .iter()
        .filter(|cell| matches!(get_node_tag_name(cell), Some("td" | "th")))
        .map(|cell| handlers.walk_children(cell))
        .collect()
}
