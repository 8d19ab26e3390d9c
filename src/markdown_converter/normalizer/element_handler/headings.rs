use smallvec::smallvec;

use super::super::structure::heading;
use super::{Element, Fragment, Handlers};

pub(super) fn headings_handler(handlers: &dyn Handlers, element: Element) -> Option<Fragment> {
    let level = element
        .tag
        .strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))?;
    heading(level, handlers.walk_children(element.node)).map(|h| smallvec![h])
}
