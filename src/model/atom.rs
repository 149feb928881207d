use super::types::{AtomId, Element};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub id: AtomId,
    pub kind: String,
    pub element: Element,
}

impl Atom {
    pub fn new(id: impl Into<AtomId>, kind: impl Into<String>, element: Element) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            element,
        }
    }
}
