use std::fmt;

/// Location of a node inside a document, rendered as `$.field[3].inner`.
///
/// Each frame borrows its parent, so descending into a child costs nothing;
/// the text is only built when a path is displayed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JsonPath<'a> {
    parent: Option<&'a JsonPath<'a>>,
    segment: Segment<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Root,
    Field(&'a str),
    Index(usize),
}

impl JsonPath<'static> {
    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            segment: Segment::Root,
        }
    }
}

impl<'a> JsonPath<'a> {
    pub(crate) fn push_field<'b>(&'b self, field: &'b str) -> JsonPath<'b> {
        JsonPath {
            parent: Some(self),
            segment: Segment::Field(field),
        }
    }

    pub(crate) fn push_index<'b>(&'b self, index: usize) -> JsonPath<'b> {
        JsonPath {
            parent: Some(self),
            segment: Segment::Index(index),
        }
    }
}

impl fmt::Display for JsonPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            fmt::Display::fmt(parent, f)?;
        }
        match self.segment {
            Segment::Root => f.write_str("$"),
            Segment::Field(name) => write!(f, ".{}", name),
            Segment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}
