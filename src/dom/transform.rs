//! Transform trait and pipeline combinator.
//!
//! ```ignore
//! let doc = Pipeline::new(doc)
//!     .pipe(&HeadingIds::new(mode))
//!     .pipe_opt(anchors.as_ref())
//!     .into_inner();
//! ```

use super::Document;

/// A single tree rewrite.
///
/// Transforms borrow themselves immutably so one configured instance can be
/// shared by every worker rendering documents in parallel.
pub trait Transform: Send + Sync {
    fn transform(&self, doc: Document) -> Document;
}

/// Left-to-right fold of transforms over one document.
pub struct Pipeline {
    doc: Document,
}

impl Pipeline {
    pub const fn new(doc: Document) -> Self {
        Self { doc }
    }

    pub fn pipe<T: Transform + ?Sized>(self, transform: &T) -> Self {
        Self {
            doc: transform.transform(self.doc),
        }
    }

    /// Apply when the transform is configured.
    pub fn pipe_opt<T: Transform>(self, transform: Option<&T>) -> Self {
        match transform {
            Some(t) => self.pipe(t),
            None => self,
        }
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, Node};

    struct Push(&'static str);

    impl Transform for Push {
        fn transform(&self, mut doc: Document) -> Document {
            doc.root.push(Node::text(self.0));
            doc
        }
    }

    #[test]
    fn test_pipeline_order() {
        let doc = Pipeline::new(Document::new(Element::new("article")))
            .pipe(&Push("a"))
            .pipe_opt(Some(&Push("b")))
            .pipe_opt::<Push>(None)
            .into_inner();
        assert_eq!(doc.root.text_content(), "ab");
    }
}
