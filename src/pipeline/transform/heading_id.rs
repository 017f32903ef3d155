//! Heading id assignment.

use crate::config::SlugMode;
use crate::dom::{Document, Transform};
use crate::utils::slug::Slugger;

/// Gives every `h1`..`h6` without an `id` a unique slug of its text.
///
/// Ids already present anywhere in the document are reserved first, so a
/// generated slug never collides with an explicit one.
pub struct HeadingIds {
    mode: SlugMode,
}

impl HeadingIds {
    pub const fn new(mode: SlugMode) -> Self {
        Self { mode }
    }
}

impl Transform for HeadingIds {
    fn transform(&self, mut doc: Document) -> Document {
        let mut slugger = Slugger::new(self.mode);
        doc.root.walk(&mut |elem| {
            if let Some(id) = elem.get_attr("id") {
                slugger.reserve(id);
            }
        });

        doc.root.walk_mut(&mut |elem| {
            if elem.heading_level().is_none() || elem.attrs.contains("id") {
                return;
            }
            // Empty slug: leave the heading unlinkable.
            if let Some(slug) = slugger.slug(&elem.text_content()) {
                elem.set_attr("id", slug);
            }
        });

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownOptions, from_markdown};

    fn ids(md: &str, mode: SlugMode) -> Vec<Option<String>> {
        let doc = HeadingIds::new(mode).transform(from_markdown(md, &MarkdownOptions::all()));
        doc.find_all(|e| e.heading_level().is_some())
            .into_iter()
            .map(|h| h.get_attr("id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_slugs_and_duplicates() {
        let got = ids("# Hello, World!\n\n## Hello World\n\n### Hello World", SlugMode::Safe);
        assert_eq!(
            got,
            vec![
                Some("hello-world".into()),
                Some("hello-world-1".into()),
                Some("hello-world-2".into()),
            ]
        );
    }

    #[test]
    fn test_explicit_id_kept_and_reserved() {
        let got = ids("## Setup\n\n## Other {#setup}", SlugMode::Safe);
        assert_eq!(got, vec![Some("setup-1".into()), Some("setup".into())]);
    }

    #[test]
    fn test_unicode_modes() {
        assert_eq!(ids("# Café Über", SlugMode::Safe), vec![Some("café-über".into())]);
        assert_eq!(ids("# Café Über", SlugMode::Ascii), vec![Some("cafe-uber".into())]);
    }

    #[test]
    fn test_empty_heading_gets_no_id() {
        assert_eq!(ids("## !!!", SlugMode::Safe), vec![None]);
    }
}
