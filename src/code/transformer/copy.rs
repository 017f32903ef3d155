//! Copy-to-clipboard button.

use std::num::NonZeroU32;

use crate::code::CodeBlock;
use crate::config::{ConfigError, CopyConfig};
use crate::dom::{Element, Node};

pub struct CopyButton {
    timeout: NonZeroU32,
}

impl CopyButton {
    /// `timeout` is how long (ms) the button stays in its `copied` state.
    pub fn new(config: &CopyConfig) -> Result<Self, ConfigError> {
        u32::try_from(config.timeout)
            .ok()
            .and_then(NonZeroU32::new)
            .map(|timeout| Self { timeout })
            .ok_or_else(|| {
                ConfigError::invalid(
                    CopyConfig::FIELDS.timeout,
                    format!(
                        "must be a positive number of milliseconds, got {}",
                        config.timeout
                    ),
                )
            })
    }

    pub fn timeout(&self) -> u32 {
        self.timeout.get()
    }

    pub fn decorate(&self, block: &CodeBlock, root: &mut Element) {
        let timeout = self.timeout.get();
        let onclick = format!(
            "navigator.clipboard.writeText(this.dataset.code);\
             this.classList.add('copied');\
             setTimeout(()=>this.classList.remove('copied'),{timeout})"
        );

        let button = Element::new("button")
            .attr("class", vec!["copy".to_string()])
            .attr("type", "button")
            .attr("title", "Copy code")
            .attr("data-code", block.plain_text())
            .attr("data-timeout", timeout.to_string())
            .attr("onclick", onclick)
            .child(span("ready"))
            .child(span("success"));
        root.push_elem(button);
    }
}

fn span(class: &str) -> Node {
    Node::element(Element::new("span").attr("class", vec![class.to_string()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_timeout() {
        for timeout in [0, -1, -2000, i64::from(u32::MAX) + 1] {
            let err = CopyButton::new(&CopyConfig { timeout }).err().unwrap();
            assert!(err.to_string().contains("markdown.code.copy.timeout"), "{err}");
        }
    }

    #[test]
    fn test_timeout_kept() {
        for timeout in [1, 2000, 15_000] {
            let button = CopyButton::new(&CopyConfig { timeout }).unwrap();
            assert_eq!(i64::from(button.timeout()), timeout);
        }
    }

    #[test]
    fn test_button_payload() {
        let block = CodeBlock::new("a < b\nc\n", None, "");
        let mut root = Element::new("pre");
        CopyButton::new(&CopyConfig { timeout: 1500 })
            .unwrap()
            .decorate(&block, &mut root);

        let button = root.child_elements().last().unwrap();
        assert_eq!(button.tag, "button");
        assert!(button.has_class("copy"));
        assert_eq!(button.get_attr("data-code"), Some("a < b\nc"));
        assert_eq!(button.get_attr("data-timeout"), Some("1500"));
        assert!(button.get_attr("onclick").unwrap().ends_with(",1500)"));
    }
}
