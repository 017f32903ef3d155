//! Document tree shared by every rendering pass.
//!
//! # Modules
//!
//! - `node`: `Document`, `Element`, `Node`, `Text` and `Attrs`
//! - `transform`: `Transform` trait and the `Pipeline` combinator
//! - `render`: HTML serialization
//!
//! The tree is a plain owned structure. A pass takes a `Document` by value
//! and hands back the rewritten one, so two passes can never observe the
//! same tree mid-mutation.

mod node;
mod render;
mod transform;

pub use node::{AttrValue, Attrs, Document, Element, Node, Text, is_heading};
pub use render::{RenderConfig, render_document, render_element};
pub use transform::{Pipeline, Transform};
