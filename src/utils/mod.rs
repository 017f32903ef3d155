//! Utility modules.

pub mod html;
pub mod plural;
pub mod slug;

pub use plural::plural_count;
