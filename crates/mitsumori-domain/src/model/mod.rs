//! Domain model types

pub mod editable_line_item;

pub use editable_line_item::{EditTotal, EditableLineItem, NEW_ITEM_NAME};
