//! Domain services

pub mod cost_parser;
pub mod man_yen;
pub mod quotation_editor;

pub use cost_parser::{normalize_width, parse_cost_range, resolve_line_item, ResolvedItem};
pub use man_yen::{format_cost_range, format_man_yen, man_to_yen, yen_to_man, YEN_PER_MAN};
pub use quotation_editor::{EditSession, EditorError, PanelState, QuotationPanel};
