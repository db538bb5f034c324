//! Export functionality

pub mod excel;

pub use excel::export_quotation;
