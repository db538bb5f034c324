//! Domain layer - quotation normalization, editing, repository traits

pub mod model;
pub mod repository;
pub mod service;
