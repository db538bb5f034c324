//! AI inference endpoint contract and adapters

pub mod backend;
pub mod command_backend;
pub mod prompts;
pub mod request;
