//! CLI subcommands

pub mod export_json;
pub mod import_json;
pub mod inspect;
