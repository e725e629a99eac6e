//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod common;
pub(crate) mod describe;
pub(crate) mod export_statics;
pub(crate) mod setup;
pub(crate) mod status;
