//! dbm-core - Core library for dbmarshal
//!
//! This crate provides the filesystem side of dbmarshal: numbered revision
//! discovery, static object (procedure/trigger) definitions, the migrations
//! directory layout, and saved connection profiles.

pub mod error;
pub mod layout;
mod newtype_string;
pub mod profile;
pub mod revision;
pub mod revision_store;
pub mod sql_utils;
pub mod static_store;
pub mod statics;

pub use error::{CoreError, CoreResult};
pub use layout::MigrationsRoot;
pub use profile::{ConnectionProfile, Driver, ProfileAlias, ProfileStore};
pub use revision::{Revision, RevisionFile, RevisionId};
pub use revision_store::RevisionStore;
pub use static_store::{DeclaredStatics, StaticStore};
pub use statics::{StaticDefinition, StaticKind, StaticName};
