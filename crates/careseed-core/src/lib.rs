//! Core contracts for careseed.
//!
//! Entity types, identifiers, the manifest registry that links generator
//! runs together, and the SQL literal serializer shared by the generator and
//! its tests.

mod atomic;
pub mod entity;
pub mod error;
pub mod identifier;
pub mod record;
pub mod registry;
pub mod value;

pub use entity::EntityType;
pub use error::{Error, Result};
pub use identifier::Identifier;
pub use record::{ForeignRef, Record};
pub use registry::{ManifestRegistry, ManifestStore, ManifestWriter};
pub use value::{Money, SqlValue, TIMESTAMP_FORMAT, escape_text, quote_column, unescape_text};
