//! `copier` crate — moves the records of a model into another model.
//!
//! The copier works against any [`EntityRegistry`]: an in-memory one for
//! tests and a SQLite one that introspects the live schema. The `moves`
//! module holds the site's own relocations.

pub mod registry;
pub mod error;
pub mod copy;
pub mod memory;
pub mod sqlite;
pub mod moves;

pub use registry::{EntityRegistry, FieldDescriptor, FieldKind, ModelRef, Record, RecordType};
pub use error::{CopyError, RegistryError};
pub use copy::{copy_model_data, CopyOptions, CopyReport};
pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;
pub use moves::{relocate_site_models, MoveOutcome, SITE_MOVES};

#[cfg(test)]
mod copy_tests;
