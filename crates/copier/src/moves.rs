//! The site's model relocations.
//!
//! `Address` and `Letting` moved from `oc_lettings_site` into `lettings`, and
//! `Profile` moved into `profiles`. Each move copies the rows of the old
//! table into the new one after the schema migrations have created it.

use serde::Serialize;
use tracing::{info, warn};

use db::DbPool;

use crate::copy::{copy_model_data, CopyOptions, CopyReport};
use crate::registry::ModelRef;
use crate::sqlite::SqliteRegistry;
use crate::CopyError;

/// Namespaces that own tables in the site database.
pub const SITE_NAMESPACES: &[&str] = &["auth", "oc_lettings_site", "lettings", "profiles"];

/// One model relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelMove {
    pub from: (&'static str, &'static str),
    pub to: (&'static str, &'static str),
}

impl ModelMove {
    pub fn source(&self) -> ModelRef {
        ModelRef::new(self.from.0, self.from.1)
    }

    pub fn destination(&self) -> ModelRef {
        ModelRef::new(self.to.0, self.to.1)
    }
}

/// The site's moves, in dependency order: an address must exist before the
/// letting that references it.
pub const SITE_MOVES: &[ModelMove] = &[
    ModelMove { from: ("oc_lettings_site", "Address"), to: ("lettings", "Address") },
    ModelMove { from: ("oc_lettings_site", "Letting"), to: ("lettings", "Letting") },
    ModelMove { from: ("oc_lettings_site", "Profile"), to: ("profiles", "Profile") },
];

/// Result of one move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub source: ModelRef,
    pub destination: ModelRef,
    /// `None` when the destination already held records and the move was skipped.
    pub report: Option<CopyReport>,
}

/// Run [`SITE_MOVES`] against the site database.
pub async fn relocate_site_models(
    pool: &DbPool,
    options: CopyOptions,
) -> Result<Vec<MoveOutcome>, CopyError> {
    relocate(pool, SITE_NAMESPACES, SITE_MOVES, options).await
}

/// Run `moves` in order inside a single transaction.
///
/// A move whose destination already holds records is skipped, so running the
/// relocation twice does not duplicate anything. Any failure rolls every
/// move back.
pub async fn relocate(
    pool: &DbPool,
    namespaces: &[&str],
    moves: &[ModelMove],
    options: CopyOptions,
) -> Result<Vec<MoveOutcome>, CopyError> {
    let registry = SqliteRegistry::begin(pool, namespaces)
        .await
        .map_err(CopyError::Registry)?;

    let mut outcomes = Vec::with_capacity(moves.len());

    for model_move in moves {
        let source = model_move.source();
        let destination = model_move.destination();

        let existing = registry
            .count(&destination)
            .await
            .map_err(CopyError::Registry)?;
        if existing > 0 && options.should_run() {
            warn!(
                "{} already holds {} records; not copying from {}",
                destination, existing, source
            );
            outcomes.push(MoveOutcome { source, destination, report: None });
            continue;
        }

        let report = copy_model_data(&registry, &source, &destination, options).await?;
        info!("{} -> {}: {} records copied", source, destination, report.copied);
        outcomes.push(MoveOutcome { source, destination, report: Some(report) });
    }

    registry.commit().await.map_err(CopyError::Registry)?;
    Ok(outcomes)
}
