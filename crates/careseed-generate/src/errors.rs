use thiserror::Error;

use careseed_core::{EntityType, Identifier};

/// Errors emitted by the fixture emitter.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{entity}: {operation} failed: {source}")]
    Entity {
        entity: EntityType,
        operation: &'static str,
        #[source]
        source: Box<GenerationError>,
    },
    #[error("{entity}.{column} references {target} {id}, which is not registered")]
    DanglingReference {
        entity: EntityType,
        column: &'static str,
        target: EntityType,
        id: Identifier,
    },
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Core(#[from] careseed_core::Error),
}

impl GenerationError {
    /// Attach the entity type and operation that were in progress.
    pub fn during(self, entity: EntityType, operation: &'static str) -> Self {
        GenerationError::Entity {
            entity,
            operation,
            source: Box::new(self),
        }
    }
}
