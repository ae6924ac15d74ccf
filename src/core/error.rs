use thiserror::Error;

use crate::domain::entity::EntityId;

/// Every way a world operation can be refused.
///
/// A failed operation leaves the world exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("entity {0} is not part of this world")]
    UnknownEntity(EntityId),
    #[error("constraint endpoint {0} is missing or has no body")]
    UnresolvedEndpoint(EntityId),
    #[error("entity {0} is not a physical entity")]
    NotPhysical(EntityId),
    #[error("constraint cannot join entity {0} to itself")]
    SelfConstraint(EntityId),
    #[error("entity {0} was already added to a world")]
    AlreadyAdded(EntityId),
    #[error("entity ids exhausted")]
    IdsExhausted,
    #[error("polygon needs at least 3 distinct, non-collinear vertices (got {0})")]
    InvalidPolygon(usize),
    #[error("polygon decomposition produced a degenerate triangle (area {area})")]
    DegenerateGeometry { area: f32 },
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("definition error: {0}")]
    Definition(String),
    #[error("settings error: {0}")]
    Settings(String),
}

impl From<serde_json::Error> for WorldError {
    fn from(err: serde_json::Error) -> Self {
        WorldError::Definition(err.to_string())
    }
}
