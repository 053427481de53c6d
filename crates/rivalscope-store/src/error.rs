use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown entity: {0}")]
    UnknownEntity(Uuid),
    #[error("tenant {tenant_id} does not track entity {entity_id}")]
    LinkNotFound { tenant_id: Uuid, entity_id: Uuid },
    #[error("unknown alert: {0}")]
    AlertNotFound(Uuid),
    #[error("scan TTL must be positive")]
    InvalidTtl,
}

/// Failure modes of a coordinated refresh. `E` is the fetcher's own error
/// type; the coordinator never inspects it beyond logging.
#[derive(Debug, Error)]
pub enum RefreshError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("scan fetch failed")]
    FetchFailed(#[source] E),
    #[error("scan fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Store(#[from] StoreError),
}
