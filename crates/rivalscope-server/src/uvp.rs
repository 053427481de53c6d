//! Per-tenant value-proposition claims feeding gap synthesis.
//!
//! Stands in for the tenant profile service at the correlation boundary:
//! tenants push their UVP claims through the API and synthesis reads them
//! back as correlation data.

use std::collections::HashMap;

use rivalscope_insights::CorrelationData;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct UvpRegistry {
    inner: RwLock<HashMap<Uuid, Vec<String>>>,
}

impl UvpRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tenant's claims wholesale, dropping empties. Returns
    /// the number of claims stored.
    pub async fn set_claims(&self, tenant_id: Uuid, claims: Vec<String>) -> usize {
        let cleaned: Vec<String> = claims
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        let count = cleaned.len();
        self.inner.write().await.insert(tenant_id, cleaned);
        count
    }

    /// Correlation input for synthesis; tenants with nothing on file get
    /// empty correlation, never an error.
    pub async fn correlation_for(&self, tenant_id: Uuid) -> CorrelationData {
        CorrelationData {
            uvp_claims: self
                .inner
                .read()
                .await
                .get(&tenant_id)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_claims_cleans_and_replaces() {
        let registry = UvpRegistry::new();
        let tenant = Uuid::new_v4();

        assert_eq!(
            registry
                .set_claims(
                    tenant,
                    vec!["  fast onboarding ".to_string(), String::new()]
                )
                .await,
            1
        );
        assert_eq!(
            registry.correlation_for(tenant).await.uvp_claims,
            vec!["fast onboarding".to_string()]
        );

        registry.set_claims(tenant, vec!["new claim".to_string()]).await;
        assert_eq!(
            registry.correlation_for(tenant).await.uvp_claims,
            vec!["new claim".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_tenant_gets_empty_correlation() {
        let registry = UvpRegistry::new();
        assert!(registry
            .correlation_for(Uuid::new_v4())
            .await
            .uvp_claims
            .is_empty());
    }
}
