use crate::domain::Agreement;
use crate::storage::AgreementStore;

use super::LedgerError;

/// Lookup and creation of agreements (parties) by display name.
#[derive(Debug, Clone)]
pub struct AgreementService<S> {
    store: S,
}

impl<S: AgreementStore> AgreementService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Agreement>, LedgerError> {
        Ok(self.store.find_agreement_by_name(name).await?)
    }

    /// Like [`AgreementService::find_by_name`], but a miss is an error.
    pub async fn get_by_name(&self, name: &str) -> Result<Agreement, LedgerError> {
        self.find_by_name(name)
            .await?
            .ok_or_else(|| LedgerError::AgreementNotFound(name.to_string()))
    }

    /// Register a new agreement. Names are unique.
    pub async fn add_agreement(&self, name: impl Into<String>) -> Result<Agreement, LedgerError> {
        let name = name.into();
        if self.find_by_name(&name).await?.is_some() {
            return Err(LedgerError::AgreementAlreadyExists(name));
        }

        let saved = self.store.save_agreement(Agreement::new(name)).await?;
        tracing::debug!(agreement_id = saved.id, "Added agreement {}", saved.name);
        Ok(saved)
    }
}
