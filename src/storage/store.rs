use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Account, AccountId, Agreement, AgreementId};

/// Persistence for accounts.
///
/// Implementations hand out owned copies: callers mutate their copy and give it
/// back through [`AccountStore::save_account`]. Nothing is shared between calls.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Load an account by identifier.
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Persist an account. An account with id `0` is inserted and receives a
    /// fresh identifier; any other account is written in place.
    async fn save_account(&self, account: Account) -> Result<Account>;

    /// List every account. Ordering is defined by the store.
    async fn list_all_accounts(&self) -> Result<Vec<Account>>;

    /// List the accounts owned by one agreement. Ordering is defined by the store.
    async fn list_accounts_by_agreement_id(
        &self,
        agreement_id: AgreementId,
    ) -> Result<Vec<Account>>;
}

/// Persistence for agreements (parties).
#[async_trait]
pub trait AgreementStore: Send + Sync {
    async fn find_agreement_by_name(&self, name: &str) -> Result<Option<Agreement>>;

    /// Persist an agreement, assigning an identifier when its id is `0`.
    async fn save_agreement(&self, agreement: Agreement) -> Result<Agreement>;
}
