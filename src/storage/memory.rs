use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Account, AccountId, Agreement, AgreementId};

use super::{AccountStore, AgreementStore};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: BTreeMap<AccountId, Account>,
    agreements: BTreeMap<AgreementId, Agreement>,
    last_account_id: AccountId,
    last_agreement_id: AgreementId,
}

/// In-memory store for accounts and agreements.
///
/// Clones share the same underlying maps, so one instance can back several
/// services at once. Listings come back in identifier order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    account_writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_account` calls served so far.
    pub fn account_writes(&self) -> usize {
        self.account_writes.load(Ordering::SeqCst)
    }

    /// Current persisted balance of an account, if it exists.
    pub async fn balance_of(&self, id: AccountId) -> Option<crate::domain::Amount> {
        let state = self.state.read().await;
        state.accounts.get(&id).map(|account| account.amount)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn save_account(&self, mut account: Account) -> Result<Account> {
        let mut state = self.state.write().await;

        if account.is_persisted() {
            state.last_account_id = state.last_account_id.max(account.id);
        } else {
            state.last_account_id += 1;
            account.id = state.last_account_id;
        }

        state.accounts.insert(account.id, account.clone());
        self.account_writes.fetch_add(1, Ordering::SeqCst);
        Ok(account)
    }

    async fn list_all_accounts(&self) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().cloned().collect())
    }

    async fn list_accounts_by_agreement_id(
        &self,
        agreement_id: AgreementId,
    ) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .filter(|account| account.agreement_id == agreement_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AgreementStore for MemoryStore {
    async fn find_agreement_by_name(&self, name: &str) -> Result<Option<Agreement>> {
        let state = self.state.read().await;
        Ok(state
            .agreements
            .values()
            .find(|agreement| agreement.name == name)
            .cloned())
    }

    async fn save_agreement(&self, mut agreement: Agreement) -> Result<Agreement> {
        let mut state = self.state.write().await;

        if agreement.is_persisted() {
            state.last_agreement_id = state.last_agreement_id.max(agreement.id);
        } else {
            state.last_agreement_id += 1;
            agreement.id = state.last_agreement_id;
        }

        state.agreements.insert(agreement.id, agreement.clone());
        Ok(agreement)
    }
}
