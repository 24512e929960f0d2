// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use kassa::application::{AccountLedger, AgreementService, TransferOrchestrator};
use kassa::domain::{Account, AccountId, AccountType, Agreement, AgreementId, Amount};
use kassa::storage::{AccountStore, MemoryStore, Repository};
use tempfile::TempDir;
use tokio::sync::Barrier;

/// Helper to create a ledger over an empty in-memory store
pub fn memory_ledger() -> AccountLedger<MemoryStore> {
    AccountLedger::new(MemoryStore::new())
}

/// Helper to create a SQLite repository in a temporary directory
pub async fn test_repository() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());
    let repo = Repository::init(&url).await?;
    Ok((repo, temp_dir))
}

/// Test fixture: two parties over one shared in-memory store
pub struct Parties {
    pub store: MemoryStore,
    pub agreements: AgreementService<MemoryStore>,
    pub orchestrator: TransferOrchestrator<MemoryStore>,
    pub payer: Agreement,
    pub payee: Agreement,
}

impl Parties {
    pub async fn new() -> Result<Self> {
        let store = MemoryStore::new();
        let agreements = AgreementService::new(store.clone());
        let orchestrator = TransferOrchestrator::new(AccountLedger::new(store.clone()));

        let payer = agreements.add_agreement("payer").await?;
        let payee = agreements.add_agreement("payee").await?;

        Ok(Self {
            store,
            agreements,
            orchestrator,
            payer,
            payee,
        })
    }

    /// Open an account for one of the parties
    pub async fn open(
        &self,
        agreement: &Agreement,
        account_type: AccountType,
        amount: Amount,
    ) -> Result<Account> {
        let number = format!("{}-{}", agreement.name, account_type);
        Ok(self
            .orchestrator
            .ledger()
            .create_account(agreement, number, account_type, amount)
            .await?)
    }

    pub async fn balance(&self, account: &Account) -> Amount {
        self.store.balance_of(account.id).await.unwrap()
    }
}

/// Account store that holds reads of one account until `parties` callers have
/// all loaded it, so every one of them sees the same balance.
pub struct GatedStore {
    inner: MemoryStore,
    gate_id: AccountId,
    parties: usize,
    arrivals: AtomicUsize,
    barrier: Barrier,
}

impl GatedStore {
    pub fn new(inner: MemoryStore, gate_id: AccountId, parties: usize) -> Self {
        Self {
            inner,
            gate_id,
            parties,
            arrivals: AtomicUsize::new(0),
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl AccountStore for GatedStore {
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let account = self.inner.find_account_by_id(id).await?;
        if id == self.gate_id && self.arrivals.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait().await;
        }
        Ok(account)
    }

    async fn save_account(&self, account: Account) -> Result<Account> {
        self.inner.save_account(account).await
    }

    async fn list_all_accounts(&self) -> Result<Vec<Account>> {
        self.inner.list_all_accounts().await
    }

    async fn list_accounts_by_agreement_id(
        &self,
        agreement_id: AgreementId,
    ) -> Result<Vec<Account>> {
        self.inner.list_accounts_by_agreement_id(agreement_id).await
    }
}
