use crate::domain::{Account, AccountId, AccountType, Agreement, Amount, exact_add, exact_sub};
use crate::storage::AccountStore;

use super::LedgerError;

/// The only component allowed to change an account's balance.
///
/// Every operation loads fresh copies from the store, mutates them locally and
/// hands them back through `save_account`. There is no locking: two concurrent
/// calls touching the same account can both pass the sufficiency check against
/// the same stale balance, and the later write wins.
#[derive(Debug, Clone)]
pub struct AccountLedger<S> {
    store: S,
}

impl<S: AccountStore> AccountLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take `amount` out of a single account.
    ///
    /// Returns `Ok(false)` without touching the store when the balance does not
    /// cover the amount. On success the account is written exactly once.
    pub async fn debit(&self, account_id: AccountId, amount: Amount) -> Result<bool, LedgerError> {
        ensure_non_negative(amount)?;

        let mut account = self
            .store
            .find_account_by_id(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        if !account.can_cover(amount) {
            tracing::warn!(
                account_id,
                balance = %account.amount,
                requested = %amount,
                "Debit refused: insufficient funds"
            );
            return Ok(false);
        }

        account.amount = exact_sub(account.amount, amount)
            .map_err(|err| LedgerError::arithmetic("debit", err))?;

        let saved = self.store.save_account(account).await?;
        tracing::debug!(account_id, balance = %saved.amount, "Debited {}", amount);
        Ok(true)
    }

    /// Move `amount` from one account to another.
    ///
    /// Either both balances change and both accounts are saved (source first),
    /// or nothing is written and the result is `Ok(false)` or an error. A leg
    /// that cannot be computed without rounding is `PrecisionLoss`.
    pub async fn transfer(
        &self,
        source_id: AccountId,
        destination_id: AccountId,
        amount: Amount,
    ) -> Result<bool, LedgerError> {
        ensure_non_negative(amount)?;

        let mut source = self
            .store
            .find_account_by_id(source_id)
            .await?
            .ok_or(LedgerError::NoSourceAccount(source_id))?;

        let mut destination = self
            .store
            .find_account_by_id(destination_id)
            .await?
            .ok_or(LedgerError::NoDestinationAccount(destination_id))?;

        if !source.can_cover(amount) {
            tracing::warn!(
                source_id,
                destination_id,
                balance = %source.amount,
                requested = %amount,
                "Transfer refused: insufficient funds"
            );
            return Ok(false);
        }

        if source_id == destination_id {
            // Net zero on one account
            self.store.save_account(source).await?;
            tracing::info!(source_id, "Transferred {} to the same account", amount);
            return Ok(true);
        }

        // Compute both legs before writing anything.
        let debited = exact_sub(source.amount, amount)
            .map_err(|err| LedgerError::arithmetic("transfer debit", err))?;
        let credited = exact_add(destination.amount, amount)
            .map_err(|err| LedgerError::arithmetic("transfer credit", err))?;

        source.amount = debited;
        destination.amount = credited;

        self.store.save_account(source).await?;
        self.store.save_account(destination).await?;

        tracing::info!(source_id, destination_id, "Transferred {}", amount);
        Ok(true)
    }

    /// List every account known to the store.
    pub async fn list_all(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list_all_accounts().await?)
    }

    /// List the accounts owned by an agreement.
    pub async fn list_by_agreement(&self, agreement: &Agreement) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list_accounts_by_agreement_id(agreement.id).await?)
    }

    /// Open a new account for an agreement.
    ///
    /// The initial amount is taken as given, negative included.
    pub async fn create_account(
        &self,
        agreement: &Agreement,
        number: impl Into<String>,
        account_type: AccountType,
        amount: Amount,
    ) -> Result<Account, LedgerError> {
        let account = Account::new(agreement.id, number, account_type, amount);
        let saved = self.store.save_account(account).await?;

        tracing::debug!(
            account_id = saved.id,
            agreement_id = agreement.id,
            "Created account {}",
            saved.number
        );
        Ok(saved)
    }
}

pub(super) fn ensure_non_negative(amount: Amount) -> Result<(), LedgerError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}
