use crate::domain::{Account, AccountType, Agreement, Amount, exact_mul};
use crate::storage::AccountStore;

use super::ledger::ensure_non_negative;
use super::{AccountLedger, LedgerError};

/// Transfers expressed in terms of parties and account types rather than raw
/// account identifiers, with an optional commission charged up front.
#[derive(Debug, Clone)]
pub struct TransferOrchestrator<S> {
    ledger: AccountLedger<S>,
}

impl<S: AccountStore> TransferOrchestrator<S> {
    pub fn new(ledger: AccountLedger<S>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &AccountLedger<S> {
        &self.ledger
    }

    /// Pick the first account of `agreement` whose type matches, in store order.
    ///
    /// When an agreement holds several accounts of the same type, which one is
    /// chosen is up to the store's ordering.
    pub async fn resolve_account(
        &self,
        agreement: &Agreement,
        account_type: AccountType,
    ) -> Result<Account, LedgerError> {
        self.ledger
            .list_by_agreement(agreement)
            .await?
            .into_iter()
            .find(|account| account.account_type == account_type)
            .ok_or(LedgerError::NoAccountOfType {
                agreement_id: agreement.id,
                account_type,
            })
    }

    /// Transfer between one account of each party.
    pub async fn transfer_between_parties(
        &self,
        source_agreement: &Agreement,
        destination_agreement: &Agreement,
        source_type: AccountType,
        destination_type: AccountType,
        amount: Amount,
    ) -> Result<bool, LedgerError> {
        let source = self.resolve_account(source_agreement, source_type).await?;
        let destination = self
            .resolve_account(destination_agreement, destination_type)
            .await?;

        tracing::debug!(
            source_agreement = source_agreement.id,
            destination_agreement = destination_agreement.id,
            source_account = source.id,
            destination_account = destination.id,
            "Resolved transfer endpoints"
        );

        self.ledger.transfer(source.id, destination.id, amount).await
    }

    /// Charge `amount * commission_rate` to the source account, then transfer `amount`.
    ///
    /// If the commission cannot be covered the transfer is never attempted. A
    /// charged commission is not refunded when the transfer that follows fails;
    /// the caller has to reconcile that state. A commission that cannot be
    /// represented without rounding is `PrecisionLoss`, raised before any write.
    pub async fn transfer_with_commission(
        &self,
        source_agreement: &Agreement,
        destination_agreement: &Agreement,
        source_type: AccountType,
        destination_type: AccountType,
        amount: Amount,
        commission_rate: Amount,
    ) -> Result<bool, LedgerError> {
        ensure_non_negative(amount)?;
        ensure_non_negative(commission_rate)?;

        let source = self.resolve_account(source_agreement, source_type).await?;
        let commission = exact_mul(amount, commission_rate)
            .map_err(|err| LedgerError::arithmetic("commission", err))?;

        if !self.ledger.debit(source.id, commission).await? {
            tracing::warn!(
                source_account = source.id,
                commission = %commission,
                "Commission refused, transfer not attempted"
            );
            return Ok(false);
        }
        tracing::info!(source_account = source.id, "Charged commission {}", commission);

        let result = self
            .transfer_between_parties(
                source_agreement,
                destination_agreement,
                source_type,
                destination_type,
                amount,
            )
            .await;

        match &result {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                source_account = source.id,
                commission = %commission,
                "Commission charged but transfer refused"
            ),
            Err(err) => tracing::warn!(
                source_account = source.id,
                commission = %commission,
                "Commission charged but transfer failed: {}",
                err
            ),
        }

        result
    }
}
