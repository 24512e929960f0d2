use thiserror::Error;

use crate::domain::{AccountId, AccountType, AgreementId, Amount, AmountError};

/// Structural failures of a ledger operation.
///
/// Insufficient funds is not in here: a refused debit or transfer is `Ok(false)`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("No source account: {0}")]
    NoSourceAccount(AccountId),

    #[error("No destination account: {0}")]
    NoDestinationAccount(AccountId),

    #[error("Agreement {agreement_id} has no account of type {account_type}")]
    NoAccountOfType {
        agreement_id: AgreementId,
        account_type: AccountType,
    },

    #[error("Agreement not found: {0}")]
    AgreementNotFound(String),

    #[error("Agreement already exists: {0}")]
    AgreementAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("Amount overflow while computing {0}")]
    AmountOverflow(&'static str),

    #[error("Cannot compute {0} without rounding")]
    PrecisionLoss(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl LedgerError {
    /// Attach what was being computed to an amount arithmetic failure.
    pub fn arithmetic(context: &'static str, err: AmountError) -> Self {
        match err {
            AmountError::Overflow => LedgerError::AmountOverflow(context),
            AmountError::Inexact => LedgerError::PrecisionLoss(context),
        }
    }

    /// Returns true for the lookup-miss family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::AccountNotFound(_)
                | LedgerError::NoSourceAccount(_)
                | LedgerError::NoDestinationAccount(_)
                | LedgerError::NoAccountOfType { .. }
                | LedgerError::AgreementNotFound(_)
        )
    }
}
