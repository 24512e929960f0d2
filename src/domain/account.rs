use serde::{Deserialize, Serialize};

use super::{AgreementId, Amount};

pub type AccountId = i64;

/// Account kind discriminator. Its meaning belongs to the callers, not the ledger.
pub type AccountType = i32;

/// A balance-holding record owned by exactly one agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Assigned by the store on first save; `0` until then
    pub id: AccountId,
    pub agreement_id: AgreementId,
    pub number: String,
    pub account_type: AccountType,
    pub amount: Amount,
}

impl Account {
    /// Create a transient account. The identifier is assigned when the store saves it.
    pub fn new(
        agreement_id: AgreementId,
        number: impl Into<String>,
        account_type: AccountType,
        amount: Amount,
    ) -> Self {
        Self {
            id: 0,
            agreement_id,
            number: number.into(),
            account_type,
            amount,
        }
    }

    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = id;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Returns true if the balance covers `amount` (`balance >= amount`).
    pub fn can_cover(&self, amount: Amount) -> bool {
        self.amount >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_account_is_transient() {
        let account = Account::new(7, "40817810", 1, dec!(10));
        assert_eq!(account.id, 0);
        assert!(!account.is_persisted());
        assert_eq!(account.agreement_id, 7);
        assert_eq!(account.number, "40817810");
        assert_eq!(account.account_type, 1);
        assert_eq!(account.amount, dec!(10));
    }

    #[test]
    fn test_with_id_marks_persisted() {
        let account = Account::new(1, "n", 0, Decimal::ZERO).with_id(3);
        assert!(account.is_persisted());
    }

    #[test]
    fn test_can_cover_is_inclusive() {
        let account = Account::new(1, "n", 0, dec!(100));
        assert!(account.can_cover(dec!(100)));
        assert!(account.can_cover(Decimal::ZERO));
        assert!(!account.can_cover(dec!(100.01)));

        let empty = Account::new(1, "n", 0, Decimal::ZERO);
        assert!(empty.can_cover(Decimal::ZERO));
    }
}
