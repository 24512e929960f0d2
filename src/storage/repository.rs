use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};

use crate::domain::{Account, AccountId, Agreement, AgreementId};

use super::{AccountStore, AgreementStore, MIGRATION_001_INITIAL};

/// SQLite-backed store for accounts and agreements.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let amount_str: String = row.get("amount");

        Ok(Account {
            id: row.get("id"),
            agreement_id: row.get("agreement_id"),
            number: row.get("number"),
            account_type: row.get("account_type"),
            amount: Decimal::from_str_exact(&amount_str)
                .with_context(|| format!("Invalid stored amount: {}", amount_str))?,
        })
    }

    fn row_to_agreement(row: &sqlx::sqlite::SqliteRow) -> Agreement {
        Agreement {
            id: row.get("id"),
            name: row.get("name"),
        }
    }
}

#[async_trait]
impl AccountStore for Repository {
    async fn find_account_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, agreement_id, number, account_type, amount FROM accounts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn save_account(&self, mut account: Account) -> Result<Account> {
        if account.is_persisted() {
            sqlx::query(
                r#"
                INSERT INTO accounts (id, agreement_id, number, account_type, amount)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    agreement_id = excluded.agreement_id,
                    number = excluded.number,
                    account_type = excluded.account_type,
                    amount = excluded.amount
                "#,
            )
            .bind(account.id)
            .bind(account.agreement_id)
            .bind(&account.number)
            .bind(account.account_type)
            .bind(account.amount.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update account")?;
        } else {
            let result = sqlx::query(
                r#"
                INSERT INTO accounts (agreement_id, number, account_type, amount)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(account.agreement_id)
            .bind(&account.number)
            .bind(account.account_type)
            .bind(account.amount.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to insert account")?;

            account.id = result.last_insert_rowid();
        }

        Ok(account)
    }

    async fn list_all_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, agreement_id, number, account_type, amount FROM accounts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    async fn list_accounts_by_agreement_id(
        &self,
        agreement_id: AgreementId,
    ) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agreement_id, number, account_type, amount
            FROM accounts
            WHERE agreement_id = ?
            ORDER BY id
            "#,
        )
        .bind(agreement_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts for agreement")?;

        rows.iter().map(Self::row_to_account).collect()
    }
}

#[async_trait]
impl AgreementStore for Repository {
    async fn find_agreement_by_name(&self, name: &str) -> Result<Option<Agreement>> {
        let row = sqlx::query("SELECT id, name FROM agreements WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch agreement by name")?;

        Ok(row.as_ref().map(Self::row_to_agreement))
    }

    async fn save_agreement(&self, mut agreement: Agreement) -> Result<Agreement> {
        if agreement.is_persisted() {
            sqlx::query(
                r#"
                INSERT INTO agreements (id, name) VALUES (?, ?)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name
                "#,
            )
            .bind(agreement.id)
            .bind(&agreement.name)
            .execute(&self.pool)
            .await
            .context("Failed to update agreement")?;
        } else {
            let result = sqlx::query("INSERT INTO agreements (name) VALUES (?)")
                .bind(&agreement.name)
                .execute(&self.pool)
                .await
                .context("Failed to insert agreement")?;

            agreement.id = result.last_insert_rowid();
        }

        Ok(agreement)
    }
}
