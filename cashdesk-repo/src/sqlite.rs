//! SQLite repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

use cashdesk_types::{
    CashDesk, CashDeskNumber, DomainError, Employee, NewPayment, NewPaymentItem, Payment,
    PaymentFilter, PaymentId, PaymentItem, PaymentItemId, PaymentRepository, RegistrationNumber,
    RepoError,
};

use crate::types::{
    DbCashDesk, DbEmployee, SqlitePaymentItemRow as DbPaymentItem, SqlitePaymentRow as DbPayment,
    format_timestamp, map_insert_error, map_write_error,
};

const PAYMENT_COLUMNS: &str =
    "id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
///
/// Writers are serialized in-process. A deferred transaction that reads before
/// writing fails with `SQLITE_BUSY` when another connection holds the write
/// lock, and the busy timeout does not apply to that upgrade.
pub struct SqliteRepo {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists.
        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite://") {
                let path = path.split('?').next().unwrap_or(path);
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            // Readers keep going while a payment is being written
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` opens a fresh database, so keep exactly one alive.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;

        execute_migration(&pool, include_str!("../migrations/0001_create_tables.sql"), "0001")
            .await?;

        tracing::debug!(in_memory, "SQLite repository ready");
        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn insert_cash_desk(&self, number: CashDeskNumber) -> Result<CashDesk, RepoError> {
        let _write = self.write_lock.lock().await;
        sqlx::query(r#"INSERT INTO cash_desks (number) VALUES (?)"#)
            .bind(number.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &format!("Cash desk {}", number)))?;

        Ok(CashDesk::new(number))
    }

    async fn insert_employee(&self, employee: Employee) -> Result<Employee, RepoError> {
        let _write = self.write_lock.lock().await;
        sqlx::query(
            r#"INSERT INTO employees (registration_number, first_name, last_name, role) VALUES (?, ?, ?, ?)"#,
        )
        .bind(employee.registration_number.as_i64())
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &format!("Employee {}", employee.registration_number)))?;

        Ok(employee)
    }

    async fn get_cash_desk(&self, number: CashDeskNumber) -> Result<Option<CashDesk>, RepoError> {
        let row: Option<DbCashDesk> =
            sqlx::query_as(r#"SELECT number FROM cash_desks WHERE number = ?"#)
                .bind(number.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbCashDesk::into_domain))
    }

    async fn get_employee(
        &self,
        registration_number: RegistrationNumber,
    ) -> Result<Option<Employee>, RepoError> {
        let row: Option<DbEmployee> = sqlx::query_as(
            r#"SELECT registration_number, first_name, last_name, role FROM employees WHERE registration_number = ?"#,
        )
        .bind(registration_number.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbEmployee::into_domain).transpose()
    }

    async fn open_payment(&self, payment: NewPayment) -> Result<Payment, RepoError> {
        let payment = NewPayment {
            created_at: payment.created_at.trunc_subsecs(6),
            ..payment
        };

        let _write = self.write_lock.lock().await;
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let desk: Option<DbCashDesk> =
            sqlx::query_as(r#"SELECT number FROM cash_desks WHERE number = ?"#)
                .bind(payment.cash_desk_number.as_i64())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if desk.is_none() {
            return Err(DomainError::CashDeskNotFound.into());
        }

        let open: Option<i64> = sqlx::query_scalar(
            r#"SELECT id FROM payments WHERE cash_desk_number = ? AND confirmed_at IS NULL LIMIT 1"#,
        )
        .bind(payment.cash_desk_number.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if open.is_some() {
            return Err(DomainError::OpenPaymentExists.into());
        }

        let employee: Option<DbEmployee> = sqlx::query_as(
            r#"SELECT registration_number, first_name, last_name, role FROM employees WHERE registration_number = ?"#,
        )
        .bind(payment.employee_registration_number.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let employee = employee
            .ok_or(DomainError::EmployeeNotFound)?
            .into_domain()?;
        employee.authorize(payment.payment_type)?;

        let result = sqlx::query(
            r#"INSERT INTO payments (cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at)
               VALUES (?, ?, ?, ?, NULL)"#,
        )
        .bind(payment.cash_desk_number.as_i64())
        .bind(payment.employee_registration_number.as_i64())
        .bind(payment.payment_type.as_str())
        .bind(format_timestamp(payment.created_at))
        .execute(&mut *db_tx)
        .await
        .map_err(map_write_error)?;

        let id = PaymentId::new(result.last_insert_rowid());

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(payment.into_payment(id))
    }

    async fn confirm_payment(&self, id: PaymentId, at: DateTime<Utc>) -> Result<(), RepoError> {
        let _write = self.write_lock.lock().await;
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let row: Option<DbPayment> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let mut payment = row.ok_or(DomainError::PaymentNotFound)?.into_domain()?;
        payment.confirm(at.trunc_subsecs(6))?;

        let result = sqlx::query(
            r#"UPDATE payments SET confirmed_at = ? WHERE id = ? AND confirmed_at IS NULL"#,
        )
        .bind(payment.confirmed_at.map(format_timestamp))
        .bind(id.as_i64())
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AlreadyConfirmed.into());
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn add_payment_item(&self, item: NewPaymentItem) -> Result<PaymentItem, RepoError> {
        let _write = self.write_lock.lock().await;
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let row: Option<DbPayment> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(item.payment_id.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.ok_or(DomainError::PaymentNotFound)?
            .into_domain()?
            .ensure_open()?;

        let result = sqlx::query(
            r#"INSERT INTO payment_items (payment_id, article_name, amount, price) VALUES (?, ?, ?, ?)"#,
        )
        .bind(item.payment_id.as_i64())
        .bind(&item.article_name)
        .bind(item.amount)
        .bind(item.price.to_string())
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let id = PaymentItemId::new(result.last_insert_rowid());

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(item.into_item(id))
    }

    async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<(), RepoError> {
        let _write = self.write_lock.lock().await;
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let exists: Option<i64> = sqlx::query_scalar(r#"SELECT id FROM payments WHERE id = ?"#)
            .bind(id.as_i64())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if exists.is_none() {
            return Err(DomainError::PaymentNotFound.into());
        }

        if delete_items {
            let removed = sqlx::query(r#"DELETE FROM payment_items WHERE payment_id = ?"#)
                .bind(id.as_i64())
                .execute(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
            tracing::debug!(payment_id = %id, items = removed.rows_affected(), "Removed payment items");
        } else {
            let items: i64 =
                sqlx::query_scalar(r#"SELECT COUNT(*) FROM payment_items WHERE payment_id = ?"#)
                    .bind(id.as_i64())
                    .fetch_one(&mut *db_tx)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;

            if items > 0 {
                return Err(DomainError::PaymentHasItems.into());
            }
        }

        sqlx::query(r#"DELETE FROM payments WHERE id = ?"#)
            .bind(id.as_i64())
            .execute(&mut *db_tx)
            .await
            .map_err(map_write_error)?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payment_items(&self, id: PaymentId) -> Result<Vec<PaymentItem>, RepoError> {
        let rows: Vec<DbPaymentItem> = sqlx::query_as(
            r#"SELECT id, payment_id, article_name, amount, price FROM payment_items
               WHERE payment_id = ? ORDER BY id ASC"#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentItem::into_domain).collect()
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(&format!(
            "SELECT {} FROM payments
             WHERE (?1 IS NULL OR cash_desk_number = ?1)
               AND (?2 IS NULL OR created_at >= ?2)
             ORDER BY id ASC",
            PAYMENT_COLUMNS
        ))
        .bind(filter.cash_desk_number.map(|n| n.as_i64()))
        .bind(filter.created_from().map(format_timestamp))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }
}
