//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;

use cashdesk_types::{
    CashDesk, CashDeskNumber, DomainError, Employee, NewPayment, NewPaymentItem, Payment,
    PaymentFilter, PaymentId, PaymentItem, PaymentItemId, PaymentRepository, RegistrationNumber,
    RepoError,
};

use crate::types::{
    DbCashDesk, DbEmployee, PgPaymentItemRow as DbPaymentItem, PgPaymentRow as DbPayment,
    map_insert_error, map_write_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with row-level locking.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for PostgresRepo {
    async fn insert_cash_desk(&self, number: CashDeskNumber) -> Result<CashDesk, RepoError> {
        sqlx::query(r#"INSERT INTO cash_desks (number) VALUES ($1)"#)
            .bind(number.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &format!("Cash desk {}", number)))?;

        Ok(CashDesk::new(number))
    }

    async fn insert_employee(&self, employee: Employee) -> Result<Employee, RepoError> {
        sqlx::query(
            r#"INSERT INTO employees (registration_number, first_name, last_name, role) VALUES ($1, $2, $3, $4)"#,
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
            sqlx::query_as(r#"SELECT number FROM cash_desks WHERE number = $1"#)
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
            r#"SELECT registration_number, first_name, last_name, role FROM employees WHERE registration_number = $1"#,
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

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        // Lock the cash desk so concurrent opens at the same desk run one after another
        let desk: Option<DbCashDesk> =
            sqlx::query_as(r#"SELECT number FROM cash_desks WHERE number = $1 FOR UPDATE"#)
                .bind(payment.cash_desk_number.as_i64())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if desk.is_none() {
            return Err(DomainError::CashDeskNotFound.into());
        }

        let open: Option<i64> = sqlx::query_scalar(
            r#"SELECT id FROM payments WHERE cash_desk_number = $1 AND confirmed_at IS NULL LIMIT 1"#,
        )
        .bind(payment.cash_desk_number.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if open.is_some() {
            return Err(DomainError::OpenPaymentExists.into());
        }

        let employee: Option<DbEmployee> = sqlx::query_as(
            r#"SELECT registration_number, first_name, last_name, role FROM employees WHERE registration_number = $1"#,
        )
        .bind(payment.employee_registration_number.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let employee = employee
            .ok_or(DomainError::EmployeeNotFound)?
            .into_domain()?;
        employee.authorize(payment.payment_type)?;

        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO payments (cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at)
               VALUES ($1, $2, $3, $4, NULL)
               RETURNING id"#,
        )
        .bind(payment.cash_desk_number.as_i64())
        .bind(payment.employee_registration_number.as_i64())
        .bind(payment.payment_type.as_str())
        .bind(payment.created_at)
        .fetch_one(&mut *db_tx)
        .await
        .map_err(map_write_error)?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(payment.into_payment(PaymentId::new(id)))
    }

    async fn confirm_payment(&self, id: PaymentId, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments WHERE id = $1 FOR UPDATE"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let mut payment = row.ok_or(DomainError::PaymentNotFound)?.into_domain()?;
        payment.confirm(at.trunc_subsecs(6))?;

        sqlx::query(r#"UPDATE payments SET confirmed_at = $1 WHERE id = $2"#)
            .bind(payment.confirmed_at)
            .bind(id.as_i64())
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn add_payment_item(&self, item: NewPaymentItem) -> Result<PaymentItem, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        // Share-lock the payment so it cannot be confirmed or deleted underneath us
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments WHERE id = $1 FOR SHARE"#,
        )
        .bind(item.payment_id.as_i64())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.ok_or(DomainError::PaymentNotFound)?
            .into_domain()?
            .ensure_open()?;

        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO payment_items (payment_id, article_name, amount, price)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(item.payment_id.as_i64())
        .bind(&item.article_name)
        .bind(item.amount)
        .bind(item.price)
        .fetch_one(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(item.into_item(PaymentItemId::new(id)))
    }

    async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<(), RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let exists: Option<i64> =
            sqlx::query_scalar(r#"SELECT id FROM payments WHERE id = $1 FOR UPDATE"#)
                .bind(id.as_i64())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if exists.is_none() {
            return Err(DomainError::PaymentNotFound.into());
        }

        if delete_items {
            let removed = sqlx::query(r#"DELETE FROM payment_items WHERE payment_id = $1"#)
                .bind(id.as_i64())
                .execute(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
            tracing::debug!(payment_id = %id, items = removed.rows_affected(), "Removed payment items");
        } else {
            let items: i64 =
                sqlx::query_scalar(r#"SELECT COUNT(*) FROM payment_items WHERE payment_id = $1"#)
                    .bind(id.as_i64())
                    .fetch_one(&mut *db_tx)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;

            if items > 0 {
                return Err(DomainError::PaymentHasItems.into());
            }
        }

        sqlx::query(r#"DELETE FROM payments WHERE id = $1"#)
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
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments WHERE id = $1"#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payment_items(&self, id: PaymentId) -> Result<Vec<PaymentItem>, RepoError> {
        let rows: Vec<DbPaymentItem> = sqlx::query_as(
            r#"SELECT id, payment_id, article_name, amount, price FROM payment_items
               WHERE payment_id = $1 ORDER BY id ASC"#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentItem::into_domain).collect()
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, cash_desk_number, employee_registration_number, payment_type, created_at, confirmed_at
               FROM payments
               WHERE ($1::BIGINT IS NULL OR cash_desk_number = $1)
                 AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
               ORDER BY id ASC"#,
        )
        .bind(filter.cash_desk_number.map(|n| n.as_i64()))
        .bind(filter.created_from())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }
}
