//! Demo master data for local runs.

use cashdesk_types::{CashDeskNumber, Employee, PaymentRepository, RegistrationNumber};

const DEMO_CASH_DESKS: [i64; 3] = [1, 2, 3];

fn demo_employees() -> [Employee; 2] {
    [
        Employee::cashier(RegistrationNumber::new(1001), "Max", "Muster"),
        Employee::manager(RegistrationNumber::new(2001), "Anna", "Huber"),
    ]
}

/// Inserts the demo cash desks and employees. Rows that already exist are skipped.
pub async fn seed_demo_data<R: PaymentRepository>(repo: &R) -> anyhow::Result<()> {
    let mut inserted = 0;

    for number in DEMO_CASH_DESKS.map(CashDeskNumber::new) {
        if repo.get_cash_desk(number).await?.is_none() {
            repo.insert_cash_desk(number).await?;
            inserted += 1;
        }
    }

    for employee in demo_employees() {
        if repo
            .get_employee(employee.registration_number)
            .await?
            .is_none()
        {
            tracing::debug!(registration_number = %employee.registration_number, role = %employee.role, "Seeding employee");
            repo.insert_employee(employee).await?;
            inserted += 1;
        }
    }

    tracing::info!(inserted, "Demo data seeded");
    Ok(())
}
