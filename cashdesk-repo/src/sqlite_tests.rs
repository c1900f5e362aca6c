//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use cashdesk_types::{
        CashDeskNumber, DomainError, Employee, NewPayment, NewPaymentItem, PaymentFilter,
        PaymentId, PaymentRepository, PaymentType, RegistrationNumber, RepoError,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use std::sync::Arc;

    use crate::SqliteRepo;

    const CASHIER: i64 = 1001;
    const MANAGER: i64 = 2001;

    async fn setup_repo() -> SqliteRepo {
        setup_repo_at("sqlite::memory:").await
    }

    async fn setup_repo_at(database_url: &str) -> SqliteRepo {
        let repo = SqliteRepo::new(database_url).await.unwrap();

        repo.insert_cash_desk(CashDeskNumber::new(1)).await.unwrap();
        repo.insert_cash_desk(CashDeskNumber::new(2)).await.unwrap();
        repo.insert_employee(Employee::cashier(
            RegistrationNumber::new(CASHIER),
            "Max",
            "Muster",
        ))
        .await
        .unwrap();
        repo.insert_employee(Employee::manager(
            RegistrationNumber::new(MANAGER),
            "Anna",
            "Huber",
        ))
        .await
        .unwrap();

        repo
    }

    fn new_payment(desk: i64, employee: i64, payment_type: PaymentType) -> NewPayment {
        NewPayment::now(
            CashDeskNumber::new(desk),
            RegistrationNumber::new(employee),
            payment_type,
        )
    }

    fn cola(payment_id: PaymentId) -> NewPaymentItem {
        NewPaymentItem::new(
            payment_id,
            "Cola".to_string(),
            2,
            Decimal::from_str("2.50").unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_master_data_lookup() {
        let repo = setup_repo().await;

        let desk = repo.get_cash_desk(CashDeskNumber::new(1)).await.unwrap();
        assert!(desk.is_some());
        assert!(
            repo.get_cash_desk(CashDeskNumber::new(9))
                .await
                .unwrap()
                .is_none()
        );

        let manager = repo
            .get_employee(RegistrationNumber::new(MANAGER))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(manager.first_name, "Anna");
        assert_eq!(manager.role, cashdesk_types::EmployeeRole::Manager);
    }

    #[tokio::test]
    async fn test_duplicate_cash_desk_conflicts() {
        let repo = setup_repo().await;

        let result = repo.insert_cash_desk(CashDeskNumber::new(1)).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_open_payment() {
        let repo = setup_repo().await;

        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();

        assert!(payment.id.as_i64() > 0);
        assert!(payment.is_open());

        let fetched = repo.get_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(fetched, payment);
    }

    #[tokio::test]
    async fn test_second_open_payment_at_same_desk_fails() {
        let repo = setup_repo().await;

        repo.open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();

        let result = repo
            .open_payment(new_payment(1, MANAGER, PaymentType::Cash))
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::OpenPaymentExists))
        ));

        // Another desk is unaffected
        repo.open_payment(new_payment(2, MANAGER, PaymentType::Cash))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_payment_index_rejects_second_open_row() {
        let repo = setup_repo().await;

        repo.open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();

        // Bypass the precondition check; the partial unique index must still hold
        let result = sqlx::query(
            r#"INSERT INTO payments (cash_desk_number, employee_registration_number, payment_type, created_at)
               VALUES (1, 1001, 'Cash', '2024-05-12T00:00:00.000000Z')"#,
        )
        .execute(repo.pool())
        .await
        .map_err(crate::types::map_write_error);

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::OpenPaymentExists))
        ));
    }

    #[tokio::test]
    async fn test_credit_card_requires_manager() {
        let repo = setup_repo().await;

        let result = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::CreditCard))
            .await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::InsufficientRights))
        ));

        let payment = repo
            .open_payment(new_payment(1, MANAGER, PaymentType::CreditCard))
            .await
            .unwrap();
        assert_eq!(payment.payment_type, PaymentType::CreditCard);
    }

    #[tokio::test]
    async fn test_open_payment_unknown_references() {
        let repo = setup_repo().await;

        let result = repo
            .open_payment(new_payment(42, CASHIER, PaymentType::Cash))
            .await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::CashDeskNotFound))
        ));

        let result = repo
            .open_payment(new_payment(1, 4242, PaymentType::Cash))
            .await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::EmployeeNotFound))
        ));
    }

    #[tokio::test]
    async fn test_confirm_payment() {
        let repo = setup_repo().await;
        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();

        repo.confirm_payment(payment.id, Utc::now()).await.unwrap();

        let confirmed = repo.get_payment(payment.id).await.unwrap().unwrap();
        assert!(confirmed.confirmed_at.is_some());

        let again = repo.confirm_payment(payment.id, Utc::now()).await;
        assert!(matches!(
            again,
            Err(RepoError::Domain(DomainError::AlreadyConfirmed))
        ));

        // The desk is free again
        repo.open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_confirm_payment_not_found() {
        let repo = setup_repo().await;

        let result = repo.confirm_payment(PaymentId::new(999), Utc::now()).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::PaymentNotFound))
        ));
    }

    #[tokio::test]
    async fn test_add_payment_item() {
        let repo = setup_repo().await;
        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();

        let item = repo.add_payment_item(cola(payment.id)).await.unwrap();
        assert!(item.id.as_i64() > 0);

        let items = repo.list_payment_items(payment.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].article_name, "Cola");
        assert_eq!(items[0].amount, 2);
        assert_eq!(items[0].price, Decimal::from_str("2.50").unwrap());
    }

    #[tokio::test]
    async fn test_add_payment_item_rejected() {
        let repo = setup_repo().await;

        let missing = repo.add_payment_item(cola(PaymentId::new(42))).await;
        assert!(matches!(
            missing,
            Err(RepoError::Domain(DomainError::PaymentNotFound))
        ));

        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();
        repo.confirm_payment(payment.id, Utc::now()).await.unwrap();

        let confirmed = repo.add_payment_item(cola(payment.id)).await;
        assert!(matches!(
            confirmed,
            Err(RepoError::Domain(DomainError::AlreadyConfirmed))
        ));
        assert!(repo.list_payment_items(payment.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_payment_with_items() {
        let repo = setup_repo().await;
        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();
        repo.add_payment_item(cola(payment.id)).await.unwrap();
        repo.add_payment_item(cola(payment.id)).await.unwrap();

        repo.delete_payment(payment.id, true).await.unwrap();

        assert!(repo.get_payment(payment.id).await.unwrap().is_none());
        assert!(repo.list_payment_items(payment.id).await.unwrap().is_empty());
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_items")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_delete_payment_keeping_items_is_rejected() {
        let repo = setup_repo().await;
        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();
        repo.add_payment_item(cola(payment.id)).await.unwrap();

        let result = repo.delete_payment(payment.id, false).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::PaymentHasItems))
        ));
        assert!(repo.get_payment(payment.id).await.unwrap().is_some());
        assert_eq!(repo.list_payment_items(payment.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_payment_without_items() {
        let repo = setup_repo().await;
        let payment = repo
            .open_payment(new_payment(1, CASHIER, PaymentType::Cash))
            .await
            .unwrap();

        repo.delete_payment(payment.id, false).await.unwrap();

        assert!(repo.get_payment(payment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_payment_not_found() {
        let repo = setup_repo().await;

        let result = repo.delete_payment(PaymentId::new(123), true).await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::PaymentNotFound))
        ));
    }

    /// desk 1 on 2024-05-12 (confirmed), desk 2 on 2024-05-13, desk 1 on 2024-05-14.
    async fn seed_listing(repo: &SqliteRepo) {
        let first = repo
            .open_payment(NewPayment {
                created_at: Utc.with_ymd_and_hms(2024, 5, 12, 9, 30, 0).unwrap(),
                ..new_payment(1, CASHIER, PaymentType::Cash)
            })
            .await
            .unwrap();
        repo.confirm_payment(first.id, Utc.with_ymd_and_hms(2024, 5, 12, 9, 35, 0).unwrap())
            .await
            .unwrap();

        repo.open_payment(NewPayment {
            created_at: Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap(),
            ..new_payment(2, CASHIER, PaymentType::Cash)
        })
        .await
        .unwrap();

        repo.open_payment(NewPayment {
            created_at: Utc.with_ymd_and_hms(2024, 5, 14, 17, 0, 0).unwrap(),
            ..new_payment(1, CASHIER, PaymentType::Cash)
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_list_payments_unfiltered() {
        let repo = setup_repo().await;
        seed_listing(&repo).await;

        let payments = repo.list_payments(&PaymentFilter::default()).await.unwrap();

        assert_eq!(payments.len(), 3);
        assert!(payments.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_list_payments_by_cash_desk() {
        let repo = setup_repo().await;
        seed_listing(&repo).await;

        let filter = PaymentFilter::default().cash_desk(CashDeskNumber::new(1));
        let payments = repo.list_payments(&filter).await.unwrap();

        assert_eq!(payments.len(), 2);
        assert!(
            payments
                .iter()
                .all(|p| p.cash_desk_number == CashDeskNumber::new(1))
        );
    }

    #[tokio::test]
    async fn test_list_payments_by_date() {
        let repo = setup_repo().await;
        seed_listing(&repo).await;

        let from = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
        let payments = repo
            .list_payments(&PaymentFilter::default().from_date(from))
            .await
            .unwrap();

        assert_eq!(payments.len(), 2);
        assert!(payments.iter().all(|p| p.created_at.date_naive() >= from));

        let both = PaymentFilter::default()
            .cash_desk(CashDeskNumber::new(1))
            .from_date(from);
        assert_eq!(repo.list_payments(&both).await.unwrap().len(), 1);
    }

    // File databases use a real connection pool, so writers race on separate connections

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_file_database_concurrent_opens_leave_one_open_payment() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("cashdesk.db").display());
        let repo = Arc::new(setup_repo_at(&url).await);

        for round in 0..5 {
            let mut handles = Vec::new();
            for _ in 0..8 {
                let repo = Arc::clone(&repo);
                handles.push(tokio::spawn(async move {
                    repo.open_payment(new_payment(1, CASHIER, PaymentType::Cash))
                        .await
                }));
            }

            let mut opened = Vec::new();
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(payment) => opened.push(payment),
                    Err(err) => assert!(
                        matches!(err, RepoError::Domain(DomainError::OpenPaymentExists)),
                        "round {round}: {err:?}"
                    ),
                }
            }
            assert_eq!(opened.len(), 1, "round {round}");

            let open_at_desk: Vec<_> = repo
                .list_payments(&PaymentFilter::default().cash_desk(CashDeskNumber::new(1)))
                .await
                .unwrap()
                .into_iter()
                .filter(|p| p.is_open())
                .collect();
            assert_eq!(open_at_desk.len(), 1, "round {round}");
            assert_eq!(open_at_desk[0].id, opened[0].id);

            repo.confirm_payment(opened[0].id, Utc::now()).await.unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_file_database_concurrent_confirms_succeed_once() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("cashdesk.db").display());
        let repo = Arc::new(setup_repo_at(&url).await);

        let payment = repo
            .open_payment(new_payment(2, MANAGER, PaymentType::CreditCard))
            .await
            .unwrap();
        repo.add_payment_item(cola(payment.id)).await.unwrap();

        let id = payment.id;
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.confirm_payment(id, Utc::now()).await
            }));
        }

        let mut confirmed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => confirmed += 1,
                Err(err) => assert!(
                    matches!(err, RepoError::Domain(DomainError::AlreadyConfirmed)),
                    "{err:?}"
                ),
            }
        }
        assert_eq!(confirmed, 1);

        let stored = repo.get_payment(payment.id).await.unwrap().unwrap();
        assert!(!stored.is_open());

        // A new payment can be opened at the desk once the old one is closed
        repo.open_payment(new_payment(2, CASHIER, PaymentType::Cash))
            .await
            .unwrap();
    }
}
