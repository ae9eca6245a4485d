//! End-to-end tests over an in-memory SQLite database.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crewpay_consultants::{Consultant, EquipmentItem};
use crewpay_core::{DomainError, Money};
use crewpay_invoicing::{InvoiceStatus, BONUS_LINE_SERVICE, DEFAULT_INVOICE_BONUS};
use crewpay_payroll::{PayrollCycle, WorkflowStep};

use crate::{
    connect, init_schema, ClientInvoiceService, ConsultantRepo, CycleRepo, LineItemPatch,
    StoreError,
};

async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:").await.unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()
}

fn billed_consultant(name: &str, role: &str, unit_price: Option<f64>) -> Consultant {
    let mut c = Consultant::new(
        name,
        format!("{}@example.com", name.to_lowercase()),
        role,
        Money::from_cents(9_500),
    )
    .unwrap();
    c.client_invoice_unit_price = unit_price.map(Money::from_major_units);
    c
}

/// Seed consultants, create a cycle over them, return (cycle, consultants).
async fn seed_cycle(
    pool: &SqlitePool,
    month: &str,
    consultants: Vec<Consultant>,
) -> (PayrollCycle, Vec<Consultant>) {
    let consultant_repo = ConsultantRepo::new(pool.clone());
    for c in &consultants {
        consultant_repo.create(c).await.unwrap();
    }
    let cycle = PayrollCycle::new(month, 160.0).unwrap();
    CycleRepo::new(pool.clone())
        .create(&cycle, &consultants)
        .await
        .unwrap();
    (cycle, consultants)
}

fn reference_consultants() -> Vec<Consultant> {
    let role = "Senior Software Developer I";
    let alice = billed_consultant("Alice", role, Some(5410.77));
    let bob = billed_consultant("Bob", role, Some(5410.77));
    let mut carol = billed_consultant("Carol", role, Some(5410.77));
    carol.client_invoice_service_description = Some("On-site consulting".to_string());
    vec![alice, bob, carol]
}

#[tokio::test]
async fn create_from_cycle_groups_consultants_and_matches_reference_totals() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool);

    let (invoice, items) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    assert_eq!(invoice.invoice_number, 198);
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(items.len(), 3);

    // Carol's distinct description sorts first, then the Alice+Bob group,
    // then the bonus line.
    assert_eq!(items[0].quantity, 1);
    assert_eq!(items[1].quantity, 2);
    assert_eq!(items[1].description, "Senior Software Developer I (Alice, Bob).");
    assert_eq!(items[1].consultant_ids.len(), 2);
    assert_eq!(items[2].service_name, BONUS_LINE_SERVICE);
    assert_eq!(items[2].amount, DEFAULT_INVOICE_BONUS);

    assert_eq!(invoice.subtotal, Money::from_cents(1_698_427));
    assert_eq!(invoice.tax, Money::ZERO);
    assert_eq!(invoice.total, invoice.subtotal);
    assert_eq!(invoice.amount_due, invoice.total);

    // Round trip through the store keeps line ordering and join rows.
    let (reloaded, reloaded_items) = service.get(invoice.id).await.unwrap();
    assert_eq!(reloaded, invoice);
    assert_eq!(reloaded_items, items);
}

#[tokio::test]
async fn second_create_for_same_cycle_fails_and_leaves_first_untouched() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool);

    let (first, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    let err = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::Domain(DomainError::Validation(_))),
        "duplicate create must be a validation error, got {err:?}"
    );

    let (unchanged, _) = service.get(first.id).await.unwrap();
    assert_eq!(unchanged, first);
    assert_eq!(service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_unit_prices_fail_naming_every_offender_and_write_nothing() {
    let pool = test_pool().await;
    let consultants = vec![
        billed_consultant("Alice", "Dev", Some(5000.0)),
        billed_consultant("Bob", "Dev", None),
        billed_consultant("Carol", "Dev", None),
    ];
    let (cycle, _) = seed_cycle(&pool, "2025-10", consultants).await;
    let service = ClientInvoiceService::new(pool.clone());

    let err = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap_err();
    match err {
        StoreError::Domain(DomainError::Validation(msg)) => {
            assert!(msg.contains("Bob") && msg.contains("Carol"));
            assert!(!msg.contains("Alice"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert!(service.list().await.unwrap().is_empty());
    assert!(service.get_by_cycle_id(cycle.id).await.unwrap().is_none());

    // The failed attempt must not have burnt a number: the first successful
    // invoice still gets the seed value.
    let consultant_repo = ConsultantRepo::new(pool);
    let mut fixed = consultant_repo.list(false).await.unwrap();
    for c in fixed.iter_mut().filter(|c| c.client_invoice_unit_price.is_none()) {
        c.client_invoice_unit_price = Some(Money::from_cents(500_000));
        consultant_repo.update(c).await.unwrap();
    }
    let (invoice, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();
    assert_eq!(invoice.invoice_number, 198);
}

#[tokio::test]
async fn invoice_numbers_are_strictly_increasing_without_gaps() {
    let pool = test_pool().await;
    let (first_cycle, consultants) = seed_cycle(&pool, "2025-10", reference_consultants()).await;

    let second_cycle = PayrollCycle::new("2025-11", 160.0).unwrap();
    CycleRepo::new(pool.clone())
        .create(&second_cycle, &consultants)
        .await
        .unwrap();

    let service = ClientInvoiceService::new(pool);
    let (a, _) = service
        .create_from_cycle(first_cycle.id, issue_date())
        .await
        .unwrap();
    let (b, _) = service
        .create_from_cycle(second_cycle.id, issue_date())
        .await
        .unwrap();

    assert_eq!(a.invoice_number, 198);
    assert_eq!(b.invoice_number, 199);

    // The pool-level variant continues the same sequence.
    assert_eq!(service.next_invoice_number().await.unwrap(), 200);
    assert_eq!(service.next_invoice_number().await.unwrap(), 201);
}

#[tokio::test]
async fn sync_bonus_updates_in_place_and_recomputes_totals() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let cycle_repo = CycleRepo::new(pool.clone());
    let service = ClientInvoiceService::new(pool);

    let (invoice, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    let (mut cycle, _) = cycle_repo.get(cycle.id).await.unwrap();
    cycle.invoice_bonus = Some(Money::from_major_units(1000.00));
    cycle_repo.update(&cycle).await.unwrap();

    let (synced, items) = service.sync_bonus_from_cycle(invoice.id).await.unwrap();

    let bonus_lines: Vec<_> = items.iter().filter(|i| i.is_bonus_line()).collect();
    assert_eq!(bonus_lines.len(), 1, "no duplicate bonus line");
    assert_eq!(bonus_lines[0].amount, Money::from_cents(100_000));

    // 3 x 5410.77 + 1000.00
    assert_eq!(synced.subtotal, Money::from_cents(1_723_231));
    assert_eq!(synced.total, synced.subtotal);
    assert_eq!(synced.amount_due, synced.total);

    // Re-running is idempotent.
    let (again, again_items) = service.sync_bonus_from_cycle(invoice.id).await.unwrap();
    assert_eq!(again, synced);
    assert_eq!(again_items, items);
}

#[tokio::test]
async fn update_fields_applies_tax_and_keeps_totals_reconciled() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool);
    let (invoice, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    // 8% of the fixture subtotal.
    let tax = Money::from_cents(135_874);
    let new_date = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap();
    let (updated, _) = service
        .update_fields(invoice.id, Some(new_date), Some(tax))
        .await
        .unwrap();

    assert_eq!(updated.issue_date, new_date);
    assert_eq!(updated.tax, tax);
    assert_eq!(updated.subtotal, Money::from_cents(1_698_427));
    assert_eq!(updated.total, Money::from_cents(1_698_427 + 135_874));
    assert_eq!(updated.amount_due, updated.total);

    // Persisted, not just returned.
    let (reloaded, _) = service.get(invoice.id).await.unwrap();
    assert_eq!(reloaded, updated);

    // Negative tax is rejected and leaves the stored invoice alone.
    let err = service
        .update_fields(invoice.id, None, Some(Money::from_cents(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
    let (unchanged, _) = service.get(invoice.id).await.unwrap();
    assert_eq!(unchanged, updated);
}

#[tokio::test]
async fn cancelled_invoice_does_not_block_recreation() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool);

    let (first, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();
    service
        .update_status(first.id, InvoiceStatus::Cancelled, Utc::now())
        .await
        .unwrap();

    // The partial unique index only covers non-cancelled invoices, so a
    // replacement passes both the guard and the index.
    let (second, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();
    assert_eq!(second.invoice_number, first.invoice_number + 1);

    let current = service.get_by_cycle_id(cycle.id).await.unwrap().unwrap();
    assert_eq!(current.id, second.id);
    assert_eq!(service.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn status_dates_stamp_exactly_once() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool);
    let (invoice, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    let first = Utc::now();
    let sent = service
        .update_status(invoice.id, InvoiceStatus::Sent, first)
        .await
        .unwrap();
    assert_eq!(sent.sent_date, Some(first));

    let later = first + chrono::Duration::hours(3);
    service
        .update_status(invoice.id, InvoiceStatus::Draft, later)
        .await
        .unwrap();
    let resent = service
        .update_status(invoice.id, InvoiceStatus::Sent, later)
        .await
        .unwrap();
    assert_eq!(resent.sent_date, Some(first), "re-entry must not re-stamp");

    let paid = service
        .update_status(invoice.id, InvoiceStatus::Paid, later)
        .await
        .unwrap();
    assert_eq!(paid.paid_date, Some(later));
    assert_eq!(paid.sent_date, Some(first));
}

#[tokio::test]
async fn line_item_edit_reconciles_cached_totals() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool);
    let (invoice, items) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    // Bump the Alice+Bob group from qty 2 to qty 3.
    let target = items.iter().find(|i| i.quantity == 2).unwrap();
    let (updated, updated_items) = service
        .update_line_item(
            invoice.id,
            target.id,
            LineItemPatch {
                quantity: Some(3),
                ..LineItemPatch::default()
            },
        )
        .await
        .unwrap();

    let edited = updated_items.iter().find(|i| i.id == target.id).unwrap();
    assert_eq!(edited.amount, Money::from_cents(3 * 541_077));
    let expected: Money = updated_items.iter().map(|i| i.amount).sum();
    assert_eq!(updated.subtotal, expected);
    assert_eq!(updated.amount_due, expected);

    // Zero quantity is rejected before any write.
    let err = service
        .update_line_item(
            invoice.id,
            target.id,
            LineItemPatch {
                quantity: Some(0),
                ..LineItemPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
}

#[tokio::test]
async fn delete_round_trip_removes_invoice_and_line_items() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let service = ClientInvoiceService::new(pool.clone());
    let (invoice, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    service.delete(invoice.id).await.unwrap();

    let err = service.get(invoice.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::NotFound(_))));

    let (orphans,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM invoice_line_items WHERE invoice_id = ?")
            .bind(invoice.id.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphans, 0);

    let err = service.delete(invoice.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::NotFound(_))));
}

#[tokio::test]
async fn check_from_cycle_reports_reasons_without_writing() {
    let pool = test_pool().await;
    let consultants = vec![
        billed_consultant("Alice", "Dev", Some(5000.0)),
        billed_consultant("Bob", "Dev", None),
    ];
    let (cycle, _) = seed_cycle(&pool, "2025-10", consultants).await;
    let service = ClientInvoiceService::new(pool);

    let check = service.check_from_cycle(cycle.id).await.unwrap();
    assert!(!check.eligible);
    assert_eq!(check.reasons.len(), 1);
    assert!(check.reasons[0].contains("Bob"));
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn cycle_month_labels_are_unique() {
    let pool = test_pool().await;
    let (_, consultants) = seed_cycle(&pool, "2025-10", reference_consultants()).await;

    let duplicate = PayrollCycle::new("2025-10", 150.0).unwrap();
    let err = CycleRepo::new(pool)
        .create(&duplicate, &consultants)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
}

#[tokio::test]
async fn cycle_delete_is_blocked_by_a_live_invoice_then_cascades() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let cycle_repo = CycleRepo::new(pool.clone());
    let service = ClientInvoiceService::new(pool.clone());

    let (invoice, _) = service
        .create_from_cycle(cycle.id, issue_date())
        .await
        .unwrap();

    let err = cycle_repo.delete(cycle.id).await.unwrap_err();
    match err {
        StoreError::Domain(DomainError::Validation(msg)) => {
            assert!(msg.contains(&invoice.invoice_number.to_string()));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    service.delete(invoice.id).await.unwrap();
    cycle_repo.delete(cycle.id).await.unwrap();

    let (orphans,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cycle_line_items WHERE cycle_id = ?")
            .bind(cycle.id.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn workflow_steps_stamp_once() {
    let pool = test_pool().await;
    let (cycle, _) = seed_cycle(&pool, "2025-10", reference_consultants()).await;
    let cycle_repo = CycleRepo::new(pool);

    let first = Utc::now();
    cycle_repo
        .complete_step(cycle.id, WorkflowStep::HoursEntered, first)
        .await
        .unwrap();
    let updated = cycle_repo
        .complete_step(
            cycle.id,
            WorkflowStep::HoursEntered,
            first + chrono::Duration::hours(1),
        )
        .await
        .unwrap();
    assert_eq!(updated.hours_entered_at, Some(first));
    assert!(updated.invoices_sent_at.is_none());
}

#[tokio::test]
async fn terminated_consultant_and_equipment_round_trip() {
    let pool = test_pool().await;
    let repo = ConsultantRepo::new(pool);
    let consultant = billed_consultant("Alice", "Dev", Some(5000.0));
    repo.create(&consultant).await.unwrap();

    let item = EquipmentItem::new(
        consultant.id,
        "MacBook Pro 14",
        Some("C02XY".to_string()),
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
    )
    .unwrap();
    repo.assign_equipment(&item).await.unwrap();

    let terminated = repo
        .terminate(
            consultant.id,
            NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            "contract ended",
            14,
        )
        .await
        .unwrap();
    assert!(!terminated.active);
    assert_eq!(
        terminated.equipment_return_deadline,
        NaiveDate::from_ymd_opt(2025, 10, 29)
    );
    assert!(repo.list(true).await.unwrap().is_empty());

    let returned = repo
        .return_equipment(item.id, NaiveDate::from_ymd_opt(2025, 10, 20).unwrap())
        .await
        .unwrap();
    assert!(returned.is_returned());

    let listed = repo.equipment_for(consultant.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_returned());
}
