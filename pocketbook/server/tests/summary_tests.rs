use axum::http::StatusCode;
use chrono::{DateTime, TimeZone, Utc};
use insta::assert_yaml_snapshot;
use pocketbook_server::entities::expense;
use pocketbook_server::entities::expense_summary;
use pocketbook_server::entities::sea_orm_active_enums::{ExpenseStatus, ExpenseType};
use pocketbook_server::summary::{SummaryFilter, SummaryService, SummaryServiceError};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, PaginatorTrait};

mod common;

use common::TestApp;

async fn insert_expense(
    db: &DatabaseConnection,
    user_id: i32,
    amount: f64,
    category_id: i32,
    created_at: DateTime<Utc>,
) {
    expense::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        amount: ActiveValue::Set(amount),
        description: ActiveValue::Set("seeded".to_string()),
        category_id: ActiveValue::Set(category_id),
        payment_mode_id: ActiveValue::Set(1),
        r#type: ActiveValue::Set(ExpenseType::Debit),
        status: ActiveValue::Set(ExpenseStatus::Paid),
        created_at: ActiveValue::Set(created_at),
        updated_at: ActiveValue::Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert expense");
}

fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
}

fn april(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn totals_match_the_sum_of_expenses() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let user = common::create_user(&db, "alice@example.com").await.unwrap();
    insert_expense(&db, user.id, 10.0, 1, march(1)).await;
    insert_expense(&db, user.id, 15.5, 1, march(20)).await;
    insert_expense(&db, user.id, 4.0, 2, march(3)).await;
    insert_expense(&db, user.id, 100.0, 1, april(2)).await;

    let groups = SummaryService::new(&db, user.id)
        .summarize(SummaryFilter::default())
        .await
        .unwrap();

    let totals: Vec<(u32, i32, f64)> = groups
        .iter()
        .map(|group| (group.month, group.category_id, group.total_amount))
        .collect();
    assert_eq!(totals, vec![(3, 1, 25.5), (3, 2, 4.0), (4, 1, 100.0)]);
    let grand_total: f64 = groups.iter().map(|group| group.total_amount).sum();
    assert_eq!(grand_total, 129.5);
}

#[tokio::test]
async fn only_counts_the_users_own_expenses() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let alice = common::create_user(&db, "alice@example.com").await.unwrap();
    let bob = common::create_user(&db, "bob@example.com").await.unwrap();
    insert_expense(&db, alice.id, 10.0, 1, march(1)).await;
    insert_expense(&db, bob.id, 99.0, 1, march(1)).await;

    let groups = SummaryService::new(&db, alice.id)
        .summarize(SummaryFilter::default())
        .await
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].total_amount, 10.0);
}

#[tokio::test]
async fn each_run_appends_summary_rows() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let user = common::create_user(&db, "alice@example.com").await.unwrap();
    insert_expense(&db, user.id, 10.0, 1, march(1)).await;
    insert_expense(&db, user.id, 5.0, 2, march(1)).await;
    let summary_service = SummaryService::new(&db, user.id);

    summary_service
        .summarize(SummaryFilter::default())
        .await
        .unwrap();
    assert_eq!(expense_summary::Entity::find().count(&db).await.unwrap(), 2);

    summary_service
        .summarize(SummaryFilter::default())
        .await
        .unwrap();
    let rows = expense_summary::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.user_id == user.id));
    assert!(rows.iter().all(|row| (row.month, row.year) == (3, 2025)));
}

#[tokio::test]
async fn filters_restrict_the_aggregated_expenses() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let user = common::create_user(&db, "alice@example.com").await.unwrap();
    insert_expense(&db, user.id, 10.0, 1, march(1)).await;
    insert_expense(&db, user.id, 20.0, 2, march(2)).await;
    insert_expense(&db, user.id, 40.0, 1, april(1)).await;
    let summary_service = SummaryService::new(&db, user.id);

    let groups = summary_service
        .summarize(SummaryFilter {
            month: Some(4),
            year: Some(2025),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].total_amount, 40.0);

    let groups = summary_service
        .summarize(SummaryFilter {
            category_id: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].total_amount, 20.0);

    let groups = summary_service
        .summarize(SummaryFilter {
            year: Some(2024),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn rejects_month_out_of_range() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let user = common::create_user(&db, "alice@example.com").await.unwrap();

    let result = SummaryService::new(&db, user.id)
        .summarize(SummaryFilter {
            month: Some(13),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(SummaryServiceError::InvalidMonth(13))));
}

#[tokio::test]
async fn summary_endpoint_reports_groups() {
    let app = TestApp::new().await.unwrap();
    let (user, token) = app.login_as("alice@example.com").await.unwrap();
    insert_expense(app.db(), user.id, 7.25, 3, march(5)).await;
    insert_expense(app.db(), user.id, 2.5, 3, march(6)).await;

    let (status, body) = app.get("/api/expenses/summary", &token).await;

    assert_eq!(status, StatusCode::OK);
    insta::with_settings!({ sort_maps => true }, {
        assert_yaml_snapshot!(body["expenseSummary"], @r#"
        - category: 3
          month: 3
          paymentMode: 1
          status: paid
          totalAmount: 9.75
          type: debit
          year: 2025
        "#);
    });

    let (status, body) = app.get("/api/expenses/summary?month=0", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Month must be between 1 and 12, got 0");
}

#[tokio::test]
async fn unparsable_summary_filters_get_json_errors() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();

    for uri in [
        "/api/expenses/summary?month=-1",
        "/api/expenses/summary?month=abc",
        "/api/expenses/summary?year=soon",
    ] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "BAD_REQUEST", "{}", uri);
    }
}
