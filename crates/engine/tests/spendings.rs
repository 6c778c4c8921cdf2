use std::collections::HashMap;
use std::sync::atomic::Ordering;

use engine::{EngineError, NewSpending};

mod common;
use common::{create_user, day, engine_with_rates, rate_table, spending};

#[tokio::test]
async fn same_currency_write_keeps_amount_and_unit_rate() {
    let (engine, calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let row = engine
        .create_spending(&user, spending(25.50, Some("USD"), "food", day(2026, 7, 10)))
        .await
        .unwrap();

    assert_eq!(row.amount, 25.50);
    assert_eq!(row.original_amount, 25.50);
    assert_eq!(row.exchange_rate, 1.0);
    assert_eq!(row.original_currency, "USD");
    assert_eq!(row.display_currency, "USD");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn omitted_currency_defaults_to_preferred() {
    let (engine, calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let row = engine
        .create_spending(&user, spending(9.99, None, "food", day(2026, 7, 10)))
        .await
        .unwrap();

    assert_eq!(row.original_currency, "USD");
    assert_eq!(row.exchange_rate, 1.0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cross_currency_write_converts_and_rounds() {
    let (engine, _calls) = engine_with_rates(rate_table(&[("EUR", "USD", 1.25)])).await;
    let user = create_user(&engine, "a@x.com").await;

    let row = engine
        .create_spending(&user, spending(10.55, Some("EUR"), "travel", day(2026, 7, 10)))
        .await
        .unwrap();

    assert_eq!(row.amount, 13.19);
    assert_eq!(row.original_amount, 10.55);
    assert_eq!(row.exchange_rate, 1.25);
    assert_eq!(row.original_currency, "EUR");
    assert_eq!(row.display_currency, "USD");
}

#[tokio::test]
async fn unavailable_rate_aborts_the_write() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let err = engine
        .create_spending(&user, spending(10.0, Some("EUR"), "travel", day(2026, 7, 10)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::RateUnavailable {
            from: "EUR".to_string(),
            to: "USD".to_string(),
        }
    );

    let rows = engine.list_spendings(user.id, 0, None).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn invalid_inputs_are_rejected() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let err = engine
        .create_spending(&user, spending(0.0, None, "food", day(2026, 7, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Invalid(_)));

    let err = engine
        .create_spending(&user, spending(5.0, None, "  ", day(2026, 7, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Invalid(_)));

    let err = engine
        .create_spending(&user, spending(5.0, Some("EURO"), "food", day(2026, 7, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Invalid(_)));
}

#[tokio::test]
async fn list_is_newest_first_with_paging() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    for dom in [3, 1, 9] {
        engine
            .create_spending(&user, spending(1.0, None, "food", day(2026, 7, dom)))
            .await
            .unwrap();
    }

    let rows = engine.list_spendings(user.id, 0, None).await.unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![day(2026, 7, 9), day(2026, 7, 3), day(2026, 7, 1)]);

    let page = engine.list_spendings(user.id, 1, Some(1)).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].date, day(2026, 7, 3));
}

#[tokio::test]
async fn by_date_returns_only_that_day() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    engine
        .create_spending(&user, spending(1.0, None, "food", day(2026, 7, 1)))
        .await
        .unwrap();
    engine
        .create_spending(&user, spending(2.0, None, "food", day(2026, 7, 2)))
        .await
        .unwrap();

    let rows = engine.spendings_by_date(user.id, day(2026, 7, 2)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 2.0);
}

#[tokio::test]
async fn update_reruns_the_conversion() {
    let (engine, _calls) = engine_with_rates(rate_table(&[("EUR", "USD", 1.25)])).await;
    let user = create_user(&engine, "a@x.com").await;

    let row = engine
        .create_spending(&user, spending(20.0, None, "food", day(2026, 7, 1)))
        .await
        .unwrap();
    assert_eq!(row.exchange_rate, 1.0);

    let updated = engine
        .update_spending(&user, row.id, spending(20.0, Some("EUR"), "food", day(2026, 7, 1)))
        .await
        .unwrap();

    assert_eq!(updated.amount, 25.0);
    assert_eq!(updated.exchange_rate, 1.25);
    assert_eq!(updated.original_currency, "EUR");
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn rows_are_scoped_to_their_owner() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let alice = create_user(&engine, "alice@x.com").await;
    let bob = create_user(&engine, "bob@x.com").await;

    let row = engine
        .create_spending(&alice, spending(5.0, None, "food", day(2026, 7, 1)))
        .await
        .unwrap();

    let err = engine.spending_by_id(bob.id, row.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("spending".to_string()));

    let err = engine.delete_spending(bob.id, row.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("spending".to_string()));
}

#[tokio::test]
async fn delete_removes_the_row() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let row = engine
        .create_spending(&user, spending(5.0, None, "food", day(2026, 7, 1)))
        .await
        .unwrap();
    engine.delete_spending(user.id, row.id).await.unwrap();

    assert!(engine.list_spendings(user.id, 0, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_convert_rewrites_history_and_preference() {
    let (engine, _calls) =
        engine_with_rates(rate_table(&[("EUR", "USD", 1.25), ("USD", "EUR", 0.8)])).await;
    let user = create_user(&engine, "a@x.com").await;

    engine
        .create_spending(&user, spending(100.0, None, "rent", day(2026, 7, 1)))
        .await
        .unwrap();
    engine
        .create_spending(&user, spending(10.0, Some("EUR"), "food", day(2026, 7, 2)))
        .await
        .unwrap();

    let updated = engine.convert_all_spendings(&user, "EUR").await.unwrap();
    assert_eq!(updated, 2);

    let account = engine.user_by_id(user.id).await.unwrap();
    assert_eq!(account.preferred_currency, "EUR");

    let rows = engine.list_spendings(user.id, 0, None).await.unwrap();
    for row in &rows {
        assert_eq!(row.display_currency, "EUR");
    }
    // The USD-entered row converts through the USD→EUR rate; the
    // EUR-entered row snaps back to its original amount at rate 1.0.
    let usd_row = rows.iter().find(|r| r.original_currency == "USD").unwrap();
    assert_eq!(usd_row.amount, 80.0);
    assert_eq!(usd_row.exchange_rate, 0.8);
    let eur_row = rows.iter().find(|r| r.original_currency == "EUR").unwrap();
    assert_eq!(eur_row.amount, 10.0);
    assert_eq!(eur_row.exchange_rate, 1.0);
}

#[tokio::test]
async fn bulk_convert_missing_rate_changes_nothing() {
    let (engine, _calls) = engine_with_rates(rate_table(&[("EUR", "USD", 1.25)])).await;
    let user = create_user(&engine, "a@x.com").await;

    engine
        .create_spending(&user, spending(10.0, Some("EUR"), "food", day(2026, 7, 2)))
        .await
        .unwrap();

    let err = engine.convert_all_spendings(&user, "GBP").await.unwrap_err();
    assert!(matches!(err, EngineError::RateUnavailable { .. }));

    let account = engine.user_by_id(user.id).await.unwrap();
    assert_eq!(account.preferred_currency, "USD");
    let rows = engine.list_spendings(user.id, 0, None).await.unwrap();
    assert_eq!(rows[0].display_currency, "USD");
}

#[tokio::test]
async fn dashboard_for_empty_month_is_all_zeros() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let stats = engine.dashboard(user.id, day(2026, 7, 15)).await.unwrap();

    assert_eq!(stats.total_spending, 0.0);
    assert_eq!(stats.average_daily, 0.0);
    assert_eq!(stats.weekly_spending, 0.0);
    assert_eq!(stats.monthly_transactions, 0);
    assert_eq!(stats.highest_single_spending, 0.0);
    assert!(stats.top_categories.is_empty());
    assert!(stats.recent_spendings.is_empty());
    assert_eq!(stats.weekly_trend.len(), 7);
    assert!(stats.weekly_trend.iter().all(|(_, amount)| *amount == 0.0));
}

#[tokio::test]
async fn dashboard_windows_and_category_order() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;
    let today = day(2026, 7, 15);

    // Months ago: outside every window, including the trailing 30 days.
    engine
        .create_spending(&user, spending(500.0, None, "rent", day(2026, 5, 20)))
        .await
        .unwrap();
    // This month, outside the trailing week.
    engine
        .create_spending(&user, spending(40.0, None, "food", day(2026, 7, 2)))
        .await
        .unwrap();
    engine
        .create_spending(&user, spending(60.0, None, "travel", day(2026, 7, 3)))
        .await
        .unwrap();
    // Inside the trailing week.
    engine
        .create_spending(&user, spending(10.0, None, "food", day(2026, 7, 14)))
        .await
        .unwrap();

    let stats = engine.dashboard(user.id, today).await.unwrap();

    assert_eq!(stats.total_spending, 110.0);
    assert_eq!(stats.weekly_spending, 10.0);
    assert_eq!(stats.monthly_transactions, 3);
    assert_eq!(stats.highest_single_spending, 60.0);
    // 30-day window: 110 / 30.
    assert!((stats.average_daily - 110.0 / 30.0).abs() < 1e-9);

    assert_eq!(stats.category_distribution.len(), 2);
    assert_eq!(stats.category_distribution[0].category, "travel");
    assert_eq!(stats.category_distribution[1].category, "food");
    assert_eq!(stats.category_distribution[1].amount, 50.0);

    let trend_total: f64 = stats.weekly_trend.iter().map(|(_, amount)| amount).sum();
    assert_eq!(trend_total, 10.0);
    assert_eq!(stats.weekly_trend.last().unwrap().0, today);
}

#[tokio::test]
async fn labels_flow_from_list_to_details() {
    let (engine, _calls) = engine_with_rates(HashMap::new()).await;
    let user = create_user(&engine, "a@x.com").await;

    let tagged = |amount: f64, category: &str, label: &str, dom: u32| NewSpending {
        label: Some(label.to_string()),
        ..spending(amount, None, category, day(2026, 7, dom))
    };

    engine
        .create_spending(&user, tagged(30.0, "food", "holiday", 2))
        .await
        .unwrap();
    engine
        .create_spending(&user, tagged(70.0, "hotel", "holiday", 5))
        .await
        .unwrap();
    engine
        .create_spending(&user, tagged(5.0, "coffee", "office", 7))
        .await
        .unwrap();
    // Untagged row stays out of label stats.
    engine
        .create_spending(&user, spending(99.0, None, "rent", day(2026, 7, 1)))
        .await
        .unwrap();

    let mut labels = engine.labels(user.id).await.unwrap();
    labels.sort();
    assert_eq!(labels, vec!["holiday".to_string(), "office".to_string()]);

    let overview = engine.labels_overview(user.id).await.unwrap();
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].label, "holiday");
    assert_eq!(overview[0].total_spending, 100.0);
    assert_eq!(overview[1].label, "office");

    let details = engine.label_details(user.id, "holiday").await.unwrap();
    assert_eq!(details.transaction_count, 2);
    assert_eq!(details.average_per_transaction, 50.0);
    assert_eq!(details.highest_spending_amount, 70.0);
    assert_eq!(details.highest_spending_date, day(2026, 7, 5));
    assert_eq!(details.first_transaction_date, day(2026, 7, 2));
    assert_eq!(details.last_transaction_date, day(2026, 7, 5));

    let err = engine.label_details(user.id, "nope").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("label".to_string()));
}
