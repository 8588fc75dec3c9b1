use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use dine_analytics::adapters::memory::{Dataset, MemoryStore};
use dine_analytics::core::period::{Period, TimeRangeSelector};
use dine_analytics::core::reporter::{AnalyticsReporter, ReportOptions};
use dine_analytics::domain::model::{Order, OrderStatus, Review};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

fn order(id: i64, restaurant_id: i64, total: f64, when: DateTime<Utc>, items: &[&str]) -> Order {
    let items: Vec<_> = items
        .iter()
        .map(|name| serde_json::json!({ "name": name, "quantity": 1 }))
        .collect();
    Order {
        id,
        restaurant_id,
        table_id: Some(1),
        status: OrderStatus::Completed,
        total,
        created_at: when - Duration::minutes(30),
        completed_at: Some(when),
        items_json: serde_json::to_string(&items).unwrap(),
    }
}

fn review(id: i64, restaurant_id: i64, rating: i64, comment: &str, when: DateTime<Utc>) -> Review {
    Review::new(id, restaurant_id, rating, Some(comment.to_string()), when).unwrap()
}

fn reporter(store: &MemoryStore) -> AnalyticsReporter<MemoryStore, MemoryStore> {
    AnalyticsReporter::new(store.clone(), store.clone())
}

#[tokio::test]
async fn test_seven_day_report_fills_trend_gaps() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    for (id, total) in [(1, 100.0), (2, 50.0), (3, 75.0)] {
        store
            .insert_order(order(id, 1, total, at(day(2024, 3, 12), 12), &["Pho"]))
            .await;
    }

    let report = reporter(&store)
        .compute_analytics_on(1, &TimeRangeSelector::SevenDays, today)
        .await
        .unwrap();

    assert_eq!(report.total_orders, 3);
    assert_eq!(report.total_revenue, 225.0);
    assert_eq!(report.previous_orders, 0);
    assert_eq!(report.previous_revenue, 0.0);
    assert_eq!(report.average_order_value, 75.0);

    assert_eq!(report.revenue_trend.len(), 7);
    assert_eq!(report.revenue_trend[0].date, day(2024, 3, 9));
    assert_eq!(report.revenue_trend[6].date, today);
    for point in &report.revenue_trend {
        let expected = if point.date == day(2024, 3, 12) { 225.0 } else { 0.0 };
        assert_eq!(point.revenue, expected, "revenue on {}", point.date);
    }
}

#[tokio::test]
async fn test_custom_range_and_previous_period() {
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 7, 40.0, at(day(2024, 1, 10), 9), &["Tea"]))
        .await;
    store
        .insert_order(order(2, 7, 60.0, at(day(2024, 1, 12), 23), &["Tea"]))
        .await;
    store
        .insert_order(order(3, 7, 25.0, at(day(2024, 1, 8), 18), &["Cake"]))
        .await;
    // outside both windows
    store
        .insert_order(order(4, 7, 999.0, at(day(2024, 1, 13), 0), &["Cake"]))
        .await;
    store
        .insert_review(review(1, 7, 4, "good", at(day(2024, 1, 11), 10)))
        .await;
    store
        .insert_review(review(2, 7, 5, "great", at(day(2024, 1, 11), 11)))
        .await;
    store
        .insert_review(review(3, 7, 2, "meh", at(day(2024, 1, 7), 11)))
        .await;

    let selector = TimeRangeSelector::custom("2024-01-10", "2024-01-12");
    let report = reporter(&store)
        .compute_analytics_on(7, &selector, day(2024, 6, 1))
        .await
        .unwrap();

    assert_eq!(report.period.start, day(2024, 1, 10));
    assert_eq!(report.period.end, day(2024, 1, 12));
    assert_eq!(report.previous_period.start, day(2024, 1, 7));
    assert_eq!(report.previous_period.end, day(2024, 1, 9));

    assert_eq!(report.total_orders, 2);
    assert_eq!(report.total_revenue, 100.0);
    assert_eq!(report.previous_orders, 1);
    assert_eq!(report.previous_revenue, 25.0);
    assert_eq!(report.average_rating, 4.5);
    assert_eq!(report.previous_rating, 2.0);
    assert_eq!(report.revenue_trend.len(), 3);
    assert_eq!(report.top_items, vec!["Tea".to_string()]);
    assert_eq!(report.recent_reviews, vec!["great".to_string(), "good".to_string()]);
}

#[tokio::test]
async fn test_custom_without_end_date_falls_back_to_seven_days() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    let selector = TimeRangeSelector::from_params(Some("custom"), Some("2024-01-10"), None);

    let report = reporter(&store)
        .compute_analytics_on(1, &selector, today)
        .await
        .unwrap();

    assert_eq!(report.period.start, day(2024, 3, 9));
    assert_eq!(report.period.end, today);
    assert_eq!(report.revenue_trend.len(), 7);

    let reversed = TimeRangeSelector::custom("2024-01-12", "2024-01-10");
    let report = reporter(&store)
        .compute_analytics_on(1, &reversed, today)
        .await
        .unwrap();
    assert_eq!(report.period.end, today);
}

#[tokio::test]
async fn test_malformed_items_still_count_toward_totals() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 1, 20.0, at(today, 8), &["Bun"]))
        .await;
    let mut broken = order(2, 1, 30.0, at(today, 9), &[]);
    broken.items_json = "{not json".to_string();
    store.insert_order(broken).await;

    let report = reporter(&store)
        .compute_analytics_on(1, &TimeRangeSelector::SevenDays, today)
        .await
        .unwrap();

    assert_eq!(report.total_orders, 2);
    assert_eq!(report.total_revenue, 50.0);
    assert_eq!(report.top_items, vec!["Bun".to_string()]);
}

#[tokio::test]
async fn test_no_reviews_yields_zero_rating() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 1, 20.0, at(today, 8), &["Bun"]))
        .await;

    let report = reporter(&store)
        .compute_analytics_on(1, &TimeRangeSelector::ThirtyDays, today)
        .await
        .unwrap();

    assert_eq!(report.average_rating, 0.0);
    assert_eq!(report.previous_rating, 0.0);
    assert!(report.recent_reviews.is_empty());
    assert_eq!(report.revenue_trend.len(), 30);
}

#[tokio::test]
async fn test_unknown_restaurant_yields_empty_report() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 1, 20.0, at(today, 8), &["Bun"]))
        .await;

    let report = reporter(&store)
        .compute_analytics_on(42, &TimeRangeSelector::SevenDays, today)
        .await
        .unwrap();

    assert_eq!(report.total_orders, 0);
    assert_eq!(report.total_revenue, 0.0);
    assert_eq!(report.average_order_value, 0.0);
    assert!(report.top_items.is_empty());
    assert!(report.revenue_trend.iter().all(|point| point.revenue == 0.0));
}

#[tokio::test]
async fn test_unfinished_orders_are_excluded() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 1, 10.0, at(today, 8), &["Bun"]))
        .await;
    let mut pending = order(2, 1, 500.0, at(today, 9), &["Steak"]);
    pending.status = OrderStatus::Pending;
    pending.completed_at = None;
    store.insert_order(pending).await;
    let mut ready = order(3, 1, 300.0, at(today, 10), &["Steak"]);
    ready.status = OrderStatus::Ready;
    ready.completed_at = None;
    store.insert_order(ready).await;

    let report = reporter(&store)
        .compute_analytics_on(1, &TimeRangeSelector::SevenDays, today)
        .await
        .unwrap();

    assert_eq!(report.total_orders, 1);
    assert_eq!(report.total_revenue, 10.0);
    assert_eq!(report.top_items, vec!["Bun".to_string()]);
}

#[tokio::test]
async fn test_report_invariants_on_busy_restaurant() {
    let today = day(2024, 3, 31);
    let store = MemoryStore::new();
    let menu = ["Pho", "Banh Mi", "Spring Roll", "Coffee", "Tea", "Cake", "Soup"];

    for i in 0..60i64 {
        let date = today - Duration::days(i % 40);
        let items: Vec<&str> = menu
            .iter()
            .copied()
            .take((i as usize % menu.len()) + 1)
            .collect();
        store
            .insert_order(order(i, 1, 10.0 + i as f64, at(date, (i % 24) as u32), &items))
            .await;
    }
    for i in 0..12i64 {
        let comment = if i % 3 == 0 {
            "   ".to_string()
        } else {
            format!("tasty {}", i)
        };
        store
            .insert_review(review(
                i,
                1,
                (i % 5) + 1,
                &comment,
                at(today - Duration::days(i), 12),
            ))
            .await;
    }

    let report = reporter(&store)
        .compute_analytics_on(1, &TimeRangeSelector::ThirtyDays, today)
        .await
        .unwrap();

    let trend_sum: f64 = report.revenue_trend.iter().map(|point| point.revenue).sum();
    assert!((trend_sum - report.total_revenue).abs() < 1e-9);

    assert_eq!(report.revenue_trend.len(), 30);
    for pair in report.revenue_trend.windows(2) {
        assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
    }

    assert_eq!(
        report.previous_period.end.succ_opt().unwrap(),
        report.period.start
    );
    assert_eq!(
        report.previous_period.end - report.previous_period.start,
        report.period.end - report.period.start
    );

    assert!(report.top_items.len() <= 5);
    assert_eq!(report.top_items[0], "Pho");
    assert!(report.recent_reviews.len() <= 5);
    assert!(report.recent_reviews.iter().all(|c| !c.trim().is_empty()));
    assert_eq!(report.recent_reviews[0], "tasty 1");
}

#[tokio::test]
async fn test_limits_follow_report_options() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 1, 10.0, at(today, 8), &["A", "B", "C"]))
        .await;
    store
        .insert_review(review(1, 1, 5, "first", at(today, 8)))
        .await;
    store
        .insert_review(review(2, 1, 5, "second", at(today, 9)))
        .await;

    let report = reporter(&store)
        .with_options(ReportOptions {
            top_items_limit: 2,
            recent_reviews_limit: 1,
            ..ReportOptions::default()
        })
        .compute_analytics_on(1, &TimeRangeSelector::SevenDays, today)
        .await
        .unwrap();

    assert_eq!(report.top_items, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(report.recent_reviews, vec!["second".to_string()]);
}

#[tokio::test]
async fn test_rollup_stores_one_row_per_day() {
    let store = MemoryStore::new();
    store
        .insert_order(order(1, 1, 30.0, at(day(2024, 2, 1), 10), &["Pho"]))
        .await;
    store
        .insert_order(order(2, 1, 10.0, at(day(2024, 2, 1), 11), &["Pho"]))
        .await;

    let period = Period::new(day(2024, 2, 1), day(2024, 2, 3)).unwrap();
    let summaries = reporter(&store).rollup(1, &period, &store).await.unwrap();

    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0].total_orders, 2);
    assert_eq!(summaries[0].total_revenue, 40.0);
    assert_eq!(summaries[0].average_order_value, 20.0);
    assert_eq!(summaries[2].total_orders, 0);
    assert_eq!(store.summaries().await, summaries);

    // re-running replaces rather than duplicates
    reporter(&store).rollup(1, &period, &store).await.unwrap();
    assert_eq!(store.summaries().await.len(), 3);
}

#[tokio::test]
async fn test_report_from_json_dataset() {
    let dataset = Dataset::from_json_slice(
        br#"{
            "orders": [
                {"id": 1, "restaurant_id": 5, "status": "completed", "total": 12.5,
                 "created_at": "2024-03-14T10:00:00Z", "completed_at": "2024-03-14T10:20:00Z",
                 "items_json": "[{\"name\": \"Latte\", \"quantity\": 2}]"}
            ],
            "reviews": [
                {"id": 1, "restaurant_id": 5, "rating": 4, "comment": "cosy",
                 "created_at": "2024-03-14T11:00:00Z"}
            ]
        }"#,
    )
    .unwrap();
    let store = MemoryStore::from_dataset(dataset);

    let report = reporter(&store)
        .compute_analytics_on(5, &TimeRangeSelector::SevenDays, day(2024, 3, 15))
        .await
        .unwrap();

    assert_eq!(report.total_orders, 1);
    assert_eq!(report.total_revenue, 12.5);
    assert_eq!(report.average_rating, 4.0);
    assert_eq!(report.top_items, vec!["Latte".to_string()]);
    assert_eq!(report.recent_reviews, vec!["cosy".to_string()]);
}

#[test]
fn test_dataset_rejects_out_of_range_rating() {
    let result = Dataset::from_json_slice(
        br#"{"reviews": [{"id": 1, "restaurant_id": 5, "rating": 9,
              "created_at": "2024-03-14T11:00:00Z"}]}"#,
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_custom_range_longer_than_limit_falls_back() {
    let today = day(2024, 3, 15);
    let store = MemoryStore::new();
    let month = TimeRangeSelector::custom("2024-01-01", "2024-01-31");

    let capped = reporter(&store)
        .with_options(ReportOptions {
            max_period_days: 30,
            ..ReportOptions::default()
        })
        .compute_analytics_on(1, &month, today)
        .await
        .unwrap();
    assert_eq!(capped.period.start, day(2024, 3, 9));
    assert_eq!(capped.revenue_trend.len(), 7);

    let everything = TimeRangeSelector::custom("0001-01-01", "9999-12-31");
    let report = reporter(&store)
        .compute_analytics_on(1, &everything, today)
        .await
        .unwrap();
    assert_eq!(report.revenue_trend.len(), 7);

    let report = reporter(&store)
        .compute_analytics_on(1, &month, today)
        .await
        .unwrap();
    assert_eq!(report.revenue_trend.len(), 31);
}
