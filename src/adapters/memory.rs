use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::model::{DailySummary, Order, Review};
use crate::domain::ports::{OrderQuery, OrderStore, ReviewStore, SummaryStore, TimestampRange};
use crate::utils::error::Result;

/// Orders and reviews as laid out in a JSON dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Dataset {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read(path)?;
        Self::from_json_slice(&content)
    }

    pub fn from_json_slice(content: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(content)?)
    }
}

#[derive(Debug, Default)]
struct Tables {
    orders: Vec<Order>,
    reviews: Vec<Review>,
    summaries: Vec<DailySummary>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                orders: dataset.orders,
                reviews: dataset.reviews,
                summaries: Vec::new(),
            })),
        }
    }

    pub async fn insert_order(&self, order: Order) {
        self.tables.write().await.orders.push(order);
    }

    pub async fn insert_review(&self, review: Review) {
        self.tables.write().await.reviews.push(review);
    }

    pub async fn summaries(&self) -> Vec<DailySummary> {
        self.tables.read().await.summaries.clone()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn query_orders(&self, restaurant_id: i64, query: &OrderQuery) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|order| order.restaurant_id == restaurant_id && query.matches(order))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn query_reviews(
        &self,
        restaurant_id: i64,
        range: Option<TimestampRange>,
    ) -> Result<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|review| review.restaurant_id == restaurant_id)
            .filter(|review| range.map_or(true, |range| range.contains(review.created_at)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn upsert_summaries(&self, summaries: &[DailySummary]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for summary in summaries {
            let existing = tables.summaries.iter_mut().find(|row| {
                row.restaurant_id == summary.restaurant_id && row.date == summary.date
            });
            match existing {
                Some(row) => *row = summary.clone(),
                None => tables.summaries.push(summary.clone()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OrderStatus;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn order(id: i64, restaurant_id: i64, status: OrderStatus, day: u32) -> Order {
        Order {
            id,
            restaurant_id,
            table_id: Some(1),
            status,
            total: 10.0,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            completed_at: None,
            items_json: "[]".to_string(),
        }
    }

    fn january(from: u32, to: u32) -> TimestampRange {
        TimestampRange {
            start: Utc.with_ymd_and_hms(2024, 1, from, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, to, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_query_orders_filters_restaurant_status_and_range() {
        let store = MemoryStore::new();
        store.insert_order(order(1, 1, OrderStatus::Completed, 10)).await;
        store.insert_order(order(2, 1, OrderStatus::Pending, 10)).await;
        store.insert_order(order(3, 2, OrderStatus::Completed, 10)).await;
        store.insert_order(order(4, 1, OrderStatus::Completed, 20)).await;

        let completed = store
            .query_orders(1, &OrderQuery::completed_within(january(9, 11)))
            .await
            .unwrap();
        let ids: Vec<i64> = completed.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1]);

        let everything = store.query_orders(1, &OrderQuery::default()).await.unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn test_query_reviews_by_range() {
        let store = MemoryStore::new();
        let at = |day| Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap();
        store
            .insert_review(Review::new(1, 1, 5, Some("Great".into()), at(10)).unwrap())
            .await;
        store
            .insert_review(Review::new(2, 1, 3, None, at(15)).unwrap())
            .await;

        let in_range = store.query_reviews(1, Some(january(9, 11))).await.unwrap();
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].id, 1);

        assert_eq!(store.query_reviews(1, None).await.unwrap().len(), 2);
        assert!(store.query_reviews(99, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_summaries_replaces_same_day() {
        let store = MemoryStore::new();
        let summary = |orders, revenue| DailySummary {
            restaurant_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            total_orders: orders,
            total_revenue: revenue,
            average_order_value: 0.0,
        };

        store.upsert_summaries(&[summary(1, 10.0)]).await.unwrap();
        store.upsert_summaries(&[summary(3, 30.0)]).await.unwrap();

        let rows = store.summaries().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_orders, 3);
    }

    #[test]
    fn test_dataset_from_json() {
        let json = br#"{
            "orders": [{
                "id": 1, "restaurant_id": 1, "status": "completed", "total": 99.5,
                "created_at": "2024-01-10T12:00:00Z", "items_json": "[{\"name\": \"Pav Bhaji\"}]"
            }],
            "reviews": [{"id": 1, "restaurant_id": 1, "rating": 4, "created_at": "2024-01-10T13:00:00Z"}]
        }"#;

        let dataset = Dataset::from_json_slice(json).unwrap();
        assert_eq!(dataset.orders.len(), 1);
        assert_eq!(dataset.orders[0].status, OrderStatus::Completed);
        assert_eq!(dataset.orders[0].table_id, None);
        assert_eq!(dataset.reviews[0].rating(), 4);

        assert!(Dataset::from_json_slice(b"{\"orders\": 5}").is_err());
    }
}
