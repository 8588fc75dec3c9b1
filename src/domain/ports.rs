use crate::domain::model::{DailySummary, Order, OrderStatus, Review};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Half-open instant range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimestampRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub range: Option<TimestampRange>,
}

impl OrderQuery {
    pub fn completed_within(range: TimestampRange) -> Self {
        Self {
            status: Some(OrderStatus::Completed),
            range: Some(range),
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |status| order.status == status)
            && self
                .range
                .map_or(true, |range| range.contains(order.effective_at()))
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn query_orders(&self, restaurant_id: i64, query: &OrderQuery) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn query_reviews(
        &self,
        restaurant_id: i64,
        range: Option<TimestampRange>,
    ) -> Result<Vec<Review>>;
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn upsert_summaries(&self, summaries: &[DailySummary]) -> Result<()>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> &str;
    fn bind_address(&self) -> String;
    fn top_items_limit(&self) -> usize;
    fn recent_reviews_limit(&self) -> usize;
    fn max_period_days(&self) -> u64;
}
