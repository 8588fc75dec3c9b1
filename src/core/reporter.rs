use crate::core::aggregate;
use crate::core::period::{Period, TimeRangeSelector, DEFAULT_MAX_PERIOD_DAYS};
use crate::domain::model::{AnalyticsReport, DailySummary, Order, Review};
use crate::domain::ports::{ConfigProvider, OrderQuery, OrderStore, ReviewStore, SummaryStore};
use crate::utils::error::Result;
use chrono::{NaiveDate, Utc};

pub const DEFAULT_TOP_ITEMS: usize = 5;
pub const DEFAULT_RECENT_REVIEWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_items_limit: usize,
    pub recent_reviews_limit: usize,
    pub max_period_days: u64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_items_limit: DEFAULT_TOP_ITEMS,
            recent_reviews_limit: DEFAULT_RECENT_REVIEWS,
            max_period_days: DEFAULT_MAX_PERIOD_DAYS,
        }
    }
}

impl ReportOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            top_items_limit: config.top_items_limit(),
            recent_reviews_limit: config.recent_reviews_limit(),
            max_period_days: config.max_period_days(),
        }
    }
}

/// Builds per-restaurant analytics from an order store and a review store.
pub struct AnalyticsReporter<O: OrderStore, R: ReviewStore> {
    orders: O,
    reviews: R,
    options: ReportOptions,
}

impl<O: OrderStore, R: ReviewStore> AnalyticsReporter<O, R> {
    pub fn new(orders: O, reviews: R) -> Self {
        Self {
            orders,
            reviews,
            options: ReportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ReportOptions {
        self.options
    }

    pub async fn compute_analytics(
        &self,
        restaurant_id: i64,
        selector: &TimeRangeSelector,
    ) -> Result<AnalyticsReport> {
        self.compute_analytics_on(restaurant_id, selector, Utc::now().date_naive())
            .await
    }

    /// Same as [`compute_analytics`](Self::compute_analytics) with `today` supplied by the caller.
    pub async fn compute_analytics_on(
        &self,
        restaurant_id: i64,
        selector: &TimeRangeSelector,
        today: NaiveDate,
    ) -> Result<AnalyticsReport> {
        let period = Period::resolve_within(selector, today, self.options.max_period_days);
        let previous = period.previous();

        tracing::info!(
            restaurant_id,
            start = %period.start(),
            end = %period.end(),
            "Computing analytics"
        );

        let current_orders = self.completed_orders(restaurant_id, &period).await?;
        let previous_orders = self.completed_orders(restaurant_id, &previous).await?;
        let current_reviews = self.reviews_within(restaurant_id, &period).await?;
        let previous_reviews = self.reviews_within(restaurant_id, &previous).await?;

        tracing::debug!(
            current_orders = current_orders.len(),
            previous_orders = previous_orders.len(),
            current_reviews = current_reviews.len(),
            previous_reviews = previous_reviews.len(),
            "Fetched report rows"
        );

        let current = aggregate::order_totals(&current_orders);
        let prior = aggregate::order_totals(&previous_orders);

        Ok(AnalyticsReport {
            total_orders: current.count,
            total_revenue: current.revenue,
            average_rating: aggregate::average_rating(&current_reviews),
            previous_orders: prior.count,
            previous_revenue: prior.revenue,
            previous_rating: aggregate::average_rating(&previous_reviews),
            revenue_trend: aggregate::revenue_trend(&period, &current_orders),
            top_items: aggregate::top_items(&current_orders, self.options.top_items_limit),
            recent_reviews: aggregate::recent_reviews(
                &current_reviews,
                self.options.recent_reviews_limit,
            ),
            average_order_value: current.average_order_value(),
            period: period.bounds(),
            previous_period: previous.bounds(),
        })
    }

    /// Computes one summary row per day of `period` and hands them to `sink`.
    pub async fn rollup<S: SummaryStore>(
        &self,
        restaurant_id: i64,
        period: &Period,
        sink: &S,
    ) -> Result<Vec<DailySummary>> {
        let orders = self.completed_orders(restaurant_id, period).await?;
        let summaries = aggregate::daily_summaries(restaurant_id, period, &orders);

        sink.upsert_summaries(&summaries).await?;
        tracing::info!(
            restaurant_id,
            days = summaries.len(),
            orders = orders.len(),
            "Stored daily summaries"
        );

        Ok(summaries)
    }

    async fn completed_orders(&self, restaurant_id: i64, period: &Period) -> Result<Vec<Order>> {
        let query = OrderQuery::completed_within(period.timestamp_range());
        self.orders.query_orders(restaurant_id, &query).await
    }

    async fn reviews_within(&self, restaurant_id: i64, period: &Period) -> Result<Vec<Review>> {
        self.reviews
            .query_reviews(restaurant_id, Some(period.timestamp_range()))
            .await
    }
}
