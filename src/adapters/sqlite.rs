//! SQLite implementation of the order, review and summary stores.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sea_query::{Expr, OnConflict, Order as SortOrder, Query, SqliteQueryBuilder};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::schema::{
    Analytics, Orders, Reviews, CREATE_ANALYTICS_TABLE, CREATE_ORDERS_TABLE,
    CREATE_REVIEWS_TABLE, ORDER_EFFECTIVE_AT,
};
use crate::domain::model::{ymd, DailySummary, Order, OrderStatus, Review};
use crate::domain::ports::{OrderQuery, OrderStore, ReviewStore, SummaryStore, TimestampRange};
use crate::utils::error::{AnalyticsError, Result};

/// Fixed-width RFC 3339 text, so string order matches time order.
pub fn to_sql_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_sql_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| AnalyticsError::store(format!("bad {} value '{}': {}", column, raw, e)))
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::debug!(url, max_connections, "Connected to SQLite");
        Ok(Self::new(pool))
    }

    /// Single-connection in-memory database, kept alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_REVIEWS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_ANALYTICS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_order(&self, order: &Order) -> Result<()> {
        let sql = Query::insert()
            .into_table(Orders::Table)
            .columns([
                Orders::Id,
                Orders::RestaurantId,
                Orders::TableId,
                Orders::ItemsJson,
                Orders::Total,
                Orders::Status,
                Orders::CreatedAt,
                Orders::CompletedAt,
            ])
            .values_panic([
                order.id.into(),
                order.restaurant_id.into(),
                order.table_id.into(),
                order.items_json.as_str().into(),
                order.total.into(),
                order.status.as_str().into(),
                to_sql_timestamp(order.created_at).into(),
                order.completed_at.map(to_sql_timestamp).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn insert_review(&self, review: &Review) -> Result<()> {
        let sql = Query::insert()
            .into_table(Reviews::Table)
            .columns([
                Reviews::Id,
                Reviews::RestaurantId,
                Reviews::Rating,
                Reviews::Comment,
                Reviews::CreatedAt,
            ])
            .values_panic([
                review.id.into(),
                review.restaurant_id.into(),
                i64::from(review.rating()).into(),
                review.comment.clone().into(),
                to_sql_timestamp(review.created_at).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn daily_summaries(&self, restaurant_id: i64) -> Result<Vec<DailySummary>> {
        let sql = Query::select()
            .columns([
                Analytics::RestaurantId,
                Analytics::Date,
                Analytics::TotalOrders,
                Analytics::TotalRevenue,
                Analytics::AverageOrderValue,
            ])
            .from(Analytics::Table)
            .and_where(Expr::col(Analytics::RestaurantId).eq(restaurant_id))
            .order_by(Analytics::Date, SortOrder::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(summary_from_row).collect()
    }
}

fn order_from_row(row: &SqliteRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let completed_at: Option<String> = row.try_get("completed_at")?;

    Ok(Order {
        id: row.try_get("id")?,
        restaurant_id: row.try_get("restaurant_id")?,
        table_id: row.try_get("table_id")?,
        status: status.parse::<OrderStatus>()?,
        total: row.try_get("total")?,
        created_at: parse_sql_timestamp("created_at", &created_at)?,
        completed_at: completed_at
            .as_deref()
            .map(|raw| parse_sql_timestamp("completed_at", raw))
            .transpose()?,
        items_json: row.try_get("items_json")?,
    })
}

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let id: i64 = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;

    Review::new(
        id,
        row.try_get("restaurant_id")?,
        row.try_get("rating")?,
        row.try_get("comment")?,
        parse_sql_timestamp("created_at", &created_at)?,
    )
    .map_err(|e| AnalyticsError::store(format!("review {}: {}", id, e)))
}

fn summary_from_row(row: &SqliteRow) -> Result<DailySummary> {
    let date: String = row.try_get("date")?;
    let total_orders: i64 = row.try_get("total_orders")?;

    Ok(DailySummary {
        restaurant_id: row.try_get("restaurant_id")?,
        date: NaiveDate::parse_from_str(&date, ymd::FORMAT)
            .map_err(|e| AnalyticsError::store(format!("bad date '{}': {}", date, e)))?,
        total_orders: total_orders.max(0) as u64,
        total_revenue: row.try_get("total_revenue")?,
        average_order_value: row.try_get("average_order_value")?,
    })
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn query_orders(&self, restaurant_id: i64, query: &OrderQuery) -> Result<Vec<Order>> {
        // the builder is not Send, so it must not live across the await
        let sql = {
            let mut select = Query::select();
            select
                .columns([
                    Orders::Id,
                    Orders::RestaurantId,
                    Orders::TableId,
                    Orders::ItemsJson,
                    Orders::Total,
                    Orders::Status,
                    Orders::CreatedAt,
                    Orders::CompletedAt,
                ])
                .from(Orders::Table)
                .and_where(Expr::col(Orders::RestaurantId).eq(restaurant_id));

            if let Some(status) = query.status {
                select.and_where(Expr::col(Orders::Status).eq(status.as_str()));
            }
            if let Some(range) = query.range {
                select
                    .and_where(Expr::cust_with_values(
                        format!("{} >= ?", ORDER_EFFECTIVE_AT),
                        [to_sql_timestamp(range.start)],
                    ))
                    .and_where(Expr::cust_with_values(
                        format!("{} < ?", ORDER_EFFECTIVE_AT),
                        [to_sql_timestamp(range.end)],
                    ));
            }
            select
                .order_by(Orders::Id, SortOrder::Asc)
                .to_string(SqliteQueryBuilder)
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(order_from_row).collect()
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn query_reviews(
        &self,
        restaurant_id: i64,
        range: Option<TimestampRange>,
    ) -> Result<Vec<Review>> {
        let sql = {
            let mut select = Query::select();
            select
                .columns([
                    Reviews::Id,
                    Reviews::RestaurantId,
                    Reviews::Rating,
                    Reviews::Comment,
                    Reviews::CreatedAt,
                ])
                .from(Reviews::Table)
                .and_where(Expr::col(Reviews::RestaurantId).eq(restaurant_id));

            if let Some(range) = range {
                select
                    .and_where(Expr::col(Reviews::CreatedAt).gte(to_sql_timestamp(range.start)))
                    .and_where(Expr::col(Reviews::CreatedAt).lt(to_sql_timestamp(range.end)));
            }
            select
                .order_by(Reviews::Id, SortOrder::Asc)
                .to_string(SqliteQueryBuilder)
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(review_from_row).collect()
    }
}

#[async_trait]
impl SummaryStore for SqliteStore {
    async fn upsert_summaries(&self, summaries: &[DailySummary]) -> Result<()> {
        if summaries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for summary in summaries {
            let sql = Query::insert()
                .into_table(Analytics::Table)
                .columns([
                    Analytics::RestaurantId,
                    Analytics::Date,
                    Analytics::TotalOrders,
                    Analytics::TotalRevenue,
                    Analytics::AverageOrderValue,
                ])
                .values_panic([
                    summary.restaurant_id.into(),
                    summary.date.format(ymd::FORMAT).to_string().into(),
                    (summary.total_orders as i64).into(),
                    summary.total_revenue.into(),
                    summary.average_order_value.into(),
                ])
                .on_conflict(
                    OnConflict::columns([Analytics::RestaurantId, Analytics::Date])
                        .update_columns([
                            Analytics::TotalOrders,
                            Analytics::TotalRevenue,
                            Analytics::AverageOrderValue,
                        ])
                        .to_owned(),
                )
                .to_string(SqliteQueryBuilder);

            sqlx::query(&sql).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(())
    }
}
