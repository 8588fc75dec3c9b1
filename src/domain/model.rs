use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::{AnalyticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(AnalyticsError::store(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
}

/// Outcome of decoding an order's serialized line items.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedItems {
    Items(Vec<LineItem>),
    Malformed(String),
}

impl ParsedItems {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let items: &[LineItem] = match self {
            ParsedItems::Items(items) => items,
            ParsedItems::Malformed(_) => &[],
        };
        items.iter().map(|item| item.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    #[serde(default)]
    pub table_id: Option<i64>,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub items_json: String,
}

impl Order {
    /// Completion time when known, otherwise the time the order was placed.
    pub fn effective_at(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }

    pub fn parse_items(&self) -> ParsedItems {
        match serde_json::from_str::<Vec<LineItem>>(&self.items_json) {
            Ok(items) => ParsedItems::Items(items),
            Err(e) => ParsedItems::Malformed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReview")]
pub struct Review {
    pub id: i64,
    pub restaurant_id: i64,
    rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawReview {
    id: i64,
    restaurant_id: i64,
    rating: i64,
    #[serde(default)]
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RawReview> for Review {
    type Error = AnalyticsError;

    fn try_from(raw: RawReview) -> Result<Self> {
        Review::new(
            raw.id,
            raw.restaurant_id,
            raw.rating,
            raw.comment,
            raw.created_at,
        )
    }
}

impl Review {
    pub fn new(
        id: i64,
        restaurant_id: i64,
        rating: i64,
        comment: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if !(1..=5).contains(&rating) {
            return Err(AnalyticsError::validation(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }

        Ok(Self {
            id,
            restaurant_id,
            rating: rating as u8,
            comment,
            created_at,
        })
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Comment text, if it has any visible content.
    pub fn visible_comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .filter(|comment| !comment.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenuePoint {
    #[serde(with = "ymd")]
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub restaurant_id: i64,
    #[serde(with = "ymd")]
    pub date: NaiveDate,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBounds {
    #[serde(with = "ymd")]
    pub start: NaiveDate,
    #[serde(with = "ymd")]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_rating: f64,
    pub previous_orders: u64,
    pub previous_revenue: f64,
    pub previous_rating: f64,
    pub revenue_trend: Vec<DailyRevenuePoint>,
    pub top_items: Vec<String>,
    pub recent_reviews: Vec<String>,
    pub average_order_value: f64,
    pub period: PeriodBounds,
    pub previous_period: PeriodBounds,
}

/// `YYYY-MM-DD` on the wire.
pub(crate) mod ymd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
