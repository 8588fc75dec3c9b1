pub mod aggregate;
pub mod export;
pub mod period;
pub mod reporter;

pub use crate::domain::model::{AnalyticsReport, DailyRevenuePoint, DailySummary, Order, Review};
pub use crate::domain::ports::{
    ConfigProvider, OrderQuery, OrderStore, ReviewStore, Storage, SummaryStore, TimestampRange,
};
pub use crate::utils::error::Result;
