//! Aggregations over already-filtered order and review rows.
//!
//! Callers pass the rows a store returned for one period; nothing here
//! re-checks status or timestamps except where a period is needed to
//! place values on calendar days.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::core::period::Period;
use crate::domain::model::{DailyRevenuePoint, DailySummary, Order, ParsedItems, Review};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderTotals {
    pub count: u64,
    pub revenue: f64,
}

impl OrderTotals {
    pub fn average_order_value(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_to(self.revenue / self.count as f64, 2)
    }
}

pub fn order_totals(orders: &[Order]) -> OrderTotals {
    OrderTotals {
        count: orders.len() as u64,
        revenue: orders.iter().map(|order| order.total).sum(),
    }
}

fn totals_by_date(orders: &[Order]) -> BTreeMap<NaiveDate, OrderTotals> {
    let mut by_date: BTreeMap<NaiveDate, OrderTotals> = BTreeMap::new();
    for order in orders {
        let totals = by_date.entry(order.effective_at().date_naive()).or_default();
        totals.count += 1;
        totals.revenue += order.total;
    }
    by_date
}

/// One point per day of `period`, ascending, zero for days without sales.
pub fn revenue_trend(period: &Period, orders: &[Order]) -> Vec<DailyRevenuePoint> {
    let by_date = totals_by_date(orders);
    period
        .dates()
        .map(|date| DailyRevenuePoint {
            date,
            revenue: by_date.get(&date).map_or(0.0, |totals| totals.revenue),
        })
        .collect()
}

pub fn daily_summaries(restaurant_id: i64, period: &Period, orders: &[Order]) -> Vec<DailySummary> {
    let by_date = totals_by_date(orders);
    period
        .dates()
        .map(|date| {
            let totals = by_date.get(&date).copied().unwrap_or_default();
            DailySummary {
                restaurant_id,
                date,
                total_orders: totals.count,
                total_revenue: totals.revenue,
                average_order_value: totals.average_order_value(),
            }
        })
        .collect()
}

/// Mean rating to one decimal place, `0.0` without reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u64 = reviews.iter().map(|review| u64::from(review.rating())).sum();
    round_to(sum as f64 / reviews.len() as f64, 1)
}

/// Most frequently ordered item names. Equal counts keep the order in
/// which the names were first seen.
pub fn top_items(orders: &[Order], limit: usize) -> Vec<String> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for order in orders {
        let parsed = order.parse_items();
        if let ParsedItems::Malformed(reason) = &parsed {
            tracing::debug!(order_id = order.id, %reason, "skipping unreadable order items");
        }

        for name in parsed.names() {
            match positions.get(name) {
                Some(&index) => counts[index].1 += 1,
                None => {
                    positions.insert(name.to_string(), counts.len());
                    counts.push((name.to_string(), 1));
                }
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(name, _)| name)
        .collect()
}

/// Latest non-blank comments, newest first.
pub fn recent_reviews(reviews: &[Review], limit: usize) -> Vec<String> {
    let mut commented: Vec<&Review> = reviews
        .iter()
        .filter(|review| review.visible_comment().is_some())
        .collect();
    commented.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    commented
        .into_iter()
        .take(limit)
        .filter_map(|review| review.comment.clone())
        .collect()
}

/// Exact halves round to the even neighbour.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
