//! Table identifiers and DDL for the SQLite store.

use sea_query::Iden;

#[derive(Iden)]
pub enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "restaurant_id"]
    RestaurantId,
    #[iden = "table_id"]
    TableId,
    #[iden = "items_json"]
    ItemsJson,
    #[iden = "total"]
    Total,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "completed_at"]
    CompletedAt,
}

#[derive(Iden)]
pub enum Reviews {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "restaurant_id"]
    RestaurantId,
    #[iden = "rating"]
    Rating,
    #[iden = "comment"]
    Comment,
    #[iden = "created_at"]
    CreatedAt,
}

/// Daily rollup rows, unique per restaurant and date.
#[derive(Iden)]
pub enum Analytics {
    Table,
    #[iden = "restaurant_id"]
    RestaurantId,
    #[iden = "date"]
    Date,
    #[iden = "total_orders"]
    TotalOrders,
    #[iden = "total_revenue"]
    TotalRevenue,
    #[iden = "average_order_value"]
    AverageOrderValue,
}

/// Expression the analytics window is matched against.
pub const ORDER_EFFECTIVE_AT: &str = "COALESCE(completed_at, created_at)";

pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL,
    table_id INTEGER,
    items_json TEXT NOT NULL,
    total REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_orders_restaurant_status ON orders(restaurant_id, status);
"#;

pub const CREATE_REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_restaurant_created ON reviews(restaurant_id, created_at);
"#;

pub const CREATE_ANALYTICS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analytics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    total_orders INTEGER NOT NULL DEFAULT 0,
    total_revenue REAL NOT NULL DEFAULT 0,
    average_order_value REAL NOT NULL DEFAULT 0,
    UNIQUE (restaurant_id, date)
);
"#;
