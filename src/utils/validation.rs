use crate::utils::error::{AnalyticsError, Result};
use chrono::NaiveDate;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_database_url(field_name: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url.to_string(),
            reason: "Database URL cannot be empty".to_string(),
        });
    }

    if !url.starts_with("sqlite:") {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url.to_string(),
            reason: "Only sqlite: URLs are supported".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Rejects values still carrying an unexpanded `${VAR}` reference.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if let Some(start) = value.find("${") {
        let var = value[start + 2..].split('}').next().unwrap_or_default();
        return Err(AnalyticsError::MissingConfigError {
            field: format!("{} (environment variable {})", field_name, var),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Strict `YYYY-MM-DD` parse for places where a bad date is a user error
/// (CLI rollup bounds), unlike the report selector which falls back.
pub fn validate_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Expected YYYY-MM-DD: {}", e),
        }
    })
}

pub fn validate_restaurant_id(restaurant_id: i64) -> Result<()> {
    if restaurant_id <= 0 {
        return Err(AnalyticsError::validation(format!(
            "restaurant id must be positive, got {}",
            restaurant_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_database_url() {
        assert!(validate_database_url("database.url", "sqlite:dine.db?mode=rwc").is_ok());
        assert!(validate_database_url("database.url", "sqlite::memory:").is_ok());
        assert!(validate_database_url("database.url", "").is_err());
        assert!(validate_database_url("database.url", "postgres://localhost/dine").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("database.max_connections", 5, 1).is_ok());
        assert!(validate_positive_number("database.max_connections", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("analytics.top_items_limit", 5, 1, 50).is_ok());
        assert!(validate_range("analytics.top_items_limit", 0, 1, 50).is_err());
        assert!(validate_range("analytics.top_items_limit", 51, 1, 50).is_err());
    }

    #[test]
    fn test_validate_date() {
        let date = validate_date("start_date", "2024-01-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(validate_date("start_date", "2024-13-01").is_err());
        assert!(validate_date("start_date", "10/01/2024").is_err());
    }

    #[test]
    fn test_validate_restaurant_id() {
        assert!(validate_restaurant_id(1).is_ok());
        assert!(validate_restaurant_id(0).is_err());
        assert!(validate_restaurant_id(-3).is_err());
    }

    #[test]
    fn test_validate_resolved() {
        assert!(validate_resolved("database.url", "sqlite:dine.db").is_ok());
        let err = validate_resolved("database.url", "${DINE_DB}").unwrap_err();
        assert!(err.to_string().contains("DINE_DB"));
    }
}
