use crate::domain::model::{ymd, PeriodBounds};
use crate::domain::ports::TimestampRange;
use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};

const DEFAULT_WINDOW_DAYS: u64 = 7;
const MONTH_WINDOW_DAYS: u64 = 30;

/// Longest custom range accepted, in days (about ten years).
pub const DEFAULT_MAX_PERIOD_DAYS: u64 = 3660;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeRangeSelector {
    #[default]
    SevenDays,
    ThirtyDays,
    Custom {
        start_date: Option<String>,
        end_date: Option<String>,
    },
}

impl TimeRangeSelector {
    /// Builds a selector from raw `timeRange` / `startDate` / `endDate` values.
    /// Anything unrecognised selects the 7-day window.
    pub fn from_params(
        time_range: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Self {
        match time_range.map(str::trim) {
            Some("30days") => TimeRangeSelector::ThirtyDays,
            Some("custom") => TimeRangeSelector::Custom {
                start_date: start_date.map(str::to_string),
                end_date: end_date.map(str::to_string),
            },
            _ => TimeRangeSelector::SevenDays,
        }
    }

    pub fn custom(start_date: &str, end_date: &str) -> Self {
        TimeRangeSelector::Custom {
            start_date: Some(start_date.to_string()),
            end_date: Some(end_date.to_string()),
        }
    }
}

/// Inclusive calendar-date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Returns `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn resolve(selector: &TimeRangeSelector, today: NaiveDate) -> Self {
        Self::resolve_within(selector, today, DEFAULT_MAX_PERIOD_DAYS)
    }

    /// Like [`resolve`](Self::resolve), treating custom ranges longer than
    /// `max_days` as invalid.
    pub fn resolve_within(selector: &TimeRangeSelector, today: NaiveDate, max_days: u64) -> Self {
        match selector {
            TimeRangeSelector::SevenDays => Self::ending_on(today, DEFAULT_WINDOW_DAYS),
            TimeRangeSelector::ThirtyDays => Self::ending_on(today, MONTH_WINDOW_DAYS),
            TimeRangeSelector::Custom {
                start_date,
                end_date,
            } => {
                let parsed = parse_date(start_date.as_deref())
                    .zip(parse_date(end_date.as_deref()))
                    .and_then(|(start, end)| Self::new(start, end))
                    .filter(|period| period.days() <= max_days);

                parsed.unwrap_or_else(|| {
                    tracing::debug!(
                        ?start_date,
                        ?end_date,
                        "custom range incomplete or invalid, using default window"
                    );
                    Self::ending_on(today, DEFAULT_WINDOW_DAYS)
                })
            }
        }
    }

    fn ending_on(end: NaiveDate, days: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(days - 1))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days, both ends included.
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// The equal-length window ending the day before this one starts.
    pub fn previous(&self) -> Self {
        let end = self.start.pred_opt().unwrap_or(NaiveDate::MIN);
        Self::ending_on(end, self.days())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.days() as usize)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every instant of the period's days: `[start 00:00, end + 1 day 00:00)`.
    pub fn timestamp_range(&self) -> TimestampRange {
        let after_end = self.end.succ_opt().unwrap_or(NaiveDate::MAX);
        TimestampRange {
            start: Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN)),
            end: Utc.from_utc_datetime(&after_end.and_time(NaiveTime::MIN)),
        }
    }

    pub fn bounds(&self) -> PeriodBounds {
        PeriodBounds {
            start: self.start,
            end: self.end,
        }
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|value| NaiveDate::parse_from_str(value.trim(), ymd::FORMAT).ok())
}
