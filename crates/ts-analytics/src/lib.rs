//! Analytics aggregation for TemSafy Pro
//!
//! Stateless arithmetic over grouped-count query results. The database
//! does the grouping; this crate shapes it for the dashboard.

pub mod aggregate;
pub mod trends;

pub use aggregate::{completion_rate, AnalyticsOverview, EntityTotals, GroupCount};
pub use trends::{trend_series, TrendPoint};
