//! Core types used throughout Blip
//!
//! Query parameters shared by every metrics and history endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time window for metrics queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "HOUR_1")]
    Hour1,
    #[serde(rename = "HOUR_3")]
    Hour3,
    #[serde(rename = "HOUR_6")]
    Hour6,
    #[serde(rename = "HOUR_12")]
    Hour12,
    #[serde(rename = "DAY_1")]
    Day1,
    #[serde(rename = "DAY_3")]
    Day3,
    #[serde(rename = "WEEK_1")]
    #[default]
    Week1,
    #[serde(rename = "WEEK_2")]
    Week2,
    #[serde(rename = "MONTH_1")]
    Month1,
    #[serde(rename = "MONTH_3")]
    Month3,
    #[serde(rename = "MONTH_6")]
    Month6,
    #[serde(rename = "YEAR_1")]
    Year1,
    #[serde(rename = "ALL_TIME")]
    AllTime,
}

impl TimeRange {
    pub const ALL: [TimeRange; 13] = [
        TimeRange::Hour1,
        TimeRange::Hour3,
        TimeRange::Hour6,
        TimeRange::Hour12,
        TimeRange::Day1,
        TimeRange::Day3,
        TimeRange::Week1,
        TimeRange::Week2,
        TimeRange::Month1,
        TimeRange::Month3,
        TimeRange::Month6,
        TimeRange::Year1,
        TimeRange::AllTime,
    ];

    /// Wire value used in the `timeRange` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour1 => "HOUR_1",
            TimeRange::Hour3 => "HOUR_3",
            TimeRange::Hour6 => "HOUR_6",
            TimeRange::Hour12 => "HOUR_12",
            TimeRange::Day1 => "DAY_1",
            TimeRange::Day3 => "DAY_3",
            TimeRange::Week1 => "WEEK_1",
            TimeRange::Week2 => "WEEK_2",
            TimeRange::Month1 => "MONTH_1",
            TimeRange::Month3 => "MONTH_3",
            TimeRange::Month6 => "MONTH_6",
            TimeRange::Year1 => "YEAR_1",
            TimeRange::AllTime => "ALL_TIME",
        }
    }

    /// Parse from the wire value, case-insensitive
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|r| r.as_str() == upper)
    }

    /// Phrase used after "from" in stat change badges
    pub fn comparison_phrase(&self) -> &'static str {
        match self {
            TimeRange::Week1 => "last week",
            TimeRange::Week2 => "last two weeks",
            TimeRange::Month1 => "last month",
            TimeRange::Month3 => "last three months",
            TimeRange::Month6 => "last six months",
            _ => "previous period",
        }
    }

    /// Label for period pickers
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Hour1 => "Last hour",
            TimeRange::Hour3 => "Last three hours",
            TimeRange::Hour6 => "Last six hours",
            TimeRange::Hour12 => "Last twelve hours",
            TimeRange::Day1 => "Last day",
            TimeRange::Day3 => "Last three days",
            TimeRange::Week1 => "Last week",
            TimeRange::Week2 => "Last two weeks",
            TimeRange::Month1 => "Last month",
            TimeRange::Month3 => "Last three months",
            TimeRange::Month6 => "Last six months",
            TimeRange::Year1 => "Last year",
            TimeRange::AllTime => "All time",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Allowed result limits for list endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Limit {
    L1,
    L5,
    #[default]
    L10,
    L25,
    L50,
    L100,
}

impl Limit {
    pub const ALL: [Limit; 6] = [
        Limit::L1,
        Limit::L5,
        Limit::L10,
        Limit::L25,
        Limit::L50,
        Limit::L100,
    ];

    pub fn value(&self) -> u32 {
        match self {
            Limit::L1 => 1,
            Limit::L5 => 5,
            Limit::L10 => 10,
            Limit::L25 => 25,
            Limit::L50 => 50,
            Limit::L100 => 100,
        }
    }

    /// Parse from a numeric value; only the enumerated limits are accepted
    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.value() == value)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
