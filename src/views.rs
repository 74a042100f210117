//! Text views over query results
//!
//! Pure functions from API records to what a terminal shows: overview stats,
//! chart series and table rows. Nothing here fetches.

use std::fmt::Write as _;

use crate::api::{
    RecentAlert, RecentEvent, RecentTransaction, SavedContract, TopEvent, TopUser,
    TransactionFeesWithComparison, TransactionSuccessRateWithComparison,
    TransactionVolumeWithComparison, UniqueUsersWithComparison, UserProfile,
};
use crate::format::{
    camel_to_snake_case, convert_stroops_to_lumens, format_datetime, format_number,
    format_percentage_with_sign, format_short_date, truncate_contract_id, truncate_hash,
    NumberFormat,
};
use crate::query::QueryState;
use crate::types::TimeRange;

/// Period picker entries on the overview. The last entry reads "All time"
/// but requests one year.
pub const OVERVIEW_RANGES: [(TimeRange, &str); 6] = [
    (TimeRange::Week1, "Last week"),
    (TimeRange::Week2, "Last two weeks"),
    (TimeRange::Month1, "Last month"),
    (TimeRange::Month3, "Last three months"),
    (TimeRange::Month6, "Last six months"),
    (TimeRange::Year1, "All time"),
];

/// One line listing the picker periods, the selected one bracketed
pub fn range_picker(selected: TimeRange) -> String {
    OVERVIEW_RANGES
        .iter()
        .map(|(range, label)| {
            if *range == selected {
                format!("[{label}]")
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

const HOST_FUNCTION_PREFIX: &str = "HostFunctionTypeHostFunctionType";
const MISSING: &str = "-";

// ─────────────────────────────────────────────────────────────────
// Stats
// ─────────────────────────────────────────────────────────────────

/// One tile of the overview grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub title: String,
    pub value: String,
    /// Signed percentage, `+∞` without a baseline, `-` without data
    pub change: String,
    /// "from last week" and similar
    pub period: String,
}

impl Stat {
    pub fn new(
        title: &str,
        value: Option<f64>,
        change: Option<Option<f64>>,
        format: NumberFormat,
        time_range: TimeRange,
    ) -> Self {
        Self {
            title: title.to_string(),
            value: format_number(value.unwrap_or(0.0), format),
            change: change
                .map(format_percentage_with_sign)
                .unwrap_or_else(|| MISSING.to_string()),
            period: format!("from {}", time_range.comparison_phrase()),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.change.starts_with('+')
    }
}

/// Results behind the four overview stats; any may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewData {
    pub tx_volume: Option<TransactionVolumeWithComparison>,
    pub unique_users: Option<UniqueUsersWithComparison>,
    pub tx_success_rate: Option<TransactionSuccessRateWithComparison>,
    pub tx_fees: Option<TransactionFeesWithComparison>,
}

pub fn overview_stats(data: &OverviewData, time_range: TimeRange) -> [Stat; 4] {
    let volume = data.tx_volume.as_ref();
    let users = data.unique_users.as_ref();
    let success = data.tx_success_rate.as_ref();
    let fees = data.tx_fees.as_ref();
    [
        Stat::new(
            "Transaction volume",
            volume.map(|v| v.total_volume as f64),
            volume.and_then(|v| v.compared_total_volume.percentage_change),
            NumberFormat::PLAIN,
            time_range,
        ),
        Stat::new(
            "Unique users",
            users.map(|u| u.total_unique_users as f64),
            users.and_then(|u| u.compared_total_unique_users.percentage_change),
            NumberFormat::PLAIN,
            time_range,
        ),
        Stat::new(
            "Success rate",
            success.map(|s| s.overall_success_rate),
            success.and_then(|s| s.compared_overall_success_rate.percentage_change),
            NumberFormat::PERCENTAGE,
            time_range,
        ),
        Stat::new(
            "Average fee",
            fees.map(|f| f.avg_fee),
            fees.and_then(|f| f.compared_avg_fee.percentage_change),
            NumberFormat::STROOP,
            time_range,
        ),
    ]
}

pub fn render_stats(stats: &[Stat]) -> String {
    let mut out = String::new();
    for stat in stats {
        let _ = writeln!(
            out,
            "{:<20} {:>12}  {:>9} {}",
            stat.title, stat.value, stat.change, stat.period
        );
    }
    out
}

// ─────────────────────────────────────────────────────────────────
// Charts
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Intervals arrive newest first; series run oldest first
fn series<T>(intervals: &[T], date: impl Fn(&T) -> &str, value: impl Fn(&T) -> f64) -> Vec<ChartPoint> {
    intervals
        .iter()
        .rev()
        .map(|item| ChartPoint {
            label: format_short_date(date(item), false),
            value: value(item),
        })
        .collect()
}

pub fn volume_series(data: &TransactionVolumeWithComparison) -> Vec<ChartPoint> {
    series(&data.interval_volumes, |i| i.date.as_str(), |i| i.transaction_count as f64)
}

pub fn success_rate_series(data: &TransactionSuccessRateWithComparison) -> Vec<ChartPoint> {
    series(&data.interval_success_rates, |i| i.date.as_str(), |i| i.interval_success_rate)
}

pub fn unique_users_series(data: &UniqueUsersWithComparison) -> Vec<ChartPoint> {
    series(&data.interval_unique_users, |i| i.date.as_str(), |i| i.unique_users as f64)
}

pub fn avg_fee_series(data: &TransactionFeesWithComparison) -> Vec<ChartPoint> {
    series(&data.interval_fees, |i| i.date.as_str(), |i| i.avg_fee)
}

/// Lower bound of the success-rate axis: the lowest value floored to tens,
/// kept within [0, 99] so the axis never collapses at 100
pub fn success_rate_domain_min(points: &[ChartPoint]) -> f64 {
    let min = points
        .iter()
        .map(|p| p.value)
        .fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return 0.0;
    }
    ((min / 10.0).floor() * 10.0).clamp(0.0, 99.0)
}

/// Named block in the top-users treemap or top-events chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedItem {
    pub name: String,
    pub size: u64,
}

/// Global rankings prefix each name with the contract nickname
fn ranked_name(scoped: bool, nickname: &str, name: &str) -> String {
    if scoped {
        name.to_string()
    } else {
        format!("{nickname}: {name}")
    }
}

pub fn top_user_items(users: &[TopUser], scoped: bool) -> Vec<RankedItem> {
    users
        .iter()
        .map(|u| RankedItem {
            name: ranked_name(scoped, &u.contract_nickname, &u.user),
            size: u.transaction_count,
        })
        .collect()
}

pub fn top_event_items(events: &[TopEvent], scoped: bool) -> Vec<RankedItem> {
    events
        .iter()
        .map(|e| RankedItem {
            name: ranked_name(scoped, &e.contract_nickname, &e.event_name),
            size: e.event_count,
        })
        .collect()
}

/// Amber scale from rgb(252,211,77) at the smallest size to rgb(217,119,6)
/// at the largest. A flat range maps everything to the light end.
pub fn color_scale(value: u64, items: &[RankedItem]) -> String {
    let min = items.iter().map(|i| i.size).min().unwrap_or(0);
    let max = items.iter().map(|i| i.size).max().unwrap_or(0);
    let t = if max > min {
        (value.saturating_sub(min)) as f64 / (max - min) as f64
    } else {
        0.0
    };
    let lerp = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    format!(
        "rgb({},{},{})",
        lerp(252.0, 217.0),
        lerp(211.0, 119.0),
        lerp(77.0, 6.0)
    )
}

/// Chart blocks as rows: name, size and fill colour
pub fn ranking_chart(items: &[RankedItem]) -> Table {
    let mut table = Table::new(&["Name", "Size", "Color"]);
    for item in items {
        table.push(vec![
            item.name.clone(),
            item.size.to_string(),
            color_scale(item.size, items),
        ]);
    }
    table
}

pub fn render_series(title: &str, points: &[ChartPoint], format: NumberFormat) -> String {
    let mut out = format!("{title}\n");
    for point in points {
        let _ = writeln!(out, "  {:<12} {}", point.label, format_number(point.value, format));
    }
    out
}

// ─────────────────────────────────────────────────────────────────
// Tables
// ─────────────────────────────────────────────────────────────────

/// Plain text table with left-aligned, width-fitted columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let line = |cells: &[String], out: &mut String| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{c:<w$}"))
                .collect();
            let _ = writeln!(out, "{}", padded.join("  ").trim_end());
        };
        line(&self.headers, &mut out);
        for row in &self.rows {
            line(row, &mut out);
        }
        out
    }
}

/// Loading, error and empty states share one rendering path across tables
pub fn render_query<T>(
    state: &QueryState<Vec<T>>,
    noun: &str,
    build: impl Fn(&[T]) -> Table,
) -> String {
    if state.is_loading {
        return "Loading...\n".to_string();
    }
    if state.error.is_some() {
        return format!("Error loading {noun}\n");
    }
    match &state.data {
        Some(items) if !items.is_empty() => build(items).render(),
        _ => format!("No {noun} found\n"),
    }
}

/// First symbol parameter, else the host function name in snake case
pub fn function_label(tx: &RecentTransaction) -> String {
    tx.parameters
        .iter()
        .find(|p| p.kind == "Sym")
        .map(|p| p.value.clone())
        .unwrap_or_else(|| camel_to_snake_case(&tx.function_name.replace(HOST_FUNCTION_PREFIX, "")))
}

fn status(successful: bool) -> String {
    let label = if successful { "Success" } else { "Failed" };
    label.to_string()
}

fn nickname(nick: &Option<String>) -> String {
    nick.clone().unwrap_or_default()
}

pub fn recent_tx_table(txs: &[RecentTransaction]) -> Table {
    let mut table = Table::new(&[
        "Transaction Hash",
        "From",
        "Contract",
        "Function",
        "Date",
        "Fee Charged",
        "Status",
    ]);
    for tx in txs {
        table.push(vec![
            truncate_hash(&tx.transaction_hash),
            truncate_hash(&tx.source_account),
            nickname(&tx.contract_nickname),
            function_label(tx),
            format_datetime(&tx.created_at),
            convert_stroops_to_lumens(tx.fee_charged as f64),
            status(tx.successful),
        ]);
    }
    table
}

pub fn recent_events_table(events: &[RecentEvent]) -> Table {
    let mut table = Table::new(&["Transaction Hash", "Contract", "Event", "Date", "Tx Status"]);
    for event in events {
        let topics: Vec<&str> = event.symbol_topics().map(|t| t.value.as_str()).collect();
        table.push(vec![
            truncate_hash(&event.transaction_hash),
            nickname(&event.contract_nickname),
            topics.join(", "),
            format_datetime(&event.created_at),
            status(event.successful),
        ]);
    }
    table
}

pub fn recent_alerts_table(alerts: &[RecentAlert]) -> Table {
    let mut table = Table::new(&["Contract", "Alert Time", "Failed Tx", "Error Rate"]);
    for alert in alerts {
        table.push(vec![
            nickname(&alert.contract_nickname),
            format_datetime(&alert.alert_time),
            alert.failed_transactions.to_string(),
            format!("{:.2}%", alert.error_rate),
        ]);
    }
    table
}

/// Event names that are account or hash strings get shortened
fn event_label(name: &str) -> String {
    match name.chars().count() {
        56 | 64 => truncate_hash(name),
        _ => name.to_string(),
    }
}

pub fn top_events_table(events: &[TopEvent]) -> Table {
    let mut table = Table::new(&["Event Name", "Event Count"]);
    for event in events {
        table.push(vec![event_label(&event.event_name), event.event_count.to_string()]);
    }
    table
}

pub fn top_users_table(users: &[TopUser]) -> Table {
    let mut table = Table::new(&["User", "Transaction Count"]);
    for user in users {
        table.push(vec![truncate_hash(&user.user), user.transaction_count.to_string()]);
    }
    table
}

pub fn saved_contracts_table(contracts: &[SavedContract]) -> Table {
    let mut table = Table::new(&["Nickname", "Contract", "Default", "Updated"]);
    for c in contracts {
        table.push(vec![
            c.nickname.clone(),
            truncate_contract_id(&c.contract_id),
            if c.is_default { "*" } else { "" }.to_string(),
            format_datetime(&c.updated_at),
        ]);
    }
    table
}

pub fn profile_card(profile: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.full_name);
    let _ = writeln!(out, "  username  {}", profile.username);
    let _ = writeln!(out, "  email     {}", profile.email);
    out
}
