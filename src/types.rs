use crate::metrics::Ratio;
use crate::period::PeriodKey;
use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// Header plus text cells, as read from the first worksheet or a CSV file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub period: PeriodKey,
    pub store: String,
    pub channel: String,
    pub region: String,
    pub sku: String,
    pub category: String,
    pub quantity: f64,
    pub sales: f64,
    pub discount: f64,
    /// `None` for a blank cell; blank ids are not counted as orders.
    pub order_id: Option<String>,
    pub dept: String,
    pub return_amount: f64,
    pub target_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub period: PeriodKey,
    pub gmv: f64,
    pub orders: usize,
    pub qty: f64,
    pub returns: f64,
    pub target: f64,
    pub atv: Ratio,
    pub upt: Ratio,
    pub return_rate: Ratio,
    pub target_ach: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRow {
    /// Set when the rollup is also split by month.
    pub period: Option<PeriodKey>,
    pub dept: String,
    pub channel: String,
    pub gmv: f64,
    pub returns: f64,
    pub target: f64,
    pub return_rate: Ratio,
    pub target_ach: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub kpi: KpiRow,
    pub previous_period: Option<PeriodKey>,
    pub gmv_mom: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: PeriodKey,
    pub gmv: f64,
    pub atv: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelShare {
    pub channel: String,
    pub sales: f64,
    pub share: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSales {
    pub rank: usize,
    pub store: String,
    pub sales: f64,
}

/// Everything the presentation layer renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filtered_rows: usize,
    pub headline: Headline,
    pub kpi_by_period: Vec<KpiRow>,
    /// Department x channel over every filtered month.
    pub segments: Vec<SegmentRow>,
    pub segments_by_period: Vec<SegmentRow>,
    pub segments_latest: Vec<SegmentRow>,
    pub trend: Vec<TrendPoint>,
    pub channel_share: Vec<ChannelShare>,
    pub top_stores: Vec<StoreSales>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiDisplayRow {
    #[serde(rename = "YearMonth")]
    #[tabled(rename = "YearMonth")]
    pub period: String,
    #[serde(rename = "GMV")]
    #[tabled(rename = "GMV")]
    pub gmv: String,
    #[serde(rename = "Orders")]
    #[tabled(rename = "Orders")]
    pub orders: usize,
    #[serde(rename = "Qty")]
    #[tabled(rename = "Qty")]
    pub qty: String,
    #[serde(rename = "Returns")]
    #[tabled(rename = "Returns")]
    pub returns: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "ATV")]
    #[tabled(rename = "ATV")]
    pub atv: String,
    #[serde(rename = "UPT")]
    #[tabled(rename = "UPT")]
    pub upt: String,
    #[serde(rename = "ReturnRate%")]
    #[tabled(rename = "ReturnRate%")]
    pub return_rate: String,
    #[serde(rename = "TargetAch%")]
    #[tabled(rename = "TargetAch%")]
    pub target_ach: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SegmentDisplayRow {
    #[serde(rename = "YearMonth")]
    #[tabled(rename = "YearMonth")]
    pub period: String,
    #[serde(rename = "Dept")]
    #[tabled(rename = "Dept")]
    pub dept: String,
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "GMV")]
    #[tabled(rename = "GMV")]
    pub gmv: String,
    #[serde(rename = "ReturnRate%")]
    #[tabled(rename = "ReturnRate%")]
    pub return_rate: String,
    #[serde(rename = "TargetAch%")]
    #[tabled(rename = "TargetAch%")]
    pub target_ach: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendDisplayRow {
    #[serde(rename = "YearMonth")]
    #[tabled(rename = "YearMonth")]
    pub period: String,
    #[serde(rename = "GMV")]
    #[tabled(rename = "GMV")]
    pub gmv: String,
    #[serde(rename = "ATV")]
    #[tabled(rename = "ATV")]
    pub atv: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChannelShareDisplayRow {
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[serde(rename = "Share%")]
    #[tabled(rename = "Share%")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StoreRankingDisplayRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Store")]
    #[tabled(rename = "Store")]
    pub store: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales")]
    pub sales: String,
}
