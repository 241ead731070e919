// Display rows for the terminal dashboard and the CSV exports.
//
// This is the only place ratios turn into strings.
use crate::types::{
    ChannelShare, ChannelShareDisplayRow, Headline, KpiDisplayRow, KpiRow, SegmentDisplayRow,
    SegmentRow, StoreRankingDisplayRow, StoreSales, TrendDisplayRow, TrendPoint,
};
use crate::util::{format_int, format_number, format_percent, format_ratio};

/// One headline card: label plus rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
}

/// The six headline cards for the latest retained period.
pub fn headline_cards(h: &Headline) -> Vec<KpiCard> {
    let k = &h.kpi;
    vec![
        KpiCard {
            label: "GMV",
            value: format!("{} (MoM {})", format_number(k.gmv, 2), format_percent(h.gmv_mom)),
        },
        KpiCard {
            label: "ATV",
            value: format_ratio(k.atv, 2),
        },
        KpiCard {
            label: "UPT",
            value: format_ratio(k.upt, 2),
        },
        KpiCard {
            label: "Return Rate",
            value: format_percent(k.return_rate),
        },
        KpiCard {
            label: "Target Achievement",
            value: format_percent(k.target_ach),
        },
        KpiCard {
            label: "Orders",
            value: format_int(k.orders),
        },
    ]
}

pub fn generate_kpi_report(kpis: &[KpiRow]) -> Vec<KpiDisplayRow> {
    kpis.iter()
        .map(|k| KpiDisplayRow {
            period: k.period.to_string(),
            gmv: format_number(k.gmv, 2),
            orders: k.orders,
            qty: format_number(k.qty, 0),
            returns: format_number(k.returns, 2),
            target: format_number(k.target, 2),
            atv: format_ratio(k.atv, 2),
            upt: format_ratio(k.upt, 2),
            return_rate: format_percent(k.return_rate),
            target_ach: format_percent(k.target_ach),
        })
        .collect()
}

pub fn generate_segment_report(segments: &[SegmentRow]) -> Vec<SegmentDisplayRow> {
    segments
        .iter()
        .map(|s| SegmentDisplayRow {
            period: s.period.map(|p| p.to_string()).unwrap_or_else(|| "All".to_string()),
            dept: s.dept.clone(),
            channel: s.channel.clone(),
            gmv: format_number(s.gmv, 2),
            return_rate: format_percent(s.return_rate),
            target_ach: format_percent(s.target_ach),
        })
        .collect()
}

pub fn generate_trend_report(trend: &[TrendPoint]) -> Vec<TrendDisplayRow> {
    trend
        .iter()
        .map(|t| TrendDisplayRow {
            period: t.period.to_string(),
            gmv: format_number(t.gmv, 2),
            atv: format_ratio(t.atv, 2),
        })
        .collect()
}

pub fn generate_channel_report(shares: &[ChannelShare]) -> Vec<ChannelShareDisplayRow> {
    shares
        .iter()
        .map(|c| ChannelShareDisplayRow {
            channel: c.channel.clone(),
            sales: format_number(c.sales, 2),
            share: format_percent(c.share),
        })
        .collect()
}

pub fn generate_store_report(stores: &[StoreSales]) -> Vec<StoreRankingDisplayRow> {
    stores
        .iter()
        .map(|s| StoreRankingDisplayRow {
            rank: s.rank,
            store: s.store.clone(),
            sales: format_number(s.sales, 2),
        })
        .collect()
}
