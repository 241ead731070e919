use crate::metrics::{atv, return_rate, target_achievement, upt, Ratio};
use crate::period::PeriodKey;
use crate::types::{ChannelShare, KpiRow, SalesRecord, SegmentRow, StoreSales, TrendPoint};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

// Sums are accumulated in input-row order and grouped in BTreeMaps, so the
// same rows always give bit-identical, sorted output.

/// Global KPIs per month, ascending by period.
pub fn kpi_by_period(rows: &[&SalesRecord]) -> Vec<KpiRow> {
    #[derive(Default)]
    struct Acc<'a> {
        gmv: f64,
        orders: HashSet<&'a str>,
        qty: f64,
        returns: f64,
        target: f64,
    }

    let mut map: BTreeMap<PeriodKey, Acc> = BTreeMap::new();
    for r in rows {
        let e = map.entry(r.period).or_default();
        e.gmv += r.sales;
        if let Some(id) = r.order_id.as_deref() {
            e.orders.insert(id);
        }
        e.qty += r.quantity;
        e.returns += r.return_amount;
        e.target += r.target_sales;
    }

    map.into_iter()
        .map(|(period, acc)| {
            let orders = acc.orders.len();
            KpiRow {
                period,
                gmv: acc.gmv,
                orders,
                qty: acc.qty,
                returns: acc.returns,
                target: acc.target,
                atv: atv(acc.gmv, orders),
                upt: upt(acc.qty, orders),
                return_rate: return_rate(acc.returns, acc.gmv),
                target_ach: target_achievement(acc.gmv, acc.target),
            }
        })
        .collect()
}

#[derive(Default)]
struct SegmentAcc {
    gmv: f64,
    returns: f64,
    target: f64,
}

impl SegmentAcc {
    fn add(&mut self, r: &SalesRecord) {
        self.gmv += r.sales;
        self.returns += r.return_amount;
        self.target += r.target_sales;
    }

    fn into_row(self, period: Option<PeriodKey>, dept: String, channel: String) -> SegmentRow {
        SegmentRow {
            period,
            dept,
            channel,
            gmv: self.gmv,
            returns: self.returns,
            target: self.target,
            return_rate: return_rate(self.returns, self.gmv),
            target_ach: target_achievement(self.gmv, self.target),
        }
    }
}

/// Department x channel rollup over all filtered months.
pub fn segments(rows: &[&SalesRecord]) -> Vec<SegmentRow> {
    let mut map: BTreeMap<(&str, &str), SegmentAcc> = BTreeMap::new();
    for r in rows {
        map.entry((r.dept.as_str(), r.channel.as_str()))
            .or_default()
            .add(r);
    }
    map.into_iter()
        .map(|((dept, channel), acc)| acc.into_row(None, dept.to_string(), channel.to_string()))
        .collect()
}

/// Department x channel rollup split by month, ordered by period then key.
pub fn segments_by_period(rows: &[&SalesRecord]) -> Vec<SegmentRow> {
    let mut map: BTreeMap<(PeriodKey, &str, &str), SegmentAcc> = BTreeMap::new();
    for r in rows {
        map.entry((r.period, r.dept.as_str(), r.channel.as_str()))
            .or_default()
            .add(r);
    }
    map.into_iter()
        .map(|((period, dept, channel), acc)| {
            acc.into_row(Some(period), dept.to_string(), channel.to_string())
        })
        .collect()
}

/// The slice of a by-period segment table that belongs to `period`.
pub fn segments_for(segments: &[SegmentRow], period: PeriodKey) -> Vec<SegmentRow> {
    segments
        .iter()
        .filter(|s| s.period == Some(period))
        .cloned()
        .collect()
}

pub fn trend(kpis: &[KpiRow]) -> Vec<TrendPoint> {
    kpis.iter()
        .map(|k| TrendPoint {
            period: k.period,
            gmv: k.gmv,
            atv: k.atv,
        })
        .collect()
}

/// Sales per channel with each channel's share of the filtered total.
pub fn channel_share(rows: &[&SalesRecord]) -> Vec<ChannelShare> {
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *map.entry(r.channel.as_str()).or_insert(0.0) += r.sales;
    }
    let total: f64 = map.values().sum();
    map.into_iter()
        .map(|(channel, sales)| ChannelShare {
            channel: channel.to_string(),
            sales,
            share: Ratio::of(sales, total),
        })
        .collect()
}

/// Top `n` stores by sales, descending; ties are broken by store name.
pub fn top_stores(rows: &[&SalesRecord], n: usize) -> Vec<StoreSales> {
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *map.entry(r.store.as_str()).or_insert(0.0) += r.sales;
    }
    let mut ranked: Vec<(&str, f64)> = map.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, (store, sales))| StoreSales {
            rank: idx + 1,
            store: store.to_string(),
            sales,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::rec;

    fn with_order(mut r: SalesRecord, order: &str, qty: f64) -> SalesRecord {
        r.order_id = Some(order.to_string());
        r.quantity = qty;
        r
    }

    #[test]
    fn test_three_row_month_scenario() {
        let data = vec![
            with_order(rec("2024-01-02", "D1", "Online", "S1", 100.0), "A", 1.0),
            with_order(rec("2024-01-10", "D1", "Online", "S1", 200.0), "A", 2.0),
            with_order(rec("2024-01-28", "D2", "Store", "S2", 300.0), "B", 3.0),
        ];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let kpis = kpi_by_period(&rows);
        assert_eq!(kpis.len(), 1);
        let k = &kpis[0];
        assert_eq!(k.period.to_string(), "2024-01");
        assert_eq!(k.gmv, 600.0);
        assert_eq!(k.orders, 2);
        assert_eq!(k.qty, 6.0);
        assert_eq!(k.atv, Ratio::Value(300.0));
        assert_eq!(k.upt, Ratio::Value(3.0));
    }

    #[test]
    fn test_kpi_rows_sorted_by_period() {
        let data = vec![
            rec("2024-03-01", "D1", "Online", "S1", 1.0),
            rec("2023-12-01", "D1", "Online", "S1", 2.0),
            rec("2024-01-01", "D1", "Online", "S1", 3.0),
        ];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let periods: Vec<String> = kpi_by_period(&rows).iter().map(|k| k.period.to_string()).collect();
        assert_eq!(periods, vec!["2023-12", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_blank_order_ids_not_counted() {
        let mut r = rec("2024-01-02", "D1", "Online", "S1", 100.0);
        r.order_id = None;
        let data = vec![r];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let k = &kpi_by_period(&rows)[0];
        assert_eq!(k.orders, 0);
        assert!(k.atv.is_undefined());
        assert!(k.upt.is_undefined());
    }

    #[test]
    fn test_zero_target_is_undefined_not_infinite() {
        let data = vec![rec("2024-01-02", "D1", "Online", "S1", 100.0)];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let k = &kpi_by_period(&rows)[0];
        assert!(k.target_ach.is_undefined());
        let s = &segments(&rows)[0];
        assert!(s.target_ach.is_undefined());
        assert_eq!(s.return_rate, Ratio::Value(0.0));
    }

    #[test]
    fn test_zero_gmv_return_rate_undefined() {
        let mut r = rec("2024-01-02", "D1", "Online", "S1", 0.0);
        r.return_amount = 5.0;
        let data = vec![r];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        assert!(kpi_by_period(&rows)[0].return_rate.is_undefined());
        assert!(segments_by_period(&rows)[0].return_rate.is_undefined());
    }

    #[test]
    fn test_segment_partition_matches_period_gmv() {
        let data = vec![
            rec("2024-01-02", "D1", "Online", "S1", 10.5),
            rec("2024-01-03", "D1", "Store", "S1", 20.25),
            rec("2024-01-04", "D2", "Online", "S2", 30.0),
            rec("2024-01-05", "D1", "Online", "S2", 40.0),
            rec("2024-02-01", "D2", "Store", "S1", 50.0),
        ];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let kpis = kpi_by_period(&rows);
        let segs = segments_by_period(&rows);
        for k in &kpis {
            let seg_total: f64 = segments_for(&segs, k.period).iter().map(|s| s.gmv).sum();
            assert!((seg_total - k.gmv).abs() < 1e-9);
        }
        assert_eq!(segments_for(&segs, kpis[0].period).len(), 3);
    }

    #[test]
    fn test_segment_returns_and_targets() {
        let mut a = rec("2024-01-02", "D1", "Online", "S1", 200.0);
        a.return_amount = 20.0;
        a.target_sales = 100.0;
        let mut b = rec("2024-01-09", "D1", "Online", "S2", 200.0);
        b.return_amount = 20.0;
        b.target_sales = 300.0;
        let data = vec![a, b];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let segs = segments(&rows);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].period, None);
        assert_eq!(segs[0].gmv, 400.0);
        assert_eq!(segs[0].return_rate, Ratio::Value(0.1));
        assert_eq!(segs[0].target_ach, Ratio::Value(1.0));
    }

    #[test]
    fn test_channel_share_sums_to_one() {
        let data = vec![
            rec("2024-01-02", "D1", "Online", "S1", 25.0),
            rec("2024-01-03", "D1", "Store", "S1", 75.0),
        ];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let shares = channel_share(&rows);
        assert_eq!(shares[0].channel, "Online");
        assert_eq!(shares[0].share, Ratio::Value(0.25));
        assert_eq!(shares[1].share, Ratio::Value(0.75));
    }

    #[test]
    fn test_top_stores_ranking() {
        let data = vec![
            rec("2024-01-02", "D1", "Online", "S1", 10.0),
            rec("2024-01-02", "D1", "Online", "S2", 50.0),
            rec("2024-01-02", "D1", "Online", "S3", 30.0),
            rec("2024-01-02", "D1", "Online", "S1", 30.0),
            rec("2024-01-02", "D1", "Online", "S4", 5.0),
            rec("2024-01-02", "D1", "Online", "S5", 30.0),
            rec("2024-01-02", "D1", "Online", "S6", 1.0),
        ];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let top = top_stores(&rows, 5);
        let names: Vec<&str> = top.iter().map(|s| s.store.as_str()).collect();
        assert_eq!(names, vec!["S2", "S1", "S3", "S5", "S4"]);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[1].sales, 40.0);
    }

    #[test]
    fn test_trend_follows_kpis() {
        let data = vec![
            rec("2024-02-02", "D1", "Online", "S1", 10.0),
            rec("2024-01-02", "D1", "Online", "S1", 20.0),
        ];
        let rows: Vec<&SalesRecord> = data.iter().collect();
        let t = trend(&kpi_by_period(&rows));
        assert_eq!(t[0].period.to_string(), "2024-01");
        assert_eq!(t[0].gmv, 20.0);
        assert_eq!(t[1].atv, Ratio::Value(10.0));
    }
}
