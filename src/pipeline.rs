// Filter -> aggregate -> derive, for one filter selection.
//
// Loading (schema validation, type coercion, period keys) happens once per
// file in `loader`; `build_dashboard` reruns on every filter change.
use crate::aggregate;
use crate::filter::{self, FilterOutcome, FilterSelection};
use crate::metrics;
use crate::types::{Dashboard, SalesRecord};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardOutcome {
    Ready(Box<Dashboard>),
    /// The selection matched no rows; nothing was aggregated.
    NoData,
}

pub fn build_dashboard(
    records: &[SalesRecord],
    selection: &FilterSelection,
    top_n: usize,
) -> DashboardOutcome {
    let rows = match filter::apply(records, selection) {
        FilterOutcome::Rows(rows) => rows,
        FilterOutcome::NoData => {
            info!("no data under current filters");
            return DashboardOutcome::NoData;
        }
    };

    let kpi_by_period = aggregate::kpi_by_period(&rows);
    let Some(headline) = metrics::headline(&kpi_by_period) else {
        return DashboardOutcome::NoData;
    };
    let segments_by_period = aggregate::segments_by_period(&rows);
    let segments_latest = aggregate::segments_for(&segments_by_period, headline.kpi.period);

    info!(
        rows = rows.len(),
        periods = kpi_by_period.len(),
        latest = %headline.kpi.period,
        "built dashboard"
    );
    DashboardOutcome::Ready(Box::new(Dashboard {
        filtered_rows: rows.len(),
        trend: aggregate::trend(&kpi_by_period),
        channel_share: aggregate::channel_share(&rows),
        top_stores: aggregate::top_stores(&rows, top_n),
        segments: aggregate::segments(&rows),
        headline,
        kpi_by_period,
        segments_by_period,
        segments_latest,
    }))
}
