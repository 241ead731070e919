// Filter engine.
//
// A `FilterSelection` is an immutable value: the menu builds a new one on
// every change and hands it to the pipeline by reference.
use crate::types::SalesRecord;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Month,
    Dept,
    Channel,
    Store,
    Region,
    Category,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Month,
        Dimension::Dept,
        Dimension::Channel,
        Dimension::Store,
        Dimension::Region,
        Dimension::Category,
    ];

    /// Dimensions constrained by the default selection.
    pub const DEFAULT: [Dimension; 4] = [
        Dimension::Month,
        Dimension::Dept,
        Dimension::Channel,
        Dimension::Store,
    ];

    pub fn value_of(self, r: &SalesRecord) -> Cow<'_, str> {
        match self {
            Dimension::Month => Cow::Owned(r.period.to_string()),
            Dimension::Dept => Cow::Borrowed(&r.dept),
            Dimension::Channel => Cow::Borrowed(&r.channel),
            Dimension::Store => Cow::Borrowed(&r.store),
            Dimension::Region => Cow::Borrowed(&r.region),
            Dimension::Category => Cow::Borrowed(&r.category),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Month => "Month",
            Dimension::Dept => "Dept",
            Dimension::Channel => "Channel",
            Dimension::Store => "Store",
            Dimension::Region => "Region",
            Dimension::Category => "Category",
        };
        f.write_str(name)
    }
}

/// Sorted distinct values of `dim` across `records`.
pub fn observed_values(records: &[SalesRecord], dim: Dimension) -> BTreeSet<String> {
    records
        .iter()
        .map(|r| dim.value_of(r).into_owned())
        .collect()
}

/// Per-dimension allow-sets. A dimension without an entry is unconstrained;
/// an entry with an empty set rejects every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    allowed: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSelection {
    /// No constraints at all.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Month, Dept, Channel and Store restricted to every value present in
    /// `records`, the state a fresh load starts from.
    pub fn all_observed(records: &[SalesRecord]) -> Self {
        let allowed = Dimension::DEFAULT
            .iter()
            .map(|&dim| (dim, observed_values(records, dim)))
            .collect();
        Self { allowed }
    }

    pub fn with(mut self, dim: Dimension, values: impl IntoIterator<Item = String>) -> Self {
        self.allowed.insert(dim, values.into_iter().collect());
        self
    }

    pub fn without(mut self, dim: Dimension) -> Self {
        self.allowed.remove(&dim);
        self
    }

    pub fn allowed(&self, dim: Dimension) -> Option<&BTreeSet<String>> {
        self.allowed.get(&dim)
    }

    pub fn matches(&self, r: &SalesRecord) -> bool {
        self.allowed
            .iter()
            .all(|(dim, set)| set.contains(&*dim.value_of(r)))
    }
}

#[derive(Debug)]
pub enum FilterOutcome<'a> {
    Rows(Vec<&'a SalesRecord>),
    NoData,
}

pub fn apply<'a>(records: &'a [SalesRecord], selection: &FilterSelection) -> FilterOutcome<'a> {
    let rows: Vec<&SalesRecord> = records.iter().filter(|r| selection.matches(r)).collect();
    debug!(kept = rows.len(), total = records.len(), "applied filter selection");
    if rows.is_empty() {
        FilterOutcome::NoData
    } else {
        FilterOutcome::Rows(rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::period::PeriodKey;
    use chrono::NaiveDate;

    pub(crate) fn rec(date: &str, dept: &str, channel: &str, store: &str, sales: f64) -> SalesRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        SalesRecord {
            date,
            period: PeriodKey::from_date(date),
            store: store.to_string(),
            channel: channel.to_string(),
            region: "North".to_string(),
            sku: "K1".to_string(),
            category: "Shoes".to_string(),
            quantity: 1.0,
            sales,
            discount: 0.0,
            order_id: Some(format!("{date}-{store}-{sales}")),
            dept: dept.to_string(),
            return_amount: 0.0,
            target_sales: 0.0,
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            rec("2024-01-03", "D1", "Online", "S1", 100.0),
            rec("2024-01-20", "D2", "Store", "S2", 200.0),
            rec("2024-02-11", "D1", "Store", "S1", 300.0),
        ]
    }

    fn set(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_all_observed_keeps_everything() {
        let data = sample();
        let sel = FilterSelection::all_observed(&data);
        assert_eq!(sel.allowed(Dimension::Month).unwrap().len(), 2);
        assert!(sel.allowed(Dimension::Region).is_none());
        match apply(&data, &sel) {
            FilterOutcome::Rows(rows) => assert_eq!(rows.len(), 3),
            FilterOutcome::NoData => panic!("expected rows"),
        }
    }

    #[test]
    fn test_month_filter() {
        let data = sample();
        let sel = FilterSelection::all_observed(&data).with(Dimension::Month, set(&["2024-02"]));
        match apply(&data, &sel) {
            FilterOutcome::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].sales, 300.0);
            }
            FilterOutcome::NoData => panic!("expected rows"),
        }
    }

    #[test]
    fn test_empty_allow_set_gives_no_data() {
        let data = sample();
        let sel = FilterSelection::all_observed(&data).with(Dimension::Dept, Vec::new());
        assert!(matches!(apply(&data, &sel), FilterOutcome::NoData));
    }

    #[test]
    fn test_empty_table_gives_no_data() {
        let sel = FilterSelection::unconstrained();
        assert!(matches!(apply(&[], &sel), FilterOutcome::NoData));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let data = sample();
        let sel = FilterSelection::unconstrained()
            .with(Dimension::Dept, set(&["D1"]))
            .with(Dimension::Channel, set(&["Store"]));
        match apply(&data, &sel) {
            FilterOutcome::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].period.to_string(), "2024-02");
            }
            FilterOutcome::NoData => panic!("expected rows"),
        }
    }

    #[test]
    fn test_without_removes_constraint() {
        let data = sample();
        let sel = FilterSelection::all_observed(&data)
            .with(Dimension::Store, Vec::new())
            .without(Dimension::Store);
        assert!(matches!(apply(&data, &sel), FilterOutcome::Rows(ref r) if r.len() == 3));
    }

    #[test]
    fn test_category_filter_is_opt_in() {
        let mut data = sample();
        data[1].category = "Bags".to_string();
        let base = FilterSelection::all_observed(&data);
        assert!(base.allowed(Dimension::Category).is_none());
        assert_eq!(observed_values(&data, Dimension::Category).len(), 2);

        let sel = base.with(Dimension::Category, set(&["Bags"]));
        match apply(&data, &sel) {
            FilterOutcome::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].store, "S2");
            }
            FilterOutcome::NoData => panic!("expected rows"),
        }
    }

    #[test]
    fn test_varying_one_dimension_only_affects_that_dimension() {
        let data = sample();
        let base = FilterSelection::all_observed(&data);
        let narrowed = base.clone().with(Dimension::Channel, set(&["Online"]));
        for r in &data {
            let expected = base.matches(r) && r.channel == "Online";
            assert_eq!(narrowed.matches(r), expected);
        }
    }
}
