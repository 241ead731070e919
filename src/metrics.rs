// Derived ratio metrics.
//
// Every ratio on the dashboard goes through `Ratio::of`, so a zero
// denominator always yields `Ratio::Undefined` instead of `inf`/`NaN`.
use crate::types::{Headline, KpiRow};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Value(f64),
    Undefined,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Ratio::Undefined;
        }
        let q = numerator / denominator;
        if q.is_finite() {
            Ratio::Value(q)
        } else {
            Ratio::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Value(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

// Undefined serializes as JSON `null` and as an empty CSV field.
impl Serialize for Ratio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value().serialize(serializer)
    }
}

/// Average transaction value.
pub fn atv(gmv: f64, orders: usize) -> Ratio {
    Ratio::of(gmv, orders as f64)
}

/// Units per transaction.
pub fn upt(qty: f64, orders: usize) -> Ratio {
    Ratio::of(qty, orders as f64)
}

pub fn return_rate(returns: f64, gmv: f64) -> Ratio {
    Ratio::of(returns, gmv)
}

pub fn target_achievement(gmv: f64, target: f64) -> Ratio {
    Ratio::of(gmv, target)
}

/// Relative change from `previous` to `current`.
pub fn period_change(current: f64, previous: f64) -> Ratio {
    Ratio::of(current - previous, previous)
}

/// Headline KPIs: the row with the greatest period key among `kpis`,
/// compared with the closest earlier retained period. Row order does not
/// matter, so a filtered-out latest month shifts the headline back.
pub fn headline(kpis: &[KpiRow]) -> Option<Headline> {
    let latest = kpis.iter().max_by_key(|k| k.period)?;
    let previous = kpis
        .iter()
        .filter(|k| k.period < latest.period)
        .max_by_key(|k| k.period);
    Some(Headline {
        kpi: latest.clone(),
        previous_period: previous.map(|p| p.period),
        gmv_mom: match previous {
            Some(p) => period_change(latest.gmv, p.gmv),
            None => Ratio::Undefined,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodKey;

    fn kpi(year: i32, month: u32, gmv: f64) -> KpiRow {
        KpiRow {
            period: PeriodKey { year, month },
            gmv,
            orders: 1,
            qty: 1.0,
            returns: 0.0,
            target: 0.0,
            atv: atv(gmv, 1),
            upt: upt(1.0, 1),
            return_rate: return_rate(0.0, gmv),
            target_ach: target_achievement(gmv, 0.0),
        }
    }

    #[test]
    fn test_zero_denominators_are_undefined() {
        assert!(atv(100.0, 0).is_undefined());
        assert!(upt(3.0, 0).is_undefined());
        assert!(return_rate(5.0, 0.0).is_undefined());
        assert!(target_achievement(100.0, 0.0).is_undefined());
        assert!(Ratio::of(0.0, 0.0).is_undefined());
        assert!(period_change(10.0, 0.0).is_undefined());
    }

    #[test]
    fn test_defined_ratios() {
        assert_eq!(atv(600.0, 2), Ratio::Value(300.0));
        assert_eq!(upt(6.0, 2), Ratio::Value(3.0));
        assert_eq!(return_rate(30.0, 600.0), Ratio::Value(0.05));
        assert_eq!(target_achievement(600.0, 500.0), Ratio::Value(1.2));
        assert_eq!(period_change(150.0, 100.0), Ratio::Value(0.5));
    }

    #[test]
    fn test_negative_zero_denominator_is_undefined() {
        assert!(Ratio::of(1.0, -0.0).is_undefined());
    }

    #[test]
    fn test_serializes_undefined_as_null() {
        let json = serde_json::to_string(&vec![Ratio::Value(0.5), Ratio::Undefined]).unwrap();
        assert_eq!(json, "[0.5,null]");
    }

    #[test]
    fn test_headline_uses_max_period_not_last_row() {
        let kpis = vec![kpi(2024, 3, 300.0), kpi(2024, 1, 100.0), kpi(2024, 2, 200.0)];
        let h = headline(&kpis).unwrap();
        assert_eq!(h.kpi.period.to_string(), "2024-03");
        assert_eq!(h.previous_period, Some(PeriodKey { year: 2024, month: 2 }));
        assert_eq!(h.gmv_mom, Ratio::Value(0.5));
    }

    #[test]
    fn test_headline_single_period_has_undefined_mom() {
        let h = headline(&[kpi(2024, 1, 100.0)]).unwrap();
        assert_eq!(h.previous_period, None);
        assert!(h.gmv_mom.is_undefined());
    }

    #[test]
    fn test_headline_empty() {
        assert!(headline(&[]).is_none());
    }
}
