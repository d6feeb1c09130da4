//! Class-anchored calibration of monthly comfort scores.
//!
//! Months are first classified (recommended / middling / avoid) from a raw
//! heuristic, then min-max rescaled inside their class range so the best
//! month of a class hits the top of the range. Monsoon destinations get
//! their avoid months lifted into the middling range: tropical downpours
//! are short and rarely a real obstacle to travel.

use crate::data::MonthSummary;

/// Editorial month class, derived from the raw heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Avoid,
    Mid,
    Rec,
}

impl Class {
    const ALL: [Class; 3] = [Class::Avoid, Class::Mid, Class::Rec];

    /// Score range on the 0-10 scale.
    fn range(self) -> (f64, f64) {
        match self {
            Class::Avoid => (0.5, 3.9),
            Class::Mid => (4.0, 6.9),
            Class::Rec => (7.0, 10.0),
        }
    }
}

/// Normalized thermal comfort [0, 1] as a function of the daily maximum.
pub fn t_ideal(tmax: f64) -> f64 {
    if tmax <= 5.0 {
        0.0
    } else if tmax <= 14.0 {
        (tmax - 5.0) / 9.0 * 0.3
    } else if tmax <= 22.0 {
        0.3 + (tmax - 14.0) / 8.0 * 0.5
    } else if tmax <= 28.0 {
        0.8 + (tmax - 22.0) / 6.0 * 0.2
    } else if tmax <= 35.0 {
        1.0 - (tmax - 28.0) / 7.0 * 0.4
    } else {
        (0.6 - (tmax - 35.0) / 10.0 * 0.3).max(0.0)
    }
}

/// Raw heuristic [0, 1] ordering months before anchoring: 40% thermal
/// comfort, 35% dryness, 25% sunshine (15 h/day is the theoretical max).
pub fn raw_score(tmax: f64, rain_pct: f64, sun_h: f64) -> f64 {
    0.40 * t_ideal(tmax) + 0.35 * (1.0 - rain_pct / 100.0).max(0.0) + 0.25 * (sun_h / 15.0).min(1.0)
}

pub fn classify(raw: f64) -> Class {
    if raw >= 0.55 {
        Class::Rec
    } else if raw >= 0.38 {
        Class::Mid
    } else {
        Class::Avoid
    }
}

/// Fill in `fiche_score` for every month that lacks one.
///
/// Curated months are preserved verbatim, but still participate in the
/// min-max normalization of their class. A no-op when all twelve months
/// already carry a score.
pub fn anchor_scores(monthly: &mut [MonthSummary], monsoon: bool) {
    if monthly.iter().all(|m| m.fiche_score.is_some()) {
        return;
    }

    struct Item {
        idx: usize,
        raw: f64,
        class: Class,
    }
    let items: Vec<Item> = monthly
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let tmax = m.tmax.or(m.avg_temp).unwrap_or(20.0);
            // A measured zero counts; only absent data gets the neutral
            // 5-hour substitute.
            let sun = m.sun_hours.unwrap_or(5.0);
            let raw = raw_score(tmax, m.rain_pct, sun);
            Item { idx, raw, class: classify(raw) }
        })
        .collect();

    for class in Class::ALL {
        let group: Vec<&Item> = items.iter().filter(|it| it.class == class).collect();
        if group.is_empty() {
            continue;
        }
        let (lo, hi) = if monsoon && class == Class::Avoid {
            Class::Mid.range()
        } else {
            class.range()
        };
        let mn = group.iter().map(|it| it.raw).fold(f64::INFINITY, f64::min);
        let mx = group.iter().map(|it| it.raw).fold(f64::NEG_INFINITY, f64::max);
        for it in group {
            if monthly[it.idx].fiche_score.is_some() {
                continue;
            }
            let norm = if mx > mn { (it.raw - mn) / (mx - mn) } else { 0.5 };
            monthly[it.idx].fiche_score = Some(((lo + norm * (hi - lo)) * 10.0).round() as u16);
        }
    }
}
