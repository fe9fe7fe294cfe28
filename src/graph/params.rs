//! Parameterized keyword resolution.
//!
//! A parameterized edge (keyword `name#`) defers numeric resolution: the
//! captured payload must be matched against a per-component lookup table
//! supplied by an external collaborator. The outcome per capture is one of:
//!
//! - an exact table entry,
//! - the two bracketing entries plus the interpolation fraction (the
//!   spectral-math library does the actual curve interpolation),
//! - the latest entry, when a parameterized component had no value supplied
//!   at all.
//!
//! Values outside the table domain are a hard error. Clamping or
//! extrapolating calibration data would silently produce physically wrong
//! throughputs, so the caller must see the failure.

use chrono::NaiveDate;

use crate::error::ResolveError;

/// One entry of a parameter lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    pub value: f64,
    pub filename: String,
}

/// External lookup collaborator, keyed by `(component, keyword)`.
pub trait ParameterTable {
    /// Entries for a parameterized component, sorted ascending by value.
    /// `None` when the pair has no table.
    fn entries(&self, component: &str, keyword: &str) -> Option<Vec<ParamEntry>>;

    /// The parameter axis a component is parameterized on, if any. Drives
    /// the use-latest policy for components resolved without a supplied
    /// value.
    fn parameterized_keyword(&self, _component: &str) -> Option<String> {
        None
    }
}

/// A parameter table with no entries. Handy for tests and for expression
/// work that never touches parameterized components.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyParameterTable;

impl ParameterTable for EmptyParameterTable {
    fn entries(&self, _component: &str, _keyword: &str) -> Option<Vec<ParamEntry>> {
        None
    }
}

/// How one capture resolved against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamMatch {
    Exact { filename: String },
    /// Value falls between two entries; `fraction` is the linear position
    /// within `[lower, upper]`, in `0.0..=1.0`.
    Bracketed { lower: ParamEntry, upper: ParamEntry, fraction: f64 },
    /// No value supplied; policy default is the newest entry.
    Latest { filename: String },
}

/// Resolve one captured (or defaulted) parameter value for a component.
pub fn resolve_parameter<P: ParameterTable + ?Sized>(
    table: &P,
    component: &str,
    keyword: &str,
    value: Option<f64>,
) -> Result<ParamMatch, ResolveError> {
    let entries = table.entries(component, keyword).ok_or_else(|| {
        ResolveError::MissingParameterTable {
            component: component.to_string(),
            keyword: keyword.to_string(),
        }
    })?;
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return Err(ResolveError::MissingParameterTable {
            component: component.to_string(),
            keyword: keyword.to_string(),
        });
    };

    let Some(value) = value else {
        return Ok(ParamMatch::Latest { filename: last.filename.clone() });
    };

    if value < first.value || value > last.value {
        return Err(ResolveError::ParameterOutOfRange {
            component: component.to_string(),
            keyword: keyword.to_string(),
            value,
            min: first.value,
            max: last.value,
        });
    }

    if let Some(hit) = entries.iter().find(|e| e.value == value) {
        return Ok(ParamMatch::Exact { filename: hit.filename.clone() });
    }

    // In-domain and not exact: the bracketing pair exists by construction.
    let upper_idx = entries.iter().position(|e| e.value > value).unwrap_or(entries.len() - 1);
    let lower = entries[upper_idx - 1].clone();
    let upper = entries[upper_idx].clone();
    let fraction = (value - lower.value) / (upper.value - lower.value);
    Ok(ParamMatch::Bracketed { lower, upper, fraction })
}

// MJD 0 is 1858-11-17. The `mjd#` axis is the dominant parameterized
// keyword in delivered tables; these helpers keep diagnostics readable.

/// Calendar date of an MJD value (fractional day discarded).
pub fn mjd_to_date(mjd: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1858, 11, 17)?;
    epoch.checked_add_days(chrono::Days::new(mjd.floor() as u64))
}

/// MJD of midnight on a calendar date.
pub fn date_to_mjd(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1858, 11, 17).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}
