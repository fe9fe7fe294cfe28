//! Closed name spaces of the language.
//!
//! Functions, flux units, reddening laws and catalog grids are fixed
//! enumerations. New entries are code changes, not configuration, so the
//! interpreter can match exhaustively and an unknown name is always a
//! user error with a precise variant.

use std::fmt;
use std::str::FromStr;

use log::info;

use crate::error::LangError;

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynFunction {
    Band,
    Bb,
    Box_,
    Ebmvx,
    Em,
    Icat,
    Pl,
    Rn,
    Spec,
    Unit,
    Z,
}

impl SynFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            SynFunction::Band => "band",
            SynFunction::Bb => "bb",
            SynFunction::Box_ => "box",
            SynFunction::Ebmvx => "ebmvx",
            SynFunction::Em => "em",
            SynFunction::Icat => "icat",
            SynFunction::Pl => "pl",
            SynFunction::Rn => "rn",
            SynFunction::Spec => "spec",
            SynFunction::Unit => "unit",
            SynFunction::Z => "z",
        }
    }
}

impl FromStr for SynFunction {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, LangError> {
        Ok(match s.to_lowercase().as_str() {
            "band" => SynFunction::Band,
            "bb" => SynFunction::Bb,
            "box" => SynFunction::Box_,
            "ebmvx" => SynFunction::Ebmvx,
            "em" => SynFunction::Em,
            "icat" => SynFunction::Icat,
            "pl" => SynFunction::Pl,
            "rn" => SynFunction::Rn,
            "spec" => SynFunction::Spec,
            "unit" => SynFunction::Unit,
            "z" => SynFunction::Z,
            _ => return Err(LangError::UnknownFunction(s.to_string())),
        })
    }
}

impl fmt::Display for SynFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flux units accepted by `pl`, `em`, `unit` and `rn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxUnit {
    Abmag,
    Counts,
    Flam,
    Fnu,
    Jy,
    Mjy,
    Obmag,
    Photlam,
    Photnu,
    Stmag,
    Vegamag,
}

impl FluxUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            FluxUnit::Abmag => "abmag",
            FluxUnit::Counts => "counts",
            FluxUnit::Flam => "flam",
            FluxUnit::Fnu => "fnu",
            FluxUnit::Jy => "jy",
            FluxUnit::Mjy => "mjy",
            FluxUnit::Obmag => "obmag",
            FluxUnit::Photlam => "photlam",
            FluxUnit::Photnu => "photnu",
            FluxUnit::Stmag => "stmag",
            FluxUnit::Vegamag => "vegamag",
        }
    }
}

impl FromStr for FluxUnit {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, LangError> {
        Ok(match s.to_lowercase().as_str() {
            "abmag" => FluxUnit::Abmag,
            "counts" => FluxUnit::Counts,
            "flam" => FluxUnit::Flam,
            "fnu" => FluxUnit::Fnu,
            "jy" => FluxUnit::Jy,
            "mjy" => FluxUnit::Mjy,
            "obmag" => FluxUnit::Obmag,
            "photlam" => FluxUnit::Photlam,
            "photnu" => FluxUnit::Photnu,
            "stmag" => FluxUnit::Stmag,
            "vegamag" => FluxUnit::Vegamag,
            _ => return Err(LangError::UnknownUnit(s.to_string())),
        })
    }
}

impl fmt::Display for FluxUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interstellar reddening laws accepted by `ebmvx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedLaw {
    Lmc30Dor,
    LmcAvg,
    MwAvg,
    MwDense,
    MwRv21,
    MwRv40,
    SmcBar,
    XGalSb,
}

impl RedLaw {
    pub fn as_str(self) -> &'static str {
        match self {
            RedLaw::Lmc30Dor => "lmc30dor",
            RedLaw::LmcAvg => "lmcavg",
            RedLaw::MwAvg => "mwavg",
            RedLaw::MwDense => "mwdense",
            RedLaw::MwRv21 => "mwrv21",
            RedLaw::MwRv40 => "mwrv40",
            RedLaw::SmcBar => "smcbar",
            RedLaw::XGalSb => "xgalsb",
        }
    }
}

impl FromStr for RedLaw {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, LangError> {
        Ok(match s.to_lowercase().as_str() {
            "lmc30dor" => RedLaw::Lmc30Dor,
            "lmcavg" => RedLaw::LmcAvg,
            "mwavg" => RedLaw::MwAvg,
            "mwdense" => RedLaw::MwDense,
            "mwrv21" => RedLaw::MwRv21,
            "mwrv40" => RedLaw::MwRv40,
            "smcbar" => RedLaw::SmcBar,
            "xgalsb" => RedLaw::XGalSb,
            // Legacy name from older deliveries.
            "gal3" => {
                info!("reddening law 'gal3' read as 'mwavg'");
                RedLaw::MwAvg
            }
            _ => return Err(LangError::UnknownLaw(s.to_string())),
        })
    }
}

impl fmt::Display for RedLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stellar atmosphere grids accepted by `icat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogGrid {
    Ck04Models,
    K93Models,
    Phoenix,
}

impl CatalogGrid {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogGrid::Ck04Models => "ck04models",
            CatalogGrid::K93Models => "k93models",
            CatalogGrid::Phoenix => "phoenix",
        }
    }
}

impl FromStr for CatalogGrid {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, LangError> {
        Ok(match s.to_lowercase().as_str() {
            "ck04models" => CatalogGrid::Ck04Models,
            "k93models" => CatalogGrid::K93Models,
            "phoenix" => CatalogGrid::Phoenix,
            _ => return Err(LangError::UnknownCatalog(s.to_string())),
        })
    }
}

impl fmt::Display for CatalogGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
