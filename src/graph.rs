//! Instrument graph engine.
//!
//! Pipeline:
//!
//! ```text
//! "acs,wfc1,mjd#56000,f555w"
//!      |  obsmode::parse
//!      v
//! [acs] [wfc1] [mjd#56000] [f555w]          tokens
//!      |  resolve::resolve (walk from node 1)
//!      v
//! GraphPath { optical: [ota, acs_wfc_ccd1, ...], captures: [mjd=56000] }
//!      |  params::resolve_parameter (per capture)
//!      v
//! exact file | bracketing pair + fraction | latest
//! ```
//!
//! [`table`] holds the immutable graph and component tables, [`resolve`]
//! walks them, [`params`] settles captured parameter values against the
//! external lookup tables.

pub mod params;
pub mod resolve;
pub mod table;

pub use params::{ParamEntry, ParamMatch, ParameterTable, resolve_parameter};
pub use resolve::{GraphPath, ParamCapture, resolve};
pub use table::{CompTable, GraphRow, GraphTable};

#[cfg(test)]
pub(crate) mod tests;
