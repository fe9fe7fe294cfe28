//! Instrument bandpass resolution and a synthetic-photometry expression
//! language, as two engines sharing one error taxonomy:
//!
//! ```text
//! obsmode string ──> obsmode ──> graph ──> observatory ──> ResolvedPath
//!                    (tokens)    (walk)    (files, params, cache)
//!
//! expression ──> lang::scanner ──> lang::earley ──> lang::interp
//!                (tokens)          (parse tree)     (SpectrumFactory calls)
//! ```
//!
//! The engines meet in `band(...)`: the interpreter hands its argument
//! subtree to [`Observatory::resolve`] as an obsmode string and turns the
//! resulting component path into a bandpass through the factory.
//!
//! Everything is deterministic and table-driven. Spectral math and on-disk
//! table decoding live outside the crate, behind [`SpectrumFactory`] and
//! the row types consumed by [`GraphTable::from_rows`].

#[macro_use]
mod macros;

pub mod error;
pub mod graph;
pub mod lang;
pub mod observatory;
pub mod obsmode;

pub use error::{Error, LangError, MalformedGraph, ResolveError};
pub use graph::params::{ParamEntry, ParamMatch, ParameterTable};
pub use graph::table::{CompTable, GraphRow, GraphTable};
pub use lang::interp::{Interpreter, SpectrumFactory, TraceFactory};
pub use observatory::{Observatory, ResolvedComponent, ResolvedPath};
pub use obsmode::Obsmode;
