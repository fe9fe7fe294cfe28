//! Error taxonomy.
//!
//! Errors fall into three tiers, mirroring the lifecycle of a request:
//!
//! - [`MalformedGraph`]: table build time. Fatal: a broken graph table can
//!   serve no request, so construction fails before anything is published.
//! - [`ResolveError`]: per obsmode-resolution request. Recoverable: the
//!   caller gets the offending token/node and may retry with corrected input.
//! - [`LangError`]: per expression request. Recoverable, except for
//!   [`LangError::AmbiguousGrammar`], which flags a broken grammar/priority
//!   table rather than bad user input.
//!
//! Every variant carries enough context (token, node, byte position,
//! expected-terminal set) to produce an actionable message. Nothing in the
//! core retries: inputs are deterministic, so retrying an unchanged input
//! reproduces the same error.

use thiserror::Error;

use crate::graph::table::NodeId;
use crate::lang::grammar::TermSet;

/// Graph table construction failures. These prevent the table from ever
/// being published.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedGraph {
    /// Two edges out of one node share a keyword, making traversal ambiguous.
    #[error("node {node} already has an edge for keyword '{keyword}'")]
    DuplicateKeyword { node: NodeId, keyword: String },

    /// The well-formedness pass found a cycle reachable from the entry node.
    /// Traversal over a cyclic table would not terminate.
    #[error("graph table has a cycle through node {node}")]
    Cycle { node: NodeId },
}

/// Per-request obsmode resolution failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("invalid obsmode '{obsmode}': {reason}")]
    InvalidObsmode { obsmode: String, reason: String },

    /// A keyword was never consumed by any edge along the path (and is not a
    /// known cross-cutting modifier).
    #[error("unrecognized keyword '{keyword}' in obsmode '{obsmode}'")]
    UnrecognizedKeyword { keyword: String, obsmode: String },

    /// Traversal stalled at a node that has outgoing edges but no default
    /// and no matching keyword left to consume.
    #[error("incomplete obsmode: stopped at node {node}, expected one of [{}]", .available.join(", "))]
    IncompleteObsmode { node: NodeId, available: Vec<String> },

    /// A parameterized keyword's value falls outside the lookup table's
    /// domain. This is a hard failure: silently extrapolating calibration
    /// data produces physically wrong results.
    #[error(
        "parameter {keyword}={value} for component '{component}' is outside \
         the table domain [{min}, {max}]"
    )]
    ParameterOutOfRange { component: String, keyword: String, value: f64, min: f64, max: f64 },

    /// A parameterized component has no lookup entries at all.
    #[error("no parameter table for component '{component}', keyword '{keyword}'")]
    MissingParameterTable { component: String, keyword: String },

    /// A component named by the graph is absent from the component table.
    #[error("component '{component}' not found in table '{table}'")]
    UnknownComponent { component: String, table: String },
}

/// Per-request expression language failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LangError {
    /// The scanner hit a byte it cannot start any token with.
    #[error("unrecognized character at byte {position}")]
    Lex { position: usize },

    /// No parse survives the token at `position` (or the input ended with an
    /// unfinished construct). `expected` lists the terminals that would have
    /// allowed the parse to continue.
    #[error("syntax error at byte {position}: expected {expected}")]
    Syntax { position: usize, expected: TermSet },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unknown flux unit '{0}'")]
    UnknownUnit(String),

    #[error("unknown reddening law '{0}'")]
    UnknownLaw(String),

    #[error("unknown catalog grid '{0}'")]
    UnknownCatalog(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    WrongArgCount { function: &'static str, expected: usize, got: usize },

    #[error("{function}: argument {index} has the wrong type (expected {expected})")]
    BadArgument { function: &'static str, index: usize, expected: &'static str },

    /// `band(...)` was interpreted without instrument tables attached.
    #[error("band() requires instrument tables")]
    BandUnavailable,

    /// The expression evaluates to a bare number rather than a spectrum or
    /// bandpass.
    #[error("expression evaluates to a bare number, not a spectrum")]
    NotASpectrum,

    /// Two structurally different derivations span the whole input at equal
    /// priority. With a frozen grammar and priority table this cannot happen;
    /// seeing it means the tables themselves are broken.
    #[error("grammar ambiguity: multiple derivations at equal priority")]
    AmbiguousGrammar,
}

/// Umbrella error for callers that cross both engines (the interpreter does,
/// through `band(...)`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] MalformedGraph),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Lang(#[from] LangError),
}
