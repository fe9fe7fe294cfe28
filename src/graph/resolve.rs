//! Graph traversal: obsmode tokens -> ordered component path.
//!
//! This is the operational core of the graph engine. Resolution is a small
//! state machine over three pieces of state:
//!
//! ```text
//! current node ──┬─ some remaining token matches a named edge?
//!                │     -> consume it, append the edge's components,
//!                │        capture the parameter value if any
//!                ├─ else: default edge present?
//!                │     -> take it, consume nothing
//!                └─ else: halt
//! ```
//!
//! started at [`ENTRY_NODE`] and repeated until a terminal node (no outgoing
//! edges) or a halt. Matching is greedy and order-independent: remaining
//! tokens are checked in sorted keyword order, so the same token set always
//! selects the same edge regardless of how the input string was written.
//!
//! Cross-cutting modifier keywords (`ota/noota`, `costar/nocostar`) are not
//! part of the main walk. Instruments that care expose them as ordinary
//! edges and the walk consumes them there; whatever is left over afterwards
//! is checked against a fixed side-table and recorded as a modifier instead
//! of failing the request.

use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;

use crate::error::ResolveError;
use crate::obsmode::{ObsToken, Obsmode};

use super::table::{ENTRY_NODE, GraphTable, NodeId};

/// Keywords accepted anywhere, outside the main graph walk.
static MODIFIER_KEYWORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["ota", "noota", "costar", "nocostar"]);

/// A parameterized keyword consumed along the path, tied to the components
/// of the edge that consumed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamCapture {
    /// Keyword name without the trailing `#`, e.g. `mjd`.
    pub keyword: String,
    pub value: f64,
    /// Optical component of the consuming edge, if not clear.
    pub component: Option<String>,
    /// Thermal component of the consuming edge, if not clear.
    pub thermal: Option<String>,
}

/// Result of one traversal: the ordered component references plus everything
/// a later stage needs (captures for parameter lookup, consumed modifiers).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    /// Canonical obsmode string this path was resolved from.
    pub obsmode: String,
    /// Optical component names, in traversal order. Clear edges contribute
    /// nothing.
    pub optical: Vec<String>,
    /// Thermal component names, in traversal order.
    pub thermal: Vec<String>,
    /// Parameterized keyword captures, in traversal order.
    pub captures: Vec<ParamCapture>,
    /// Side-table modifiers consumed after the walk, sorted.
    pub modifiers: Vec<String>,
}

impl GraphPath {
    /// Captured value for a keyword, if any.
    pub fn capture(&self, keyword: &str) -> Option<f64> {
        self.captures.iter().find(|c| c.keyword == keyword).map(|c| c.value)
    }
}

/// Resolve a tokenized obsmode against a graph table.
pub fn resolve(table: &GraphTable, obsmode: &Obsmode) -> Result<GraphPath, ResolveError> {
    // Keyed by table keyword ("mjd#" for parameterized tokens); BTreeMap
    // iteration order is what makes edge selection order-independent.
    let mut remaining: BTreeMap<String, ObsToken> =
        obsmode.tokens.iter().map(|t| (t.table_keyword(), t.clone())).collect();

    let mut path = GraphPath {
        obsmode: obsmode.canonical.clone(),
        optical: Vec::new(),
        thermal: Vec::new(),
        captures: Vec::new(),
        modifiers: Vec::new(),
    };

    let mut current = ENTRY_NODE;
    loop {
        let Some(node) = table.node(current) else {
            break; // terminal
        };

        let matched = remaining
            .keys()
            .find_map(|k| node.edge_for(k).map(|edge| (k.clone(), edge)));
        let (label, edge) = match matched {
            Some((keyword, edge)) => {
                if let Some(ObsToken::Param { name, value }) = remaining.remove(&keyword) {
                    path.captures.push(ParamCapture {
                        keyword: name,
                        value,
                        component: edge.component.clone(),
                        thermal: edge.thermal.clone(),
                    });
                }
                (keyword, edge)
            }
            None => match node.default_edge() {
                Some(edge) => ("default".to_string(), edge),
                None => return Err(halted(current, node.keywords(), remaining, &path.obsmode)),
            },
        };

        debug!("node {current} -> {} via {label} (component {:?})", edge.to, edge.component);
        if let Some(comp) = &edge.component {
            path.optical.push(comp.clone());
        }
        if let Some(th) = &edge.thermal {
            path.thermal.push(th.clone());
        }
        current = edge.to;
    }

    // Terminal reached. Leftover tokens must be cross-cutting modifiers.
    for (keyword, _) in remaining {
        if MODIFIER_KEYWORDS.contains(&keyword.as_str()) {
            path.modifiers.push(keyword);
        } else {
            return Err(ResolveError::UnrecognizedKeyword {
                keyword,
                obsmode: path.obsmode.clone(),
            });
        }
    }
    Ok(path)
}

/// Classify a stall: leftover non-modifier tokens are the caller's mistake,
/// an exhausted token set at a node with required edges is an incomplete
/// obsmode.
fn halted(
    node: NodeId,
    available: Vec<String>,
    remaining: BTreeMap<String, ObsToken>,
    obsmode: &str,
) -> ResolveError {
    let leftover = remaining.keys().find(|k| !MODIFIER_KEYWORDS.contains(&k.as_str()));
    match leftover {
        Some(keyword) => ResolveError::UnrecognizedKeyword {
            keyword: keyword.clone(),
            obsmode: obsmode.to_string(),
        },
        None => ResolveError::IncompleteObsmode { node, available },
    }
}
