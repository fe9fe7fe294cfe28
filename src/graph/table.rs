//! Instrument graph and component tables.
//!
//! The graph table is the instrument configuration expressed as a directed
//! graph: nodes are small integers, and each edge carries a keyword, an
//! optical component reference and an optional thermal component reference.
//! Traversal starts at node 1 and ends at a node with no outgoing edges.
//!
//! Decoding the on-disk table format (FITS) is an external collaborator's
//! job; this module consumes already-decoded [`GraphRow`]s and builds an
//! immutable in-memory structure. There is no mutation API; reloading a
//! table means building a fresh instance and swapping the reference (see
//! `Observatory`), so a half-updated graph can never be observed.
//!
//! Construction performs the full well-formedness pass up front: duplicate
//! `(node, keyword)` edges and cycles are build-time errors, because either
//! would make traversal ambiguous or non-terminating. Unreachable nodes are
//! only warned about; real delivered tables contain a few.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};

use crate::error::{MalformedGraph, ResolveError};

/// Node identifier in the configuration graph.
pub type NodeId = u32;

/// Fixed entry point for every traversal.
pub const ENTRY_NODE: NodeId = 1;

/// Component value meaning "pass-through, contributes no calibration file".
const CLEAR: &str = "clear";

/// One row of a decoded graph table, as supplied by the table collaborator.
#[derive(Debug, Clone)]
pub struct GraphRow {
    pub innode: NodeId,
    pub keyword: String,
    pub outnode: NodeId,
    pub compname: String,
    pub thcompname: String,
}

/// One outgoing edge. `component`/`thermal` are `None` for clear filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    pub component: Option<String>,
    pub thermal: Option<String>,
}

/// All outgoing edges of one node: the keyword-labeled ones, plus the
/// optional `default` edge taken when no keyword matches.
#[derive(Debug, Clone, Default)]
pub struct GraphNode {
    default: Option<Edge>,
    named: BTreeMap<String, Edge>,
}

impl GraphNode {
    /// The edge taken when no user keyword matches, if any.
    pub fn default_edge(&self) -> Option<&Edge> {
        self.default.as_ref()
    }

    /// Keyword-labeled edges, ordered by keyword.
    pub fn named_edges(&self) -> impl Iterator<Item = (&str, &Edge)> {
        self.named.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn edge_for(&self, keyword: &str) -> Option<&Edge> {
        self.named.get(keyword)
    }

    /// Keywords accepted at this node, sorted. Used for diagnostics.
    pub fn keywords(&self) -> Vec<String> {
        self.named.keys().cloned().collect()
    }
}

/// Immutable in-memory instrument graph.
#[derive(Debug, Clone)]
pub struct GraphTable {
    name: String,
    nodes: HashMap<NodeId, GraphNode>,
}

impl GraphTable {
    /// Build a graph table from decoded rows.
    ///
    /// Keywords and component names are lower-cased; component name `clear`
    /// becomes `None`. Fails on duplicate `(node, keyword)` pairs and on any
    /// cycle reachable from the entry node.
    pub fn from_rows<I>(name: &str, rows: I) -> Result<Self, MalformedGraph>
    where
        I: IntoIterator<Item = GraphRow>,
    {
        let mut nodes: HashMap<NodeId, GraphNode> = HashMap::new();

        for row in rows {
            let keyword = row.keyword.trim().to_lowercase();
            let edge = Edge {
                to: row.outnode,
                component: parse_component(&row.compname),
                thermal: parse_component(&row.thcompname),
            };
            let node = nodes.entry(row.innode).or_default();

            if keyword == "default" {
                if node.default.is_some() {
                    return Err(MalformedGraph::DuplicateKeyword { node: row.innode, keyword });
                }
                node.default = Some(edge);
            } else {
                if node.named.contains_key(&keyword) {
                    return Err(MalformedGraph::DuplicateKeyword { node: row.innode, keyword });
                }
                node.named.insert(keyword, edge);
            }
        }

        let table = GraphTable { name: name.to_string(), nodes };
        table.check_well_formed()?;
        Ok(table)
    }

    /// Table name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing edges of `node`, or `None` when the node is terminal.
    pub fn node(&self, node: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&node)
    }

    /// A node with no outgoing edges ends traversal.
    pub fn is_terminal(&self, node: NodeId) -> bool {
        !self.nodes.contains_key(&node)
    }

    /// Depth-first walk from the entry node: rejects cycles, warns about
    /// nodes no traversal can ever reach.
    fn check_well_formed(&self) -> Result<(), MalformedGraph> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut on_path: HashSet<NodeId> = HashSet::new();
        self.visit(ENTRY_NODE, &mut visited, &mut on_path)?;

        let unreachable: Vec<NodeId> = {
            let mut v: Vec<NodeId> =
                self.nodes.keys().copied().filter(|n| !visited.contains(n)).collect();
            v.sort_unstable();
            v
        };
        if !unreachable.is_empty() {
            warn!(
                "graph table '{}': {} unreachable node(s): {:?}",
                self.name,
                unreachable.len(),
                unreachable
            );
        }
        debug!("graph table '{}': {} node(s) validated", self.name, visited.len());
        Ok(())
    }

    fn visit(
        &self,
        node: NodeId,
        visited: &mut HashSet<NodeId>,
        on_path: &mut HashSet<NodeId>,
    ) -> Result<(), MalformedGraph> {
        if on_path.contains(&node) {
            return Err(MalformedGraph::Cycle { node });
        }
        if !visited.insert(node) {
            return Ok(());
        }
        let Some(entry) = self.nodes.get(&node) else {
            return Ok(()); // terminal
        };

        on_path.insert(node);
        if let Some(edge) = &entry.default {
            self.visit(edge.to, visited, on_path)?;
        }
        for edge in entry.named.values() {
            self.visit(edge.to, visited, on_path)?;
        }
        on_path.remove(&node);
        Ok(())
    }
}

fn parse_component(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() || name == CLEAR { None } else { Some(name) }
}

/// Component table: maps a component name to its throughput filename.
///
/// Two instances serve one observatory: one for optical components, one for
/// thermal emissivities.
#[derive(Debug, Clone)]
pub struct CompTable {
    name: String,
    tab: HashMap<String, String>,
}

impl CompTable {
    pub fn from_rows<I>(name: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let tab = rows
            .into_iter()
            .map(|(comp, file)| (comp.trim().to_lowercase(), file.trim().to_string()))
            .collect();
        CompTable { name: name.to_string(), tab }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Throughput filename for a component named by the graph.
    pub fn filename(&self, component: &str) -> Result<&str, ResolveError> {
        self.tab.get(component).map(String::as_str).ok_or_else(|| ResolveError::UnknownComponent {
            component: component.to_string(),
            table: self.name.clone(),
        })
    }
}
