//! Long-lived service object tying the tables together.
//!
//! An [`Observatory`] owns one graph table, the optical and thermal
//! component tables, the parameter lookup collaborator and a memoized
//! obsmode cache. Tables are immutable once published; [`Observatory::reload`]
//! builds the replacement set off to the side and swaps it in behind the
//! `RwLock`, so in-flight resolutions finish against the tables they
//! started with and no request ever sees a half-updated set.
//!
//! The cache maps canonical obsmode strings to [`ResolvedPath`]s behind a
//! `Mutex`. Resolution is deterministic, so a race between two misses just
//! computes the same value twice. Several `Observatory` instances can
//! coexist in one process, each with its own table generation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, info};

use crate::error::ResolveError;
use crate::graph::params::{ParamMatch, ParameterTable, resolve_parameter};
use crate::graph::resolve::{GraphPath, resolve};
use crate::graph::table::{CompTable, GraphTable};
use crate::obsmode::Obsmode;

/// One component of a resolved path, ready for spectral work.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub name: String,
    pub throughput_file: String,
    /// Present when the component is parameterized.
    pub param: Option<ParamMatch>,
}

/// A fully resolved obsmode: ordered components with their files, plus the
/// modifiers consumed outside the graph walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub obsmode: String,
    pub optical: Vec<ResolvedComponent>,
    pub thermal: Vec<ResolvedComponent>,
    pub modifiers: Vec<String>,
}

struct Tables {
    graph: GraphTable,
    optical: CompTable,
    thermal: CompTable,
}

pub struct Observatory<P: ParameterTable> {
    tables: RwLock<Arc<Tables>>,
    params: P,
    cache: Mutex<HashMap<String, Arc<ResolvedPath>>>,
}

impl<P: ParameterTable> Observatory<P> {
    pub fn new(graph: GraphTable, optical: CompTable, thermal: CompTable, params: P) -> Self {
        Observatory {
            tables: RwLock::new(Arc::new(Tables { graph, optical, thermal })),
            params,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an obsmode string to its component path, memoized on the
    /// canonical form.
    pub fn resolve(&self, obsmode: &str) -> Result<Arc<ResolvedPath>, ResolveError> {
        let obsmode = Obsmode::parse(obsmode)?;

        if let Some(hit) = lock(&self.cache).get(&obsmode.canonical) {
            debug!("obsmode '{}' served from cache", obsmode.canonical);
            return Ok(hit.clone());
        }

        let tables = read(&self.tables).clone();
        let path = resolve(&tables.graph, &obsmode)?;
        let resolved = Arc::new(self.settle(&tables, path)?);

        lock(&self.cache).insert(obsmode.canonical, resolved.clone());
        Ok(resolved)
    }

    /// Attach filenames and parameter matches to a raw graph path.
    fn settle(&self, tables: &Tables, path: GraphPath) -> Result<ResolvedPath, ResolveError> {
        let optical = self.settle_side(&tables.optical, &path, &path.optical, false)?;
        let thermal = self.settle_side(&tables.thermal, &path, &path.thermal, true)?;
        Ok(ResolvedPath { obsmode: path.obsmode, optical, thermal, modifiers: path.modifiers })
    }

    fn settle_side(
        &self,
        comptab: &CompTable,
        path: &GraphPath,
        names: &[String],
        thermal: bool,
    ) -> Result<Vec<ResolvedComponent>, ResolveError> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let capture = path.captures.iter().find(|c| {
                let side = if thermal { &c.thermal } else { &c.component };
                side.as_deref() == Some(name.as_str())
            });
            let param = match capture {
                Some(c) => Some(resolve_parameter(&self.params, name, &c.keyword, Some(c.value))?),
                // Parameterized components reached without a value fall back
                // to the latest table entry.
                None => match self.params.parameterized_keyword(name) {
                    Some(keyword) => Some(resolve_parameter(&self.params, name, &keyword, None)?),
                    None => None,
                },
            };
            out.push(ResolvedComponent {
                name: name.clone(),
                throughput_file: comptab.filename(name)?.to_string(),
                param,
            });
        }
        Ok(out)
    }

    /// Publish a fresh table set and drop every memoized path.
    pub fn reload(&self, graph: GraphTable, optical: CompTable, thermal: CompTable) {
        info!("reloading tables: graph '{}', comp '{}'/'{}'", graph.name(), optical.name(), thermal.name());
        *write(&self.tables) = Arc::new(Tables { graph, optical, thermal });
        lock(&self.cache).clear();
    }

    /// Number of memoized paths. Diagnostic only.
    pub fn cached_paths(&self) -> usize {
        lock(&self.cache).len()
    }
}

// Lock poisoning means another thread panicked mid-update; the guarded data
// here is either a swap-only Arc or a cache safe to recompute, so recover
// the guard instead of propagating the panic.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn read<T>(l: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(l: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{FixtureParams, fixture_rows, fixture_table};

    fn comp_tables() -> (CompTable, CompTable) {
        let optical = CompTable::from_rows(
            "tmc",
            [
                ("ota", "hst_ota_007_syn.fits"),
                ("acs_wfc_ccd1", "acs_wfc_ccd1_019_syn.fits"),
                ("acs_wfc_ccd2", "acs_wfc_ccd2_019_syn.fits"),
                ("acs_wfc_ccd1_mjd", "acs_wfc_ccd1_mjd_003_syn.fits"),
                ("acs_f555w", "acs_f555w_004_syn.fits"),
                ("acs_f814w", "acs_f814w_004_syn.fits"),
                ("johnson_v", "johnson_v_004_syn.fits"),
            ]
            .map(|(c, f)| (c.to_string(), f.to_string())),
        );
        let thermal = CompTable::from_rows("tmt", Vec::new());
        (optical, thermal)
    }

    fn observatory() -> Observatory<FixtureParams> {
        let (optical, thermal) = comp_tables();
        Observatory::new(fixture_table(), optical, thermal, FixtureParams)
    }

    #[test]
    fn resolves_components_with_files() {
        let obs = observatory();
        let path = obs.resolve("acs,wfc1,f555w").unwrap();
        let names: Vec<&str> = path.optical.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ota", "acs_wfc_ccd1", "acs_f555w"]);
        assert_eq!(path.optical[2].throughput_file, "acs_f555w_004_syn.fits");
        assert!(path.optical.iter().all(|c| c.param.is_none()));
    }

    #[test]
    fn parameterized_component_gets_its_match() {
        let obs = observatory();
        let path = obs.resolve("acs,wfc1,mjd#56000,f555w").unwrap();
        let mjd = path.optical.iter().find(|c| c.name == "acs_wfc_ccd1_mjd").unwrap();
        assert!(matches!(
            mjd.param,
            Some(ParamMatch::Bracketed { ref lower, .. }) if lower.value == 55000.0
        ));
    }

    #[test]
    fn cache_returns_the_same_arc_for_equivalent_spellings() {
        let obs = observatory();
        let a = obs.resolve("acs,wfc1,f555w").unwrap();
        let b = obs.resolve(" ACS, WFC1, F555W ").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(obs.cached_paths(), 1);
    }

    #[test]
    fn reload_clears_the_cache_and_swaps_tables() {
        let obs = observatory();
        obs.resolve("acs,wfc1,f555w").unwrap();
        assert_eq!(obs.cached_paths(), 1);

        let mut rows = fixture_rows();
        rows.push(crate::graph::table::GraphRow {
            innode: 50,
            keyword: "f606w".to_string(),
            outnode: 60,
            compname: "acs_f606w".to_string(),
            thcompname: "clear".to_string(),
        });
        let graph = GraphTable::from_rows("fixture2", rows).unwrap();
        let (_, thermal) = comp_tables();
        let optical = CompTable::from_rows(
            "tmc2",
            [
                ("ota", "hst_ota_007_syn.fits"),
                ("acs_wfc_ccd1", "acs_wfc_ccd1_019_syn.fits"),
                ("acs_f606w", "acs_f606w_004_syn.fits"),
            ]
            .map(|(c, f)| (c.to_string(), f.to_string())),
        );
        obs.reload(graph, optical, thermal);

        assert_eq!(obs.cached_paths(), 0);
        let path = obs.resolve("acs,wfc1,f606w").unwrap();
        assert_eq!(path.optical[2].throughput_file, "acs_f606w_004_syn.fits");
    }

    #[test]
    fn unknown_component_file_is_reported() {
        let (_, thermal) = comp_tables();
        let optical = CompTable::from_rows("tmc", Vec::new());
        let obs = Observatory::new(fixture_table(), optical, thermal, FixtureParams);
        let err = obs.resolve("acs,wfc1,f555w").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownComponent { ref component, .. } if component == "ota"));
    }
}
