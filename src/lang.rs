//! Expression language engine.
//!
//! Pipeline:
//!
//! ```text
//! "rn(bb(5000),band(johnson,v),17,abmag)"
//!      |  scanner::scan (after scanner::rewrite)
//!      v
//! [rn] [(] [bb] [(] [5000] ...                 tokens
//!      |  earley::parse (chart over the fixed grammar)
//!      v
//! CallNode(rn, [CallNode(bb, ..), CallNode(band, ..), 17, abmag])
//!      |  interp::Interpreter::eval
//!      v
//! SpectrumFactory calls; band(...) detours through Observatory::resolve
//! ```
//!
//! The grammar, function set, flux units, reddening laws and catalog grids
//! are all frozen enumerations ([`grammar`], [`names`]); nothing here is
//! extensible at runtime.

pub mod earley;
pub mod grammar;
pub mod interp;
pub mod names;
pub mod scanner;
pub mod tree;

pub use grammar::TermSet;
pub use interp::{Interpreter, SpectrumFactory, TraceFactory, Value};
pub use names::{CatalogGrid, FluxUnit, RedLaw, SynFunction};
pub use scanner::{Token, TokenKind};
pub use tree::ParseTree;

#[cfg(test)]
mod tests;
