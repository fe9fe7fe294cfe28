//! Tree interpreter.
//!
//! Spectral math lives outside this crate, behind [`SpectrumFactory`]. The
//! interpreter walks a parse tree, checks arity and argument types against
//! the closed function set, and emits factory calls; what a "spectrum"
//! actually is stays the factory's business. `band(...)` is the one place
//! the two engines meet: its argument subtree is re-serialized into an
//! obsmode string and resolved through an attached [`Observatory`].
//!
//! [`TraceFactory`] is a factory that builds plan strings instead of
//! spectra. The tests and the CLI both use it.

use std::cell::RefCell;

use crate::error::{Error, LangError};
use crate::graph::params::{EmptyParameterTable, ParameterTable};
use crate::observatory::{Observatory, ResolvedPath};

use super::grammar::{RuleTag, TermSet};
use super::names::{CatalogGrid, FluxUnit, RedLaw, SynFunction};
use super::scanner::{self, Token, TokenKind};
use super::tree::ParseTree;
use super::earley;

/// An intermediate evaluation result. Bare identifiers and strings stay
/// names until a context forces them into a spectrum (through
/// [`SpectrumFactory::from_file`]) or a unit/law/grid lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<V> {
    Num(f64),
    Name(String),
    Spectrum(V),
}

/// External spectral-object constructor and algebra.
pub trait SpectrumFactory {
    type Value: Clone;

    fn blackbody(&self, teff: f64) -> Result<Self::Value, Error>;
    fn power_law(&self, refval: f64, alpha: f64, unit: FluxUnit) -> Result<Self::Value, Error>;
    fn gaussian_emission(
        &self,
        center: f64,
        fwhm: f64,
        total_flux: f64,
        unit: FluxUnit,
    ) -> Result<Self::Value, Error>;
    fn constant_flux(&self, value: f64, unit: FluxUnit) -> Result<Self::Value, Error>;
    fn box_throughput(&self, center: f64, width: f64) -> Result<Self::Value, Error>;
    fn from_catalog_grid(
        &self,
        grid: CatalogGrid,
        teff: f64,
        metallicity: f64,
        log_g: f64,
    ) -> Result<Self::Value, Error>;
    fn from_file(&self, filename: &str) -> Result<Self::Value, Error>;
    fn extinction(&self, law: RedLaw, ebv: f64) -> Result<Self::Value, Error>;
    fn redshift(&self, spectrum: Self::Value, z: f64) -> Result<Self::Value, Error>;
    fn renormalize(
        &self,
        spectrum: Self::Value,
        band: Self::Value,
        value: f64,
        unit: FluxUnit,
    ) -> Result<Self::Value, Error>;

    fn add(&self, a: Self::Value, b: Self::Value) -> Result<Self::Value, Error>;
    fn subtract(&self, a: Self::Value, b: Self::Value) -> Result<Self::Value, Error>;
    fn multiply(&self, a: Self::Value, b: Self::Value) -> Result<Self::Value, Error>;
    fn divide(&self, a: Self::Value, b: Self::Value) -> Result<Self::Value, Error>;
    fn scale(&self, spectrum: Self::Value, by: f64) -> Result<Self::Value, Error>;
    fn negate(&self, spectrum: Self::Value) -> Result<Self::Value, Error>;

    fn bandpass_from_components(&self, path: &ResolvedPath) -> Result<Self::Value, Error>;
}

pub struct Interpreter<'a, F: SpectrumFactory, P: ParameterTable = EmptyParameterTable> {
    factory: &'a F,
    observatory: Option<&'a Observatory<P>>,
}

impl<'a, F: SpectrumFactory> Interpreter<'a, F> {
    /// An interpreter without instrument tables. `band(...)` fails with
    /// [`LangError::BandUnavailable`].
    pub fn standalone(factory: &'a F) -> Self {
        Interpreter { factory, observatory: None }
    }
}

impl<'a, F: SpectrumFactory, P: ParameterTable> Interpreter<'a, F, P> {
    pub fn with_observatory(factory: &'a F, observatory: &'a Observatory<P>) -> Self {
        Interpreter { factory, observatory: Some(observatory) }
    }

    /// Scan, parse and evaluate one expression down to a spectral object.
    ///
    /// A top-level bare name reads as a spectrum file; a top-level bare
    /// number is rejected.
    pub fn interpret(&self, src: &str) -> Result<F::Value, Error> {
        let src = scanner::rewrite(src);
        let tokens = scanner::scan(&src)?;
        let tree = earley::parse(&tokens, src.len())?;
        match self.eval(&tree)? {
            Value::Spectrum(v) => Ok(v),
            Value::Name(name) => self.factory.from_file(&name),
            Value::Num(_) => Err(LangError::NotASpectrum.into()),
        }
    }

    pub fn eval(&self, tree: &ParseTree) -> Result<Value<F::Value>, Error> {
        match tree {
            ParseTree::Leaf(tok) => self.eval_leaf(tok),
            ParseTree::Node { tag, children } => match (tag, children.as_slice()) {
                (RuleTag::Add | RuleTag::Sub | RuleTag::Mul | RuleTag::Div, [l, _, r]) => {
                    let a = self.eval(l)?;
                    let b = self.eval(r)?;
                    self.binary(*tag, a, b)
                }
                (RuleTag::FactorUnary, [sign, v]) => {
                    let value = self.eval(v)?;
                    match sign {
                        ParseTree::Leaf(t) if t.kind == TokenKind::Minus => self.negated(value),
                        _ => Ok(value),
                    }
                }
                (RuleTag::Paren, [_, e, _]) => self.eval(e),
                (RuleTag::CallNode, [ParseTree::Leaf(head), _, args, _]) => self.call(head, args),
                _ => Err(malformed_tree(tree)),
            },
        }
    }

    fn eval_leaf(&self, tok: &Token) -> Result<Value<F::Value>, Error> {
        match tok.kind {
            TokenKind::Number => {
                let v = tok.value.ok_or(LangError::Lex { position: tok.pos })?;
                Ok(Value::Num(v))
            }
            TokenKind::Ident | TokenKind::Str => Ok(Value::Name(tok.text.clone())),
            _ => Err(malformed_tree(&ParseTree::Leaf(tok.clone()))),
        }
    }

    fn binary(
        &self,
        tag: RuleTag,
        a: Value<F::Value>,
        b: Value<F::Value>,
    ) -> Result<Value<F::Value>, Error> {
        use RuleTag::{Add, Div, Mul, Sub};
        use Value::{Num, Spectrum};

        let f = self.factory;
        Ok(match (tag, a, b) {
            (Add, Num(x), Num(y)) => Num(x + y),
            (Sub, Num(x), Num(y)) => Num(x - y),
            (Mul, Num(x), Num(y)) => Num(x * y),
            (Div, Num(x), Num(y)) => Num(x / y),
            (Mul, Spectrum(s), Num(k)) | (Mul, Num(k), Spectrum(s)) => Spectrum(f.scale(s, k)?),
            (Div, Spectrum(s), Num(k)) => Spectrum(f.scale(s, 1.0 / k)?),
            (Add, a, b) => Spectrum(f.add(self.coerce(a, "+", 1)?, self.coerce(b, "+", 2)?)?),
            (Sub, a, b) => {
                Spectrum(f.subtract(self.coerce(a, "-", 1)?, self.coerce(b, "-", 2)?)?)
            }
            (Mul, a, b) => {
                Spectrum(f.multiply(self.coerce(a, "*", 1)?, self.coerce(b, "*", 2)?)?)
            }
            (Div, a, b) => Spectrum(f.divide(self.coerce(a, "/", 1)?, self.coerce(b, "/", 2)?)?),
            _ => return Err(malformed_tree(&ParseTree::Node { tag, children: Vec::new() })),
        })
    }

    fn negated(&self, value: Value<F::Value>) -> Result<Value<F::Value>, Error> {
        match value {
            Value::Num(v) => Ok(Value::Num(-v)),
            other => Ok(Value::Spectrum(self.factory.negate(self.coerce(other, "-", 1)?)?)),
        }
    }

    /// Force a value to a spectrum. Names read as spectrum files.
    fn coerce(
        &self,
        value: Value<F::Value>,
        function: &'static str,
        index: usize,
    ) -> Result<F::Value, Error> {
        match value {
            Value::Spectrum(s) => Ok(s),
            Value::Name(name) => self.factory.from_file(&name),
            Value::Num(_) => {
                Err(LangError::BadArgument { function, index, expected: "spectrum" }.into())
            }
        }
    }

    fn call(&self, head: &Token, args: &ParseTree) -> Result<Value<F::Value>, Error> {
        let func: SynFunction = head.text.parse()?;

        // band() never evaluates its arguments; the subtree is an obsmode.
        if func == SynFunction::Band {
            let obs = self.observatory.ok_or(LangError::BandUnavailable)?;
            let path = obs.resolve(&args.serialize())?;
            return Ok(Value::Spectrum(self.factory.bandpass_from_components(&path)?));
        }

        let vals: Vec<Value<F::Value>> =
            collect_args(args).into_iter().map(|t| self.eval(t)).collect::<Result<_, _>>()?;

        let expected = match func {
            SynFunction::Bb | SynFunction::Spec => 1,
            SynFunction::Box_ | SynFunction::Ebmvx | SynFunction::Unit | SynFunction::Z => 2,
            SynFunction::Pl => 3,
            SynFunction::Em | SynFunction::Icat | SynFunction::Rn => 4,
            SynFunction::Band => 0,
        };
        if vals.len() != expected {
            return Err(LangError::WrongArgCount {
                function: func.as_str(),
                expected,
                got: vals.len(),
            }
            .into());
        }

        let f = self.factory;
        let fname = func.as_str();
        let spectrum = match func {
            SynFunction::Bb => f.blackbody(self.num(&vals, 0, fname)?)?,
            SynFunction::Box_ => {
                f.box_throughput(self.num(&vals, 0, fname)?, self.num(&vals, 1, fname)?)?
            }
            SynFunction::Em => f.gaussian_emission(
                self.num(&vals, 0, fname)?,
                self.num(&vals, 1, fname)?,
                self.num(&vals, 2, fname)?,
                self.name(&vals, 3, fname)?.parse()?,
            )?,
            SynFunction::Icat => f.from_catalog_grid(
                self.name(&vals, 0, fname)?.parse()?,
                self.num(&vals, 1, fname)?,
                self.num(&vals, 2, fname)?,
                self.num(&vals, 3, fname)?,
            )?,
            SynFunction::Pl => f.power_law(
                self.num(&vals, 0, fname)?,
                self.num(&vals, 1, fname)?,
                self.name(&vals, 2, fname)?.parse()?,
            )?,
            SynFunction::Rn => f.renormalize(
                self.spectrum(&vals, 0, fname)?,
                self.spectrum(&vals, 1, fname)?,
                self.num(&vals, 2, fname)?,
                self.name(&vals, 3, fname)?.parse()?,
            )?,
            SynFunction::Spec => f.from_file(self.name(&vals, 0, fname)?)?,
            SynFunction::Unit => {
                f.constant_flux(self.num(&vals, 0, fname)?, self.name(&vals, 1, fname)?.parse()?)?
            }
            SynFunction::Ebmvx => {
                // Both argument orders circulate in existing obsmode
                // archives: ebmvx(0.3, mwavg) and ebmvx(mwavg, 0.3).
                let (law, ebv) = match (&vals[0], &vals[1]) {
                    (Value::Num(v), Value::Name(l)) => (l.parse::<RedLaw>()?, *v),
                    (Value::Name(l), Value::Num(v)) => (l.parse::<RedLaw>()?, *v),
                    _ => {
                        return Err(LangError::BadArgument {
                            function: fname,
                            index: 1,
                            expected: "a reddening law and a number",
                        }
                        .into());
                    }
                };
                f.extinction(law, ebv)?
            }
            SynFunction::Z => {
                let base = match &vals[0] {
                    // z(null, ...) redshifts a unit flat spectrum.
                    Value::Name(n) if n.eq_ignore_ascii_case("null") => {
                        f.constant_flux(1.0, FluxUnit::Photlam)?
                    }
                    _ => self.spectrum(&vals, 0, fname)?,
                };
                f.redshift(base, self.num(&vals, 1, fname)?)?
            }
            SynFunction::Band => return Err(LangError::BandUnavailable.into()),
        };
        Ok(Value::Spectrum(spectrum))
    }

    fn num(&self, vals: &[Value<F::Value>], i: usize, function: &'static str) -> Result<f64, Error> {
        match &vals[i] {
            Value::Num(v) => Ok(*v),
            _ => Err(LangError::BadArgument { function, index: i + 1, expected: "number" }.into()),
        }
    }

    fn name<'v>(
        &self,
        vals: &'v [Value<F::Value>],
        i: usize,
        function: &'static str,
    ) -> Result<&'v str, Error> {
        match &vals[i] {
            Value::Name(s) => Ok(s),
            _ => Err(LangError::BadArgument { function, index: i + 1, expected: "name" }.into()),
        }
    }

    fn spectrum(
        &self,
        vals: &[Value<F::Value>],
        i: usize,
        function: &'static str,
    ) -> Result<F::Value, Error> {
        self.coerce(vals[i].clone(), function, i + 1)
    }
}

/// Walk the left-recursive argument spine into a flat list.
fn collect_args(tree: &ParseTree) -> Vec<&ParseTree> {
    fn walk<'t>(tree: &'t ParseTree, out: &mut Vec<&'t ParseTree>) {
        if let ParseTree::Node { tag: RuleTag::ArgMore, children } = tree {
            if let [left, _, right] = children.as_slice() {
                walk(left, out);
                out.push(right);
                return;
            }
        }
        out.push(tree);
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

/// A tree shape no grammar rule produces.
fn malformed_tree(tree: &ParseTree) -> Error {
    let position = match tree {
        ParseTree::Leaf(tok) => tok.pos,
        ParseTree::Node { .. } => 0,
    };
    LangError::Syntax { position, expected: TermSet::empty() }.into()
}

/// A [`SpectrumFactory`] whose spectra are the plan strings describing how
/// they would be built. Records every call it receives.
#[derive(Debug, Default)]
pub struct TraceFactory {
    calls: RefCell<Vec<String>>,
}

impl TraceFactory {
    pub fn new() -> Self {
        TraceFactory::default()
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn note(&self, plan: String) -> Result<String, Error> {
        self.calls.borrow_mut().push(plan.clone());
        Ok(plan)
    }
}

impl SpectrumFactory for TraceFactory {
    type Value = String;

    fn blackbody(&self, teff: f64) -> Result<String, Error> {
        self.note(format!("bb({teff})"))
    }

    fn power_law(&self, refval: f64, alpha: f64, unit: FluxUnit) -> Result<String, Error> {
        self.note(format!("pl({refval},{alpha},{unit})"))
    }

    fn gaussian_emission(
        &self,
        center: f64,
        fwhm: f64,
        total_flux: f64,
        unit: FluxUnit,
    ) -> Result<String, Error> {
        self.note(format!("em({center},{fwhm},{total_flux},{unit})"))
    }

    fn constant_flux(&self, value: f64, unit: FluxUnit) -> Result<String, Error> {
        self.note(format!("unit({value},{unit})"))
    }

    fn box_throughput(&self, center: f64, width: f64) -> Result<String, Error> {
        self.note(format!("box({center},{width})"))
    }

    fn from_catalog_grid(
        &self,
        grid: CatalogGrid,
        teff: f64,
        metallicity: f64,
        log_g: f64,
    ) -> Result<String, Error> {
        self.note(format!("icat({grid},{teff},{metallicity},{log_g})"))
    }

    fn from_file(&self, filename: &str) -> Result<String, Error> {
        self.note(format!("file({filename})"))
    }

    fn extinction(&self, law: RedLaw, ebv: f64) -> Result<String, Error> {
        self.note(format!("ebmvx({law},{ebv})"))
    }

    fn redshift(&self, spectrum: String, z: f64) -> Result<String, Error> {
        self.note(format!("z({spectrum},{z})"))
    }

    fn renormalize(
        &self,
        spectrum: String,
        band: String,
        value: f64,
        unit: FluxUnit,
    ) -> Result<String, Error> {
        self.note(format!("rn({spectrum},{band},{value},{unit})"))
    }

    fn add(&self, a: String, b: String) -> Result<String, Error> {
        self.note(format!("({a} + {b})"))
    }

    fn subtract(&self, a: String, b: String) -> Result<String, Error> {
        self.note(format!("({a} - {b})"))
    }

    fn multiply(&self, a: String, b: String) -> Result<String, Error> {
        self.note(format!("({a} * {b})"))
    }

    fn divide(&self, a: String, b: String) -> Result<String, Error> {
        self.note(format!("({a} / {b})"))
    }

    fn scale(&self, spectrum: String, by: f64) -> Result<String, Error> {
        self.note(format!("({by} * {spectrum})"))
    }

    fn negate(&self, spectrum: String) -> Result<String, Error> {
        self.note(format!("(-{spectrum})"))
    }

    fn bandpass_from_components(&self, path: &ResolvedPath) -> Result<String, Error> {
        let files: Vec<&str> =
            path.optical.iter().map(|c| c.throughput_file.as_str()).collect();
        self.note(format!("band({} -> [{}])", path.obsmode, files.join(", ")))
    }
}
