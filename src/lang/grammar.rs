//! The fixed expression grammar.
//!
//! ```text
//! top    -> expr
//! expr   -> expr + term | expr - term | term
//! term   -> term * factor | term / factor | factor
//! factor -> unary value | value
//! unary  -> + | -
//! value  -> ( expr ) | NUMBER | IDENT | STR | call
//! call   -> IDENT ( args )
//! args   -> args , expr | expr
//! ```
//!
//! The grammar is frozen; there is no user-defined syntax. Each rule
//! carries a tag the interpreter matches on and a priority used to pick
//! between competing spanning derivations.

use std::fmt;

use bitflags::bitflags;

use super::scanner::TokenKind;

/// Nonterminal symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerm {
    Top,
    Expr,
    Term,
    Factor,
    Unary,
    Value,
    Call,
    Args,
}

/// One grammar symbol: a nonterminal or a terminal token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    N(NonTerm),
    T(TokenKind),
}

/// Rule identity, matched by the interpreter. Unit rules (a single
/// right-hand symbol) never appear in parse trees; their tags exist only
/// to name the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTag {
    TopExpr,
    Add,
    Sub,
    ExprChain,
    Mul,
    Div,
    TermChain,
    FactorUnary,
    FactorChain,
    UnaryPlus,
    UnaryMinus,
    Paren,
    Number,
    Ident,
    Str,
    CallValue,
    CallNode,
    ArgMore,
    ArgFirst,
}

pub struct GrammarRule {
    pub lhs: NonTerm,
    pub rhs: &'static [Symbol],
    pub tag: RuleTag,
    /// Higher wins when several derivations span the input.
    pub priority: u8,
}

use NonTerm::*;
use Symbol::{N, T};
use TokenKind as K;

/// Traversal start symbol.
pub const START: NonTerm = Top;

pub static RULES: &[GrammarRule] = &[
    GrammarRule { lhs: Top, rhs: &[N(Expr)], tag: RuleTag::TopExpr, priority: 0 },
    GrammarRule { lhs: Expr, rhs: &[N(Expr), T(K::Plus), N(Term)], tag: RuleTag::Add, priority: 0 },
    GrammarRule { lhs: Expr, rhs: &[N(Expr), T(K::Minus), N(Term)], tag: RuleTag::Sub, priority: 0 },
    GrammarRule { lhs: Expr, rhs: &[N(Term)], tag: RuleTag::ExprChain, priority: 0 },
    GrammarRule { lhs: Term, rhs: &[N(Term), T(K::Star), N(Factor)], tag: RuleTag::Mul, priority: 0 },
    GrammarRule { lhs: Term, rhs: &[N(Term), T(K::Slash), N(Factor)], tag: RuleTag::Div, priority: 0 },
    GrammarRule { lhs: Term, rhs: &[N(Factor)], tag: RuleTag::TermChain, priority: 0 },
    GrammarRule {
        lhs: Factor,
        rhs: &[N(Unary), N(Value)],
        tag: RuleTag::FactorUnary,
        priority: 0,
    },
    GrammarRule { lhs: Factor, rhs: &[N(Value)], tag: RuleTag::FactorChain, priority: 0 },
    GrammarRule { lhs: Unary, rhs: &[T(K::Plus)], tag: RuleTag::UnaryPlus, priority: 0 },
    GrammarRule { lhs: Unary, rhs: &[T(K::Minus)], tag: RuleTag::UnaryMinus, priority: 0 },
    GrammarRule {
        lhs: Value,
        rhs: &[T(K::LParen), N(Expr), T(K::RParen)],
        tag: RuleTag::Paren,
        priority: 0,
    },
    GrammarRule { lhs: Value, rhs: &[T(K::Number)], tag: RuleTag::Number, priority: 0 },
    GrammarRule { lhs: Value, rhs: &[T(K::Ident)], tag: RuleTag::Ident, priority: 0 },
    GrammarRule { lhs: Value, rhs: &[T(K::Str)], tag: RuleTag::Str, priority: 0 },
    GrammarRule { lhs: Value, rhs: &[N(Call)], tag: RuleTag::CallValue, priority: 0 },
    // A call outranks reading the head identifier as a bare value, should
    // both ever span.
    GrammarRule {
        lhs: Call,
        rhs: &[T(K::Ident), T(K::LParen), N(Args), T(K::RParen)],
        tag: RuleTag::CallNode,
        priority: 1,
    },
    GrammarRule {
        lhs: Args,
        rhs: &[N(Args), T(K::Comma), N(Expr)],
        tag: RuleTag::ArgMore,
        priority: 0,
    },
    GrammarRule { lhs: Args, rhs: &[N(Expr)], tag: RuleTag::ArgFirst, priority: 0 },
];

bitflags! {
    /// A set of terminal classes, used in syntax diagnostics.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TermSet: u16 {
        const NUMBER  = 1 << 0;
        const IDENT   = 1 << 1;
        const STR     = 1 << 2;
        const LPAREN  = 1 << 3;
        const RPAREN  = 1 << 4;
        const COMMA   = 1 << 5;
        const PLUS    = 1 << 6;
        const MINUS   = 1 << 7;
        const STAR    = 1 << 8;
        const SLASH   = 1 << 9;
    }
}

impl TermSet {
    pub fn from_kind(kind: TokenKind) -> TermSet {
        match kind {
            TokenKind::Number => TermSet::NUMBER,
            TokenKind::Ident => TermSet::IDENT,
            TokenKind::Str => TermSet::STR,
            TokenKind::LParen => TermSet::LPAREN,
            TokenKind::RParen => TermSet::RPAREN,
            TokenKind::Comma => TermSet::COMMA,
            TokenKind::Plus => TermSet::PLUS,
            TokenKind::Minus => TermSet::MINUS,
            TokenKind::Star => TermSet::STAR,
            TokenKind::Slash => TermSet::SLASH,
        }
    }
}

impl fmt::Display for TermSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TermSet, &str); 10] = [
            (TermSet::NUMBER, "number"),
            (TermSet::IDENT, "identifier"),
            (TermSet::STR, "string"),
            (TermSet::LPAREN, "'('"),
            (TermSet::RPAREN, "')'"),
            (TermSet::COMMA, "','"),
            (TermSet::PLUS, "'+'"),
            (TermSet::MINUS, "'-'"),
            (TermSet::STAR, "'*'"),
            (TermSet::SLASH, "'/'"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("end of input")?;
        }
        Ok(())
    }
}
