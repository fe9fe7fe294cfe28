//! Parse trees.
//!
//! Unit rules collapse during construction, so trees are shallow: a call
//! node holds its head identifier leaf, both paren leaves and the argument
//! spine directly. Leaves keep their source text, which is what makes
//! [`ParseTree::serialize`] possible; the interpreter uses it to turn a
//! `band(...)` argument subtree back into an obsmode string.

use super::grammar::RuleTag;
use super::scanner::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Leaf(Token),
    Node { tag: RuleTag, children: Vec<ParseTree> },
}

impl ParseTree {
    /// Reconstruct source text from the leaves, in order. Division keeps
    /// the surrounding whitespace it is scanned with and strings get their
    /// quotes back; everything else concatenates verbatim.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        match self {
            ParseTree::Leaf(tok) => match tok.kind {
                TokenKind::Slash => out.push_str(" / "),
                TokenKind::Str => {
                    out.push('"');
                    out.push_str(&tok.text);
                    out.push('"');
                }
                _ => out.push_str(&tok.text),
            },
            ParseTree::Node { children, .. } => {
                for child in children {
                    child.write(out);
                }
            }
        }
    }

    /// Structural equality: same tags, same leaf kinds and texts, token
    /// positions ignored. Two derivations with the same shape are the same
    /// parse for disambiguation purposes.
    pub fn same_shape(&self, other: &ParseTree) -> bool {
        match (self, other) {
            (ParseTree::Leaf(a), ParseTree::Leaf(b)) => a.kind == b.kind && a.text == b.text,
            (
                ParseTree::Node { tag: ta, children: ca },
                ParseTree::Node { tag: tb, children: cb },
            ) => {
                ta == tb
                    && ca.len() == cb.len()
                    && ca.iter().zip(cb).all(|(x, y)| x.same_shape(y))
            }
            _ => false,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            ParseTree::Leaf(_) => 1,
            ParseTree::Node { children, .. } => {
                1 + children.iter().map(ParseTree::depth).max().unwrap_or(0)
            }
        }
    }
}
