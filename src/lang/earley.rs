//! Chart parser over the fixed grammar.
//!
//! Classic predict/scan/complete over one item set per input position.
//! Items carry their child trees eagerly, so completing the spanning item
//! yields the finished [`ParseTree`] with no second walk. Within a set,
//! items are deduplicated on `(rule, dot, origin)` and the first derivation
//! wins; the grammar has no empty productions, so a completed item's origin
//! always precedes the current set and completion never revisits the set it
//! runs in.
//!
//! When several items span the whole input, the highest rule priority is
//! taken. A priority tie between structurally different trees aborts with
//! [`LangError::AmbiguousGrammar`]: the grammar and priority tables are
//! frozen, so that situation is a table bug, never user input.

use std::collections::HashSet;

use crate::error::LangError;

use super::grammar::{RULES, START, Symbol, TermSet};
use super::scanner::Token;
use super::tree::ParseTree;

#[derive(Debug, Clone)]
struct Item {
    rule: usize,
    dot: usize,
    origin: usize,
    children: Vec<ParseTree>,
}

impl Item {
    fn next_symbol(&self) -> Option<Symbol> {
        RULES[self.rule].rhs.get(self.dot).copied()
    }
}

/// Unit rules collapse to their only child, so chains like
/// `expr -> term -> factor -> value` leave no trace in the tree.
fn build_node(rule: usize, mut children: Vec<ParseTree>) -> ParseTree {
    if children.len() == 1 {
        return children.remove(0);
    }
    ParseTree::Node { tag: RULES[rule].tag, children }
}

fn push(set: &mut Vec<Item>, seen: &mut HashSet<(usize, usize, usize)>, item: Item) {
    if seen.insert((item.rule, item.dot, item.origin)) {
        set.push(item);
    }
}

/// Terminals that would let any item in the set advance. Drives the
/// `expected` half of syntax diagnostics.
fn expected_terminals(set: &[Item]) -> TermSet {
    let mut expected = TermSet::empty();
    for item in set {
        if let Some(Symbol::T(kind)) = item.next_symbol() {
            expected |= TermSet::from_kind(kind);
        }
    }
    expected
}

/// Parse a token stream. `src_len` positions end-of-input diagnostics.
pub fn parse(tokens: &[Token], src_len: usize) -> Result<ParseTree, LangError> {
    let n = tokens.len();
    let mut sets: Vec<Vec<Item>> = vec![Vec::new(); n + 1];
    let mut seen: Vec<HashSet<(usize, usize, usize)>> = vec![HashSet::new(); n + 1];

    for (ri, rule) in RULES.iter().enumerate() {
        if rule.lhs == START {
            push(&mut sets[0], &mut seen[0], Item { rule: ri, dot: 0, origin: 0, children: Vec::new() });
        }
    }

    for i in 0..=n {
        let mut j = 0;
        while j < sets[i].len() {
            let item = sets[i][j].clone();
            j += 1;

            match item.next_symbol() {
                Some(Symbol::N(nt)) => {
                    for (ri, rule) in RULES.iter().enumerate() {
                        if rule.lhs == nt {
                            push(
                                &mut sets[i],
                                &mut seen[i],
                                Item { rule: ri, dot: 0, origin: i, children: Vec::new() },
                            );
                        }
                    }
                }
                Some(Symbol::T(kind)) => {
                    if i < n && tokens[i].kind == kind {
                        let mut children = item.children.clone();
                        children.push(ParseTree::Leaf(tokens[i].clone()));
                        push(
                            &mut sets[i + 1],
                            &mut seen[i + 1],
                            Item { rule: item.rule, dot: item.dot + 1, origin: item.origin, children },
                        );
                    }
                }
                None => {
                    let lhs = RULES[item.rule].lhs;
                    let node = build_node(item.rule, item.children.clone());
                    let parents: Vec<Item> = sets[item.origin]
                        .iter()
                        .filter(|p| p.next_symbol() == Some(Symbol::N(lhs)))
                        .cloned()
                        .collect();
                    for parent in parents {
                        let mut children = parent.children;
                        children.push(node.clone());
                        push(
                            &mut sets[i],
                            &mut seen[i],
                            Item {
                                rule: parent.rule,
                                dot: parent.dot + 1,
                                origin: parent.origin,
                                children,
                            },
                        );
                    }
                }
            }
        }

        if i < n && sets[i + 1].is_empty() {
            return Err(LangError::Syntax {
                position: tokens[i].pos,
                expected: expected_terminals(&sets[i]),
            });
        }
    }

    let mut best: Option<(u8, ParseTree)> = None;
    let mut ambiguous = false;
    for item in &sets[n] {
        let rule = &RULES[item.rule];
        if rule.lhs != START || item.origin != 0 || item.dot != rule.rhs.len() {
            continue;
        }
        let tree = build_node(item.rule, item.children.clone());
        match &best {
            None => best = Some((rule.priority, tree)),
            Some((prio, kept)) => {
                if rule.priority > *prio {
                    best = Some((rule.priority, tree));
                    ambiguous = false;
                } else if rule.priority == *prio && !kept.same_shape(&tree) {
                    ambiguous = true;
                }
            }
        }
    }

    if ambiguous {
        return Err(LangError::AmbiguousGrammar);
    }
    match best {
        Some((_, tree)) => Ok(tree),
        None => Err(LangError::Syntax { position: src_len, expected: expected_terminals(&sets[n]) }),
    }
}
