//! Chemical formula parsing.
//!
//! Supports element symbols with integer or decimal multipliers and nested
//! parenthesised groups, e.g. `C(H3(Be2HO4)2)3C2`. Numbers in a formula are
//! always counts, never mass numbers.

use std::collections::BTreeMap;

use crate::elements::periodic_table;
use crate::errors::{MatError, MatResult};

/// Atom counts per element symbol
pub fn parse_formula(formula: &str) -> MatResult<BTreeMap<String, f64>> {
    let mut parser = FormulaParser {
        chars: formula.trim().chars().collect(),
        pos: 0,
    };
    let counts = parser.sequence()?;
    if parser.pos != parser.chars.len() {
        return Err(parser.unparsed(parser.pos));
    }
    if counts.is_empty() {
        return Err(MatError::invalid_input("formula", formula, "formula contains no elements"));
    }
    Ok(counts)
}

struct FormulaParser {
    chars: Vec<char>,
    pos: usize,
}

impl FormulaParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unparsed(&self, from: usize) -> MatError {
        let rest: String = self.chars[from.min(self.chars.len())..].iter().collect();
        let formula: String = self.chars.iter().collect();
        MatError::invalid_input("formula", formula, format!("Unparsed input '{}'", rest))
    }

    /// Groups until end of input or a closing parenthesis
    fn sequence(&mut self) -> MatResult<BTreeMap<String, f64>> {
        let mut counts = BTreeMap::new();
        while let Some(c) = self.peek() {
            let group = match c {
                '(' => {
                    let open = self.pos;
                    self.pos += 1;
                    let inner = self.sequence()?;
                    if self.peek() != Some(')') {
                        return Err(self.unparsed(open));
                    }
                    self.pos += 1;
                    inner
                }
                c if c.is_ascii_uppercase() => {
                    let symbol = self.symbol();
                    if periodic_table::atomic_number(&symbol).is_none() {
                        return Err(MatError::invalid_input(
                            "formula",
                            symbol,
                            "unknown element symbol",
                        ));
                    }
                    BTreeMap::from([(symbol, 1.0)])
                }
                _ => break,
            };
            let multiplier = self.number()?.unwrap_or(1.0);
            for (symbol, n) in group {
                *counts.entry(symbol).or_insert(0.0) += n * multiplier;
            }
        }
        Ok(counts)
    }

    fn symbol(&mut self) -> String {
        let mut s = String::new();
        if let Some(c) = self.peek() {
            s.push(c);
            self.pos += 1;
        }
        while let Some(c) = self.peek().filter(char::is_ascii_lowercase) {
            s.push(c);
            self.pos += 1;
        }
        s
    }

    fn number(&mut self) -> MatResult<Option<f64>> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map(Some).map_err(|_| self.unparsed(start))
    }
}
