use std::fmt;
use std::str::FromStr;

use sqlparser::ast::{Expr, Fetch, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use crate::error::TdvqError;

/// Path prefix of the TDV system catalog. Queries that reference it are
/// never rewritten.
pub const CATALOG_PATH: &str = "/services/databases/system/";

/// A technique the rewriter may use to bound a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStrategy {
    /// `FETCH FIRST n ROWS ONLY`
    Fetch,
}

impl LimitStrategy {
    pub const ALLOWED: &'static [LimitStrategy] = &[LimitStrategy::Fetch];

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitStrategy::Fetch => "fetch",
        }
    }
}

impl fmt::Display for LimitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitStrategy {
    type Err = TdvqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LimitStrategy::ALLOWED
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                let allowed = LimitStrategy::ALLOWED
                    .iter()
                    .map(LimitStrategy::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                TdvqError::Configuration {
                    message: format!(
                        "unknown limit strategy '{}' (allowed: {})",
                        s, allowed
                    ),
                }
            })
    }
}

/// Parse a comma-separated strategy list such as `"fetch"`.
///
/// Entries are trimmed and lower-cased and empty entries dropped. The first
/// entry outside the allow-list fails the whole list.
pub fn validate_strategies(csv: &str) -> Result<Vec<LimitStrategy>, TdvqError> {
    csv.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect()
}

/// Whether a query targets the system catalog and is exempt from rewriting.
pub fn is_catalog_query(sql: &str) -> bool {
    sql.to_lowercase().contains(CATALOG_PATH.to_lowercase().as_str())
}

/// Bound `sql` to at most `cap` rows using the given strategies.
///
/// Callers pass `max_rows + 1` so a full result can be told apart from a
/// truncated one. An existing `LIMIT` or `FETCH FIRST` is kept when it is
/// already within `cap` and lowered when it is larger. Non-query statements
/// and catalog queries are returned unchanged. Text the parser rejects, such
/// as TDV resource paths, is bounded at the token level when it is a single
/// `SELECT` or `WITH` statement.
pub fn rewrite(sql: &str, strategies: &[LimitStrategy], cap: u64) -> String {
    if strategies.is_empty() || is_catalog_query(sql) {
        return sql.to_string();
    }

    let dialect = GenericDialect {};
    let mut statements = match Parser::parse_sql(&dialect, sql) {
        Ok(stmts) => stmts,
        Err(e) => {
            debug!(error = %e, "query did not parse; bounding by tokens");
            return append_fetch_tokens(sql, cap).unwrap_or_else(|| sql.to_string());
        }
    };

    let mut changed = false;
    for strategy in strategies {
        match strategy {
            LimitStrategy::Fetch => {
                for stmt in statements.iter_mut() {
                    changed |= apply_fetch(stmt, cap);
                }
            }
        }
    }

    if !changed {
        return sql.to_string();
    }

    statements
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(";\n")
}

/// Bound one statement. Returns true if the statement changed.
///
/// An existing `LIMIT` or `FETCH` is the only limiting clause the statement
/// keeps; it is lowered to `cap` only when its count is a literal above `cap`.
fn apply_fetch(stmt: &mut Statement, cap: u64) -> bool {
    let Statement::Query(query) = stmt else {
        return false;
    };

    if let Some(limit) = query.limit.as_mut() {
        return lower_to_cap(limit, cap);
    }

    if let Some(fetch) = query.fetch.as_mut() {
        if fetch.percent {
            return false;
        }
        return match fetch.quantity.as_mut() {
            Some(quantity) => lower_to_cap(quantity, cap),
            // FETCH FIRST ROW ONLY asks for one row, never more than a usable cap.
            None => false,
        };
    }

    let Some(quantity) = number_expr(cap) else {
        return false;
    };

    query.fetch = Some(Fetch {
        with_ties: false,
        percent: false,
        quantity: Some(quantity),
    });
    true
}

/// Replace a literal row count above `cap`. Counts that are not literals
/// are left alone.
fn lower_to_cap(count: &mut Expr, cap: u64) -> bool {
    match (literal_count(count), number_expr(cap)) {
        (Some(existing), Some(quantity)) if existing > cap => {
            *count = quantity;
            true
        }
        _ => false,
    }
}

fn literal_count(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::Value(value) => value.to_string().parse().ok(),
        _ => None,
    }
}

fn number_expr(n: u64) -> Option<Expr> {
    Parser::new(&GenericDialect {})
        .try_with_sql(&n.to_string())
        .and_then(|mut parser| parser.parse_expr())
        .ok()
}

/// Append `FETCH FIRST cap ROWS ONLY` after the last significant token,
/// keeping any trailing `;`, comments and whitespace where they were.
///
/// Gives up on anything but one `SELECT`/`WITH` statement, and on text that
/// already mentions `FETCH` or `LIMIT`.
fn append_fetch_tokens(sql: &str, cap: u64) -> Option<String> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .with_unescape(false)
        .tokenize()
        .ok()?;

    let significant =
        |t: &Token| !matches!(t, Token::Whitespace(_) | Token::SemiColon | Token::EOF);
    let first = tokens.iter().position(significant)?;
    let last = tokens.iter().rposition(significant)?;

    match &tokens[first] {
        Token::Word(w) if matches!(w.keyword, Keyword::SELECT | Keyword::WITH) => {}
        _ => return None,
    }

    let body = &tokens[..=last];
    let has_limit_or_split = body.iter().any(|t| match t {
        Token::SemiColon => true,
        Token::Word(w) => matches!(w.keyword, Keyword::FETCH | Keyword::LIMIT),
        _ => false,
    });
    if has_limit_or_split {
        return None;
    }

    let head: String = body.iter().map(Token::to_string).collect();
    let tail: String = tokens[last + 1..].iter().map(Token::to_string).collect();
    Some(format!("{head} FETCH FIRST {cap} ROWS ONLY{tail}"))
}
