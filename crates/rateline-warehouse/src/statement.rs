//! SQL text with named `@parameters` and their bound values.
//!
//! Builders never interpolate caller-supplied values into SQL. Asset codes,
//! issuers, and time bounds travel as [`ParamValue`]s; clients either bind
//! them natively, rewrite them to positional markers with
//! [`Statement::positional`], or render them as literals with
//! [`Statement::inline_sql`] in the statement's [`SqlDialect`].

use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;

use crate::SqlDialect;

/// A value bound to a named statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
}

impl ParamValue {
    /// Literal form of the value in `dialect`.
    pub fn to_literal(&self, dialect: SqlDialect) -> String {
        match self {
            Self::Text(value) => dialect.string_literal(value),
            Self::Int(value) => value.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A named parameter and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: ParamValue,
}

/// Generated SQL plus its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<QueryParam>,
    dialect: SqlDialect,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            dialect: SqlDialect::default(),
        }
    }

    /// Mark the SQL as written for `dialect`; only affects [`Statement::inline_sql`].
    #[must_use]
    pub fn in_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Bind `value` to `@name`. Rebinding a name replaces the earlier value.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|param| param.name == name) {
            Some(existing) => existing.value = value,
            None => self.params.push(QueryParam { name, value }),
        }
        self
    }

    /// SQL text with `@name` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| &param.value)
    }

    /// Render bound values as literals. Unknown `@names` are left untouched.
    pub fn inline_sql(&self) -> String {
        let dialect = self.dialect;
        self.rewrite(|value| value.to_literal(dialect))
    }

    /// Rewrite placeholders to `?` and return the values in placeholder order,
    /// for engines that only support positional parameters.
    pub fn positional(&self) -> (String, Vec<&ParamValue>) {
        let mut ordered = Vec::new();
        let sql = rewrite_placeholders(&self.sql, |name, out| match self.param(name) {
            Some(value) => {
                ordered.push(value);
                out.push('?');
                true
            }
            None => false,
        });
        (sql, ordered)
    }

    fn rewrite(&self, render: impl Fn(&ParamValue) -> String) -> String {
        rewrite_placeholders(&self.sql, |name, out| match self.param(name) {
            Some(value) => {
                out.push_str(&render(value));
                true
            }
            None => false,
        })
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inline_sql())
    }
}

/// Walk `sql`, handing every `@identifier` outside quoted text to `replace`.
/// When `replace` returns false the placeholder is copied through verbatim.
fn rewrite_placeholders<F>(sql: &str, mut replace: F) -> String
where
    F: FnMut(&str, &mut String) -> bool,
{
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(open) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => {
                quote = Some(ch);
                out.push(ch);
            }
            '@' => {
                let name = take_identifier(&mut chars);
                if name.is_empty() || !replace(&name, &mut out) {
                    out.push('@');
                    out.push_str(&name);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn take_identifier(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            name.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    name
}
