//! Whether money came in or went out.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The direction of a transaction, shared by categories and transactions.
///
/// Seed files written in Spanish use "Ingreso" and "Gasto", which are accepted
/// as aliases when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Money earned, e.g. a salary payment.
    #[serde(alias = "Ingreso")]
    Income,
    /// Money spent, e.g. groceries.
    #[serde(alias = "Gasto")]
    Expense,
}

impl Kind {
    /// Every kind, in the order they are offered in forms.
    pub const ALL: [Kind; 2] = [Kind::Income, Kind::Expense];

    /// The canonical name of the kind, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Income" | "Ingreso" => Ok(Kind::Income),
            "Expense" | "Gasto" => Ok(Kind::Expense),
            other => Err(Error::InvalidKind(other.to_owned())),
        }
    }
}

impl ToSql for Kind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Kind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}
