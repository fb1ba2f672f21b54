//! Translation of feature-service query parameters into SoQL.
//!
//! Keys are emitted verbatim (`$select`, `$where`, ...); every value is
//! percent-encoded, so user-supplied clauses cannot break out of their
//! parameter.

use crate::error::{ProviderError, ProviderResult};
use crate::types::QueryParams;

/// Select every system column (`:*`) plus every user column.
pub const SELECT_ALL: &str = ":*,*";

/// Ordering used when the request names none.
pub const DEFAULT_ORDER: &str = ":id ASC";

/// Parsed, validated query. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub select: String,
    pub where_clause: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub order: String,
}

impl QuerySpec {
    pub fn from_params(params: &QueryParams) -> ProviderResult<Self> {
        let where_clause = non_empty(params.where_clause.as_deref()).map(str::to_string);
        let offset = parse_count("resultOffset", params.result_offset.as_deref())?;
        let limit = parse_count("resultRecordCount", params.result_record_count.as_deref())?;
        let order = match non_empty(params.order_by_fields.as_deref()) {
            Some(raw) => translate_order(raw)?,
            None => DEFAULT_ORDER.to_string(),
        };

        Ok(Self {
            select: SELECT_ALL.to_string(),
            where_clause,
            offset,
            limit,
            order,
        })
    }

    /// Unencoded `(key, value)` pairs in emission order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("$select", self.select.clone())];
        if let Some(ref where_clause) = self.where_clause {
            pairs.push(("$where", where_clause.clone()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("$offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("$limit", limit.to_string()));
        }
        pairs.push(("$order", self.order.clone()));
        pairs
    }

    /// The `&`-joined, encoded query string.
    pub fn to_query_string(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Format request query parameters as an upstream query string.
pub fn format_query(params: &QueryParams) -> ProviderResult<String> {
    QuerySpec::from_params(params).map(|spec| spec.to_query_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_count(param: &str, value: Option<&str>) -> ProviderResult<Option<u64>> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            ProviderError::invalid_query(param, format!("expected a non-negative integer, got '{}'", raw))
        }),
    }
}

/// Translate `field [ASC|DESC], ...` into a SoQL order expression.
fn translate_order(raw: &str) -> ProviderResult<String> {
    let mut terms = Vec::new();

    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut tokens = item.split_whitespace();
        let field = tokens.next().unwrap_or_default();
        if !is_identifier(field) {
            return Err(ProviderError::invalid_query(
                "orderByFields",
                format!("'{}' is not a field name", field),
            ));
        }

        let direction = match tokens.next().map(str::to_ascii_uppercase).as_deref() {
            None | Some("ASC") => "ASC",
            Some("DESC") => "DESC",
            Some(other) => {
                return Err(ProviderError::invalid_query(
                    "orderByFields",
                    format!("unknown sort direction '{}'", other),
                ))
            }
        };

        if let Some(extra) = tokens.next() {
            return Err(ProviderError::invalid_query(
                "orderByFields",
                format!("unexpected token '{}' after '{}'", extra, item),
            ));
        }

        terms.push(format!("{} {}", field, direction));
    }

    if terms.is_empty() {
        return Ok(DEFAULT_ORDER.to_string());
    }
    Ok(terms.join(","))
}

fn is_identifier(field: &str) -> bool {
    !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '@'))
}
