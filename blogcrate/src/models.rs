//! Request parameters and paginated response envelopes.
//!
//! [`ListParams`] is the decoded form of a listing request: the reserved
//! parameters (`search`, `order_by`, `sort_by`, `per_page`, `page`) plus the
//! remaining ad-hoc filter parameters. Two encodings are accepted at the
//! boundary:
//!
//! - Query strings, with the bracket convention for arrays:
//!   `status=Active&tag_ids[]=2&tag_ids[]=5`
//! - A JSON object: `{"status": "Active", "tag_ids": [2, 5]}`
//!
//! [`Paginated`] is the page envelope clients consume; its `meta` shape
//! (`current_page`, `per_page`, `total`, `last_page`, `from`, `to`) is part
//! of the public contract.

use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Parameter names that are never treated as entity filter keys.
pub const RESERVED_PARAMS: [&str; 5] = ["search", "order_by", "sort_by", "per_page", "page"];

/// A single raw filter value: one scalar or a list of scalars.
///
/// Values stay as strings until the filtering layer coerces them with the
/// configured value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Empty values mean "not provided" and are skipped by the engine.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.trim().is_empty(),
            Self::Many(values) => values.is_empty(),
        }
    }
}

/// Ad-hoc filter parameters keyed by external parameter name.
pub type FilterParams = HashMap<String, FilterValue>;

/// Decoded listing request: reserved parameters plus entity filters.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub order_by: Option<String>,
    pub sort_by: Option<String>,
    pub per_page: Option<u64>,
    pub page: Option<u64>,
    pub filters: FilterParams,
}

impl ListParams {
    /// Decode a raw query string.
    ///
    /// Keys ending in `[]` accumulate into a list value; reserved keys are
    /// routed to their dedicated fields and never reach the filter map.
    /// Unparseable `per_page`/`page` values fall back to the defaults.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.absorb(&key, value.into_owned());
        }
        params
    }

    /// Decode a JSON object encoding of the same parameters.
    ///
    /// Invalid JSON yields empty parameters (logged at warn level); nested
    /// objects and nulls are skipped.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        let parsed: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "invalid JSON in filter parameters");
                return Self::default();
            }
        };
        let Some(object) = parsed.as_object() else {
            tracing::warn!("filter parameters must be a JSON object");
            return Self::default();
        };

        let mut params = Self::default();
        for (key, value) in object {
            match value {
                serde_json::Value::String(s) => params.absorb(key, s.clone()),
                serde_json::Value::Number(n) => params.absorb(key, n.to_string()),
                serde_json::Value::Bool(b) => params.absorb(key, b.to_string()),
                serde_json::Value::Array(items) => {
                    let values: Vec<String> = items
                        .iter()
                        .filter_map(|item| match item {
                            serde_json::Value::String(s) => Some(s.clone()),
                            serde_json::Value::Number(n) => Some(n.to_string()),
                            serde_json::Value::Bool(b) => Some(b.to_string()),
                            _ => None,
                        })
                        .collect();
                    params.filters.insert(key.clone(), FilterValue::Many(values));
                }
                _ => {}
            }
        }
        params
    }

    fn absorb(&mut self, key: &str, value: String) {
        match key {
            "search" => self.search = non_empty(value),
            "order_by" => self.order_by = non_empty(value),
            "sort_by" => self.sort_by = non_empty(value),
            "per_page" => self.per_page = value.trim().parse().ok().filter(|n| *n > 0),
            "page" => self.page = value.trim().parse().ok().filter(|n| *n > 0),
            _ => {
                if let Some(base) = key.strip_suffix("[]") {
                    let slot = self
                        .filters
                        .entry(base.to_string())
                        .or_insert_with(|| FilterValue::Many(Vec::new()));
                    if let FilterValue::Many(items) = slot {
                        items.push(value);
                    } else {
                        *slot = FilterValue::Many(vec![value]);
                    }
                } else {
                    self.filters
                        .insert(key.to_string(), FilterValue::Single(value));
                }
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pagination metadata, in the shape pagination-aware clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// 1-based index of the first item on this page, null when empty.
    pub from: Option<u64>,
    /// 1-based index of the last item on this page, null when empty.
    pub to: Option<u64>,
}

/// Neighbouring page numbers. URL rendering belongs to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLinks {
    pub first: u64,
    pub last: u64,
    pub prev: Option<u64>,
    pub next: Option<u64>,
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

impl<T> Paginated<T> {
    /// Assemble a page envelope. `last_page` is at least 1 so clients can
    /// always render a pager, even over an empty result set.
    #[must_use]
    pub fn new(data: Vec<T>, current_page: u64, per_page: u64, total: u64) -> Self {
        let last_page = if total == 0 {
            1
        } else {
            total.div_ceil(per_page.max(1))
        };
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = (current_page - 1) * per_page + 1;
            (Some(from), Some(from + data.len() as u64 - 1))
        };
        Self {
            meta: PageMeta {
                current_page,
                per_page,
                total,
                last_page,
                from,
                to,
            },
            links: PageLinks {
                first: 1,
                last: last_page,
                prev: (current_page > 1).then(|| current_page - 1),
                next: (current_page < last_page).then(|| current_page + 1),
            },
            data,
        }
    }
}
