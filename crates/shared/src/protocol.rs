use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::domain::{StatusId, StatusOption};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_ORDER_BY: &str = "-criado_em";

/// Paginated envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusListResponse {
    pub results: Vec<StatusOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sort key must name a field")]
pub struct InvalidSortKey;

/// Backend ordering key: a field name, `-` prefixed when descending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            descending: !self.descending,
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::descending("criado_em")
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, field) = match s.strip_prefix('-') {
            Some(rest) => (true, rest.trim()),
            None => (false, s),
        };
        if field.is_empty() {
            return Err(InvalidSortKey);
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Query string of the order list endpoint. Optional fields are left out of
/// the URL entirely when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOrdersQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusId>,
    pub order_by: SortKey,
    #[serde(rename = "data_inicio", skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(rename = "data_fim", skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl Default for ListOrdersQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            status: None,
            order_by: SortKey::default(),
            date_from: None,
            date_to: None,
        }
    }
}

impl ListOrdersQuery {
    /// Drops blank search text and clamps page numbers to the 1-based range.
    pub fn normalized(mut self) -> Self {
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.page = self.page.max(1);
        self.page_size = self.page_size.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status_id: StatusId,
}
