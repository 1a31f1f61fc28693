//! Filter sets accepted by the per-entity search operations.
//!
//! Every attribute is an exact-match constraint; an empty (or blank) value means
//! "no constraint". `limit` and `offset` are raw caller input and are normalized
//! by [`Pagination`](crate::Pagination) before the query runs.

use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads `limit`/`offset` from a query string or a JSON body.
///
/// An empty value (`?limit=`) reads as 0 so the pagination defaults apply.
/// Anything else that is not an integer is rejected.
pub fn deserialize_page_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct PageNumber;

    impl<'de> Visitor<'de> for PageNumber {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or an empty value")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(0);
            }
            v.parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(PageNumber)
}

/// Filters for ticket search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TicketFilters {
    pub status: String,
    pub session_id: String,
    pub client_id: String,
    pub operator_id: String,
    #[serde(deserialize_with = "deserialize_page_number")]
    pub limit: i64,
    #[serde(deserialize_with = "deserialize_page_number")]
    pub offset: i64,
}

/// Filters for session search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionFilters {
    pub status: String,
    pub client_id: String,
    pub pin: String,
    #[serde(deserialize_with = "deserialize_page_number")]
    pub limit: i64,
    #[serde(deserialize_with = "deserialize_page_number")]
    pub offset: i64,
}

/// Filters for operator search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OperatorFilters {
    pub region: String,
    pub role: String,
    pub display_name: String,
    #[serde(deserialize_with = "deserialize_page_number")]
    pub limit: i64,
    #[serde(deserialize_with = "deserialize_page_number")]
    pub offset: i64,
}

macro_rules! impl_page_builders {
    ($($filters:ty),*) => {
        $(
            impl $filters {
                /// Set the requested page size.
                pub fn with_limit(mut self, limit: i64) -> Self {
                    self.limit = limit;
                    self
                }

                /// Set the requested offset.
                pub fn with_offset(mut self, offset: i64) -> Self {
                    self.offset = offset;
                    self
                }
            }
        )*
    };
}

impl_page_builders!(TicketFilters, SessionFilters, OperatorFilters);
