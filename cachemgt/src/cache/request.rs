// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Invalidation requests
//!
//! A [`CacheInvalidateRequest`] names what to invalidate: every record of one
//! table, or a single record (optionally together with the root record it
//! belongs to, e.g. an order line and its order). A
//! [`CacheInvalidateMultiRequest`] is either "reset everything" or a batch of
//! such requests. Both are immutable values with stable equality and hashing,
//! so they can be used as map keys for de-duplication and handed to the
//! remote gateway for serialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;

/// Reference to one record of one table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRecordReference {
    pub table_name: String,
    pub record_id: i64,
}

impl TableRecordReference {
    pub fn new(table_name: impl Into<String>, record_id: i64) -> Self {
        Self {
            table_name: table_name.into(),
            record_id,
        }
    }
}

impl fmt::Display for TableRecordReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table_name, self.record_id)
    }
}

/// What to invalidate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheInvalidateRequest {
    /// All records of a table
    AllRecords { table_name: String },

    /// One record, optionally cascading to the root record it belongs to
    Record {
        record: TableRecordReference,
        root: Option<TableRecordReference>,
    },
}

impl CacheInvalidateRequest {
    pub fn all_records_for_table(table_name: impl Into<String>) -> Self {
        CacheInvalidateRequest::AllRecords {
            table_name: table_name.into(),
        }
    }

    pub fn record(table_name: impl Into<String>, record_id: i64) -> Self {
        CacheInvalidateRequest::Record {
            record: TableRecordReference::new(table_name, record_id),
            root: None,
        }
    }

    /// A child record whose change also stales its root record
    pub fn for_child_record(
        root_table_name: impl Into<String>,
        root_record_id: i64,
        child_table_name: impl Into<String>,
        child_record_id: i64,
    ) -> Self {
        CacheInvalidateRequest::Record {
            record: TableRecordReference::new(child_table_name, child_record_id),
            root: Some(TableRecordReference::new(root_table_name, root_record_id)),
        }
    }

    /// Negative or missing record ids mean "all records of the table"
    pub fn from_table_name_and_record_id(
        table_name: impl Into<String>,
        record_id: Option<i64>,
    ) -> Self {
        match record_id {
            Some(record_id) if record_id >= 0 => Self::record(table_name, record_id),
            _ => Self::all_records_for_table(table_name),
        }
    }

    pub fn is_all_records(&self) -> bool {
        matches!(self, CacheInvalidateRequest::AllRecords { .. })
    }

    /// The table this request is primarily about
    pub fn table_name_effective(&self) -> &str {
        match self {
            CacheInvalidateRequest::AllRecords { table_name } => table_name,
            CacheInvalidateRequest::Record { record, .. } => &record.table_name,
        }
    }

    pub fn child_record(&self) -> Option<&TableRecordReference> {
        match self {
            CacheInvalidateRequest::AllRecords { .. } => None,
            CacheInvalidateRequest::Record { record, .. } => Some(record),
        }
    }

    pub fn root_record(&self) -> Option<&TableRecordReference> {
        match self {
            CacheInvalidateRequest::AllRecords { .. } => None,
            CacheInvalidateRequest::Record { root, .. } => root.as_ref(),
        }
    }
}

impl fmt::Display for CacheInvalidateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheInvalidateRequest::AllRecords { table_name } => write!(f, "{}/*", table_name),
            CacheInvalidateRequest::Record { record, root: None } => write!(f, "{}", record),
            CacheInvalidateRequest::Record {
                record,
                root: Some(root),
            } => write!(f, "{} (root {})", record, root),
        }
    }
}

/// Batch of invalidation requests, or "reset everything"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheInvalidateMultiRequest {
    All,
    Requests(Vec<CacheInvalidateRequest>),
}

impl CacheInvalidateMultiRequest {
    pub fn all() -> Self {
        CacheInvalidateMultiRequest::All
    }

    /// Batch of requests; duplicates are dropped, first occurrence keeps its position
    pub fn of(requests: impl IntoIterator<Item = CacheInvalidateRequest>) -> Self {
        let mut seen = HashSet::new();
        let requests = requests
            .into_iter()
            .filter(|request| seen.insert(request.clone()))
            .collect();
        CacheInvalidateMultiRequest::Requests(requests)
    }

    pub fn of_request(request: CacheInvalidateRequest) -> Self {
        CacheInvalidateMultiRequest::Requests(vec![request])
    }

    pub fn all_records_for_table(table_name: impl Into<String>) -> Self {
        Self::of_request(CacheInvalidateRequest::all_records_for_table(table_name))
    }

    pub fn from_table_name_and_record_id(
        table_name: impl Into<String>,
        record_id: Option<i64>,
    ) -> Self {
        Self::of_request(CacheInvalidateRequest::from_table_name_and_record_id(
            table_name, record_id,
        ))
    }

    pub fn is_reset_all(&self) -> bool {
        matches!(self, CacheInvalidateMultiRequest::All)
    }

    /// Contained requests; empty for "reset all"
    pub fn requests(&self) -> &[CacheInvalidateRequest] {
        match self {
            CacheInvalidateMultiRequest::All => &[],
            CacheInvalidateMultiRequest::Requests(requests) => requests,
        }
    }

    pub fn table_names_effective(&self) -> BTreeSet<&str> {
        self.requests()
            .iter()
            .map(CacheInvalidateRequest::table_name_effective)
            .collect()
    }
}

impl fmt::Display for CacheInvalidateMultiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheInvalidateMultiRequest::All => f.write_str("ALL"),
            CacheInvalidateMultiRequest::Requests(requests) => {
                f.write_str("[")?;
                for (i, request) in requests.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", request)?;
                }
                f.write_str("]")
            }
        }
    }
}
