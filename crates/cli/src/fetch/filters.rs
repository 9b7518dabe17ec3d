// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query text plus keyed filters for a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(default, flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Request parameters for `page`. An empty query is omitted.
    pub fn to_params(&self, page: u32) -> Value {
        let mut params = Map::new();
        params.insert("page".into(), Value::from(page));
        if !self.query.is_empty() {
            params.insert("q".into(), Value::from(self.query.clone()));
        }
        for (key, value) in &self.fields {
            params.insert(key.clone(), Value::from(value.clone()));
        }
        Value::Object(params)
    }
}
