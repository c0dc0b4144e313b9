// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordinator configuration

use serde::{Deserialize, Serialize};

use super::CacheError;

/// Environment variable selecting the run mode (`production` or `unit_test`)
pub const RUN_MODE_ENV: &str = "CACHEMGT_RUN_MODE";

/// Environment variable listing tables enabled for remote invalidation (comma separated)
pub const REMOTE_TABLES_ENV: &str = "CACHEMGT_REMOTE_TABLES";

/// Execution environment of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Production,
    /// Tests and offline tools: record resets are never broadcast
    UnitTest,
}

impl RunMode {
    pub fn is_unit_test_mode(&self) -> bool {
        matches!(self, RunMode::UnitTest)
    }

    pub fn parse(value: &str) -> Result<Self, CacheError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(RunMode::Production),
            "unit_test" | "unittest" | "test" => Ok(RunMode::UnitTest),
            other => Err(CacheError::Config(format!("Unknown run mode '{}'", other))),
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheMgtConfig {
    /// Process run mode
    pub run_mode: RunMode,

    /// Tables enabled for remote broadcast when the coordinator is created
    pub remote_invalidation_tables: Vec<String>,
}

impl CacheMgtConfig {
    /// Configuration for tests: nothing is broadcast from `reset_record`
    pub fn unit_test() -> Self {
        Self {
            run_mode: RunMode::UnitTest,
            ..Self::default()
        }
    }

    /// Read configuration from `CACHEMGT_RUN_MODE` and `CACHEMGT_REMOTE_TABLES`
    pub fn from_env() -> Result<Self, CacheError> {
        let mut config = Self::default();

        if let Ok(run_mode) = std::env::var(RUN_MODE_ENV) {
            config.run_mode = RunMode::parse(&run_mode)?;
        }

        if let Ok(tables) = std::env::var(REMOTE_TABLES_ENV) {
            config.remote_invalidation_tables = tables
                .split(',')
                .map(str::trim)
                .filter(|table| !table.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CacheError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if let Some(position) = self
            .remote_invalidation_tables
            .iter()
            .position(|table| table.trim().is_empty())
        {
            return Err(CacheError::Config(format!(
                "remote_invalidation_tables[{}] is empty",
                position
            )));
        }
        Ok(())
    }
}
