// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Failure barrier for calls into caches and listeners

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::CacheError;

/// Run a cache or listener callback, turning both errors and panics into a message.
pub(crate) fn call_no_fail<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, CacheError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_no_fail_passes_value_through() {
        assert_eq!(call_no_fail(|| Ok(7)), Ok(7));
    }

    #[test]
    fn test_call_no_fail_reports_error() {
        let result: Result<u64, String> =
            call_no_fail(|| Err(CacheError::ResetFailed("boom".to_string())));
        assert_eq!(result, Err("Cache reset failed: boom".to_string()));
    }

    #[test]
    fn test_call_no_fail_catches_panic() {
        let result: Result<u64, String> = call_no_fail(|| panic!("kaputt"));
        assert_eq!(result, Err("panicked: kaputt".to_string()));
    }
}
