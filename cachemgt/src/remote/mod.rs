// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cross-process cache invalidation
//!
//! The coordinator hands broadcast requests to a [`RemoteInvalidationHandler`].
//! Delivery is best-effort and fire-and-forget; the transport and its wire
//! format belong to the handler implementation.

pub mod handler;
pub mod noop;

pub use handler::RemoteInvalidationHandler;
pub use noop::NoopRemoteHandler;
