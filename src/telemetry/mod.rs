// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Structured logging setup.
//!
//! Initialize once at startup:
//!
//! ```rust,ignore
//! use mcp_router::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::default())?;
//! ```
//!
//! Discovery and invocation entry points carry `#[instrument]`; protocol
//! traffic is logged at debug level, selections at info, and per-server
//! failures at error.

mod init;

pub use init::{init_telemetry, TelemetryConfig};
