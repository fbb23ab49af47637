// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Murmur integration tests.
//!
//! Provides scripted collaborators and a harness for fast, deterministic,
//! CI-runnable tests without a real platform or content provider.
//!
//! # Components
//!
//! - [`MockPlatform`] - Scripted platform client that records every call
//! - [`MockGenerator`] - Scripted content generator with dissimilar defaults
//! - [`TestHarness`] - Temp database, config, mocks and loop context in one place

pub mod harness;
pub mod mock_generator;
pub mod mock_platform;

pub use harness::{TestHarness, tweet};
pub use mock_generator::MockGenerator;
pub use mock_platform::{MockPlatform, PlatformCall};
