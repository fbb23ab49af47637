// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the external collaborators the automation loops call.
//!
//! Both use `#[async_trait]` so loops can hold them as `Arc<dyn ...>`.

pub mod generator;
pub mod platform;

pub use generator::ContentGenerator;
pub use platform::PlatformClient;
