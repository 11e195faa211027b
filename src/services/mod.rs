// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod admin;
pub mod catalog;
pub mod export;
pub mod identity;
pub mod scan;

pub use admin::AdminRoleService;
pub use catalog::CatalogService;
pub use identity::{IdentityError, IdentityProvider, JwtIdentityProvider};
pub use scan::{ScanOutcome, ScanService};
