//! Reusable CLI components for Storefront-BI.

pub mod logging;
