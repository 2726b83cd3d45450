//! screen-sentry: on-screen content safety monitor
//!
//! Continuously inspects the display and flags two categories of
//! policy-violating content: explicit imagery and toxic text. Each cycle
//! runs a fixed pipeline and records an auditable event for every
//! detection:
//!
//! ```text
//! capture -> classify -> extract text -> translate -> score -> emit
//! ```
//!
//! The [`monitor`] module owns the loop and defines the collaborator
//! traits; the leaf modules provide the production implementations, all
//! constructed once at startup and handed to the loop.

pub mod capture;
pub mod classifier;
pub mod config;
pub mod error;
pub mod monitor;
pub mod ocr;
pub mod sink;
pub mod toxicity;
pub mod translate;
