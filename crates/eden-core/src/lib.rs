//! # eden-core
//!
//! Pure-logic layer of the eden loader shim. The shim interposes the glibc
//! dynamic-loader entry points and redirects `dlopen` into the non-default
//! linking namespace the shim itself was loaded into; this crate holds every
//! decision that can be made without touching the loader: flag filtering,
//! the open-redirection plan, glibc version parsing and strategy selection,
//! namespace-id validation, and the debug-switch parsing.
//!
//! No `unsafe` code is permitted at the crate level. All FFI lives in
//! `eden-abi`.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod namespace;
pub mod policy;
pub mod version;

pub use error::ConfigError;
pub use namespace::NamespaceId;
pub use policy::OpenPlan;
pub use version::{OpenStrategy, PlatformVersion};
