// All extern "C" ABI exports accept raw pointers from native callers and
// forward them verbatim to the platform loader; per-function safety docs
// would restate the dlfcn contract.
#![allow(clippy::missing_safety_doc)]
//! # eden-abi
//!
//! ABI boundary of the eden loader shim. This crate produces a `cdylib`
//! (`libeden.so`) that a hosting runtime loads into a dedicated, non-default
//! linking namespace via `dlmopen`. It exports drop-in replacements for
//! `dlopen`, `dlmopen`, `dlclose`, and `dlsym`; guest code inside the
//! namespace that links against the public loader API binds to these
//! replacements, and every plain `dlopen` is redirected into the shim's own
//! namespace so guest-loaded native code never touches the process's default
//! symbol scope.
//!
//! # Architecture
//!
//! ```text
//! guest caller -> interposed entry (dlfcn_abi) -> policy (eden-core)
//!                                              -> real primitive (forward)
//!                                              -> raw lookup (raw)
//! ```
//!
//! The `raw` layer uses glibc-private lookup primitives that the shim does
//! not interpose, which is what breaks the self-interception cycle: the
//! interposed surface is implemented in terms of the raw capability, never
//! the other way around.

#[macro_use]
mod trace;

mod util;

pub mod ctype_abi;
pub mod dlfcn_abi;
pub mod forward;
mod raw;
pub mod registry;
pub mod startup_abi;
