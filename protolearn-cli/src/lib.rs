//! Library surface for the `protolearn` training-driver CLI.
//!
//! See `SPEC_FULL.md` §6.6/§7 at the workspace root for the driver's
//! retry-loop contract.

pub mod cli;
pub mod logging;
