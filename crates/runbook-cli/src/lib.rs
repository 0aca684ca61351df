//! Interfaces of the runbook tool.
//!
//! The `runbook` binary wires these to its subcommands: [`http`] serves the
//! JSON API used by the web UI and [`mcp`] exposes the same operations as
//! Model Context Protocol tools over stdio.

pub mod http;
pub mod mcp;
