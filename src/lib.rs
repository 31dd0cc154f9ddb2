//! Typed bindings and a runtime engine for ABI-described smart contracts.

pub mod abi;
pub mod codegen;
pub mod config;
pub mod ethereum;
pub mod runtime;
