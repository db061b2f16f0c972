// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer Gateway - Single-Signer EVM Transfer Service
//!
//! Exposes two HTTP operations backed by an EVM JSON-RPC provider and one
//! server-held signing key: send native funds, and query a balance.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Chain client, signing key, unit conversion
//! - `config` - Environment configuration
//! - `transfer` - Transaction submission pipeline
//! - `validation` - Input validation and sanitization

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod state;
pub mod transfer;
pub mod validation;
