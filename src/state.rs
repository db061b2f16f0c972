// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use crate::{blockchain::ChainClient, transfer::TransferService};

/// Shared handler state: one chain client and one signing identity per process.
#[derive(Clone)]
pub struct AppState {
    pub transfers: Arc<TransferService>,
}

impl AppState {
    pub fn new(client: Arc<dyn ChainClient>, rpc_timeout: Duration) -> Self {
        Self {
            transfers: Arc::new(TransferService::new(client, rpc_timeout)),
        }
    }
}
