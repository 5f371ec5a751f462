//! In-memory [`RemoteStore`] with scripted answers.

use crate::error::Result;
use crate::remote::{Patch, RemoteResponse, RemoteStore};
use crate::session::SessionContext;
use async_trait::async_trait;
use reelboard_core::types::{ItemId, ItemKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Call = (ItemKind, ItemId, Patch);

#[derive(Default)]
pub struct ScriptedStore {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Result<RemoteResponse>>>,
    listing: Mutex<Option<RemoteResponse>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next update. Unscripted updates succeed.
    pub fn respond(&self, response: Result<RemoteResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn set_listing(&self, response: RemoteResponse) {
        *self.listing.lock().unwrap() = Some(response);
    }

    /// Make the next update wait until the returned handle is notified.
    pub fn hold_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for ScriptedStore {
    async fn update(
        &self,
        _session: &SessionContext,
        kind: ItemKind,
        id: &ItemId,
        patch: &Patch,
    ) -> Result<RemoteResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((kind, id.clone(), patch.clone()));
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let scripted = self.responses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(RemoteResponse::ok(None)))
    }

    async fn list(&self, _session: &SessionContext, _kind: ItemKind) -> Result<RemoteResponse> {
        Ok(self
            .listing
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| RemoteResponse::ok(Some(serde_json::json!([])))))
    }
}
