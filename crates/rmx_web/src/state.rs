use std::sync::Arc;

use rmx_core::{GenerationBackend, MediaStore, SessionStore};
use rmx_generation::{payments::PaymentClient, uploads::ObjectStorage};

pub struct AppState {
    pub backend: Arc<dyn GenerationBackend>,
    pub store: Arc<dyn MediaStore>,
    pub sessions: Arc<dyn SessionStore>,
    /// Absent when object storage is not configured; the upload endpoint
    /// reports that instead of failing at startup.
    pub uploads: Option<ObjectStorage>,
    /// Absent when no payment provider key is configured.
    pub payments: Option<PaymentClient>,
}
