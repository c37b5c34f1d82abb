//! State

use std::sync::Arc;

use catalog_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Largest accepted import body, in bytes.
    pub(crate) import_max_bytes: usize,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, import_max_bytes: usize) -> Self {
        Self {
            app,
            import_max_bytes,
        }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, import_max_bytes: usize) -> Arc<Self> {
        Arc::new(Self::new(app, import_max_bytes))
    }
}
