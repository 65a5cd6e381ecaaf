use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::storage::RunStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RunStore>,
    pub tracker: Arc<TrackerConfig>,
}
