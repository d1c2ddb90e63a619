pub mod services;
pub mod state;

use std::sync::Arc;

use shared_api::BackendClient;
use shared_config::ClientConfig;
use shared_models::{ClientError, Notifier};

pub use services::SessionService;
pub use state::AppState;

/// Builds the state container and a backend client whose 401s tear the
/// session down through it.
pub fn connect(
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<(Arc<AppState>, Arc<BackendClient>), ClientError> {
    let api = BackendClient::new(&config)?;
    let state = AppState::new(config, notifier);
    let api = api.with_unauthorized_handler(state.clone());
    Ok((state, Arc::new(api)))
}
