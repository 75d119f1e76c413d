use std::sync::Arc;

use db::DBService;
use services::services::notification::OrderNotifier;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub notifier: Arc<dyn OrderNotifier>,
}
