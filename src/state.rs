use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Process-lifetime resources shared by every request. Never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}
