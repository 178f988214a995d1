pub mod analytics;
pub mod cache;
pub mod channel;
pub mod config;
pub mod export;
pub mod health;
pub mod models;
pub mod refresh;
pub mod registry;

use parking_lot::Mutex;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
