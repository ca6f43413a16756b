pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod state;
pub mod stats;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use models::{Character, CharacterDraft, CharacterId, CharacterPatch};
pub use routes::create_router;
pub use state::AppState;
pub use store::{CharacterStore, StoreError};
