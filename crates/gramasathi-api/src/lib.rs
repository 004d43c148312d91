//! # GramaSathi API
//!
//! HTTP surface of the GramaSathi backend.
//!
//! - **Users**: store arbitrary citizen profiles used to fill forms
//! - **Messages**: inbound citizen messages and their status lifecycle
//! - **Tasks**: run a form automation task and read its persisted record
//! - **Files**: static access to the before/after PDF snapshots
//!
//! ## Route Structure
//!
//! ```text
//! GET    /                        - Banner
//! GET    /livez                   - Liveness probe
//! POST   /users                   - Create user
//! GET    /users/{id}              - Read user
//! POST   /messages                - Store message
//! POST   /messages/withMetadata   - Store message with intent/language
//! PATCH  /messages/{id}/status    - Change message status
//! POST   /tasks                   - Run form automation task
//! GET    /tasks/{id}              - Read task record
//! GET    /files/{name}            - Snapshot PDFs
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
