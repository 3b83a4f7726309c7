//! Client core for the storefront/admin UI and the scanning client:
//! API calls, persisted session, and the view state machine. Rendering
//! lives elsewhere.

pub mod api;
pub mod session;
pub mod views;

pub use api::{ApiClient, ClientError};
pub use session::{Session, SessionStore};
pub use views::{View, ViewState};
