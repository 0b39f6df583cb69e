pub mod routes;
pub mod startup;
pub mod errors;

pub use routes::{build_admin_router, build_router, AppState};
pub use startup::{build_state, run};
