pub mod controller;
pub mod routes;

pub use controller::StatusState;
pub use routes::status_routes;
