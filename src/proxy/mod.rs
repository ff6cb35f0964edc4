pub mod handlers;
pub mod response;

pub use handlers::handle_client;
pub use response::send_error_response;
