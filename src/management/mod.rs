mod authorization;
mod authorization_provider;
mod errors;
mod http_client;
mod policy_provider;
mod tunnel_locator;
mod tunnel_request_options;

pub use authorization::*;
pub use authorization_provider::*;
pub use errors::*;
pub use http_client::*;
pub use tunnel_locator::*;
pub use tunnel_request_options::*;
