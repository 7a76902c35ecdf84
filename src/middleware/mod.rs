pub mod auth;
pub mod authorize;
pub mod model;

pub use auth::{basic_auth_middleware, bearer_auth_middleware};
pub use authorize::authorize_middleware;
pub use model::{resolve_model_middleware, BoundModel};
