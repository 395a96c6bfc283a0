pub mod browser;
pub mod error;
pub mod health;
pub mod hosted;
pub mod logger;
pub mod resolver;
pub mod routes;

pub use browser::CommandBrowserLauncher;
pub use error::{Result as ServerResult, ServerError};
pub use health::AppState;
pub use hosted::{AxumHandle, AxumService};
pub use resolver::{Registry, Resolver, TypeMapRegistry};

pub use crate::routes::build_router;
