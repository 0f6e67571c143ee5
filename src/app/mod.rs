//! Application layer containing business logic and shared state.

pub mod creator;
mod persistence;
pub mod resolver;
pub mod service;
pub mod state;

pub use creator::LogoCreator;
pub use resolver::LogoResolver;
pub use service::AppService;
pub use state::AppState;
