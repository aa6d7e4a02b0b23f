mod core;
pub mod cors;

pub use core::{Flow, HeaderFilter, Middleware, SendHeaders};
pub use cors::{install_cors, CorsError, CorsPreflight, ResponseFilter};
