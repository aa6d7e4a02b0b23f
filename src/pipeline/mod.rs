//! # Pipeline Module
//!
//! A small synchronous request pipeline that hosts the CORS engine.
//!
//! ## Stages
//!
//! 1. **Phase handlers** ([`Middleware`](crate::middleware::Middleware)) run
//!    in registration order and may answer the request early
//! 2. **Content handler** produces the response when no phase handler did
//! 3. **Header filters** ([`HeaderFilter`](crate::middleware::HeaderFilter))
//!    see every outbound response; each one is built around the stage that
//!    follows it and forwards explicitly
//!
//! ## Error Handling
//!
//! Any stage may fail with a [`CorsError`](crate::middleware::cors::CorsError).
//! The pipeline logs it, drops whatever was built so far and answers `500`.

mod core;

pub use core::{ContentHandler, HandlerRequest, HandlerResponse, Pipeline};
