use tracing::trace;

use crate::middleware::cors::CorsError;
use crate::pipeline::{HandlerRequest, HandlerResponse};

/// Outcome of an early phase handler.
#[derive(Debug)]
pub enum Flow {
    /// Run the next phase handler, then the content handler
    Continue,
    /// Stop here and send this response
    Respond(HandlerResponse),
}

/// Phase handler run before the content handler.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn before(&self, _req: &HandlerRequest) -> Result<Flow, CorsError> {
        Ok(Flow::Continue)
    }
}

/// Stage of the outbound header chain.
///
/// Each filter is constructed with the stage that follows it and is
/// responsible for forwarding to it. The chain ends in [`SendHeaders`].
pub trait HeaderFilter: Send + Sync {
    fn filter(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> Result<(), CorsError>;
}

/// Terminal header filter: the response is complete and handed to the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendHeaders;

impl HeaderFilter for SendHeaders {
    fn filter(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> Result<(), CorsError> {
        trace!(
            request_id = %req.request_id,
            status = res.status,
            headers = res.headers.len(),
            "response headers complete"
        );
        Ok(())
    }
}
