//! Pipeline core: request/response types and stage execution.

use std::sync::Arc;
use std::time::Instant;

use http::Method;
use tracing::{debug, error, info_span};

use crate::headers::{HeaderValues, HeaderVec, RequestHeaders, ResponseHeaders};
use crate::ids::RequestId;
use crate::middleware::cors::CorsError;
use crate::middleware::{Flow, HeaderFilter, Middleware, SendHeaders};
use crate::policy::{PolicyConfig, DEFAULT_PREFLIGHT_CONTENT_TYPE};

/// One inbound request as seen by the pipeline stages.
///
/// Carries the policy snapshot captured when the request was dispatched;
/// a reload while the request is in flight does not affect it.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    /// Configuration scope the host selected for this request
    pub scope: String,
    /// Header lines in arrival order
    pub headers: HeaderVec,
    pub policy: Arc<PolicyConfig>,
}

impl HandlerRequest {
    #[must_use]
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderVec,
        policy: Arc<PolicyConfig>,
    ) -> Self {
        Self {
            request_id: RequestId::from_headers(&headers),
            method,
            path: path.into(),
            scope: String::new(),
            headers,
            policy,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Get a header by name (first match, case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }
}

impl RequestHeaders for HandlerRequest {
    #[inline]
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }

    #[inline]
    fn header_all(&self, name: &str) -> HeaderValues<'_> {
        self.headers.header_all(name)
    }
}

/// Response assembled by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub content_type: Arc<str>,
    pub body: String,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, content_type: Arc<str>, body: String) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            content_type,
            body,
        }
    }

    /// Plain-text response
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, Arc::from(DEFAULT_PREFLIGHT_CONTENT_TYPE), body.to_string())
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::text(status, message)
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }

    /// Every line of a header, in the order added
    #[must_use]
    pub fn get_header_all(&self, name: &str) -> HeaderValues<'_> {
        self.headers.header_all(name)
    }
}

impl ResponseHeaders for HandlerResponse {
    #[inline]
    fn append_header(&mut self, name: &'static str, value: &str) -> Result<(), CorsError> {
        self.headers.append_header(name, value)
    }
}

/// Produces the response when no phase handler answered.
pub type ContentHandler = Arc<dyn Fn(&HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Request pipeline: phase handlers, content handler, outbound header chain.
///
/// ```text
/// request -> middleware* -> content handler -> header filters -> SendHeaders
///                 \________ Flow::Respond ______/
/// ```
///
/// A response produced by a phase handler skips the remaining phase handlers
/// and the content handler but still passes through the header filters.
#[derive(Clone)]
pub struct Pipeline {
    middlewares: Vec<Arc<dyn Middleware>>,
    header_filter: Arc<dyn HeaderFilter>,
    content: ContentHandler,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Empty pipeline whose content handler answers `200` with an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            header_filter: Arc::new(SendHeaders),
            content: Arc::new(|_: &HandlerRequest| HandlerResponse::text(200, "")),
        }
    }

    #[must_use]
    pub fn with_content_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        self.content = Arc::new(handler);
        self
    }

    /// Append a phase handler. Handlers run in the order added.
    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        debug!(middleware = middleware.name(), "registered phase handler");
        self.middlewares.push(middleware);
    }

    /// Put a header filter in front of the current chain.
    ///
    /// `make` receives the current head of the chain and must return a filter
    /// that forwards to it. The last filter pushed runs first.
    pub fn push_header_filter<F>(&mut self, make: F)
    where
        F: FnOnce(Arc<dyn HeaderFilter>) -> Arc<dyn HeaderFilter>,
    {
        let next = Arc::clone(&self.header_filter);
        self.header_filter = make(next);
    }

    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    /// Run one request through every stage.
    ///
    /// A [`CorsError`] from any stage discards the partial response and yields
    /// a bare `500`.
    pub fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            scope = %req.scope,
        );
        let _entered = span.enter();
        let start = Instant::now();

        match self.run(req) {
            Ok(res) => {
                debug!(
                    status = res.status,
                    latency_us = start.elapsed().as_micros() as u64,
                    "request complete"
                );
                res
            }
            Err(e) => {
                error!(error = %e, "request failed");
                HandlerResponse::error(500, "Internal Server Error")
            }
        }
    }

    fn run(&self, req: &HandlerRequest) -> Result<HandlerResponse, CorsError> {
        let mut early = None;
        for mw in &self.middlewares {
            if let Flow::Respond(res) = mw.before(req)? {
                debug!(middleware = mw.name(), status = res.status, "phase handler responded");
                early = Some(res);
                break;
            }
        }

        let mut res = match early {
            Some(res) => res,
            None => (self.content)(req),
        };
        self.header_filter.filter(req, &mut res)?;
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Answer(u16);

    impl Middleware for Answer {
        fn name(&self) -> &'static str {
            "answer"
        }

        fn before(&self, _req: &HandlerRequest) -> Result<Flow, CorsError> {
            Ok(Flow::Respond(HandlerResponse::text(self.0, "early")))
        }
    }

    struct Fail;

    impl Middleware for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn before(&self, _req: &HandlerRequest) -> Result<Flow, CorsError> {
            Err(CorsError::Allocation { what: "test" })
        }
    }

    struct Tag {
        value: &'static str,
        next: Arc<dyn HeaderFilter>,
        calls: Arc<AtomicUsize>,
    }

    impl HeaderFilter for Tag {
        fn filter(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> Result<(), CorsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            res.append_header("X-Tag", self.value)?;
            self.next.filter(req, res)
        }
    }

    fn request() -> HandlerRequest {
        HandlerRequest::new(
            Method::GET,
            "/",
            smallvec![(Arc::from("X-Request-Id"), "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string())],
            Arc::new(PolicyConfig::default()),
        )
    }

    #[test]
    fn test_content_handler_runs_without_middleware() {
        let pipeline = Pipeline::new().with_content_handler(|_| HandlerResponse::text(201, "made"));
        let res = pipeline.handle(&request());
        assert_eq!(res.status, 201);
        assert_eq!(res.body, "made");
    }

    #[test]
    fn test_early_response_skips_content_but_not_filters() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline =
            Pipeline::new().with_content_handler(|_| panic!("content handler must not run"));
        pipeline.add_middleware(Arc::new(Answer(204)));
        let c = Arc::clone(&calls);
        pipeline.push_header_filter(move |next| Arc::new(Tag { value: "a", next, calls: c }));

        let res = pipeline.handle(&request());
        assert_eq!(res.status, 204);
        assert_eq!(res.get_header("X-Tag"), Some("a"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_last_pushed_filter_runs_first() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = Pipeline::new();
        let (c1, c2) = (Arc::clone(&calls), Arc::clone(&calls));
        pipeline.push_header_filter(move |next| Arc::new(Tag { value: "inner", next, calls: c1 }));
        pipeline.push_header_filter(move |next| Arc::new(Tag { value: "outer", next, calls: c2 }));

        let res = pipeline.handle(&request());
        assert_eq!(res.get_header_all("X-Tag").as_slice(), &["outer", "inner"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_error_becomes_500() {
        let mut pipeline = Pipeline::new();
        pipeline.add_middleware(Arc::new(Fail));
        let res = pipeline.handle(&request());
        assert_eq!(res.status, 500);
        assert!(res.headers.is_empty());
    }

    #[test]
    fn test_request_id_taken_from_header() {
        let req = request();
        assert_eq!(req.request_id.to_string(), "01ARZ3NDEKTSV4RRFFQ69G5FAV");
    }
}
