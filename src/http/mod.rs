//! Execute-once HTTP pipeline with pluggable stages.
//!
//! A call to [`Pipeline::execute`] performs exactly one GET request and runs
//! three stages of hooks around it:
//!
//! 1. **before request**: rewrite the request (method, headers, URL) or the
//!    per-call [`CallOptions`]
//! 2. **before eval response**: inspect the response before it is consumed;
//!    the default global hook rejects statuses outside `[100, 400)`
//! 3. **eval response**: consume the body (write it to a buffer, a file, a
//!    temporary file, ...)
//!
//! Every stage runs the call-scoped plugins first, in argument order, then the
//! pipeline's global plugins in registration order. All request hooks finish
//! before the request is sent; the first failing hook aborts the call.
//!
//! # Examples
//!
//! ```no_run
//! use gosdk::http::{self, Pipeline};
//! use std::sync::{Arc, Mutex};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new();
//!     let sink = Arc::new(Mutex::new(Vec::new()));
//!     pipeline
//!         .execute(
//!             "https://go.dev/VERSION?m=text",
//!             &[http::header("Accept", "text/plain"), http::write_to(sink.clone())],
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

mod plugins;

pub use plugins::{
    basic_auth, bearer_auth, eval_body, header, method, validate_status, write_to, write_to_file,
    write_to_temporary_file,
};

use crate::error::{HttpError, NoBodyError};
use futures::future::BoxFuture;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode, Url};
use std::fmt;
use tracing::debug;

/// Options scoped to a single [`Pipeline::execute_with`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Let responses of any status through the default status validation.
    pub skip_status_validation: bool,
}

pub type BeforeRequestHook =
    Box<dyn Fn(&mut Request, &mut CallOptions) -> anyhow::Result<()> + Send + Sync>;

pub type BeforeEvalResponseHook =
    Box<dyn Fn(&mut Response, &CallOptions) -> anyhow::Result<()> + Send + Sync>;

pub type EvalResponseHook =
    Box<dyn for<'a> Fn(&'a mut Response) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync>;

/// A set of optional stage hooks. A plugin may provide any subset of them;
/// the pipeline skips the stages a plugin has no hook for.
#[derive(Default)]
pub struct Plugin {
    before_request: Option<BeforeRequestHook>,
    before_eval_response: Option<BeforeEvalResponseHook>,
    eval_response: Option<EvalResponseHook>,
}

impl Plugin {
    pub fn before_request<F>(hook: F) -> Self
    where
        F: Fn(&mut Request, &mut CallOptions) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::default().with_before_request(hook)
    }

    pub fn before_eval_response<F>(hook: F) -> Self
    where
        F: Fn(&mut Response, &CallOptions) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::default().with_before_eval_response(hook)
    }

    pub fn eval_response<F>(hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut Response) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self::default().with_eval_response(hook)
    }

    pub fn with_before_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Request, &mut CallOptions) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before_request = Some(Box::new(hook));
        self
    }

    pub fn with_before_eval_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Response, &CallOptions) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before_eval_response = Some(Box::new(hook));
        self
    }

    pub fn with_eval_response<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut Response) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.eval_response = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("before_request", &self.before_request.is_some())
            .field("before_eval_response", &self.before_eval_response.is_some())
            .field("eval_response", &self.eval_response.is_some())
            .finish()
    }
}

/// A received response. The body is only reachable through [`Response::body`],
/// which fails with [`NoBodyError`] for responses that cannot carry one.
pub struct Response {
    inner: reqwest::Response,
    has_body: bool,
}

impl Response {
    fn new(inner: reqwest::Response, method: &Method) -> Self {
        let status = inner.status();
        let has_body = *method != Method::HEAD
            && status != StatusCode::NO_CONTENT
            && status != StatusCode::NOT_MODIFIED;
        Self { inner, has_body }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    pub fn has_body(&self) -> bool {
        self.has_body
    }

    /// The streaming body. Hooks that run after another hook drained it see
    /// an exhausted stream, not an error.
    pub fn body(&mut self) -> Result<&mut reqwest::Response, NoBodyError> {
        if self.has_body {
            Ok(&mut self.inner)
        } else {
            Err(NoBodyError)
        }
    }
}

/// Shared client plus the global plugins every call runs after its own.
pub struct Pipeline {
    client: reqwest::Client,
    globals: Vec<Plugin>,
}

impl Pipeline {
    /// A pipeline whose only global plugin is [`validate_status`].
    pub fn new() -> Self {
        Self::bare().with_global(validate_status())
    }

    /// A pipeline without global plugins.
    pub fn bare() -> Self {
        Self {
            client: reqwest::Client::new(),
            globals: Vec::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_global(mut self, plugin: Plugin) -> Self {
        self.globals.push(plugin);
        self
    }

    pub fn register(&mut self, plugin: Plugin) {
        self.globals.push(plugin);
    }

    pub fn globals(&self) -> &[Plugin] {
        &self.globals
    }

    /// GET `url` with default [`CallOptions`].
    pub async fn execute(&self, url: &str, plugins: &[Plugin]) -> Result<(), HttpError> {
        self.execute_with(url, CallOptions::default(), plugins).await
    }

    /// GET `url`, running `plugins` before the global plugins at every stage.
    pub async fn execute_with(
        &self,
        url: &str,
        mut options: CallOptions,
        plugins: &[Plugin],
    ) -> Result<(), HttpError> {
        let mut request = self
            .client
            .get(url)
            .build()
            .map_err(|source| HttpError::CreateRequest {
                url: url.to_string(),
                source,
            })?;

        for hook in self.stage(plugins, |p| p.before_request.as_ref()) {
            hook(&mut request, &mut options).map_err(|source| HttpError::PrepareRequest {
                url: url.to_string(),
                source,
            })?;
        }

        let method = request.method().clone();
        debug!("{} {}", method, request.url());
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| HttpError::Execute {
                url: url.to_string(),
                source,
            })?;
        let mut response = Response::new(response, &method);
        debug!("{} {} -> {}", method, url, response.status());

        for hook in self.stage(plugins, |p| p.before_eval_response.as_ref()) {
            hook(&mut response, &options).map_err(|source| HttpError::PrepareResponse {
                url: url.to_string(),
                source,
            })?;
        }

        for hook in self.stage(plugins, |p| p.eval_response.as_ref()) {
            hook(&mut response)
                .await
                .map_err(|source| HttpError::EvalResponse {
                    url: url.to_string(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Hooks of one stage: call-scoped first, then global.
    fn stage<'p, H: ?Sized + 'p>(
        &'p self,
        plugins: &'p [Plugin],
        select: impl Fn(&'p Plugin) -> Option<&'p Box<H>> + 'p,
    ) -> impl Iterator<Item = &'p H> + 'p {
        plugins
            .iter()
            .chain(self.globals.iter())
            .filter_map(move |p| select(p).map(|hook| hook.as_ref()))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("globals", &self.globals)
            .finish()
    }
}
