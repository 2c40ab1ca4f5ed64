//! Stock plugins for [`super::Pipeline`].

use super::{CallOptions, Plugin, Response};
use crate::error::StatusError;
use anyhow::Context;
use base64::{Engine as _, engine::general_purpose};
use futures::FutureExt;
use futures::future::BoxFuture;
use indicatif::ProgressBar;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use reqwest::{Method, Request};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;

/// Replace the request method.
pub fn method(method: Method) -> Plugin {
    Plugin::before_request(move |req: &mut Request, _: &mut CallOptions| {
        *req.method_mut() = method.clone();
        Ok(())
    })
}

/// Set (replace) a request header.
pub fn header(name: &str, value: &str) -> Plugin {
    let name = name.to_string();
    let value = value.to_string();
    Plugin::before_request(move |req: &mut Request, _: &mut CallOptions| {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name '{}'", name))?;
        let value = HeaderValue::from_str(&value)
            .with_context(|| format!("invalid value for header '{}'", name))?;
        req.headers_mut().insert(name, value);
        Ok(())
    })
}

/// Authorize with a bearer token.
pub fn bearer_auth(token: &str) -> Plugin {
    let value = format!("Bearer {}", token);
    Plugin::before_request(move |req: &mut Request, _: &mut CallOptions| {
        let mut value = HeaderValue::from_str(&value).context("invalid bearer token")?;
        value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    })
}

/// Authorize with HTTP basic credentials.
pub fn basic_auth(user: &str, password: &str) -> Plugin {
    let credentials = general_purpose::STANDARD.encode(format!("{}:{}", user, password));
    let value = format!("Basic {}", credentials);
    Plugin::before_request(move |req: &mut Request, _: &mut CallOptions| {
        let mut value = HeaderValue::from_str(&value).context("invalid basic credentials")?;
        value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    })
}

/// Reject responses whose status is outside `[100, 400)`, unless the call
/// set [`CallOptions::skip_status_validation`].
pub fn validate_status() -> Plugin {
    Plugin::before_eval_response(|resp: &mut Response, options: &CallOptions| {
        if options.skip_status_validation {
            return Ok(());
        }
        let status = resp.status();
        let code = status.as_u16();
        if !(100..400).contains(&code) {
            return Err(StatusError {
                code,
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            }
            .into());
        }
        Ok(())
    })
}

/// Hand the response body to `on_body`; fails with
/// [`crate::error::NoBodyError`] if the response has none.
pub fn eval_body<F>(on_body: F) -> Plugin
where
    F: for<'a> Fn(&'a mut reqwest::Response) -> BoxFuture<'a, anyhow::Result<()>>
        + Send
        + Sync
        + 'static,
{
    Plugin::eval_response(move |resp: &mut Response| match resp.body() {
        Ok(body) => on_body(body),
        Err(e) => futures::future::ready(Err(anyhow::Error::from(e))).boxed(),
    })
}

/// Copy the body into a shared writer.
pub fn write_to<W>(writer: Arc<Mutex<W>>) -> Plugin
where
    W: Write + Send + 'static,
{
    eval_body(move |body| {
        let writer = writer.clone();
        async move {
            while let Some(chunk) = body
                .chunk()
                .await
                .context("cannot read downloaded content")?
            {
                let mut guard = writer
                    .lock()
                    .map_err(|_| anyhow::anyhow!("writer lock poisoned"))?;
                guard
                    .write_all(&chunk)
                    .context("cannot copy downloaded content")?;
            }
            Ok(())
        }
        .boxed()
    })
}

/// Stream the body into `path` (created or truncated), reporting progress
/// on `progress` when given.
pub fn write_to_file(path: impl Into<PathBuf>, mode: u32, progress: Option<ProgressBar>) -> Plugin {
    let path = path.into();
    eval_body(move |body| {
        let path = path.clone();
        let progress = progress.clone();
        async move {
            if let (Some(pb), Some(total)) = (&progress, body.content_length()) {
                pb.set_length(total);
            }

            let mut options = tokio::fs::OpenOptions::new();
            options.create(true).write(true).truncate(true);
            #[cfg(unix)]
            options.mode(mode);
            #[cfg(not(unix))]
            let _ = mode;

            let mut file = options
                .open(&path)
                .await
                .with_context(|| format!("cannot open target file '{}'", path.display()))?;

            let mut downloaded: u64 = 0;
            while let Some(chunk) = body
                .chunk()
                .await
                .context("cannot read downloaded content")?
            {
                file.write_all(&chunk)
                    .await
                    .context("cannot copy downloaded content")?;
                downloaded += chunk.len() as u64;
                if let Some(pb) = &progress {
                    pb.set_position(downloaded);
                }
            }
            file.flush().await.context("cannot copy downloaded content")?;

            if let Some(pb) = &progress {
                pb.finish_and_clear();
            }
            Ok(())
        }
        .boxed()
    })
}

/// Stream the body into a fresh temporary file in `dir`, call `on_temp_file`
/// with its path, then remove it whether or not the callback succeeded.
pub fn write_to_temporary_file<F>(dir: impl Into<PathBuf>, prefix: &str, on_temp_file: F) -> Plugin
where
    F: Fn(&Path) -> anyhow::Result<()> + Send + Sync + 'static,
{
    let dir = dir.into();
    let prefix = prefix.to_string();
    let on_temp_file = Arc::new(on_temp_file);
    eval_body(move |body| {
        let dir = dir.clone();
        let prefix = prefix.clone();
        let on_temp_file = on_temp_file.clone();
        async move {
            let mut temp = tempfile::Builder::new()
                .prefix(&prefix)
                .tempfile_in(&dir)
                .with_context(|| {
                    format!("cannot create target file '{}/{}'", dir.display(), prefix)
                })?;
            while let Some(chunk) = body
                .chunk()
                .await
                .context("cannot read downloaded content")?
            {
                temp.write_all(&chunk)
                    .context("cannot copy downloaded content")?;
            }
            temp.flush().context("cannot copy downloaded content")?;
            on_temp_file(temp.path())
        }
        .boxed()
    })
}
