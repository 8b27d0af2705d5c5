//! Execution of script handlers.

use std::path::Path;
use std::process::Stdio;

use log::debug;
use tokio::process::Command;

use crate::router::handler::RequestContext;
use crate::server::{Error, HttpResponse, StatusCode};

pub(crate) async fn run(path: &Path, ctx: &RequestContext) -> Result<HttpResponse, Error> {
    // A bare file name would otherwise be looked up on PATH instead of the working directory
    let resolved = path
        .canonicalize()
        .map_err(|e| Error::ScriptError(format!("cannot resolve {}: {e}", path.display())))?;
    if !resolved.is_file() {
        return Err(Error::ScriptError(format!("{} is not a file", path.display())));
    }

    let params = serde_json::to_string(&ctx.params)?;
    let body = serde_json::to_string(&ctx.body)?;

    debug!("Running script {} for {} {}", path.display(), ctx.method, ctx.path);
    let output = Command::new(&resolved)
        .env("ROUTE_METHOD", ctx.method.as_str())
        .env("ROUTE_PATH", &ctx.path)
        .env("ROUTE_PARAMS", params)
        .env("ROUTE_BODY", body)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::ScriptError(format!("failed to run {}: {e}", path.display())))?;

    if !output.status.success() {
        return Err(Error::ScriptError(format!(
            "{} exited with {}: {}",
            path.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(HttpResponse::new(StatusCode::Ok)
        .with_content_type("text/plain")
        .with_body_bytes(output.stdout))
}
