//! Streaming file download.
//!
//! The body is written chunk by chunk into a temporary file created next to
//! the destination. Only after the stream is complete, flushed and synced is
//! the temporary file renamed over the destination. Every failure path,
//! including task cancellation, drops the temporary path, which deletes it.
//!
//! The rename is the commit point. It runs inline, with no await between the
//! last cancellation check and the rename, so an aborted task never leaves a
//! rename running behind it. A cancel that arrives after the rename has
//! committed still resolves the handle to [`RestError::Cancelled`], but the
//! completed file stays at the destination.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::RestError;
use crate::response::FileResponse;
use crate::transport::{BodyStream, Transport, TransportRequest};

const STAGING_PREFIX: &str = ".restclient-";
const STAGING_SUFFIX: &str = ".part";

/// Submits `request` and streams its body to `destination`.
pub(crate) async fn download_to_path(
    transport: &dyn Transport,
    request: TransportRequest,
    destination: PathBuf,
    token: CancellationToken,
) -> Result<FileResponse, RestError> {
    let url = request.url.clone();
    let response = transport.submit(request).await?;
    let (status, headers, body) = response.into_parts();
    let declared_length = headers.content_length();

    let (file, temp_path) = create_staging_file(&destination).await?;
    debug!(staging = %temp_path.display(), "streaming body to staging file");

    let bytes_written = match stream_to_file(file, body, &temp_path).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(
                url = %url,
                error = %error,
                "download failed mid-stream; discarding partial file"
            );
            return Err(error);
        }
    };

    if let Some(expected) = declared_length
        && expected != bytes_written
    {
        return Err(RestError::integrity(&destination, expected, bytes_written));
    }

    if token.is_cancelled() {
        return Err(RestError::cancelled(url));
    }

    persist(temp_path, &destination)?;

    info!(
        path = %destination.display(),
        bytes = bytes_written,
        status,
        "download complete"
    );

    Ok(FileResponse::new(status, headers, destination, bytes_written))
}

/// Creates the temporary file in the destination's directory so the final
/// rename stays on one file system.
async fn create_staging_file(destination: &Path) -> Result<(File, TempPath), RestError> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let error_path = destination.to_path_buf();
    let staged = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&directory)
    })
    .await
    .map_err(|e| RestError::io(&error_path, std::io::Error::other(e)))?
    .map_err(|e| RestError::io(&error_path, e))?;

    let (file, temp_path) = staged.into_parts();
    Ok((File::from_std(file), temp_path))
}

/// Streams the response body to `file`, returning bytes written.
async fn stream_to_file(
    file: File,
    mut body: BodyStream,
    file_path: &Path,
) -> Result<u64, RestError> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = body.next().await {
        let chunk = chunk_result?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| RestError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| RestError::io(file_path, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| RestError::io(file_path, e))?;

    Ok(bytes_written)
}

/// Renames the staging file over `destination`.
///
/// A same-directory rename is a single metadata operation, so it runs on the
/// task itself rather than on the blocking pool.
fn persist(temp_path: TempPath, destination: &Path) -> Result<(), RestError> {
    temp_path
        .persist(destination)
        .map_err(|e| RestError::io(destination, e.error))
}
