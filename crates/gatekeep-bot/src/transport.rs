//! Line-oriented console transport.

use crate::outcome::Message;
use crate::router::Router;
use gatekeep_core::{Error, PrincipalId, Result};
use gatekeep_payload::Upload;
use gatekeep_payload::file::MAX_UPLOAD_BYTES;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

/// Lines that end a console session.
const EXIT_COMMANDS: &[&str] = &["/quit", "/exit"];

/// Write `messages` to `output`, one blank line after each.
pub async fn write_messages<W>(output: &mut W, messages: &[Message]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for message in messages {
        output.write_all(message.text.as_bytes()).await?;
        output.write_all(b"\n\n").await?;
    }
    output.flush().await
}

/// Feed every input line to the router as `principal` until EOF or an exit
/// command. Returns the number of commands handled.
pub async fn run_session<R, W>(
    router: &Router,
    principal: PrincipalId,
    input: R,
    output: &mut W,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(line)) {
            break;
        }
        let messages = router.handle_text(principal, line).await;
        write_messages(output, &messages).await?;
        handled += 1;
    }

    info!(principal = %principal, handled, "Console session ended");
    Ok(handled)
}

/// Read a local file and hand it to the router as an upload.
///
/// Files over [`MAX_UPLOAD_BYTES`] are rejected before they are read.
pub async fn upload_file(
    router: &Router,
    principal: PrincipalId,
    path: &Path,
    mime_type: &str,
) -> Result<Vec<Message>> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > MAX_UPLOAD_BYTES as u64 {
        return Err(Error::UnsupportedUpload(format!(
            "file size exceeds the maximum of {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    let upload = Upload {
        file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        mime_type: Some(mime_type.to_string()),
        bytes,
    };
    Ok(router.handle_upload(principal, upload).await)
}
