use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use super::methods::{handle_raw_request, McpServerState};
use super::trace::{trace_id_from_raw_request, with_trace_id_scope};
use crate::domain::repository::{DatabaseRepository, PageRepository};

/// Serve MCP over the process's stdin/stdout until stdin closes.
pub async fn serve_stdio<P, D>(state: McpServerState<P, D>) -> Result<()>
where
    P: PageRepository,
    D: DatabaseRepository,
{
    info!("serving mcp over stdio");
    serve_connection(io::stdin(), io::stdout(), state).await
}

/// Newline-delimited JSON-RPC. Each request line yields at most one
/// response line; notifications yield none.
pub async fn serve_connection<R, W, P, D>(
    reader: R,
    mut writer: W,
    state: McpServerState<P, D>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    P: PageRepository,
    D: DatabaseRepository,
{
    let mut reader = BufReader::new(reader);

    loop {
        let mut request_line = Vec::new();
        let bytes_read = reader
            .read_until(b'\n', &mut request_line)
            .await
            .context("failed to read json-rpc request")?;

        if bytes_read == 0 {
            info!("stdin closed, stopping");
            return Ok(());
        }

        trim_line_endings(&mut request_line);
        if request_line.iter().all(|byte| byte.is_ascii_whitespace()) {
            continue;
        }

        let trace_id = trace_id_from_raw_request(&request_line);
        let Some(response) =
            with_trace_id_scope(trace_id, handle_raw_request(&request_line, &state)).await
        else {
            continue;
        };

        let mut encoded =
            serde_json::to_vec(&response).context("failed to serialize json-rpc response")?;
        encoded.push(b'\n');

        writer.write_all(&encoded).await.context("failed to write json-rpc response")?;
        writer.flush().await.context("failed to flush json-rpc response")?;
    }
}

fn trim_line_endings(line: &mut Vec<u8>) {
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
}
