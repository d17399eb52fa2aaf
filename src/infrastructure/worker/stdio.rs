//! Line-delimited JSON worker loop
//!
//! Backs the hidden `worker` subcommand: requests are read one per line,
//! replies written one per line. Logging must stay on stderr.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use super::service::EncoderService;
use crate::domain::worker::{WorkerRequest, WorkerResponse};

/// Serve the worker protocol on this process's stdin/stdout until EOF
pub async fn serve_stdio() -> std::io::Result<()> {
    serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve the worker protocol over any line reader and writer
pub async fn serve<R, W>(reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut service = EncoderService::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<WorkerRequest>(&line) {
            Ok(request) => service.handle(request),
            Err(e) => Some(WorkerResponse::error(format!("invalid request: {}", e))),
        };

        if let Some(response) = response {
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    debug!("worker input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn run(input: String) -> Vec<Value> {
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn session_replies_with_base64_chunks() {
        let block: Vec<f32> = (0..8192).map(|i| f32::sin(i as f32 * 0.07) * 0.5).collect();
        let encode = serde_json::to_string(&WorkerRequest::Encode { buf: block }).unwrap();
        let input = format!(
            "{}\n{}\n{}\n{}\n",
            r#"{"cmd":"init","config":{"debug":false,"sampleRate":44100}}"#,
            encode,
            encode,
            r#"{"cmd":"finish"}"#
        );

        let replies = run(input).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["cmd"], "end");

        match WorkerResponse::from_value(replies[0].clone()) {
            WorkerResponse::End { buf } => assert!(!buf.is_empty()),
            other => panic!("expected end, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn garbage_line_gets_an_error_reply() {
        let replies = run("hello\n\n".to_string()).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["cmd"], "error");
        assert!(replies[0]["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request"));
    }

    #[tokio::test]
    async fn silent_without_requests() {
        assert!(run(String::new()).await.is_empty());
    }
}
