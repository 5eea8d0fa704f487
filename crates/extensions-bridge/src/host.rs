//! Request loop of the native host.

use async_trait::async_trait;
use formfill_core_types::RunStats;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{read_frame, write_message};
use crate::message::{decode_request, BridgeMessage, BridgeRequest};
use crate::{BridgeError, RequestId, Status};

/// Failure raised by a [`RequestHandler`]; reported to the extension, never fatal
/// for the host.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Executes decoded requests.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: BridgeRequest) -> Result<RunStats, HandlerError>;
}

/// Counters reported when the stream closes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub handled: u64,
    pub failed: u64,
}

/// Serves requests from `reader`, answering each on `writer`.
pub struct NativeHost<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> NativeHost<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Run until the extension closes the stream.
    ///
    /// Returns an error only for transport failures; malformed requests and
    /// handler failures are answered with an error message and serving goes on.
    pub async fn serve<H>(&mut self, handler: &H) -> Result<ServeSummary, BridgeError>
    where
        H: RequestHandler + ?Sized,
    {
        let mut summary = ServeSummary::default();
        info!("native host ready");

        while let Some(body) = read_frame(&mut self.reader).await? {
            let request_id = RequestId::new();
            debug!(%request_id, len = body.len(), "received message");

            let reply = match decode_request(&body) {
                Ok(request) => match handler.handle(request).await {
                    Ok(stats) => {
                        info!(%request_id, %stats, "request completed");
                        BridgeMessage::success(stats)
                    }
                    Err(err) => {
                        error!(%request_id, %err, "request failed");
                        BridgeMessage::error(format!(
                            "An unexpected error occurred in the native host: {err}"
                        ))
                    }
                },
                Err(err) => {
                    warn!(%request_id, %err, "rejected message");
                    BridgeMessage::error(err.to_string())
                }
            };

            summary.handled += 1;
            if reply.status == Status::Error {
                summary.failed += 1;
            }
            self.reply(request_id, &reply).await?;
        }

        info!(handled = summary.handled, "stream closed by extension");
        Ok(summary)
    }

    async fn reply(
        &mut self,
        request_id: RequestId,
        reply: &BridgeMessage,
    ) -> Result<(), BridgeError> {
        match write_message(&mut self.writer, reply).await {
            Err(BridgeError::FrameTooLarge { len, limit }) => {
                warn!(%request_id, len, limit, "reply too large, sending error instead");
                write_message(
                    &mut self.writer,
                    &BridgeMessage::error(format!("response of {len} bytes exceeds {limit}")),
                )
                .await
            }
            other => other,
        }
    }
}
