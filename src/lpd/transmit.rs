use crate::{
    error::{
        LpdError,
        Result,
        Step,
    },
    lpd::codec::Message,
};
use bytes::{
    Bytes,
    BytesMut,
};
use futures::{
    Sink,
    SinkExt,
};
use log::trace;
use std::{
    future::Future,
    io,
    path::Path,
    time::Duration,
};
use tokio::{
    fs::File,
    io::{
        AsyncRead,
        AsyncReadExt,
    },
    time::timeout,
};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;
/// Daemons parse the declared size as a signed 32 bit integer.
pub const MAX_PAYLOAD_SIZE: u64 = i32::MAX as u64;

/// The bytes to print, plus their declared size. Reads straight from the caller's source.
#[derive(Debug)]
pub struct DataPayload<R> {
    source: R,
    len: u32,
}

impl DataPayload<File> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            LpdError::invalid_payload(format!("cannot open {}: {}", path.display(), e))
        })?;
        let meta = file.metadata().await.map_err(|e| {
            LpdError::invalid_payload(format!("cannot stat {}: {}", path.display(), e))
        })?;

        if !meta.is_file() {
            return Err(LpdError::invalid_payload(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        Self::new(file, meta.len())
    }
}

impl<R: AsyncRead + Unpin> DataPayload<R> {
    pub fn new(source: R, len: u64) -> Result<Self> {
        if len == 0 {
            return Err(LpdError::invalid_payload("unsupported file size 0"));
        }
        if len > MAX_PAYLOAD_SIZE {
            return Err(LpdError::invalid_payload(format!(
                "unsupported file size {} (max {})",
                len, MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self {
            source,
            len: len as u32,
        })
    }

    pub fn len(&self) -> u32 {
        self.len
    }
}

/// Bounds a single read, write or acknowledgement wait. `None` waits forever.
pub(crate) async fn with_timeout<F, O>(limit: Option<Duration>, step: Step, fut: F) -> Result<O>
where
    F: Future<Output = Result<O>>,
{
    match limit {
        Some(limit) => timeout(limit, fut).await.map_err(|_| {
            LpdError::transport(
                step,
                io::Error::new(io::ErrorKind::TimedOut, format!("no progress in {:?}", limit)),
            )
        })?,
        None => fut.await,
    }
}

/// Streams the payload in `chunk_size` pieces and closes it with the zero byte.
///
/// Each chunk is flushed before the next is read, and `io_timeout` bounds every chunk on its own,
/// not the stream as a whole. If the source runs dry before the declared size, the terminator is
/// never written.
pub async fn transmit<S, R>(
    sink: &mut S,
    payload: &mut DataPayload<R>,
    chunk_size: usize,
    io_timeout: Option<Duration>,
) -> Result<()>
where
    S: Sink<Message, Error = io::Error> + Unpin,
    R: AsyncRead + Unpin,
{
    let chunk_size = chunk_size.max(1);
    let total = payload.len as usize;
    let mut sent = 0usize;
    let mut buf = BytesMut::zeroed(chunk_size.min(total));

    while sent < total {
        let remain = (total - sent).min(chunk_size);
        let read = async {
            payload.source.read_exact(&mut buf[..remain]).await.map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => LpdError::invalid_payload(format!(
                    "source ended after {} of {} bytes",
                    sent, total
                )),
                _ => LpdError::invalid_payload(format!("read failed: {}", e)),
            })
        };
        with_timeout(io_timeout, Step::DataFile, read).await?;

        let write = async {
            sink.send(Message::Content(Bytes::copy_from_slice(&buf[..remain])))
                .await
                .map_err(|e| LpdError::transport(Step::DataFile, e))
        };
        with_timeout(io_timeout, Step::DataFile, write).await?;

        sent += remain;
        trace!("sent {}/{} bytes", sent, total);
    }

    let write = async {
        sink.send(Message::Terminator)
            .await
            .map_err(|e| LpdError::transport(Step::DataFile, e))
    };
    with_timeout(io_timeout, Step::DataFile, write).await
}
