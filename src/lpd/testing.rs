use std::{
    io,
    pin::Pin,
    task::{
        Context,
        Poll,
    },
};
use tokio::io::{
    AsyncRead,
    AsyncWrite,
    ReadBuf,
};

/// In-memory daemon: replies with scripted ack bytes, then EOF, and records every write.
#[derive(Debug, Default)]
pub struct MockPeer {
    replies: Vec<u8>,
    read_pos: usize,
    written: Vec<u8>,
    writes: usize,
    stalled: bool,
}

impl MockPeer {
    pub fn new(replies: &[u8]) -> Self {
        Self {
            replies: replies.to_vec(),
            ..Default::default()
        }
    }

    /// Never answers and never reaches EOF.
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Default::default()
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl AsyncRead for MockPeer {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.stalled {
            return Poll::Pending;
        }

        let start = self.read_pos;
        let n = buf.remaining().min(self.replies.len() - start);
        buf.put_slice(&self.replies[start..start + n]);
        self.read_pos += n;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockPeer {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.written.extend_from_slice(buf);
        self.writes += 1;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
