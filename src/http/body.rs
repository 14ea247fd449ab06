//! Response bodies
//!
//! Every response uses [`ResponseBody`]: small bodies are built from a buffer with
//! [`full`], files are streamed through [`FileBody`].

use crate::error::ServeError;
use crate::logger;
use futures_util::Stream;
use http_body::{Body, Frame, SizeHint};
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, Take};
use tokio_util::io::ReaderStream;

pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Read size per body frame
const CHUNK_SIZE: usize = 64 * 1024;

/// Buffered body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Streaming,
    Complete,
    Failed,
}

/// File contents streamed chunk by chunk.
///
/// At most `len` bytes (the size reported by `stat`) are read, matching the
/// `Content-Length` header. The file handle is owned by the body, so it is closed
/// whenever hyper drops the body: after the last chunk, on a write error, or when the
/// client disconnects. A read error yields an `Err` frame, which makes hyper abort
/// the connection since the status line has already been sent.
pub struct FileBody {
    stream: ReaderStream<Take<File>>,
    path: PathBuf,
    len: u64,
    sent: u64,
    state: StreamState,
    log_completion: bool,
}

impl FileBody {
    pub fn new(file: File, path: PathBuf, len: u64, log_completion: bool) -> Self {
        Self {
            stream: ReaderStream::with_capacity(file.take(len), CHUNK_SIZE),
            path,
            len,
            sent: 0,
            state: StreamState::Streaming,
            log_completion,
        }
    }

    pub fn boxed(self) -> ResponseBody {
        BodyExt::boxed(self)
    }

    fn complete(&mut self) {
        self.state = StreamState::Complete;
        if self.log_completion {
            logger::log_file_returned(&self.path, self.sent);
        }
    }

    fn fail(&mut self, source: io::Error) -> io::Error {
        self.state = StreamState::Failed;
        let kind = source.kind();
        let err = ServeError::StreamingFailure {
            path: self.path.clone(),
            source,
        };
        logger::log_stream_failed(&err);
        io::Error::new(kind, err.to_string())
    }
}

impl Body for FileBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        let this = self.get_mut();
        if this.state != StreamState::Streaming {
            return Poll::Ready(None);
        }

        match ready!(Pin::new(&mut this.stream).poll_next(cx)) {
            Some(Ok(chunk)) => {
                this.sent += chunk.len() as u64;
                if this.sent >= this.len {
                    this.complete();
                }
                Poll::Ready(Some(Ok(Frame::data(chunk))))
            }
            Some(Err(source)) => Poll::Ready(Some(Err(this.fail(source)))),
            None if this.sent < this.len => {
                let short = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file shrank to {} of {} bytes", this.sent, this.len),
                );
                Poll::Ready(Some(Err(this.fail(short))))
            }
            None => {
                this.complete();
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.state != StreamState::Streaming
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.len.saturating_sub(self.sent))
    }
}

impl Drop for FileBody {
    fn drop(&mut self) {
        if self.state == StreamState::Streaming {
            logger::log_stream_dropped(&self.path, self.sent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn file_body(contents: &[u8], len: u64) -> (tempfile::NamedTempFile, FileBody) {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(contents).unwrap();
        let file = File::open(tmp.path()).await.unwrap();
        let body = FileBody::new(file, tmp.path().to_path_buf(), len, false);
        (tmp, body)
    }

    #[tokio::test]
    async fn test_streams_whole_file() {
        let contents = vec![7u8; CHUNK_SIZE * 2 + 10];
        let (_tmp, body) = file_body(&contents, contents.len() as u64).await;
        assert_eq!(body.size_hint().exact(), Some(contents.len() as u64));

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), contents.as_slice());
    }

    #[tokio::test]
    async fn test_stops_at_stat_size() {
        let (_tmp, body) = file_body(b"hello world", 5).await;
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_shrunk_file_is_an_error() {
        let (_tmp, body) = file_body(b"abc", 10).await;
        let err = body.collect().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropped_mid_stream_closes_file() {
        use std::os::fd::AsRawFd;

        let contents = vec![3u8; CHUNK_SIZE * 3];
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&contents).unwrap();
        let opened = std::fs::canonicalize(tmp.path()).unwrap();

        let file = File::open(tmp.path()).await.unwrap();
        let fd_link = PathBuf::from(format!("/proc/self/fd/{}", file.as_raw_fd()));
        let len = contents.len() as u64;
        let mut body = FileBody::new(file, tmp.path().to_path_buf(), len, false);

        let frame = body.frame().await.unwrap().unwrap();
        assert!(!frame.into_data().unwrap().is_empty());
        assert!(!body.is_end_stream());
        assert_eq!(std::fs::read_link(&fd_link).unwrap(), opened);

        drop(body);
        assert_ne!(std::fs::read_link(&fd_link).ok(), Some(opened));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let (_tmp, body) = file_body(b"", 0).await;
        let collected = body.collect().await.unwrap().to_bytes();
        assert!(collected.is_empty());
    }

    #[tokio::test]
    async fn test_full_body() {
        let body = full("Error 404: Resource not found");
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), b"Error 404: Resource not found");
    }
}
