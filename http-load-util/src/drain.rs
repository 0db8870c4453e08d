use bytes::Buf;
use hyper::body::Body;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Reads a body to completion without retaining it, the load generator
    /// only cares about the status line. Resolves to the number of bytes read.
    pub struct DiscardBodyFuture<B: Body> {
        #[pin]
        body: B,
        discarded: usize,
    }
}

impl<B> DiscardBodyFuture<B>
where
    B: Body,
{
    #[inline]
    #[must_use]
    pub fn new(body: B) -> Self {
        Self { body, discarded: 0 }
    }
}

impl<B> Future for DiscardBodyFuture<B>
where
    B: Body,
{
    type Output = Result<usize, anyhow::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slf = self.project();
        loop {
            match slf.body.as_mut().poll_frame(cx) {
                Poll::Ready(None) => {
                    return Poll::Ready(Ok(*slf.discarded));
                }
                Poll::Ready(Some(Ok(frame))) => {
                    // Trailers are dropped along with the data.
                    if let Ok(data) = frame.into_data() {
                        *slf.discarded += data.remaining();
                    }
                }
                Poll::Ready(Some(Err(_e))) => {
                    return Poll::Ready(Err(anyhow::anyhow!("failed to poll next body frame")));
                }
                Poll::Pending => {
                    return Poll::Pending;
                }
            }
        }
    }
}
