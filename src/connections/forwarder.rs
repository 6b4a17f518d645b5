// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf},
    net::TcpStream,
    sync::mpsc,
};

const SOCKET_TO_CHANNEL_BUFFER: usize = 64 * 1024;

/// The channel-shaped half of a forwarded connection (C4's counterpart).
/// Implemented by the client's inner-SSH-session channel wrapper and the
/// host's `ForwardedPortConnection`, so the byte-copying logic here doesn't
/// need to know which side of the tunnel it's running on.
#[async_trait::async_trait]
pub(crate) trait ForwardChannel: Send {
    /// Sends a chunk of data on the channel.
    async fn send(&mut self, data: &[u8]) -> Result<(), ()>;
    /// Receives the next chunk, or `None` once the peer has closed the channel.
    async fn recv(&mut self) -> Option<Vec<u8>>;
    /// Graceful close: an empty data frame followed by closing the channel.
    async fn close_gracefully(&mut self);
    /// Abortive close: the channel is aborted (zero linger) with a reason,
    /// mirroring a `SIGABRT`-flavored teardown of the underlying socket.
    async fn abort(&mut self, reason: &str);
}

#[async_trait::async_trait]
impl ForwardChannel for Box<dyn ForwardChannel> {
    async fn send(&mut self, data: &[u8]) -> Result<(), ()> {
        (**self).send(data).await
    }
    async fn recv(&mut self) -> Option<Vec<u8>> {
        (**self).recv().await
    }
    async fn close_gracefully(&mut self) {
        (**self).close_gracefully().await
    }
    async fn abort(&mut self, reason: &str) {
        (**self).abort(reason).await
    }
}

/// Adapts any [`ForwardChannel`] into `AsyncRead + AsyncWrite` by pumping
/// bytes through a background task. Used to run the per-channel E2EE
/// handshake (`secure_stream`) on top of a channel that only exposes the
/// `send`/`recv` shape, the same way it runs over a raw SSH channel.
pub(crate) struct ChannelIo {
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    incoming: mpsc::UnboundedReceiver<Vec<u8>>,
    readbuf: super::io::ReadBuffer,
}

pub(crate) fn spawn_channel_io(mut channel: impl ForwardChannel + 'static) -> ChannelIo {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                data = out_rx.recv() => match data {
                    Some(d) => {
                        if channel.send(&d).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        channel.close_gracefully().await;
                        break;
                    }
                },
                data = channel.recv() => match data {
                    Some(d) => {
                        if in_tx.send(d).is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    ChannelIo {
        outgoing: out_tx,
        incoming: in_rx,
        readbuf: Default::default(),
    }
}

impl AsyncRead for ChannelIo {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        if let Some((v, s)) = self.readbuf.take_data() {
            return self.readbuf.put_data(buf, v, s);
        }

        match self.incoming.poll_recv(cx) {
            Poll::Ready(Some(msg)) => self.readbuf.put_data(buf, msg, 0),
            Poll::Ready(None) => Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "EOF"))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl AsyncWrite for ChannelIo {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.outgoing.send(buf.to_vec()) {
            Ok(()) => Poll::Ready(Ok(buf.len())),
            Err(_) => Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "channel closed"))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Bridges bytes in both directions between an SSH channel and a connected
/// TCP socket (C4). Either direction ending the loop tears down the other:
/// a clean EOF on one side closes the other gracefully, an I/O error aborts
/// both sides.
pub(crate) async fn forward(mut channel: impl ForwardChannel, socket: TcpStream) {
    let (mut sock_read, mut sock_write) = socket.into_split();
    let mut buf = [0u8; SOCKET_TO_CHANNEL_BUFFER];

    loop {
        tokio::select! {
            n = sock_read.read(&mut buf) => match n {
                Ok(0) => {
                    log::debug!("forwarder: EOF from local socket, closing channel gracefully");
                    channel.close_gracefully().await;
                    sock_write.shutdown().await.ok();
                    return;
                }
                Ok(n) => {
                    if channel.send(&buf[..n]).await.is_err() {
                        log::debug!("forwarder: channel send failed, aborting");
                        channel.abort("channel closed").await;
                        return;
                    }
                }
                Err(e) => {
                    log::debug!("forwarder: local socket read error, aborting: {}", e);
                    channel.abort(&e.to_string()).await;
                    return;
                }
            },
            data = channel.recv() => match data {
                Some(data) => {
                    if let Err(e) = sock_write.write_all(&data).await {
                        log::debug!("forwarder: local socket write error, aborting: {}", e);
                        channel.abort(&e.to_string()).await;
                        return;
                    }
                }
                None => {
                    log::debug!("forwarder: EOF from channel, closing local socket");
                    sock_write.shutdown().await.ok();
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        sync::mpsc,
    };

    use super::{forward, ForwardChannel};

    struct MockChannel {
        tx: mpsc::UnboundedSender<Vec<u8>>,
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
        closed_gracefully: Arc<AtomicBool>,
        aborted: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl ForwardChannel for MockChannel {
        async fn send(&mut self, data: &[u8]) -> Result<(), ()> {
            self.tx.send(data.to_vec()).map_err(|_| ())
        }

        async fn recv(&mut self) -> Option<Vec<u8>> {
            self.rx.recv().await
        }

        async fn close_gracefully(&mut self) {
            self.closed_gracefully.store(true, Ordering::SeqCst);
        }

        async fn abort(&mut self, _reason: &str) {
            self.aborted.store(true, Ordering::SeqCst);
        }
    }

    async fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connect = TcpStream::connect(addr);
        let (accept, connect) = tokio::join!(listener.accept(), connect);
        (accept.unwrap().0, connect.unwrap())
    }

    #[tokio::test]
    async fn closes_channel_gracefully_on_socket_eof() {
        let (local, remote) = connected_pair().await;
        let (to_channel_tx, to_channel_rx) = mpsc::unbounded_channel();
        let (_from_channel_tx, from_channel_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let closed = Arc::new(AtomicBool::new(false));
        let aborted = Arc::new(AtomicBool::new(false));

        let channel = MockChannel {
            tx: to_channel_tx,
            rx: from_channel_rx,
            closed_gracefully: closed.clone(),
            aborted: aborted.clone(),
        };

        let join = tokio::spawn(forward(channel, local));
        drop(remote); // peer hangs up -> socket read returns EOF
        drop(to_channel_rx);

        join.await.unwrap();
        assert!(closed.load(Ordering::SeqCst));
        assert!(!aborted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn forwards_bytes_from_channel_to_socket() {
        let (local, mut remote) = connected_pair().await;
        let (to_channel_tx, to_channel_rx) = mpsc::unbounded_channel();
        let (from_channel_tx, from_channel_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        let aborted = Arc::new(AtomicBool::new(false));

        let channel = MockChannel {
            tx: to_channel_tx,
            rx: from_channel_rx,
            closed_gracefully: closed,
            aborted,
        };

        let join = tokio::spawn(forward(channel, local));
        from_channel_tx.send(b"hello".to_vec()).unwrap();

        let mut buf = [0u8; 5];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");

        drop(from_channel_tx);
        remote.shutdown().await.ok();
        drop(to_channel_rx);
        join.await.unwrap();
    }
}
