//! The network thread: receives OSC datagrams over UDP and hands them to a [`CommandDecoder`].

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::decoder::CommandDecoder;
use crate::error::TransportError;

/// How often the receive loop wakes up to check for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct OscListener;

impl OscListener {
    /// Binds `addr` and starts the `osc-listener` thread.
    ///
    /// Binding happens on the calling thread so an unavailable port is reported immediately.
    /// Bind to port 0 to let the OS pick one; [`ListenerHandle::local_addr`] reports it.
    pub fn spawn(
        addr: SocketAddr,
        decoder: CommandDecoder,
    ) -> Result<ListenerHandle, TransportError> {
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket
            .set_read_timeout(Some(POLL_INTERVAL))
            .map_err(TransportError::Configure)?;
        let local_addr = socket.local_addr().map_err(TransportError::Configure)?;
        let handle = start(socket, local_addr, decoder)?;
        tracing::info!(%local_addr, namespace = %handle.namespace, "Listening for OSC");
        Ok(handle)
    }
}

/// A source of datagrams with a read timeout, so the receive loop can poll for shutdown.
pub(crate) trait Datagrams: Send + 'static {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

impl Datagrams for UdpSocket {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf)
    }
}

fn start(
    source: impl Datagrams,
    local_addr: SocketAddr,
    mut decoder: CommandDecoder,
) -> Result<ListenerHandle, TransportError> {
    let namespace = decoder.namespace().to_owned();
    let shutdown = Arc::new(AtomicBool::new(false));
    let thread = thread::Builder::new()
        .name("osc-listener".into())
        .spawn({
            let shutdown = shutdown.clone();
            move || receive_loop(&source, &mut decoder, &shutdown)
        })
        .map_err(TransportError::Spawn)?;

    Ok(ListenerHandle {
        local_addr,
        namespace,
        shutdown,
        thread: Some(thread),
    })
}

fn receive_loop(
    source: &impl Datagrams,
    decoder: &mut CommandDecoder,
    shutdown: &AtomicBool,
) -> Result<(), TransportError> {
    let mut buf = vec![0u8; rosc::decoder::MTU];
    while !shutdown.load(Ordering::Acquire) {
        match source.recv_from(&mut buf) {
            Ok((size, peer)) => {
                let enqueued = decoder.decode_packet(&buf[..size]);
                tracing::trace!(%peer, size, enqueued, "Received datagram");
            }
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) => {}
            Err(error) => {
                tracing::error!("OSC listener stopped: {error}");
                return Err(TransportError::Receive(error));
            }
        }
    }
    tracing::debug!(discarded = decoder.discarded(), "OSC listener shut down");
    Ok(())
}

/// Owner of the running network thread.
///
/// Dropping the handle stops the thread without reporting its result.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    namespace: String,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<(), TransportError>>>,
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// True once the thread has exited, whether stopped or failed.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signals the thread to stop and waits for it. Returns the error that ended it, if any.
    pub fn stop(mut self) -> Result<(), TransportError> {
        self.join()
    }

    fn join(&mut self) -> Result<(), TransportError> {
        self.shutdown.store(true, Ordering::Release);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| TransportError::Panicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Err(error) = self.join() {
            tracing::warn!("OSC listener exited with error: {error}");
        }
    }
}
