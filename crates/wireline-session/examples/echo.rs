//! TCP echo example — one session per accepted connection.
//!
//! Run with:
//!   cargo run --example echo

use std::io::{Read, Write};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use wireline_frame::{decode_header, encode_frame, HEADER_SIZE};
use wireline_session::{CloseListener, Dispatcher, HandlerError, Session};
use wireline_transport::TcpEndpoint;

struct Echo;

impl Dispatcher for Echo {
    fn handle(&self, session: &Session, cmd_id: u32, payload: Bytes) -> Result<(), HandlerError> {
        eprintln!(
            "[server] cmd={cmd_id} payload={:?}",
            String::from_utf8_lossy(&payload)
        );
        session.send(cmd_id, &payload)?;
        Ok(())
    }
}

struct ExitOnClose {
    tx: mpsc::Sender<()>,
}

impl CloseListener for ExitOnClose {
    fn notify(&self, _session: &Session) {
        let _ = self.tx.send(());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let endpoint = TcpEndpoint::bind("127.0.0.1:0")?;
    let addr = endpoint.local_addr();

    let server = thread::spawn(move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let stream = endpoint.accept()?;
        let session: Session = Session::new(stream, Arc::new(Echo));

        let (tx, rx) = mpsc::channel();
        session.set_close_listener(Arc::new(ExitOnClose { tx }));
        session.start();

        // Park until the client hangs up.
        rx.recv()?;
        eprintln!("[server] session closed");
        Ok(())
    });

    let mut client = TcpEndpoint::connect(addr)?;
    let request = encode_frame(1, b"hello, wireline")?;
    client.write_all(&request)?;

    let mut header_bytes = [0u8; HEADER_SIZE];
    client.read_exact(&mut header_bytes)?;
    let header = decode_header(&header_bytes).ok_or("response header failed validation")?;

    let mut payload = vec![0u8; header.payload_len()];
    client.read_exact(&mut payload)?;
    eprintln!(
        "[client] cmd={} payload={:?}",
        header.cmd_id,
        String::from_utf8_lossy(&payload)
    );

    drop(client);
    server.join().expect("server thread should finish")?;
    Ok(())
}
