//! # Ethernet Transport
//!
//! Raw TCP printing to port 9100 (the de facto "raw printing" port JetDirect
//! introduced). No protocol handshake: the printer consumes whatever bytes
//! arrive, so this transport is a straight socket writer.

use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use super::write_chunks;
use crate::error::PrintError;

/// Standard raw-printing port.
pub const RAW_PRINT_PORT: u16 = 9100;

/// Connect and write timeout.
const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless TCP printer client.
pub struct EthernetTransport;

impl EthernetTransport {
    /// Stream `chunks` to `address:9100`.
    ///
    /// Connect and write failures surface as [`PrintError::Connection`];
    /// the socket is shut down best-effort afterwards either way.
    pub fn print(address: &str, chunks: &[Vec<u8>]) -> Result<(), PrintError> {
        let mut stream = connect(address)?;
        debug!(address, chunks = chunks.len(), "ethernet transport connected");

        let result = write_chunks(&mut stream, chunks);
        let _ = stream.shutdown(Shutdown::Both);
        result
    }
}

fn connect(address: &str) -> Result<TcpStream, PrintError> {
    let addrs = (address, RAW_PRINT_PORT)
        .to_socket_addrs()
        .map_err(|e| PrintError::Connection(format!("Cannot resolve {address}: {e}")))?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, IO_TIMEOUT) {
            Ok(stream) => {
                stream
                    .set_write_timeout(Some(IO_TIMEOUT))
                    .map_err(|e| PrintError::Connection(format!("Socket setup failed: {e}")))?;
                return Ok(stream);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) => PrintError::Connection(format!("Cannot connect to {address}:{RAW_PRINT_PORT}: {e}")),
        None => PrintError::Connection(format!("No addresses for {address}")),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_print_streams_chunks_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).unwrap();
            received
        });

        // Aim at the listener instead of :9100 to keep the test hermetic.
        let address = format!("127.0.0.1:{port}");
        let addr = address.parse().unwrap();
        let mut stream = TcpStream::connect_timeout(&addr, IO_TIMEOUT).unwrap();
        let chunks = vec![vec![0x1B, 0x40], vec![], vec![0x1D, 0x56, 0x42, 0x00]];
        write_chunks(&mut stream, &chunks).unwrap();
        stream.shutdown(Shutdown::Both).unwrap();

        assert_eq!(server.join().unwrap(), vec![0x1B, 0x40, 0x1D, 0x56, 0x42, 0x00]);
    }

    #[test]
    fn test_connect_failure_is_connection_error() {
        // Reserved TEST-NET-1 address: connect must fail or time out.
        let result = EthernetTransport::print("192.0.2.1", &[vec![0x00]]);
        assert!(matches!(result, Err(PrintError::Connection(_))));
    }
}
