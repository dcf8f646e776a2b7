use std::io::ErrorKind;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::timeout;

use crate::protocol::Message;
use crate::transport::{Transport, TransportConfig};

/// Length of the big-endian frame header.
const HEADER_LEN: usize = 4;

/// Size of a single socket read.
const READ_CHUNK: usize = 4096;

/// Messages framed as a 4-byte big-endian length followed by a JSON body.
pub struct TcpTransport {
    stream: TcpStream,
    config: TransportConfig,
    /// Bytes read from the socket but not yet consumed as a frame.
    buffer: Vec<u8>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, TransportConfig::default())
    }

    pub fn with_config(stream: TcpStream, config: TransportConfig) -> Self {
        Self {
            stream,
            config,
            buffer: Vec::with_capacity(READ_CHUNK),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub async fn connect_with_config<A: ToSocketAddrs>(
        addr: A,
        config: TransportConfig,
    ) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::with_config(stream, config))
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Pop one complete frame body off the buffer, if there is one.
    fn take_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }
        let mut len_buf = [0u8; HEADER_LEN];
        len_buf.copy_from_slice(&self.buffer[..HEADER_LEN]);
        let len = u32::from_be_bytes(len_buf);

        // Bounded read length check to prevent excessive memory allocation
        if len > self.config.max_frame_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.config.max_frame_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }

        let end = HEADER_LEN + len as usize;
        if self.buffer.len() < end {
            return Ok(None);
        }
        let body = self.buffer[HEADER_LEN..end].to_vec();
        self.buffer.drain(..end);
        Ok(Some(body))
    }

    async fn read_frame(&mut self) -> anyhow::Result<Vec<u8>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(body) = self.take_frame()? {
                return Ok(body);
            }
            // `read` is cancel safe; nothing is lost if this future is dropped.
            let n = self.stream.read(&mut chunk).await.map_err(|e| {
                if e.kind() == ErrorKind::ConnectionReset {
                    anyhow::anyhow!("Connection reset by peer")
                } else {
                    anyhow::anyhow!("Read error: {}", e)
                }
            })?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let data = msg.encode()?;
        if data.len() as u64 > self.config.max_frame_size as u64 {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.config.max_frame_size
            ));
        }

        let mut frame = Vec::with_capacity(HEADER_LEN + data.len());
        frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
        frame.extend_from_slice(&data);

        let send_op = async {
            self.stream.write_all(&frame).await.map_err(|e| {
                if e.kind() == ErrorKind::BrokenPipe || e.kind() == ErrorKind::ConnectionReset {
                    anyhow::anyhow!("Connection closed by peer")
                } else {
                    anyhow::anyhow!("Write error: {}", e)
                }
            })
        };
        timeout(self.config.send_timeout, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.config.send_timeout))?
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let body = match self.config.recv_timeout {
            Some(limit) => timeout(limit, self.read_frame())
                .await
                .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", limit))??,
            None => self.read_frame().await?,
        };
        Ok(Message::decode(&body)?)
    }
}
