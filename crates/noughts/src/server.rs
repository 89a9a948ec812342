//! TCP front end for the responder.

use crate::config::ServerConfig;
use crate::responder::Responder;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, instrument, warn};

/// Accepts connections and serves each one on its own task.
#[derive(Debug, Clone)]
pub struct GameServer {
    config: ServerConfig,
}

impl GameServer {
    /// Creates a new game server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Binds the configured address.
    #[instrument(skip(self), fields(host = %self.config.host(), port = self.config.port()))]
    pub async fn bind(&self) -> io::Result<TcpListener> {
        let listener = TcpListener::bind((self.config.host().as_str(), *self.config.port())).await?;
        info!(addr = %listener.local_addr()?, "Responder listening");
        Ok(listener)
    }

    /// Binds and serves until the process ends.
    pub async fn run(&self) -> io::Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Accepts connections from `listener` forever. Sessions never share
    /// state, so a failing connection affects no other.
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        let idle_timeout = self.config.idle_timeout();
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    tokio::spawn(handle_connection(stream, peer, idle_timeout));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

#[instrument(skip(stream, idle_timeout), fields(%peer))]
async fn handle_connection(stream: TcpStream, peer: SocketAddr, idle_timeout: Duration) {
    info!("Connection opened");
    let (read, write) = stream.into_split();
    let mut responder = Responder::new(BufReader::new(read), write, idle_timeout);
    match responder.run().await {
        Ok(()) => info!(games = responder.games_completed(), "Connection closed"),
        Err(err) if err.is_connection_failure() => warn!(
            games = responder.games_completed(),
            reason = %err,
            "Connection dropped"
        ),
        Err(err) => error!(
            games = responder.games_completed(),
            reason = %err,
            "Connection failed"
        ),
    }
}
