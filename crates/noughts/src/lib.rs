//! Noughts - tic-tac-toe over a raw TCP protocol
//!
//! # Architecture
//!
//! - **Responder**: per-connection server state machine, plays `O` with the search
//! - **Server**: TCP accept loop, one task per connection
//! - **Initiator**: client state machine with a local board mirror
//! - **Players**: the source of initiator moves (search or terminal)
//! - **Config**: TOML settings for both sides
//!
//! # Example
//!
//! ```no_run
//! use noughts::{GameServer, Initiator, NoughtsConfig, SearchPlayer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (server_config, client_config) = NoughtsConfig::default().into_parts();
//! tokio::spawn(async move { GameServer::new(server_config).run().await });
//!
//! let mut initiator = Initiator::dial(&client_config).await?;
//! let mut player = SearchPlayer::new("bot", 3);
//! let games = initiator.run(&mut player).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod initiator;
mod players;
mod responder;
mod server;

pub use config::{ClientConfig, NoughtsConfig, ServerConfig};
pub use error::{ClientError, ConfigError};
pub use initiator::{INITIATOR_MARK, Initiator};
pub use players::{ConsolePlayer, GameEvent, Player, SearchPlayer};
pub use responder::{
    CELL_OCCUPIED_TEXT, INVALID_SESSION_TEXT, MALFORMED_MOVE_TEXT, Phase, RESPONDER_MARK,
    Responder, SESSION_IDS,
};
pub use server::GameServer;
