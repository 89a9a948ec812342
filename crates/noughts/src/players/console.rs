//! Interactive player reading lines from a terminal.

use super::{GameEvent, Player};
use crate::error::ClientError;
use crate::initiator::INITIATOR_MARK;
use noughts_core::{Board, Game, best_move};
use noughts_wire::{MOVE_LEN, ResultFlag};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, instrument};

/// Human player that types moves, or hands a turn to the search.
pub struct ConsolePlayer<R> {
    name: String,
    lines: Lines<R>,
}

impl ConsolePlayer<BufReader<Stdin>> {
    /// Reads from standard input.
    pub fn stdin(name: impl Into<String>) -> Self {
        Self::new(name, BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsolePlayer<R> {
    /// Reads from any line source.
    pub fn new(name: impl Into<String>, input: R) -> Self {
        Self {
            name: name.into(),
            lines: input.lines(),
        }
    }

    /// Prompts for a player name on `input` until one is given.
    pub async fn ask_name(input: R) -> Result<Self, ClientError> {
        let mut player = Self::new(String::new(), input);
        while player.name.is_empty() {
            player.name = player.ask("Enter your name:").await?;
        }
        Ok(player)
    }

    /// Prints `prompt` and returns the next line, trimmed.
    async fn ask(&mut self, prompt: &str) -> Result<String, ClientError> {
        println!("{prompt}");
        let line = self
            .lines
            .next_line()
            .await
            .map_err(|e| ClientError::Player(format!("failed to read input: {e}")))?
            .ok_or_else(|| ClientError::Player("input closed".to_string()))?;
        Ok(line.trim().to_string())
    }

    async fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, ClientError> {
        loop {
            match self.ask(prompt).await?.to_ascii_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => println!("Please answer y or n."),
            }
        }
    }

    async fn type_move(&mut self) -> Result<String, ClientError> {
        loop {
            let text = self
                .ask("Enter your move as row-col with values 0 to 2, e.g. 0-0:")
                .await?;
            if text.chars().count() == MOVE_LEN {
                return Ok(text);
            }
            println!("A move is exactly {MOVE_LEN} characters.");
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncBufRead + Unpin + Send> Player for ConsolePlayer<R> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, game), fields(player = %self.name))]
    async fn choose_move(&mut self, game: &Game) -> Result<String, ClientError> {
        loop {
            let choice = self
                .ask("Make the move yourself or let it be automatic? (M/A)")
                .await?;
            match choice.to_ascii_uppercase().as_str() {
                "M" => return self.type_move().await,
                "A" => {
                    let scored = best_move(game.board(), INITIATOR_MARK)
                        .ok_or_else(|| ClientError::Player("no move available".to_string()))?;
                    debug!(mv = %scored.mv, "Automatic move");
                    println!("Automatic move: {}", scored.mv);
                    return Ok(scored.mv.to_string());
                }
                _ => println!("Please answer M or A."),
            }
        }
    }

    async fn wants_game(&mut self, games_played: u32) -> Result<bool, ClientError> {
        let prompt = if games_played == 0 {
            "Do you want to play tic-tac-toe? (y/n)"
        } else {
            "Do you want to play again? (y/n)"
        };
        self.ask_yes_no(prompt).await
    }

    fn notify(&mut self, event: &GameEvent, game: &Game) {
        match event {
            GameEvent::Connected { session } => {
                println!("Hello {}, your session id is {session}.", self.name);
            }
            GameEvent::Admitted { .. } => {
                println!("Game on! You are X and the server is O. Cells are addressed as:");
                println!("{}", Board::legend());
            }
            GameEvent::Countered { own, reply } => {
                println!("You played {own}, the server answered {reply}.");
                println!("{}", game.board().render());
            }
            GameEvent::Rejected { message, .. } => {
                println!("Move refused: {message}");
            }
            GameEvent::Finished { flag, mv } => {
                println!("{}", game.board().render());
                match flag {
                    ResultFlag::InitiatorWin => println!("You win!"),
                    ResultFlag::ResponderWin => println!("The server wins with {mv}."),
                    ResultFlag::Draw => println!("It's a draw."),
                }
            }
        }
    }
}
