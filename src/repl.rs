//! Interactive REPL for the conversation client
//!
//! Readline-based loop with command history, slash commands, and per-turn
//! timing. A failed turn prints the error and keeps the loop alive.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::config;
use crate::session::Session;

/// REPL state
pub struct Repl {
    /// Readline editor with history
    editor: DefaultEditor,
    session: Session,
    /// History file path
    history_path: std::path::PathBuf,
}

impl Repl {
    pub fn new(session: Session) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = config::cellmate_dir().join("chat_history");

        Ok(Self {
            editor,
            session,
            history_path,
        })
    }

    fn load_history(&mut self) {
        if self.history_path.exists() {
            let _ = self.editor.load_history(&self.history_path);
        }
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.load_history();

        println!("Type your message ('exit' or Ctrl+D to quit, /help for commands)");
        println!();

        loop {
            let readline = self.editor.readline("You: ");

            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    self.editor.add_history_entry(&line)?;

                    if trimmed.eq_ignore_ascii_case("exit") {
                        break;
                    }

                    if trimmed.starts_with('/') {
                        if self.handle_command(trimmed)? {
                            break;
                        }
                        continue;
                    }

                    self.process_input(trimmed).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err:?}");
                    break;
                }
            }
        }

        self.save_history();
        Ok(())
    }

    /// Handle slash commands; returns true when the loop should exit
    fn handle_command(&mut self, cmd: &str) -> Result<bool> {
        match cmd {
            "/help" => {
                println!("Commands:");
                println!("  /help     - Show this help");
                println!("  /clear    - Reset the transcript");
                println!("  /status   - Show transcript length");
                println!("  /quit     - Exit");
            }
            "/clear" => {
                self.session.reset()?;
                println!("Transcript cleared.");
            }
            "/status" => match self.session.turn_count() {
                Ok(n) => println!("Transcript holds {n} entries."),
                Err(e) => eprintln!("Error: {e}"),
            },
            "/quit" | "/exit" => return Ok(true),
            _ => {
                println!("Unknown command: {cmd}");
            }
        }
        Ok(false)
    }

    /// Run one turn and print the reply
    async fn process_input(&mut self, input: &str) {
        let start = std::time::Instant::now();

        match self.session.turn(input).await {
            Ok(reply) => {
                println!("\nAssistant: {reply}");
                println!("  [took {:.1}s]", start.elapsed().as_secs_f32());
                println!();
            }
            Err(e) => {
                eprintln!("Error: {e}");
            }
        }
    }
}

/// Entry point for the REPL
pub async fn run(session: Session) -> Result<()> {
    let mut repl = Repl::new(session)?;
    repl.run().await
}
