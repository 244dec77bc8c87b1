//! Operator console
//!
//! Reads keystrokes from the control terminal and dispatches them to the
//! registered commands.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::warn;

use crate::console::command::Command;
use crate::console::terminal::TerminalControl;
use crate::error::ConsoleError;

const HELP_DESCRIPTION: &str = "print available commands";

pub struct CommandConsole {
    commands: Vec<Command>,
    help_key: Option<char>,
    terminal: Arc<dyn TerminalControl>,
}

impl CommandConsole {
    pub fn new(terminal: Arc<dyn TerminalControl>) -> Self {
        Self {
            commands: Vec::new(),
            help_key: None,
            terminal,
        }
    }

    /// Adds a command. A key may be bound more than once; every command
    /// bound to a pressed key runs, in registration order.
    pub fn register(&mut self, command: Command) {
        if self.is_bound(command.key()) {
            warn!(
                "Key '{}' is already bound; '{}' will run alongside it",
                command.key(),
                command.description()
            );
        }
        self.commands.push(command);
    }

    /// Binds `key` to a listing of every command, sorted by key.
    pub fn add_help_command(&mut self, key: char) {
        if self.is_bound(key) {
            warn!("Key '{}' is already bound; help will run alongside it", key);
        }
        self.help_key = Some(key);
    }

    fn is_bound(&self, key: char) -> bool {
        self.help_key == Some(key) || self.commands.iter().any(|c| c.key() == key)
    }

    /// Puts the terminal in raw mode and dispatches keystrokes from `input`
    /// until it is exhausted. The terminal is restored on the way out,
    /// whether the loop ended cleanly or not.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<(), ConsoleError> {
        self.terminal.set_raw_mode()?;
        let result = self.read_keys(&mut input, &mut output);
        let restored = self.terminal.restore();
        result?;
        restored?;
        Ok(())
    }

    fn read_keys<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<(), ConsoleError> {
        let mut byte = [0u8; 1];
        loop {
            match input.read(&mut byte) {
                Ok(0) => return Ok(()),
                Ok(_) => self.handle(char::from(byte[0]), input, output)?,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ConsoleError::Input(e)),
            }
        }
    }

    fn handle(
        &self,
        key: char,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), ConsoleError> {
        if self.help_key == Some(key) {
            self.print_commands(&mut *output).map_err(ConsoleError::Output)?;
        }

        for command in self.commands.iter().filter(|c| c.key() == key) {
            match command {
                Command::Immediate { action, .. } => {
                    action(&mut *output).map_err(ConsoleError::Output)?;
                }
                Command::Prompting { prompt, action, .. } => {
                    let answer = self.ask(prompt, &mut *input, &mut *output)?;
                    action(answer.as_str(), &mut *output).map_err(ConsoleError::Output)?;
                }
            }
        }

        output.flush().map_err(ConsoleError::Output)
    }

    /// Prints `prompt` and reads one line with the terminal back in cooked
    /// mode so the operator sees and can edit what they type.
    fn ask(
        &self,
        prompt: &str,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<String, ConsoleError> {
        write!(output, "{}", prompt).map_err(ConsoleError::Output)?;
        output.flush().map_err(ConsoleError::Output)?;

        self.terminal.restore()?;
        let mut answer = String::new();
        let read = input.read_line(&mut answer);
        self.terminal.set_raw_mode()?;
        read.map_err(ConsoleError::Input)?;

        let trimmed = answer.trim_end_matches(['\r', '\n']).len();
        answer.truncate(trimmed);
        Ok(answer)
    }

    /// Writes the key and description of every command, sorted by key.
    pub fn print_commands<W: Write + ?Sized>(&self, output: &mut W) -> io::Result<()> {
        let mut entries: Vec<(char, &str)> = self
            .commands
            .iter()
            .map(|c| (c.key(), c.description()))
            .collect();
        if let Some(key) = self.help_key {
            entries.push((key, HELP_DESCRIPTION));
        }
        entries.sort_by_key(|(key, _)| *key);

        writeln!(output, "Available commands:")?;
        for (key, description) in entries {
            writeln!(output, "    {}: {}", key, description)?;
        }
        Ok(())
    }
}
