//! Module `command`
//!
//! Defines the keystroke-bound commands the operator console dispatches.

use std::fmt;
use std::io::{self, Write};

/// Action run with no further input. Output goes to the console stream.
pub type ImmediateAction = Box<dyn Fn(&mut dyn Write) -> io::Result<()> + Send>;

/// Action run with the line the operator typed in answer to a prompt.
pub type PromptingAction = Box<dyn Fn(&str, &mut dyn Write) -> io::Result<()> + Send>;

/// A console command bound to a single key.
pub enum Command {
    /// Runs as soon as its key is pressed.
    Immediate {
        key: char,
        description: String,
        action: ImmediateAction,
    },
    /// Prints `prompt`, reads one line in cooked mode, then runs with it.
    Prompting {
        key: char,
        description: String,
        prompt: String,
        action: PromptingAction,
    },
}

impl Command {
    pub fn immediate<F>(key: char, description: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut dyn Write) -> io::Result<()> + Send + 'static,
    {
        Command::Immediate {
            key,
            description: description.into(),
            action: Box::new(action),
        }
    }

    pub fn prompting<F>(
        key: char,
        description: impl Into<String>,
        prompt: impl Into<String>,
        action: F,
    ) -> Self
    where
        F: Fn(&str, &mut dyn Write) -> io::Result<()> + Send + 'static,
    {
        Command::Prompting {
            key,
            description: description.into(),
            prompt: prompt.into(),
            action: Box::new(action),
        }
    }

    pub fn key(&self) -> char {
        match self {
            Command::Immediate { key, .. } | Command::Prompting { key, .. } => *key,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Command::Immediate { description, .. } | Command::Prompting { description, .. } => {
                description
            }
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Immediate { key, description, .. } => f
                .debug_struct("Immediate")
                .field("key", key)
                .field("description", description)
                .finish(),
            Command::Prompting {
                key,
                description,
                prompt,
                ..
            } => f
                .debug_struct("Prompting")
                .field("key", key)
                .field("description", description)
                .field("prompt", prompt)
                .finish(),
        }
    }
}
