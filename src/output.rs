//! Where the demos write their trace lines.
//!
//! The demos are scripted: what they print *is* their behaviour. Everything
//! goes through a [`Sink`] so the real binaries can write to stdout while the
//! tests capture the exact same lines in a [`Transcript`].

use colored::Colorize;
use std::cell::RefCell;
use std::rc::Rc;

pub trait Sink {
    fn line(&self, line: &str);
}

/// Writes to stdout, highlighting a few well-known line prefixes.
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Console { color }
    }

    fn paint(&self, line: &str) -> String {
        if !self.color {
            return line.to_string();
        }

        let trimmed = line.trim_start_matches('\n');
        if trimmed.starts_with("FlyweightFactory: Reusing") {
            line.green().to_string()
        } else if trimmed.starts_with("FlyweightFactory: Can't find") {
            line.yellow().to_string()
        } else if trimmed.starts_with("Hi, I'm") || trimmed.starts_with("Goodbye") {
            line.cyan().to_string()
        } else if trimmed.ends_with("removed from the list.") {
            line.red().to_string()
        } else if trimmed.starts_with("Client:") || trimmed.starts_with("There are") {
            line.bold().to_string()
        } else {
            line.to_string()
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Console::new(true)
    }
}

impl Sink for Console {
    fn line(&self, line: &str) {
        println!("{}", self.paint(line));
    }
}

/// In-memory recording of every line, cheap to clone and share.
#[derive(Clone, Default)]
pub struct Transcript {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Drains what was recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl Sink for Transcript {
    fn line(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
