use std::{
    io::{self, BufRead, Write},
    sync::Mutex,
};

use client_core::Notifier;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Writes notices and `[y/N]` prompts to `out`, stderr by default, so stdout
/// only ever carries the rendered page.
pub struct TerminalNotifier<W = io::Stderr> {
    out: Mutex<W>,
}

impl TerminalNotifier {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_text(&self, text: &str) -> bool {
        let Ok(mut out) = self.out.lock() else {
            return false;
        };
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .is_ok()
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn notify(&self, message: &str) {
        self.write_text(&format!("{message}\n"));
    }

    fn confirm(&self, message: &str) -> bool {
        if !self.write_text(&format!("{message} [y/N] ")) {
            return false;
        }
        read_answer()
    }
}

fn read_answer() -> bool {
    let read = || {
        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .map(|_| is_affirmative(&answer))
            .unwrap_or(false)
    };
    // Stdin blocks; move off the async worker when running on the multi-thread runtime.
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
