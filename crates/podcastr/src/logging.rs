//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so in that mode formatted log lines go to a channel and
//! show up in the logs modal. One-shot commands log to stderr.

use std::io;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing_subscriber::EnvFilter;

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub(crate) fn init_stderr(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_writer(io::stderr)
        .init();
}

/// Route log lines into a channel; the receiver feeds the logs modal.
pub(crate) fn init_channel(fallback: &str) -> Receiver<String> {
    let (tx, rx) = unbounded::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || ChannelWriter::new(tx.clone()))
        .init();
    rx
}

/// Buffers formatted output and sends it one line at a time.
pub(crate) struct ChannelWriter {
    tx: Sender<String>,
    buf: Vec<u8>,
}

impl ChannelWriter {
    pub(crate) fn new(tx: Sender<String>) -> Self {
        Self { tx, buf: Vec::new() }
    }

    fn send_line(&self, bytes: &[u8]) {
        let line = String::from_utf8_lossy(bytes);
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.is_empty() {
            let _ = self.tx.send(line.to_string());
        }
    }
}

impl io::Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.send_line(&line);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            self.send_line(&rest);
        }
        Ok(())
    }
}

impl Drop for ChannelWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
