use async_trait::async_trait;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Where user-facing lines go. Logging stays on `tracing`.
#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

impl OutputHandlers {
    pub fn stdio() -> Self {
        Self {
            out: |msg| println!("{}", msg),
            err: |msg| eprintln!("{}", msg),
        }
    }

    pub fn silent() -> Self {
        Self {
            out: |_| {},
            err: |_| {},
        }
    }
}

/// Source of interactively entered values (credentials).
#[async_trait]
pub trait Prompt: Send {
    async fn ask(&mut self, label: &str) -> io::Result<String>;
}

/// Line-oriented prompt over stdin.
///
/// The same reader serves the delete-all confirmation and the credential
/// prompts, so lines buffered by one are still there for the other.
pub struct StdinPrompt<R = BufReader<Stdin>> {
    reader: Lines<R>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdinPrompt<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: reader.lines(),
        }
    }

    /// Prints `banner_lines` and waits for enter. Ctrl-C or EOF cancel.
    pub async fn confirm(
        &mut self,
        banner_lines: &[&str],
        output: OutputHandlers,
    ) -> io::Result<bool> {
        for line in banner_lines {
            (output.out)(line);
        }
        io::stdout().flush()?;

        let result = tokio::select! {
            line = self.reader.next_line() => classify_line(line)?,
            _ = tokio::signal::ctrl_c() => ReadLineResult::Cancel,
        };
        Ok(result == ReadLineResult::Continue)
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Prompt for StdinPrompt<R> {
    async fn ask(&mut self, label: &str) -> io::Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;
        match self.reader.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stdin closed while asking for {}", label),
            )),
        }
    }
}

/// Possible outcomes from reading a single confirmation line.
#[derive(Debug, PartialEq, Eq)]
enum ReadLineResult {
    /// The user pressed enter (with or without text).
    Continue,
    /// EOF or Ctrl-C.
    Cancel,
}

fn classify_line(result: Result<Option<String>, io::Error>) -> io::Result<ReadLineResult> {
    match result {
        Ok(Some(_)) => Ok(ReadLineResult::Continue),
        Ok(None) => Ok(ReadLineResult::Cancel),
        Err(e) => Err(e),
    }
}
