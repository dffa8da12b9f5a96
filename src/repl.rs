//! Interactive console.
//!
//! Reads statements line by line, keeps reading while brackets are open or
//! a line ends in `\`, and runs each complete input through
//! [`Interpreter::execute_source`]. Faults are printed and the loop goes on;
//! end of input leaves the loop.
//!
//! ```text
//! >>> let bel = ecp5::BelId(ecp5::Location(1, 1), 0);
//! >>> fn place(c) {
//! ...     ctx.bind_bel(bel, c, types::PlaceStrength::USER)
//! ... }
//! >>> place("lut0")
//! ```

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::scripting::Interpreter;

/// Prompt shown at the start of an input.
pub const PRIMARY_PROMPT: &str = ">>> ";
/// Prompt shown while an input is incomplete.
pub const CONTINUATION_PROMPT: &str = "... ";

/// Terminal the REPL talks to.
pub trait Console {
    /// Show `prompt` and read one line, without its line ending.
    /// `None` means end of input.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Write the session banner.
    fn banner(&mut self, text: &str) -> io::Result<()>;

    /// Write a result line.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Write a warning line.
    fn warn(&mut self, text: &str) -> io::Result<()>;

    /// Write a fault or error line.
    fn error(&mut self, text: &str) -> io::Result<()>;
}

/// Line-oriented console over any reader and writer.
pub struct PlainConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PlainConsole<R, W> {
    /// Console reading lines from `input` and writing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Take back the writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl PlainConsole<BufReader<io::Stdin>, io::Stdout> {
    /// Console on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for PlainConsole<R, W> {
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn banner(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    fn warn(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "warning: {text}")
    }

    fn error(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }
}

// =============================================================================
// Input accumulation
// =============================================================================

/// Lines of one pending input.
#[derive(Debug, Default)]
pub struct InputBuffer {
    lines: Vec<String>,
}

impl InputBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one input line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// True when no line has been pushed.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when every bracket is closed and the last line does not end in
    /// a continuation backslash. Brackets inside strings and comments are
    /// ignored.
    pub fn is_complete(&self) -> bool {
        let Some(last) = self.lines.last() else {
            return false;
        };
        if last.trim_end().ends_with('\\') {
            return false;
        }
        bracket_depth(&self.lines.join("\n")) <= 0
    }

    /// Take the accumulated source, dropping continuation backslashes.
    pub fn take(&mut self) -> String {
        let lines = std::mem::take(&mut self.lines);
        lines
            .iter()
            .map(|line| {
                let trimmed = line.trim_end();
                trimmed.strip_suffix('\\').unwrap_or(line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn bracket_depth(source: &str) -> i64 {
    let mut depth = 0_i64;
    let mut quote: Option<char> = None;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => {
                    chars.next();
                }
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                // Rhai block comments nest
                let mut nesting = 1_u32;
                while nesting > 0 {
                    match chars.next() {
                        Some('*') if chars.peek() == Some(&'/') => {
                            chars.next();
                            nesting -= 1;
                        }
                        Some('/') if chars.peek() == Some(&'*') => {
                            chars.next();
                            nesting += 1;
                        }
                        Some(_) => {}
                        None => return depth.max(1),
                    }
                }
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

// =============================================================================
// History
// =============================================================================

/// Bounded input history, optionally persisted to a file.
#[derive(Debug, Clone)]
pub struct History {
    /// Oldest first.
    entries: Vec<String>,
    max_entries: usize,
    file_path: Option<PathBuf>,
}

impl History {
    /// In-memory history keeping at most `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
            file_path: None,
        }
    }

    /// History persisted to `path`.
    pub fn with_file(max_entries: usize, path: PathBuf) -> Self {
        let mut history = Self::new(max_entries);
        history.file_path = Some(path);
        history
    }

    /// Backing file, if any.
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Load entries from the history file, if there is one.
    pub fn load(&mut self) -> io::Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let reader = BufReader::new(File::open(path)?);
        self.entries.clear();
        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            self.entries.push(unescape_entry(&line));
        }
        self.trim();
        Ok(())
    }

    /// Write entries to the history file, creating its directory.
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        writeln!(file, "# pnr-script history")?;
        for entry in &self.entries {
            writeln!(file, "{}", escape_entry(entry))?;
        }
        Ok(())
    }

    /// Record an input. Blank inputs and repeats of the last entry are skipped.
    pub fn add(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if entry.trim().is_empty() || self.entries.last() == Some(&entry) {
            return;
        }
        self.entries.push(entry);
        self.trim();
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }
}

/// One entry per line: backslashes and newlines are escaped, and a leading `#`
/// (an object map literal) is escaped so it is not read back as a comment.
fn escape_entry(entry: &str) -> String {
    let escaped = entry.replace('\\', "\\\\").replace('\n', "\\n");
    match escaped.strip_prefix('#') {
        Some(rest) => format!("\\#{rest}"),
        None => escaped,
    }
}

fn unescape_entry(line: &str) -> String {
    let mut entry = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            entry.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => entry.push('\n'),
            Some(other) => entry.push(other),
            None => entry.push('\\'),
        }
    }
    entry
}

/// `<state dir>/pnr-script/history`, falling back to the local data dir.
pub fn default_history_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("pnr-script").join("history"))
}

// =============================================================================
// Loop
// =============================================================================

/// Read-eval-print loop over a ready [`Interpreter`].
pub struct Repl<'a, C> {
    interp: &'a mut Interpreter,
    console: C,
    history: History,
}

impl<'a, C: Console> Repl<'a, C> {
    /// Console session over `interp`.
    pub fn new(interp: &'a mut Interpreter, console: C, history: History) -> Self {
        Self {
            interp,
            console,
            history,
        }
    }

    /// Greeting shown when the session starts.
    pub fn banner(&self) -> String {
        let arch = self
            .interp
            .catalog()
            .map_or(self.interp.config().arch.as_str(), |c| c.arch());
        format!(
            "pnr-script {} ({arch})\n\
             The design context is present as 'ctx'.\n\
             End a line with '\\' to continue it; end of input exits.",
            env!("CARGO_PKG_VERSION")
        )
    }

    /// Run until end of input, then save history.
    pub fn run(&mut self) -> io::Result<()> {
        if let Err(err) = self.history.load() {
            self.console
                .warn(&format!("could not load history: {err}"))?;
        }
        let banner = self.banner();
        self.console.banner(&banner)?;

        let mut buffer = InputBuffer::new();
        loop {
            let prompt = if buffer.is_empty() {
                PRIMARY_PROMPT
            } else {
                CONTINUATION_PROMPT
            };
            let Some(line) = self.console.prompt(prompt)? else {
                if !buffer.is_empty() {
                    self.console.warn("discarding incomplete input")?;
                }
                break;
            };
            if buffer.is_empty() && line.trim().is_empty() {
                continue;
            }

            buffer.push(line);
            if !buffer.is_complete() {
                continue;
            }

            let source = buffer.take();
            self.history.add(source.as_str());
            self.eval(&source)?;
        }

        if let Err(err) = self.history.save() {
            tracing::warn!(error = %err, "could not save history");
            self.console
                .warn(&format!("could not save history: {err}"))?;
        }
        Ok(())
    }

    fn eval(&mut self, source: &str) -> io::Result<()> {
        match self.interp.execute_source(source) {
            Ok(value) if value.is_unit() => Ok(()),
            Ok(value) => {
                let text = self.interp.describe(&value);
                self.console.print(&text)
            }
            Err(fault) => self.console.error(&fault.render()),
        }
    }

    /// Recorded input.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// End the session and take back the console.
    pub fn into_console(self) -> C {
        self.console
    }
}
