//! Shared state handed to every command: working directory, output sink and
//! service handles.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use console_platform::{HashService, NetworkService, ProcessService, TestService, TraceService};
use console_types::error::Result;
use console_types::keys::BELL;
use console_vfs::Vfs;

use crate::registry::Registry;

/// Terminal output shared by the main loop and background commands.
///
/// Cloning is cheap; all clones write to the same sink.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
    bell: bool,
}

impl Output {
    /// Wrap a sink. The bell starts enabled.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
            bell: true,
        }
    }

    /// An output that records everything written to it.
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        (Self::new(captured.clone()), captured)
    }

    /// Enable or disable the audible alert.
    pub fn with_bell(mut self, bell: bool) -> Self {
        self.bell = bell;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write `text` as is.
    pub fn write_str(&self, text: &str) -> Result<()> {
        self.lock().write_all(text.as_bytes())?;
        Ok(())
    }

    /// Write `text` followed by a newline.
    pub fn println(&self, text: &str) -> Result<()> {
        let mut sink = self.lock();
        sink.write_all(text.as_bytes())?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    /// Audible alert for a rejected keystroke or a failed completion.
    pub fn beep(&self) -> Result<()> {
        if self.bell {
            self.lock().write_all(&[BELL])?;
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&self) -> Result<()> {
        self.lock().flush()?;
        Ok(())
    }
}

/// In-memory sink created by [`Output::capture`].
#[derive(Debug, Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Environment passed to every command.
///
/// A background command receives a clone: its changes to `cwd` are dropped
/// when it finishes, while service handles stay shared.
#[derive(Clone)]
pub struct Context {
    /// Current working directory (VFS path).
    pub cwd: String,
    pub out: Output,
    /// Registered commands, for `help` and nested evaluation.
    pub registry: Arc<Registry>,
    pub vfs: Arc<dyn Vfs>,
    pub network: Option<Arc<dyn NetworkService>>,
    pub process: Option<Arc<dyn ProcessService>>,
    /// Content hashers, one per algorithm.
    pub hashes: Vec<Arc<dyn HashService>>,
    pub trace: Option<Arc<dyn TraceService>>,
    pub tests: Option<Arc<dyn TestService>>,
    /// Trailing token that requests background execution.
    pub async_marker: String,
}

impl Context {
    /// A context rooted at `/` with no platform services attached.
    pub fn new(registry: Arc<Registry>, vfs: Arc<dyn Vfs>, out: Output) -> Self {
        Self {
            cwd: "/".to_string(),
            out,
            registry,
            vfs,
            network: None,
            process: None,
            hashes: Vec::new(),
            trace: None,
            tests: None,
            async_marker: "&".to_string(),
        }
    }

    /// Attach the network configuration service.
    pub fn with_network(mut self, network: Arc<dyn NetworkService>) -> Self {
        self.network = Some(network);
        self
    }

    /// Attach the process launcher.
    pub fn with_process(mut self, process: Arc<dyn ProcessService>) -> Self {
        self.process = Some(process);
        self
    }

    /// Attach a hasher, replacing any earlier one for the same algorithm.
    pub fn with_hash(mut self, hash: Arc<dyn HashService>) -> Self {
        self.hashes.retain(|h| h.algorithm() != hash.algorithm());
        self.hashes.push(hash);
        self
    }

    /// The hasher for `algorithm`, if one is attached.
    pub fn hasher(&self, algorithm: &str) -> Option<&Arc<dyn HashService>> {
        self.hashes.iter().find(|h| h.algorithm() == algorithm)
    }

    /// Attach the tracepoint service.
    pub fn with_trace(mut self, trace: Arc<dyn TraceService>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Attach the named-test runner.
    pub fn with_tests(mut self, tests: Arc<dyn TestService>) -> Self {
        self.tests = Some(tests);
        self
    }
}
