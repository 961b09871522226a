//! Platform service traits.
//!
//! Every trait here is `Send + Sync` and takes `&self`: commands hold the
//! services behind `Arc` and may run on a background thread.

use std::fmt;
use std::net::Ipv4Addr;

use console_types::error::{ConsoleError, Result};

// ---------------------------------------------------------------------------
// Network service
// ---------------------------------------------------------------------------

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Parse the colon-separated hex form (`52:54:00:12:34:56`).
    pub fn parse(text: &str) -> Result<Self> {
        let mut bytes = [0u8; 6];
        let mut parts = text.split(':');
        for byte in &mut bytes {
            let part = parts
                .next()
                .ok_or_else(|| ConsoleError::Platform(format!("bad MAC address: {text}")))?;
            if part.is_empty() || part.len() > 2 {
                return Err(ConsoleError::Platform(format!("bad MAC address: {text}")));
            }
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| ConsoleError::Platform(format!("bad MAC address: {text}")))?;
        }
        if parts.next().is_some() {
            return Err(ConsoleError::Platform(format!("bad MAC address: {text}")));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// State of one network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub mac: MacAddr,
    pub addr: Option<Ipv4Addr>,
    pub netmask: Option<Ipv4Addr>,
    pub up: bool,
}

/// A static ARP table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

/// A routing table entry. A zero destination and netmask is the default route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub destination: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Option<Ipv4Addr>,
    pub interface: Option<String>,
}

impl Route {
    /// Whether this is the default route.
    pub fn is_default(&self) -> bool {
        self.destination.is_unspecified() && self.netmask.is_unspecified()
    }
}

/// Abstraction over the network stack configuration.
pub trait NetworkService: Send + Sync {
    /// List interfaces in a stable order.
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>>;

    /// Assign an IPv4 address and netmask.
    fn set_address(&self, interface: &str, addr: Ipv4Addr, netmask: Ipv4Addr) -> Result<()>;

    /// Bring an interface up.
    fn bring_up(&self, interface: &str) -> Result<()>;

    /// Add a static ARP entry.
    fn arp_add(&self, entry: ArpEntry) -> Result<()>;

    /// Current ARP table.
    fn arp_entries(&self) -> Result<Vec<ArpEntry>>;

    /// Add a route.
    fn route_add(&self, route: Route) -> Result<()>;

    /// Current routing table.
    fn routes(&self) -> Result<Vec<Route>>;

    /// Start dynamic address discovery on one interface, or all when `None`.
    fn start_discovery(&self, interface: Option<&str>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Process service
// ---------------------------------------------------------------------------

/// Abstraction over launching a program image.
pub trait ProcessService: Send + Sync {
    /// Run the image at `path` with `argv` (argv\[0\] is the program name)
    /// and block until it exits.
    fn execute(&self, path: &str, argv: &[String]) -> Result<i32>;
}

// ---------------------------------------------------------------------------
// Hash service
// ---------------------------------------------------------------------------

/// Abstraction over a content hash.
pub trait HashService: Send + Sync {
    /// Algorithm name, as shown to the user.
    fn algorithm(&self) -> &str;

    /// Lowercase hex digest of `data`.
    fn digest(&self, data: &[u8]) -> String;
}

// ---------------------------------------------------------------------------
// Trace service
// ---------------------------------------------------------------------------

/// One sampled call stack and how often it was hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallstackSample {
    pub hits: u64,
    pub program_counters: Vec<u64>,
}

/// Abstraction over kernel tracepoints and their counters.
pub trait TraceService: Send + Sync {
    /// Names of every tracepoint, sorted.
    fn tracepoints(&self) -> Result<Vec<String>>;

    /// Current value of a tracepoint's hit counter.
    fn read_counter(&self, tracepoint: &str) -> Result<u64>;

    /// Sample call stacks at a tracepoint. At most `max_traces` samples of at
    /// most `max_frames` frames each, most frequent first.
    fn callstacks(
        &self,
        tracepoint: &str,
        max_traces: usize,
        max_frames: usize,
    ) -> Result<Vec<CallstackSample>>;
}

// ---------------------------------------------------------------------------
// Test service
// ---------------------------------------------------------------------------

/// Result of running one named test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(String),
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Abstraction over the named-test harness.
pub trait TestService: Send + Sync {
    /// Names of all available tests, sorted.
    fn test_names(&self) -> Result<Vec<String>>;

    /// Run one test to completion.
    fn run_test(&self, name: &str) -> Result<TestOutcome>;
}
