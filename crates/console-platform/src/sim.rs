//! Simulated platform for the desktop build and for tests.
//!
//! Holds network configuration, program images, tracepoint counters and
//! named tests in memory. State sits behind mutexes because the services are
//! shared with background commands.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use console_types::error::{ConsoleError, Result};

use crate::services::{
    ArpEntry, CallstackSample, InterfaceInfo, MacAddr, NetworkService, ProcessService, Route,
    TestOutcome, TestService, TraceService,
};

type Program = Box<dyn Fn(&[String]) -> i32 + Send + Sync>;
type TestFn = Box<dyn Fn() -> std::result::Result<(), String> + Send + Sync>;

/// Address handed out by simulated discovery.
const DISCOVERY_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 122, 15);
const DISCOVERY_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);
const DISCOVERY_GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 122, 1);

#[derive(Debug, Default)]
struct NetState {
    interfaces: Vec<InterfaceInfo>,
    arp: Vec<ArpEntry>,
    routes: Vec<Route>,
}

impl NetState {
    fn interface_mut(&mut self, name: &str) -> Result<&mut InterfaceInfo> {
        self.interfaces
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| ConsoleError::Platform(format!("no such interface: {name}")))
    }
}

/// In-memory implementation of every platform service except hashing.
pub struct SimPlatform {
    net: Mutex<NetState>,
    programs: BTreeMap<String, Program>,
    counters: Mutex<BTreeMap<String, u64>>,
    tests: BTreeMap<String, TestFn>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimPlatform {
    /// A platform with a configured loopback and an unconfigured `eth0`.
    pub fn new() -> Self {
        let net = NetState {
            interfaces: vec![
                InterfaceInfo {
                    name: "lo0".to_string(),
                    mac: MacAddr([0; 6]),
                    addr: Some(Ipv4Addr::LOCALHOST),
                    netmask: Some(Ipv4Addr::new(255, 0, 0, 0)),
                    up: true,
                },
                InterfaceInfo {
                    name: "eth0".to_string(),
                    mac: MacAddr([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]),
                    addr: None,
                    netmask: None,
                    up: false,
                },
            ],
            ..NetState::default()
        };
        Self {
            net: Mutex::new(net),
            programs: BTreeMap::new(),
            counters: Mutex::new(BTreeMap::new()),
            tests: BTreeMap::new(),
        }
    }

    /// Install a program image at `path`.
    pub fn with_program(
        mut self,
        path: &str,
        program: impl Fn(&[String]) -> i32 + Send + Sync + 'static,
    ) -> Self {
        self.programs.insert(path.to_string(), Box::new(program));
        self
    }

    /// Declare a tracepoint with a zero counter.
    pub fn with_tracepoint(self, name: &str) -> Self {
        lock(&self.counters).insert(name.to_string(), 0);
        self
    }

    /// Register a named test.
    pub fn with_test(
        mut self,
        name: &str,
        test: impl Fn() -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.tests.insert(name.to_string(), Box::new(test));
        self
    }

    /// Record `hits` events on a tracepoint.
    pub fn fire(&self, tracepoint: &str, hits: u64) -> Result<()> {
        let mut counters = lock(&self.counters);
        let counter = counters
            .get_mut(tracepoint)
            .ok_or_else(|| ConsoleError::Platform(format!("no such tracepoint: {tracepoint}")))?;
        *counter += hits;
        Ok(())
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkService for SimPlatform {
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>> {
        Ok(lock(&self.net).interfaces.clone())
    }

    fn set_address(&self, interface: &str, addr: Ipv4Addr, netmask: Ipv4Addr) -> Result<()> {
        let mut net = lock(&self.net);
        let iface = net.interface_mut(interface)?;
        iface.addr = Some(addr);
        iface.netmask = Some(netmask);
        log::debug!("{interface}: address {addr} netmask {netmask}");
        Ok(())
    }

    fn bring_up(&self, interface: &str) -> Result<()> {
        lock(&self.net).interface_mut(interface)?.up = true;
        log::debug!("{interface}: up");
        Ok(())
    }

    fn arp_add(&self, entry: ArpEntry) -> Result<()> {
        let mut net = lock(&self.net);
        net.arp.retain(|e| e.ip != entry.ip);
        net.arp.push(entry);
        Ok(())
    }

    fn arp_entries(&self) -> Result<Vec<ArpEntry>> {
        Ok(lock(&self.net).arp.clone())
    }

    fn route_add(&self, route: Route) -> Result<()> {
        let mut net = lock(&self.net);
        if let Some(name) = &route.interface {
            net.interface_mut(name)?;
        }
        if net
            .routes
            .iter()
            .any(|r| r.destination == route.destination && r.netmask == route.netmask)
        {
            return Err(ConsoleError::Platform(format!(
                "route exists: {}/{}",
                route.destination, route.netmask
            )));
        }
        net.routes.push(route);
        Ok(())
    }

    fn routes(&self) -> Result<Vec<Route>> {
        Ok(lock(&self.net).routes.clone())
    }

    fn start_discovery(&self, interface: Option<&str>) -> Result<()> {
        let mut net = lock(&self.net);
        let name = match interface {
            Some(name) => name.to_string(),
            None => net
                .interfaces
                .iter()
                .find(|i| !i.mac.0.iter().all(|&b| b == 0))
                .map(|i| i.name.clone())
                .ok_or_else(|| {
                    ConsoleError::Platform("no interface for discovery".to_string())
                })?,
        };
        let iface = net.interface_mut(&name)?;
        iface.addr = Some(DISCOVERY_ADDR);
        iface.netmask = Some(DISCOVERY_MASK);
        iface.up = true;
        if !net.routes.iter().any(Route::is_default) {
            net.routes.push(Route {
                destination: Ipv4Addr::UNSPECIFIED,
                netmask: Ipv4Addr::UNSPECIFIED,
                gateway: Some(DISCOVERY_GATEWAY),
                interface: Some(name.clone()),
            });
        }
        log::info!("{name}: leased {DISCOVERY_ADDR}");
        Ok(())
    }
}

impl ProcessService for SimPlatform {
    fn execute(&self, path: &str, argv: &[String]) -> Result<i32> {
        let program = self
            .programs
            .get(path)
            .ok_or_else(|| ConsoleError::Platform(format!("no such program: {path}")))?;
        log::debug!("exec {path} {argv:?}");
        Ok(program(argv))
    }
}

impl TraceService for SimPlatform {
    fn tracepoints(&self) -> Result<Vec<String>> {
        Ok(lock(&self.counters).keys().cloned().collect())
    }

    fn read_counter(&self, tracepoint: &str) -> Result<u64> {
        lock(&self.counters)
            .get(tracepoint)
            .copied()
            .ok_or_else(|| ConsoleError::Platform(format!("no such tracepoint: {tracepoint}")))
    }

    fn callstacks(
        &self,
        tracepoint: &str,
        max_traces: usize,
        _max_frames: usize,
    ) -> Result<Vec<CallstackSample>> {
        let hits = self.read_counter(tracepoint)?;
        if hits == 0 || max_traces == 0 {
            return Ok(Vec::new());
        }
        // No real unwinder here: everything lands on one synthetic stack.
        Ok(vec![CallstackSample {
            hits,
            program_counters: Vec::new(),
        }])
    }
}

impl TestService for SimPlatform {
    fn test_names(&self) -> Result<Vec<String>> {
        Ok(self.tests.keys().cloned().collect())
    }

    fn run_test(&self, name: &str) -> Result<TestOutcome> {
        let test = self
            .tests
            .get(name)
            .ok_or_else(|| ConsoleError::Platform(format!("no such test: {name}")))?;
        Ok(match test() {
            Ok(()) => TestOutcome::Passed,
            Err(reason) => TestOutcome::Failed(reason),
        })
    }
}
