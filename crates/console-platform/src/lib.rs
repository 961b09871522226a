//! Platform service abstractions for console commands.
//!
//! The console core calls none of these. Registered commands do, through the
//! handles carried in their command context.

mod hash;
mod services;
mod sim;

pub use hash::{Md5Hasher, Sha256Hasher};
pub use services::{
    ArpEntry, CallstackSample, HashService, InterfaceInfo, MacAddr, NetworkService,
    ProcessService, Route, TestOutcome, TestService, TraceService,
};
pub use sim::SimPlatform;
