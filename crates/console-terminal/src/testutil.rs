//! Fixtures shared by the unit tests in this crate.

use std::sync::Arc;

use console_platform::{Md5Hasher, Sha256Hasher, SimPlatform};
use console_vfs::MemoryVfs;

use crate::context::{Captured, Context, Output};
use crate::registry::Registry;

/// `/bin/`, `/etc/hosts`, `/etc/fstab`, `/usr/lib/` and `/usr/local/`.
pub fn sample_vfs() -> MemoryVfs {
    let mut vfs = MemoryVfs::new();
    vfs.mkdir("/bin").unwrap();
    vfs.mkdir("/usr/lib").unwrap();
    vfs.mkdir("/usr/local").unwrap();
    vfs.mkdir("/etc").unwrap();
    vfs.write("/etc/hosts", b"127.0.0.1 localhost\n").unwrap();
    vfs.write("/etc/fstab", b"").unwrap();
    vfs
}

pub fn sample_platform() -> SimPlatform {
    SimPlatform::new()
        .with_program("/bin/true.so", |_| 0)
        .with_program("/bin/argc.so", |argv| argv.len() as i32)
        .with_tracepoint("sched_switch")
        .with_tracepoint("sched_wait")
        .with_tracepoint("mutex_lock")
        .with_test("tst-bsd-evh", || Ok(()))
        .with_test("tst-fpu", || Err("mismatch at 3".to_string()))
}

/// A context over `registry` with every service attached and output captured.
pub fn context(registry: Registry) -> (Context, Captured) {
    let (out, captured) = Output::capture();
    let platform = Arc::new(sample_platform());
    let ctx = Context::new(Arc::new(registry), Arc::new(sample_vfs()), out)
        .with_network(Arc::clone(&platform) as _)
        .with_process(Arc::clone(&platform) as _)
        .with_trace(Arc::clone(&platform) as _)
        .with_tests(platform)
        .with_hash(Arc::new(Md5Hasher))
        .with_hash(Arc::new(Sha256Hasher));
    (ctx, captured)
}

pub fn toks(line: &str) -> Vec<String> {
    crate::dispatch::tokenize(line)
}
