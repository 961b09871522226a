//! Demo filesystem and simulated platform for the desktop console.

use console_platform::{HashService, Sha256Hasher, SimPlatform};
use console_types::error::Result;
use console_vfs::MemoryVfs;

/// Create the demo filesystem used when no host root is configured.
pub fn demo_vfs() -> Result<MemoryVfs> {
    let mut vfs = MemoryVfs::new();
    vfs.mkdir("/bin")?;
    vfs.mkdir("/etc")?;
    vfs.mkdir("/tmp")?;
    vfs.mkdir("/usr/lib")?;
    vfs.mkdir("/home/user")?;
    vfs.write(
        "/home/user/readme.txt",
        b"Welcome to the console.\nType 'help' for available commands.\n",
    )?;
    vfs.write("/etc/hostname", b"console\n")?;
    vfs.write("/etc/hosts", b"127.0.0.1 localhost\n")?;
    vfs.write("/bin/hello.so", b"\x7fELF")?;
    vfs.write("/bin/false.so", b"\x7fELF")?;
    Ok(vfs)
}

/// Simulated platform with the programs, tracepoints and tests the demo
/// filesystem advertises.
pub fn demo_platform() -> SimPlatform {
    SimPlatform::new()
        .with_program("/bin/hello.so", |argv| {
            println!("Hello from {}", argv.join(" "));
            0
        })
        .with_program("/bin/false.so", |_| 1)
        .with_tracepoint("sched_switch")
        .with_tracepoint("sched_wait")
        .with_tracepoint("mutex_lock")
        .with_tracepoint("net_packet_in")
        .with_test("tst-sha256", || {
            let digest = Sha256Hasher.digest(b"abc");
            if digest.starts_with("ba7816bf") {
                Ok(())
            } else {
                Err(format!("unexpected digest {digest}"))
            }
        })
        .with_test("tst-resolve", || {
            let path = console_vfs::resolve_path("/usr", "../etc/./hosts");
            if path == "/etc/hosts" {
                Ok(())
            } else {
                Err(format!("resolved to {path}"))
            }
        })
}
