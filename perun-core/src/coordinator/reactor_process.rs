use std::path::PathBuf;
use std::process::{Command, Stdio};

use sysinfo::{ProcessExt, System, SystemExt};
use tracing::{info, warn};

/// Executable basename the Coordinator looks for before spawning a new
/// Reactor (spec §4.6 "scan OS processes for one whose executable basename
/// equals the known reactor binary name"), grounded on the original's
/// `KillDSCProcess` process scan.
pub const REACTOR_BINARY_NAME: &str = "perun-events";

pub fn reactor_is_running() -> bool {
    let mut system = System::new();
    system.refresh_processes();
    system
        .processes()
        .values()
        .any(|p| p.name() == REACTOR_BINARY_NAME)
}

/// Spawns the Reactor binary detached, releasing the handle so it outlives
/// the Coordinator (spec §4.6). Failure to spawn degrades functionality but
/// must not fail activation, so this returns a bool rather than propagating
/// an error up through `Coordinator::activate`.
pub fn spawn_reactor(binary_path: Option<&str>) -> bool {
    let path: PathBuf = binary_path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(REACTOR_BINARY_NAME));

    match Command::new(&path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => {
            info!(pid = child.id(), "spawned debug event reactor");
            std::mem::drop(child);
            true
        }
        Err(e) => {
            warn!(error = %e, "failed to spawn debug event reactor, debug swap will be unavailable");
            false
        }
    }
}
