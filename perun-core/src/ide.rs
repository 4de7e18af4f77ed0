//! IDE debug-launch contract (spec §6/§7, supplemented): `perun-cli generate`
//! parses its full argument surface but does not emit `launch.json`/
//! `tasks.json` itself — that remains the external Generator's job. This
//! module documents the labels a debug container must carry to trigger the
//! Reactor, matching `original_source/services/generator.go`'s label set.

use crate::defaults::{self, PROVIDER_MODE_DEBUG};

/// Everything `generate` needs to hand an external IDE-config generator:
/// which container to point the debugger at, and the labels that container
/// must carry for the Reactor to recognize it as a debug replica.
#[derive(Debug, Clone)]
pub struct DebugLaunchSpec {
    pub workspace: String,
    pub env_name: String,
    pub service_name: String,
    pub source_location: String,
    pub source_type: String,
    pub command: String,
    pub env_target: String,
}

impl DebugLaunchSpec {
    pub fn new(
        workspace: impl Into<String>,
        env_name: impl Into<String>,
        service_name: impl Into<String>,
        source_location: impl Into<String>,
        source_type: impl Into<String>,
        command: impl Into<String>,
        env_target: impl Into<String>,
    ) -> Self {
        DebugLaunchSpec {
            workspace: workspace.into(),
            env_name: env_name.into(),
            service_name: service_name.into(),
            source_location: source_location.into(),
            source_type: source_type.into(),
            command: command.into(),
            env_target: env_target.into(),
        }
    }

    /// Container name the debug replica must be created under so the
    /// Reactor's `debug_attach`/`debug_detach` can find the original it
    /// swaps with (spec §3, §4.5).
    pub fn debug_container_name(&self) -> String {
        defaults::container_name(&self.env_name, &self.service_name)
    }

    /// Labels the debug container must carry to trigger the Reactor. All six
    /// of spec §3's labels are required — `is_managed_target`
    /// (`perun-core/src/reactor/run.rs`) refuses to act on an event missing
    /// `perun-env-target`.
    pub fn labels(&self) -> Vec<(&'static str, String)> {
        vec![
            (defaults::LABEL_PROVIDER, "perun".to_string()),
            (defaults::LABEL_PROVIDER_MODE, PROVIDER_MODE_DEBUG.to_string()),
            (defaults::LABEL_WORKSPACE, self.workspace.clone()),
            (defaults::LABEL_ENV, self.env_name.clone()),
            (defaults::LABEL_ENV_TARGET, self.env_target.clone()),
            (defaults::LABEL_SERVICE, self.service_name.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_container_name_matches_naming_convention() {
        let spec = DebugLaunchSpec::new("ws", "dev", "api", "/src", "python", "python app.py", "docker");
        assert_eq!(spec.debug_container_name(), "dev-api");
    }

    #[test]
    fn labels_carry_debug_provider_mode() {
        let spec = DebugLaunchSpec::new("ws", "dev", "api", "/src", "python", "python app.py", "docker");
        let labels = spec.labels();
        assert!(labels.contains(&(defaults::LABEL_PROVIDER_MODE, PROVIDER_MODE_DEBUG.to_string())));
    }

    #[test]
    fn labels_carry_env_target_for_reactor_matching() {
        let spec = DebugLaunchSpec::new("ws", "dev", "api", "/src", "python", "python app.py", "local");
        let labels = spec.labels();
        assert!(labels.contains(&(defaults::LABEL_ENV_TARGET, "local".to_string())));
    }
}
