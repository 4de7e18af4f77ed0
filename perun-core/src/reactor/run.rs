use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{error, info, instrument, warn};

use crate::defaults;
use crate::engine::{EngineAdapter, EngineEvent};

use super::ReactorError;

/// A debug container: `type=container`, `provider=perun`,
/// `provider-mode=debug` (spec §4.5 "A debug container is any engine event
/// whose...").
pub fn is_debug_event(event: &EngineEvent) -> bool {
    event.event_type == "container"
        && event.attribute(defaults::LABEL_PROVIDER) == Some(defaults::LABEL_PROVIDER_VALUE)
        && event.attribute(defaults::LABEL_PROVIDER_MODE) == Some(defaults::PROVIDER_MODE_DEBUG)
}

fn is_managed_target(event: &EngineEvent) -> bool {
    matches!(event.attribute(defaults::LABEL_ENV_TARGET), Some("docker") | Some("local"))
}

/// Drives the per-service state machine described in spec §4.5: a debug
/// container's `start` event stops the original replica (Debug-Attach); its
/// `destroy` event restarts the original (Debug-Detach). There is no
/// in-process graceful shutdown — the reactor loops until the event stream
/// itself errors, matching `original_source`'s `ContainerEvents`.
pub struct Reactor<E: EngineAdapter> {
    engine: Arc<E>,
}

impl<E: EngineAdapter> Reactor<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Reactor { engine }
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), ReactorError> {
        info!("starting debug event reactor");
        let mut events = self.engine.events().await?;

        while let Some(item) = events.next().await {
            let event = item?;
            if let Err(e) = self.handle(&event).await {
                error!(error = %e, "reactor event handling failed");
                return Err(e);
            }
        }

        Err(ReactorError::StreamEnded)
    }

    #[instrument(skip(self, event))]
    async fn handle(&self, event: &EngineEvent) -> Result<(), ReactorError> {
        if !is_debug_event(event) || !is_managed_target(event) {
            return Ok(());
        }

        let orig_name = match (event.attribute(defaults::LABEL_ENV), event.attribute(defaults::LABEL_SERVICE)) {
            (Some(env), Some(svc)) => defaults::container_name(env, svc),
            _ => return Ok(()),
        };

        match event.action.as_str() {
            "start" => self.debug_attach(&orig_name).await,
            "destroy" => self.debug_detach(&orig_name).await,
            _ => Ok(()),
        }
    }

    async fn debug_attach(&self, orig_name: &str) -> Result<(), ReactorError> {
        let state = self.engine.container_inspect(orig_name).await?;
        if state.running {
            self.engine.container_stop(orig_name).await?;
            info!(container = orig_name, "stopped replica to free alias for debug container");
        } else {
            warn!(container = orig_name, "no running replica to stop");
        }
        Ok(())
    }

    async fn debug_detach(&self, orig_name: &str) -> Result<(), ReactorError> {
        let state = self.engine.container_inspect(orig_name).await?;
        if state.status == "exited" {
            self.engine.container_start(orig_name).await?;
            info!(container = orig_name, "restarted replica after debug container exit");
        } else {
            warn!(container = orig_name, "no paused replica to restart");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngineAdapter;
    use crate::engine::ContainerState;
    use std::collections::HashMap;

    fn debug_event(action: &str, env: &str, service: &str, target: &str) -> EngineEvent {
        let mut attributes = HashMap::new();
        attributes.insert("provider".to_string(), "perun".to_string());
        attributes.insert("provider-mode".to_string(), "debug".to_string());
        attributes.insert("perun-env".to_string(), env.to_string());
        attributes.insert("perun-service".to_string(), service.to_string());
        attributes.insert("perun-env-target".to_string(), target.to_string());
        EngineEvent {
            event_type: "container".to_string(),
            action: action.to_string(),
            actor_id: "abc123".to_string(),
            attributes,
        }
    }

    #[test]
    fn recognizes_debug_events_only() {
        let debug = debug_event("start", "api", "web", "docker");
        assert!(is_debug_event(&debug));

        let mut sync_event = debug.clone();
        sync_event.attributes.insert("provider-mode".to_string(), "sync".to_string());
        assert!(!is_debug_event(&sync_event));
    }

    #[tokio::test]
    async fn attach_stops_running_replica() {
        let mut mock = MockEngineAdapter::new();
        mock.expect_container_inspect()
            .withf(|name| name == "api-web")
            .returning(|_| {
                Ok(ContainerState {
                    running: true,
                    status: "running".to_string(),
                })
            });
        mock.expect_container_stop()
            .withf(|name| name == "api-web")
            .returning(|_| Ok(()));

        let reactor = Reactor::new(Arc::new(mock));
        let event = debug_event("start", "api", "web", "docker");
        reactor.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn detach_restarts_exited_replica() {
        let mut mock = MockEngineAdapter::new();
        mock.expect_container_inspect()
            .withf(|name| name == "api-web")
            .returning(|_| {
                Ok(ContainerState {
                    running: false,
                    status: "exited".to_string(),
                })
            });
        mock.expect_container_start()
            .withf(|name| name == "api-web")
            .returning(|_| Ok(()));

        let reactor = Reactor::new(Arc::new(mock));
        let event = debug_event("destroy", "api", "web", "docker");
        reactor.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn non_debug_events_are_ignored() {
        let mock = MockEngineAdapter::new();
        let reactor = Reactor::new(Arc::new(mock));
        let mut event = debug_event("start", "api", "web", "docker");
        event.attributes.remove("provider-mode");
        reactor.handle(&event).await.unwrap();
    }
}
