use k8s_openapi::api::core::v1::Pod;

/// Picks the pod a Service's manifest is templated from. Spec §4.3.3.a says
/// "take pod[0]"; since the cluster's listing order is undocumented, this
/// repo breaks ties lexicographically by pod name for determinism across
/// imports (REDESIGN per spec §9's open question — recorded in DESIGN.md).
pub fn select_pod(pods: &[Pod]) -> Option<&Pod> {
    pods.iter().min_by(|a, b| {
        let name_a = a.metadata.name.as_deref().unwrap_or_default();
        let name_b = b.metadata.name.as_deref().unwrap_or_default();
        name_a.cmp(name_b)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod_named(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn picks_lexicographically_first_pod() {
        let pods = vec![pod_named("web-7c9"), pod_named("web-1a2"), pod_named("web-5e0")];
        let selected = select_pod(&pods).unwrap();
        assert_eq!(selected.metadata.name.as_deref(), Some("web-1a2"));
    }

    #[test]
    fn empty_selection_yields_none() {
        assert!(select_pod(&[]).is_none());
    }
}
