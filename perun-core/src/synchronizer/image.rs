use crate::manifest::Service;

use super::SynchronizeError;

/// The resolved image reference for a Service, plus the local source
/// directory to bind-mount at `/app` when the service runs from source
/// (spec §4.4 "Image resolution by service type").
#[derive(Debug, Clone, Default)]
pub struct ResolvedImage {
    pub image: String,
    pub volume_local_path: Option<String>,
}

/// Mirrors `loadService`'s image-resolution switch in the original
/// synchronizer: `local` resolves by `params.source`/`params.image`/
/// `params.version`, `docker` requires `params.image`, `git` is
/// unimplemented.
pub fn resolve_image(service: &Service) -> Result<ResolvedImage, SynchronizeError> {
    match service.service_type.as_str() {
        "local" => resolve_local(service),
        "docker" => {
            let image = service
                .params
                .get("image")
                .cloned()
                .ok_or_else(|| SynchronizeError::UnsupportedServiceType("docker: missing image".into()))?;
            Ok(ResolvedImage {
                image,
                volume_local_path: None,
            })
        }
        "git" => Err(SynchronizeError::UnsupportedServiceType("git".to_string())),
        other => Err(SynchronizeError::UnsupportedServiceType(other.to_string())),
    }
}

fn resolve_local(service: &Service) -> Result<ResolvedImage, SynchronizeError> {
    if let Some(image) = service.params.get("image").filter(|s| !s.is_empty()) {
        return Ok(ResolvedImage {
            image: image.clone(),
            volume_local_path: None,
        });
    }

    let source = service.params.get("source").map(String::as_str).unwrap_or("");
    let mut image = match source {
        "python" => "python".to_string(),
        "node" => "node".to_string(),
        "" => return Err(SynchronizeError::CodeAnalysisUnsupported),
        other => return Err(SynchronizeError::UnsupportedSourceType(other.to_string())),
    };

    if let Some(version) = service.params.get("version").filter(|s| !s.is_empty()) {
        image.push(':');
        image.push_str(version);
    }

    let volume_local_path = service.params.get("location").cloned();
    Ok(ResolvedImage {
        image,
        volume_local_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::collections::HashMap;

    fn service_with(params: &[(&str, &str)], service_type: &str) -> Service {
        let mut svc = Service::new("web");
        svc.service_type = service_type.to_string();
        svc.params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        svc
    }

    #[test]
    fn docker_requires_image() {
        let svc = service_with(&[], "docker");
        assert_matches!(resolve_image(&svc), Err(SynchronizeError::UnsupportedServiceType(_)));
    }

    #[test]
    fn local_with_explicit_image_wins() {
        let svc = service_with(&[("image", "custom:latest"), ("source", "python")], "local");
        let resolved = resolve_image(&svc).unwrap();
        assert_eq!(resolved.image, "custom:latest");
        assert!(resolved.volume_local_path.is_none());
    }

    #[rstest]
    #[case::python_with_version_and_location(
        &[("source", "python"), ("version", "3.11"), ("location", "/src")],
        "python:3.11",
        Some("/src")
    )]
    #[case::node_without_version(&[("source", "node"), ("location", "/src")], "node", Some("/src"))]
    #[case::python_without_location(&[("source", "python")], "python", None)]
    fn local_source_resolution(
        #[case] params: &[(&str, &str)],
        #[case] expected_image: &str,
        #[case] expected_volume: Option<&str>,
    ) {
        let svc = service_with(params, "local");
        let resolved = resolve_image(&svc).unwrap();
        assert_eq!(resolved.image, expected_image);
        assert_eq!(resolved.volume_local_path.as_deref(), expected_volume);
    }

    #[test]
    fn local_empty_source_is_code_analysis_unsupported() {
        let svc = service_with(&[], "local");
        assert_matches!(resolve_image(&svc), Err(SynchronizeError::CodeAnalysisUnsupported));
    }

    #[rstest]
    #[case::git("git")]
    #[case::unknown_type("swarm")]
    fn unsupported_service_types_are_rejected(#[case] service_type: &str) {
        let svc = service_with(&[], service_type);
        assert!(resolve_image(&svc).is_err());
    }
}
