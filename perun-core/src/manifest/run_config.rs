use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(rename = "type")]
    pub build_type: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnVar {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub port: String,
    #[serde(rename = "hostport", default)]
    pub host_port: String,
    #[serde(default)]
    pub exposed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "name")]
    pub config_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    pub name: String,
    pub source_path: String,
    pub path: String,
    #[serde(rename = "files", default)]
    pub configs: Vec<Config>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(rename = "envars", default)]
    pub en_vars: Vec<EnVar>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub mounts: HashMap<String, Mount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_round_trips_through_yaml() {
        let mut run = RunConfig {
            cmd: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), "run.sh".to_string()],
            en_vars: vec![EnVar {
                key: "PORT".to_string(),
                value: "8080".to_string(),
            }],
            ports: vec![Port {
                port: "8080".to_string(),
                host_port: "18080".to_string(),
                exposed: true,
            }],
            mounts: HashMap::new(),
        };
        run.mounts.insert(
            "config".to_string(),
            Mount {
                name: "config".to_string(),
                source_path: "/host/config".to_string(),
                path: "/etc/app".to_string(),
                configs: vec![Config {
                    config_name: "app.yml".to_string(),
                    content: "key: value".to_string(),
                }],
            },
        );

        let yaml = serde_yaml::to_string(&run).unwrap();
        let parsed: RunConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.cmd, "/bin/sh");
        assert_eq!(parsed.mounts["config"].configs[0].config_name, "app.yml");
    }
}
