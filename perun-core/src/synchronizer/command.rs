use crate::manifest::{Command, RunConfig};

/// Synthesizes the container `Cmd` array from `preRun` + `run` (spec §4.4
/// "Command synthesis"). Mirrors the original's string-building exactly,
/// including its two special cases: a `python`-resolved image that runs a
/// `.py` entry point is prefixed with `python `, and a `run.cmd` that
/// already starts with `/bin/sh` is split into 3 whitespace tokens instead
/// of being wrapped again.
pub fn synthesize_command(
    image: &str,
    pre_run: &[Command],
    run: &RunConfig,
) -> Option<Vec<String>> {
    if run.cmd.is_empty() {
        return None;
    }

    let mut generated = String::new();
    for pc in pre_run {
        if image == "python" && pc.cmd.ends_with(".py") {
            generated.push_str("python ");
        }
        generated.push_str(&pc.cmd);
        if !pc.args.is_empty() {
            generated.push(' ');
            generated.push_str(&pc.args.join(" "));
        }
        generated.push_str(" && ");
    }

    if image == "python" && run.cmd.ends_with(".py") {
        generated.push_str("python ");
    }
    generated.push_str(&run.cmd);
    if !run.args.is_empty() {
        generated.push(' ');
        generated.push_str(&run.args.join(" "));
    }

    if run.cmd.starts_with("/bin/sh") {
        let tokens: Vec<String> = generated.splitn(3, ' ').map(str::to_string).collect();
        return Some(tokens);
    }

    Some(vec!["/bin/sh".to_string(), "-c".to_string(), generated])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(cmd: &str, args: &[&str]) -> RunConfig {
        RunConfig {
            cmd: cmd.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_cmd_yields_no_command() {
        assert!(synthesize_command("nginx", &[], &RunConfig::default()).is_none());
    }

    #[test]
    fn plain_command_is_wrapped_in_sh_c() {
        let cmd = synthesize_command("nginx", &[], &run("nginx", &["-g", "daemon off;"])).unwrap();
        assert_eq!(
            cmd,
            vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "nginx -g daemon off;".to_string(),
            ]
        );
    }

    #[test]
    fn pre_run_entries_are_joined_with_and() {
        let pre_run = vec![Command {
            cmd: "pip install -r requirements.txt".to_string(),
            args: vec![],
        }];
        let cmd = synthesize_command("python", &pre_run, &run("app.py", &[])).unwrap();
        assert_eq!(
            cmd,
            vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "pip install -r requirements.txt && python app.py".to_string(),
            ]
        );
    }

    #[test]
    fn python_image_prefixes_py_entrypoints() {
        let cmd = synthesize_command("python", &[], &run("server.py", &["--port", "8080"])).unwrap();
        assert_eq!(
            cmd,
            vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "python server.py --port 8080".to_string(),
            ]
        );
    }

    #[test]
    fn bin_sh_prefixed_cmd_is_split_not_rewrapped() {
        let cmd = synthesize_command("alpine", &[], &run("/bin/sh -c run.sh", &[])).unwrap();
        assert_eq!(
            cmd,
            vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "run.sh".to_string(),
            ]
        );
    }
}
