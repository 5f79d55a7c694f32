//! Integration tests for envgraph

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary with an isolated config path so the user's config is not read
    fn envgraph(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("envgraph");
        cmd.env("ENVGRAPH_CONFIG", temp.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        envgraph(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compile development environments"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        envgraph(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("envgraph"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        envgraph(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        envgraph(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[build]"))
            .stdout(predicate::str::contains("linux/amd64"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        envgraph(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());
    }

    #[test]
    fn compile_writes_definition() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("env.toml");
        let output = temp.path().join("def.json");
        std::fs::write(
            &env_file,
            "system_packages = [\"vim\"]\nlanguage_packages = [\"numpy\"]\n",
        )
        .unwrap();

        envgraph(&temp)
            .args(["compile"])
            .arg(&env_file)
            .arg("--output")
            .arg(&output)
            .assert()
            .success();

        let json = std::fs::read_to_string(&output).unwrap();
        let definition = envgraph::llb::Definition::from_json(&json).unwrap();
        assert_eq!(definition.platform, envgraph::llb::Platform::LinuxAmd64);
        assert!(definition.root_op().is_some());
    }

    #[test]
    fn compile_to_stdout_with_platform() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("env.toml");
        std::fs::write(&env_file, "").unwrap();

        envgraph(&temp)
            .args(["compile", "--platform", "linux/arm64"])
            .arg(&env_file)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"linux/arm64\""))
            .stdout(predicate::str::contains("docker-image://docker.io/library/python:3.8"));
    }

    #[test]
    fn compile_rejects_unknown_platform() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("env.toml");
        std::fs::write(&env_file, "").unwrap();

        envgraph(&temp)
            .args(["compile", "--platform", "windows/amd64"])
            .arg(&env_file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported platform"));
    }

    #[test]
    fn compile_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        envgraph(&temp)
            .args(["compile"])
            .arg(temp.path().join("missing.toml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn compile_rejects_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("env.toml");
        std::fs::write(&env_file, "pacakges = [\"typo\"]\n").unwrap();

        envgraph(&temp)
            .args(["compile"])
            .arg(&env_file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid environment file"));
    }
}

mod compile_tests {
    use async_trait::async_trait;
    use envgraph::environment::Extension;
    use envgraph::layer::BuildSettings;
    use envgraph::llb::{Op, Platform};
    use envgraph::shell::ShellBootstrap;
    use envgraph::vscode::PluginCache;
    use envgraph::{compile, EnvError, EnvResult, Environment};
    use std::path::PathBuf;

    struct StaticPlugins {
        fail: bool,
    }

    #[async_trait]
    impl PluginCache for StaticPlugins {
        async fn ensure_cached(&self, _extension: &Extension) -> EnvResult<()> {
            if self.fail {
                return Err(EnvError::Internal("offline".to_string()));
            }
            Ok(())
        }

        fn plugin_path(&self, extension: &Extension) -> String {
            format!("extensions/{}/extension", extension)
        }
    }

    struct NoShell;

    #[async_trait]
    impl ShellBootstrap for NoShell {
        fn install_script(&self) -> &str {
            "#!/bin/bash\n"
        }

        async fn ensure_framework_cloned(&self) -> EnvResult<()> {
            Ok(())
        }

        fn framework_dir(&self) -> PathBuf {
            PathBuf::from("/nonexistent/oh-my-zsh")
        }

        fn framework_path(&self) -> String {
            "oh-my-zsh".to_string()
        }
    }

    fn full_env() -> Environment {
        Environment::parse(
            r#"
system_packages = ["vim", "git"]
language_packages = ["numpy"]
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn root_merges_four_layers() {
        let definition = compile(
            &full_env(),
            &BuildSettings::default(),
            &StaticPlugins { fail: false },
            &NoShell,
        )
        .await
        .unwrap();

        let root = definition.root_op().unwrap();
        assert_eq!(root.op, Op::Merge);
        assert_eq!(root.inputs.len(), 4);

        // Every input is defined before the op that consumes it
        for (index, record) in definition.ops.iter().enumerate() {
            for input in &record.inputs {
                let position = definition
                    .ops
                    .iter()
                    .position(|r| &r.digest == input)
                    .unwrap();
                assert!(position < index);
            }
        }
    }

    #[tokio::test]
    async fn minimal_environment_is_base_and_tool() {
        let definition = compile(
            &Environment::default(),
            &BuildSettings::default(),
            &StaticPlugins { fail: false },
            &NoShell,
        )
        .await
        .unwrap();

        assert_eq!(definition.root_op().unwrap().inputs.len(), 2);
        assert!(!definition
            .ops
            .iter()
            .any(|r| matches!(r.op, Op::Exec { .. })));
    }

    #[tokio::test]
    async fn system_packages_alone_refresh_apt_lists() {
        let env = Environment::parse("system_packages = [\"vim\"]").unwrap();
        let definition = compile(
            &env,
            &BuildSettings::default(),
            &StaticPlugins { fail: false },
            &NoShell,
        )
        .await
        .unwrap();

        assert_eq!(definition.root_op().unwrap().inputs.len(), 4);
        let execs: Vec<&Vec<String>> = definition
            .ops
            .iter()
            .filter_map(|r| match &r.op {
                Op::Exec { args, .. } => Some(args),
                _ => None,
            })
            .collect();
        assert_eq!(execs.len(), 2);
        assert!(execs
            .iter()
            .any(|args| args.iter().any(|a| a.starts_with("apt-get update && "))));
        assert!(execs
            .iter()
            .any(|args| **args == vec!["apt-get", "install", "-y", "vim"]));
    }

    #[tokio::test]
    async fn compilation_is_deterministic() {
        let settings = BuildSettings::default();
        let first = compile(&full_env(), &settings, &StaticPlugins { fail: false }, &NoShell)
            .await
            .unwrap();
        let second = compile(&full_env(), &settings, &StaticPlugins { fail: false }, &NoShell)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[tokio::test]
    async fn platform_changes_nothing_but_the_platform() {
        let amd = compile(
            &full_env(),
            &BuildSettings::default(),
            &StaticPlugins { fail: false },
            &NoShell,
        )
        .await
        .unwrap();
        let arm_settings = BuildSettings {
            platform: Platform::LinuxArm64,
            ..BuildSettings::default()
        };
        let arm = compile(&full_env(), &arm_settings, &StaticPlugins { fail: false }, &NoShell)
            .await
            .unwrap();

        assert_eq!(arm.platform, Platform::LinuxArm64);
        assert_eq!(amd.root, arm.root);
    }

    #[tokio::test]
    async fn plugin_failure_aborts_compilation() {
        let mut env = full_env();
        env.ide_extensions = vec!["ms-python.python-2021.8.1105858891".parse().unwrap()];

        let err = compile(
            &env,
            &BuildSettings::default(),
            &StaticPlugins { fail: true },
            &NoShell,
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("failed to get vscode plugins"));
        assert!(message.contains("ms-python.python-2021.8.1105858891"));
    }
}
