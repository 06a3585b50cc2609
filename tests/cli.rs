use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn physbox_cmd() -> Command {
    Command::cargo_bin("physbox").expect("binary exists")
}

#[test]
fn physbox_help_prints_usage() {
    physbox_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Draw shapes into a live 2D rigid-body simulation",
        ));
}

#[test]
fn tools_lists_every_tool_in_order() {
    physbox_cmd()
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("magicpen\ncircle\n"))
        .stdout(predicate::str::contains("destroy"));
}

#[test]
fn run_requires_script() {
    physbox_cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn run_renders_script_to_png() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("scene.toml");
    let output = temp.path().join("scene.png");
    let world = temp.path().join("scene.json.gz");
    std::fs::write(
        &script,
        r#"
frames = 4

[[at]]
frame = 0
events = [
  { event = "tool", name = "triangle" },
  { event = "down", x = 100, y = 150 },
  { event = "up", x = 100, y = 60 },
]
"#,
    )
    .unwrap();

    physbox_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["run", "--no-throttle", "--width", "320", "--height", "240"])
        .arg("--script")
        .arg(&script)
        .arg("--output")
        .arg(&output)
        .arg("--save-world")
        .arg(&world)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 4 frame(s)"))
        .stdout(predicate::str::contains("2 bodies"));

    let png = std::fs::read(&output).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    assert!(world.exists());
}

#[test]
fn run_rejects_unknown_tool_in_script() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("bad.toml");
    std::fs::write(
        &script,
        "[[at]]\nframe = 0\nevents = [{ event = \"tool\", name = \"hammer\" }]\n",
    )
    .unwrap();

    physbox_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("run")
        .arg("--script")
        .arg(&script)
        .arg("--output")
        .arg(temp.path().join("never.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tool 'hammer'"));
}

#[test]
fn init_config_writes_once() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("physbox").join("config.toml");

    physbox_cmd()
        .arg("--config")
        .arg(&path)
        .arg("init-config")
        .assert()
        .success();
    assert!(path.exists());

    physbox_cmd()
        .arg("--config")
        .arg(&path)
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
