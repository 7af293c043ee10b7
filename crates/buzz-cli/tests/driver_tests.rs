use buzz_cli::args::{CliArgs, Command};
use buzz_cli::driver;
use clap::Parser;
use std::path::Path;

fn run(command: &[&str]) -> i32 {
    let args = CliArgs::try_parse_from(command).unwrap();
    driver::run(args).unwrap()
}

fn write_script(dir: &Path, name: &str, source: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path.display().to_string()
}

#[test]
fn check_reports_success_for_valid_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "ok.buzz", "num a = 1;\n");
    assert_eq!(run(&["buzz", "check", &script]), 0);
}

#[test]
fn check_reports_failure_for_invalid_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "bad.buzz", "num a = ;\n");
    assert_eq!(run(&["buzz", "check", &script]), 1);
}

#[test]
fn ast_exits_cleanly_when_parse_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "main.buzz",
        "fun main([str] args) > num { return 0; }\n",
    );
    assert_eq!(run(&["buzz", "ast", &script]), 0);
}

#[test]
fn check_follows_the_search_path_for_imports() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "lib.buzz", "export fun hello() > void {}\n");
    let script = write_script(
        dir.path(),
        "main.buzz",
        "import \"lib\"; fun f() > void { hello(); }\n",
    );
    let buzz_path = dir.path().display().to_string();
    assert_eq!(
        run(&["buzz", "check", &script, "--buzz-path", &buzz_path]),
        0
    );
}
