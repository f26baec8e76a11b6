//! End-to-end tests for the `wikimark` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn wikimark_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wikimark"))
}

fn run(args: &[&str]) -> Output {
    Command::new(wikimark_bin())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run wikimark")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn init_then_build_writes_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let wiki = dir.path().join("notes");
    let out = dir.path().join("site");

    assert!(run(&["init", path_str(&wiki), "--quiet"]).status.success());
    let output = run(&["build", path_str(&wiki), "--out", path_str(&out), "--quiet"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let front = fs::read_to_string(out.join("FrontPage.html")).unwrap();
    assert!(front.starts_with("<?xml"), "{front}");
    assert!(front.contains("<h1>Welcome to notes</h1>"), "{front}");
    assert!(front.contains("href=\"SiteMap.html\""), "{front}");
    assert!(front.contains("NewPage<a class=\"nonexistent\""), "{front}");

    let site_map = fs::read_to_string(out.join("SiteMap.html")).unwrap();
    assert!(site_map.contains("Tree of pages, starting from"), "{site_map}");
    assert!(site_map.contains("Wanted pages"), "{site_map}");
}

#[test]
fn second_build_leaves_outputs_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("site");
    fs::write(dir.path().join("FrontPage"), "Hello OtherPage").unwrap();
    fs::write(dir.path().join("OtherPage"), "Back to FrontPage").unwrap();

    let first = run(&["build", path_str(dir.path()), "--out", path_str(&out)]);
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("3 created"));

    let second = run(&["build", path_str(dir.path()), "--out", path_str(&out)]);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("3 unchanged"), "{stdout}");
    assert!(!stdout.contains("created"), "{stdout}");
}

#[test]
fn render_prints_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("FrontPage");
    fs::write(&page, "''hi'' there").unwrap();

    let output = run(&["render", path_str(&page)]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "\n<p><em>hi</em> there</p>\n"
    );
}

#[test]
fn render_plain_flag_disables_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("FrontPage");
    fs::write(&page, "see http://example.com/").unwrap();

    let numbered = run(&["render", path_str(&page)]);
    assert!(String::from_utf8_lossy(&numbered.stdout).contains(">[1]</a>"));

    let plain = run(&["render", path_str(&page), "--plain", "--follow"]);
    let stdout = String::from_utf8_lossy(&plain.stdout);
    assert!(stdout.contains(">http://example.com/</a>"), "{stdout}");
    assert!(!stdout.contains("nofollow"), "{stdout}");
}

#[test]
fn check_fails_on_file_that_is_not_a_page() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("FrontPage");
    let bad = dir.path().join("notes.txt");
    fs::write(&good, "fine").unwrap();
    fs::write(&bad, "fine").unwrap();

    let ok = run(&["check", path_str(&good)]);
    assert!(ok.status.success());
    assert!(String::from_utf8_lossy(&ok.stdout).contains("OK"));

    let failed = run(&["check", path_str(&good), path_str(&bad)]);
    assert!(!failed.status.success());
    assert!(String::from_utf8_lossy(&failed.stdout).contains("[E001]"));
}
