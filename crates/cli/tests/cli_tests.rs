//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("glean")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_file_input() {
    let json = stdout_json(&["-k", "flood", &get_fixture_path("news_front_page.html")]);

    assert_eq!(json["matched"], true);
    assert_eq!(json["heading"], "River flood closes bridge");
    assert_eq!(json["total_keywords_matched"], 3);
    assert!(json["cleanText"].is_string());
}

#[test]
fn test_cli_stdin_input() {
    cmd()
        .args(["-k", "rain", "--threshold", "2", "-"])
        .write_stdin("<article><h1>Rain</h1><p>rain rain rain</p></article>")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_keywords_matched\":3"));
}

#[test]
fn test_cli_stdin_is_default_input() {
    cmd()
        .args(["-k", "rain"])
        .write_stdin("<div>rain</div>")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\":true"));
}

#[test]
fn test_cli_all_matches() {
    let json = stdout_json(&[
        "--all",
        "--threshold",
        "1",
        "-k",
        "flood,storm",
        "--base-url",
        "https://coastal.example/",
        &get_fixture_path("news_front_page.html"),
    ]);

    assert_eq!(json["total_matched_articles"], 2);
    assert_eq!(json["total_keywords_matched"], 5);
    assert_eq!(json["matches"][0]["article_url"], "https://coastal.example/2024/03/03/river-flood");
    assert_eq!(json["matches"][1]["date"], "2024-02-28");
}

#[test]
fn test_cli_snippet_limits() {
    let json = stdout_json(&["-k", "flood", "--chars", "20", &get_fixture_path("news_front_page.html")]);
    assert!(json["article_context"].as_str().unwrap().chars().count() <= 20);

    let json = stdout_json(&["-k", "flood", "--words", "3", &get_fixture_path("news_front_page.html")]);
    assert_eq!(json["article_context"], "By Staff Writer");

    cmd()
        .args(["-k", "flood", "--words", "3", "--chars", "20", &get_fixture_path("news_front_page.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_date_flag() {
    let json = stdout_json(&["-k", "flood", "--date", &get_fixture_path("news_front_page.html")]);
    assert_eq!(json["date"], "2024-03-03");
}

#[test]
fn test_cli_semantic_policy() {
    let json = stdout_json(&["-k", "revenue", "--semantic", &get_fixture_path("section_layout.html")]);
    assert_eq!(json["matched"], false);

    let json = stdout_json(&["-k", "revenue", &get_fixture_path("section_layout.html")]);
    assert_eq!(json["heading"], "Summary");
}

#[test]
fn test_cli_clean_mode() {
    cmd()
        .args(["--clean", &get_fixture_path("section_layout.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Summary\n"))
        .stdout(predicate::str::contains("document.write").not());
}

#[test]
fn test_cli_pretty_output() {
    cmd()
        .args(["-k", "wind", "--pretty", &get_fixture_path("div_soup.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"matched\": true"));
}

#[test]
fn test_cli_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("result.json");

    cmd()
        .args([
            "-k",
            "flood",
            "-o",
            output_path.to_str().unwrap(),
            &get_fixture_path("news_front_page.html"),
        ])
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["matched"], true);
}

#[test]
fn test_cli_verbose_mode() {
    cmd()
        .args(["-k", "flood", "-v", &get_fixture_path("news_front_page.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Match Summary"))
        .stderr(predicate::str::contains("[1/3]"));
}

#[test]
fn test_cli_requires_keywords() {
    cmd()
        .arg(get_fixture_path("news_front_page.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--keyword"));
}

#[test]
fn test_cli_invalid_file() {
    cmd()
        .args(["-k", "flood", "nonexistent_file.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_empty_document() {
    cmd()
        .args(["-k", "flood", "-"])
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("document is empty"));
}

#[test]
fn test_cli_zero_threshold() {
    cmd()
        .args(["-k", "flood", "--threshold", "0", &get_fixture_path("news_front_page.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn test_cli_invalid_base_url() {
    cmd()
        .args(["-k", "flood", "--base-url", "not a url", &get_fixture_path("news_front_page.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid base URL"));
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("keywords"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}
