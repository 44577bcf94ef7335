use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::tempdir;

fn cube_updater() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("cube-updater"));
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("CUBE_UPDATER_REPO")
        .env_remove("CUBE_UPDATER_ROOT")
        .env_remove("CUBE_UPDATER_API_URL");
    cmd
}

fn release_json(id: u64, name: &str, tag: &str) -> String {
    format!(
        r#"{{
            "id": {id},
            "name": "{name}",
            "tag_name": "{tag}",
            "body": "Release notes for {tag}",
            "created_at": "2024-01-07T12:00:00Z"
        }}"#
    )
}

#[test]
fn test_help_lists_options() {
    cube_updater()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--repo"))
        .stdout(predicate::str::contains("--api-url"))
        .stdout(predicate::str::contains("--root"));
}

#[test]
fn test_invalid_repository_fails() {
    cube_updater()
        .args(["--repo", "not-a-repo"])
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid repository"));
}

#[test]
fn test_end_to_end_download() {
    let mut server = Server::new();
    let root = tempdir().unwrap();

    let releases = server
        .mock("GET", "/api/v3/repos/owner/repo/releases?per_page=100")
        .match_header("accept", "application/vnd.github.v3+json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            "[{}, {}]",
            release_json(2, "Autobuild 2024-01-07", "weekly-2024-01-07"),
            release_json(1, "Version 1", "v1")
        ))
        .expect(1)
        .create();

    let weekly_assets = server
        .mock("GET", "/api/v3/repos/owner/repo/releases/2/assets?per_page=100")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 20, "name": "weekly.zip", "size": 7}]"#)
        .create();

    let stable_assets = server
        .mock("GET", "/api/v3/repos/owner/repo/releases/1/assets?per_page=100")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 10, "name": "cube.zip", "size": 12}]"#)
        .create();

    let download = server
        .mock("GET", "/api/v3/repos/owner/repo/releases/assets/10")
        .match_header("accept", "application/octet-stream")
        .with_status(200)
        .with_body("cube archive")
        .expect(1)
        .create();

    cube_updater()
        .args(["--repo", "owner/repo", "--api-url", &server.url()])
        .arg("--root")
        .arg(root.path())
        .write_stdin("0\nd\ny\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 release(s)"))
        .stdout(predicate::str::contains("[0] Version 1 (v1)"))
        .stdout(predicate::str::contains("Release notes for v1"))
        .stdout(predicate::str::contains("Downloaded 1 file(s) (12 B)"));

    releases.assert();
    weekly_assets.assert();
    stable_assets.assert();
    download.assert();

    let file = root.path().join("Descargas").join("v1").join("cube.zip");
    assert_eq!(std::fs::read_to_string(file).unwrap(), "cube archive");
}

#[test]
fn test_weekly_download_goes_to_weekly_folder() {
    let mut server = Server::new();
    let root = tempdir().unwrap();

    let _releases = server
        .mock("GET", "/api/v3/repos/owner/repo/releases?per_page=100")
        .with_status(200)
        .with_body(format!(
            "[{}]",
            release_json(2, "Autobuild 2024-01-07", "weekly-2024-01-07")
        ))
        .create();
    let _assets = server
        .mock("GET", "/api/v3/repos/owner/repo/releases/2/assets?per_page=100")
        .with_status(200)
        .with_body(r#"[{"id": 20, "name": "weekly.zip", "size": 7}]"#)
        .create();
    let _download = server
        .mock("GET", "/api/v3/repos/owner/repo/releases/assets/20")
        .with_status(200)
        .with_body("weekly!")
        .create();

    cube_updater()
        .args(["--repo", "owner/repo", "--api-url", &server.url()])
        .arg("--root")
        .arg(root.path())
        .write_stdin("w\n0\nd\ny\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(weekly builds shown)"));

    let file = root
        .path()
        .join("Descargas")
        .join("Weekly")
        .join("weekly-2024-01-07")
        .join("weekly.zip");
    assert_eq!(std::fs::read_to_string(file).unwrap(), "weekly!");
}

#[test]
fn test_load_failure_is_reported() {
    let mut server = Server::new();

    let _releases = server
        .mock("GET", "/api/v3/repos/owner/repo/releases?per_page=100")
        .with_status(500)
        .create();

    cube_updater()
        .args(["--repo", "owner/repo", "--api-url", &server.url()])
        .args(["--root", "."])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to load releases"))
        .stdout(predicate::str::contains("500"))
        .stdout(predicate::str::contains("(no releases)"));
}

#[test]
fn test_github_token_is_sent() {
    let mut server = Server::new();

    let releases = server
        .mock("GET", "/api/v3/repos/owner/repo/releases?per_page=100")
        .match_header("authorization", "Bearer secret-token-value")
        .match_header("user-agent", Matcher::Regex("cube-updater".into()))
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create();

    cube_updater()
        .env("GITHUB_TOKEN", "secret-token-value")
        .args(["--repo", "owner/repo", "--api-url", &server.url()])
        .args(["--root", "."])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 0 release(s)"));

    releases.assert();
}
