use assert_cmd::Command;
use predicates::prelude::*;
use rstest::*;
use serial_test::serial;
use tempfile::TempDir;

struct Shelf {
    _dir: TempDir,
    db: String,
}

#[fixture]
fn shelf() -> Shelf {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("linkshelf.db").to_string_lossy().to_string();
    Command::cargo_bin("linkshelf")
        .unwrap()
        .args(["create-db", &db])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database created"));
    Shelf { _dir: dir, db }
}

fn linkshelf(shelf: &Shelf) -> Command {
    let mut cmd = Command::cargo_bin("linkshelf").unwrap();
    cmd.env("LINKSHELF_DB_URL", &shelf.db)
        .env("LINKSHELF_USER_ID", "cli-user")
        .env("LINKSHELF_USER_NAME", "Grace Hopper")
        .arg("--no-color");
    cmd
}

#[rstest]
#[serial]
fn given_new_database_when_add_and_list_then_bookmark_shown(shelf: Shelf) {
    linkshelf(&shelf)
        .args(["add", "Rust", "https://www.rust-lang.org"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Bookmark added successfully!"));

    linkshelf(&shelf)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi Grace!"))
        .stdout(predicate::str::contains("Your bookmarks (1 bookmark)"))
        .stdout(predicate::str::contains("https://www.rust-lang.org"));
}

#[rstest]
#[serial]
fn given_bookmark_when_list_json_then_rows_with_favicon(shelf: Shelf) {
    linkshelf(&shelf)
        .args(["add", "Docs", "https://docs.rs"])
        .assert()
        .success();

    linkshelf(&shelf)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Docs\""))
        .stdout(predicate::str::contains("domain=docs.rs&sz=32"));
}

#[rstest]
#[serial]
fn given_malformed_url_when_add_then_usage_exit_and_toast(shelf: Shelf) {
    linkshelf(&shelf)
        .args(["add", "Broken", "not a url"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Please enter a valid URL"));

    linkshelf(&shelf)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No bookmarks yet"));
}

#[rstest]
#[serial]
fn given_bookmark_when_delete_with_yes_then_list_empty(shelf: Shelf) {
    linkshelf(&shelf)
        .args(["add", "Gone", "https://gone.example.org"])
        .assert()
        .success();

    let output = linkshelf(&shelf).args(["list", "--json"]).output().unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = rows[0]["id"].as_str().unwrap().to_string();

    linkshelf(&shelf)
        .args(["delete", &id, "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Bookmark deleted successfully!"));

    linkshelf(&shelf)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No bookmarks yet"));
}

#[rstest]
#[serial]
fn given_declined_confirmation_when_delete_then_aborted_and_kept(shelf: Shelf) {
    linkshelf(&shelf)
        .args(["add", "Keep", "https://keep.example.org"])
        .assert()
        .success();

    let output = linkshelf(&shelf).args(["list", "--json"]).output().unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = rows[0]["id"].as_str().unwrap().to_string();

    linkshelf(&shelf)
        .args(["delete", &id])
        .write_stdin("n\n")
        .assert()
        .code(130)
        .stderr(predicate::str::contains("Are you sure you want to delete this bookmark?"));

    linkshelf(&shelf)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep"));
}

#[rstest]
#[serial]
fn given_other_users_bookmark_when_list_then_not_visible(shelf: Shelf) {
    linkshelf(&shelf)
        .env("LINKSHELF_USER_ID", "someone-else")
        .args(["add", "Private", "https://private.example.org"])
        .assert()
        .success();

    linkshelf(&shelf)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Private").not());
}

#[test]
#[serial]
fn given_missing_database_when_list_then_hint_to_create_db() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("linkshelf")
        .unwrap()
        .env("LINKSHELF_DB_URL", dir.path().join("absent.db"))
        .args(["--no-color", "list"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("create-db"));
}

#[test]
fn given_generate_config_flag_when_run_then_toml_printed() {
    Command::cargo_bin("linkshelf")
        .unwrap()
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("poll_interval_ms = 500"))
        .stdout(predicate::str::contains("[favicon]"));
}

#[test]
fn given_bash_when_completion_then_script_on_stdout() {
    Command::cargo_bin("linkshelf")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linkshelf"));
}
