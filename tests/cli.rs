mod elastic;

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::{crate_name, Command};
use tempfile::TempDir;
use test_log::test;

use crate::elastic::server::ElasticServer;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(crate_name!()).unwrap();
    cmd.env_remove("ELASTIC_URL")
        .env_remove("WIKI_ELASTIC_MAX_CONCURRENCY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn index_config(dir: &Path, bulk_size: usize) -> PathBuf {
    write_file(dir, "settings.json", r#"{"analysis": {"analyzer": {}}}"#);
    write_file(
        dir,
        "mapping.json",
        r#"{"properties": {"title": {"type": "text"}, "text": {"type": "text"}}}"#,
    );
    write_file(
        dir,
        "index.json",
        &format!(
            r#"{{
                "indexName": "enwiki",
                "settingFile": "settings.json",
                "mappingFile": "mapping.json",
                "insertBulkSize": {bulk_size}
            }}"#
        ),
    )
}

fn pages_file(dir: &Path) -> PathBuf {
    write_file(
        dir,
        "pages.jsonl",
        r#"{"id": 12, "title": "Anarchism", "text": "Anarchism is..."}
{"id": 25, "title": "Autism", "text": "Autism is..."}
{"id": 0, "title": "Invalid"}

{"id": 39, "title": "Albedo", "text": "Albedo is..."}
"#,
    )
}

mod help {
    use super::*;
    use test_log::test;

    #[test]
    fn test_create_index_help() {
        cmd().arg("create-index").arg("--help").assert().success();
    }

    #[test]
    fn test_delete_index_help() {
        cmd().arg("delete-index").arg("--help").assert().success();
    }

    #[test]
    fn test_index_help() {
        cmd().arg("index").arg("--help").assert().success();
    }

    #[test]
    fn test_exists_help() {
        cmd().arg("exists").arg("--help").assert().success();
    }

    #[test]
    fn test_invalid_max_concurrency() {
        cmd()
            .args(["--max-concurrency", "0", "delete-index", "enwiki"])
            .assert()
            .failure();
    }
}

// The mock server runs on its own thread, so blocking on the command is fine
// as long as other workers are available.
#[test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_index_pages() {
    let server = ElasticServer::new().await;
    let dir = TempDir::new().unwrap();
    let config = index_config(dir.path(), 2);
    let pages = pages_file(dir.path());

    cmd()
        .arg("--url")
        .arg(server.url())
        .arg("index")
        .arg(&config)
        .arg(&pages)
        .arg("--recreate")
        .assert()
        .success();

    assert!(server.has_index("enwiki"));
    assert_eq!(3, server.document_count("enwiki"));
    assert!(server.document("enwiki", "25").is_some());

    cmd()
        .args(["--url", &server.url(), "exists", "enwiki", "39"])
        .assert()
        .success()
        .stdout("true\n");
    cmd()
        .args(["--url", &server.url(), "exists", "enwiki", "40"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_index_pages_one_by_one() {
    let server = ElasticServer::new().await;
    let dir = TempDir::new().unwrap();
    let config = index_config(dir.path(), 10);
    let pages = pages_file(dir.path());

    cmd()
        .args(["--url", &server.url(), "create-index"])
        .arg(&config)
        .assert()
        .success();
    cmd()
        .args(["--url", &server.url(), "index", "--bulk-size", "1"])
        .arg(&config)
        .arg(&pages)
        .assert()
        .success();

    assert_eq!(3, server.document_count("enwiki"));
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_delete_index() {
    let server = ElasticServer::new().await;
    server.add_index("enwiki");

    cmd()
        .args(["--url", &server.url(), "delete-index", "enwiki"])
        .assert()
        .success();
    assert!(!server.has_index("enwiki"));

    // Deleting a missing index is not an error.
    cmd()
        .args(["--url", &server.url(), "delete-index", "enwiki"])
        .assert()
        .success();
}

#[test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_create_existing_index_fails() {
    let server = ElasticServer::new().await;
    server.add_index("enwiki");
    let dir = TempDir::new().unwrap();
    let config = index_config(dir.path(), 10);

    cmd()
        .args(["--url", &server.url(), "create-index"])
        .arg(&config)
        .assert()
        .failure();
}
