//! Binary-level tests for `lobe-export`.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{ImageFormat, Rgb, RgbImage};
use rusqlite::Connection;
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE examples (example_id TEXT PRIMARY KEY);
    CREATE TABLE example_images (example_id TEXT, hash TEXT, metadata TEXT);
    CREATE TABLE example_labels (example_id TEXT, label TEXT, modified TEXT);
    CREATE TABLE example_metrics (example_id TEXT, accuracy REAL);
";

/// `(example_id, content_hash, label, modified)`
const EXAMPLES: [(&str, &str, &str, &str); 3] = [
    ("1", "a1", "cat", "2024-01-01T00:00:00Z"),
    ("2", "b2", "dog", "2024-01-02T00:00:00Z"),
    ("3", "c3", "cat", "2024-01-03T00:00:00Z"),
];

/// Build `<root>/projects/<id>` with a database and a PNG blob per example.
fn create_project(root: &Path, id: &str) -> PathBuf {
    let projects = root.join("projects");
    let project = projects.join(id);
    let blobs = project.join("data").join("blobs");
    fs::create_dir_all(&blobs).unwrap();

    let conn = Connection::open(project.join("db.sqlite")).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    for (i, (example_id, hash, label, modified)) in EXAMPLES.iter().enumerate() {
        conn.execute("INSERT INTO examples VALUES (?1)", [example_id])
            .unwrap();
        let metadata = format!(r#"{{"filename":"{hash}.png"}}"#);
        conn.execute(
            "INSERT INTO example_images VALUES (?1, ?2, ?3)",
            [*example_id, *hash, metadata.as_str()],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO example_labels VALUES (?1, ?2, ?3)",
            [example_id, label, modified],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO example_metrics VALUES (?1, 0.5)",
            [example_id],
        )
        .unwrap();

        let seed = u8::try_from(i).unwrap() * 60;
        let image = RgbImage::from_fn(32, 32, |x, y| {
            let x = u8::try_from(x * 8).unwrap();
            let y = u8::try_from(y * 8).unwrap();
            Rgb([x.wrapping_add(seed), y, x ^ y])
        });
        image
            .save_with_format(blobs.join(hash), ImageFormat::Png)
            .unwrap();
    }

    projects
}

fn lobe_export(projects: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lobe-export").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--projects-dir")
        .arg(projects)
        .arg("--no-color");
    cmd
}

#[test]
fn test_export_copies_and_writes_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let projects = create_project(temp_dir.path(), "pets");
    let out = temp_dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let output = lobe_export(&projects)
        .args(["--json", "export", "--project", "pets", "--phash", "--workers", "2", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["project"], "pets");
    assert_eq!(summary["records"], 3);
    assert_eq!(summary["fingerprints"], 3);
    assert_eq!(summary["copy"]["copied"], 3);
    assert!(summary["exported_at"].is_string());

    assert!(out.join("cat").join("a1.jpg").is_file());
    assert!(out.join("dog").join("b2.jpg").is_file());
    assert!(out.join("cat").join("c3.jpg").is_file());

    let manifest = fs::read_to_string(out.join("lobe-pets.csv")).unwrap();
    let lines: Vec<_> = manifest.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "example_id,content_hash,filename,label,date,accuracy,phash");
    assert!(lines[1].starts_with("1,a1,a1.png,cat,2024-01-01T00:00:00Z,0.5,"));
}

#[test]
fn test_export_to_file_target_fails_with_validation_code() {
    let temp_dir = TempDir::new().unwrap();
    let projects = create_project(temp_dir.path(), "pets");
    let file = temp_dir.path().join("not-a-dir");
    fs::write(&file, "").unwrap();

    lobe_export(&projects)
        .args(["export", "--project", "pets", "-o"])
        .arg(&file)
        .assert()
        .code(4);

    assert_eq!(fs::read_to_string(&file).unwrap(), "");
    assert!(!temp_dir.path().join("lobe-pets.csv").exists());
}

#[test]
fn test_missing_blob_aborts_with_not_found_code() {
    let temp_dir = TempDir::new().unwrap();
    let projects = create_project(temp_dir.path(), "pets");
    fs::remove_file(projects.join("pets").join("data").join("blobs").join("b2")).unwrap();
    let out = temp_dir.path().join("out");
    fs::create_dir(&out).unwrap();

    lobe_export(&projects)
        .args(["export", "--project", "pets", "-o"])
        .arg(&out)
        .assert()
        .code(3);
    assert!(out.join("cat").join("a1.jpg").is_file());
    assert!(!out.join("lobe-pets.csv").exists());

    lobe_export(&projects)
        .args(["export", "--project", "pets", "--skip-missing", "-o"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("cat").join("c3.jpg").is_file());
    let manifest = fs::read_to_string(out.join("lobe-pets.csv")).unwrap();
    assert_eq!(manifest.lines().count(), 4);
}

#[test]
fn test_in_place_writes_manifest_to_current_dir() {
    let temp_dir = TempDir::new().unwrap();
    let projects = create_project(temp_dir.path(), "pets");
    let cwd = temp_dir.path().join("cwd");
    fs::create_dir(&cwd).unwrap();

    lobe_export(&projects)
        .current_dir(&cwd)
        .args(["-q", "export", "--project", "pets", "--in-place"])
        .assert()
        .success();

    assert!(cwd.join("lobe-pets_export.csv").is_file());
    assert_eq!(fs::read_dir(&cwd).unwrap().count(), 1);
}

#[test]
fn test_unknown_project_lists_known_ones() {
    let temp_dir = TempDir::new().unwrap();
    let projects = create_project(temp_dir.path(), "pets");
    let out = temp_dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let output = lobe_export(&projects)
        .args(["--json", "export", "--project", "birds", "-o"])
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let error: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "PROJECT_NOT_FOUND");
    assert!(error["error"]["hint"].as_str().unwrap().contains("pets"));
}

#[test]
fn test_projects_and_labels() {
    let temp_dir = TempDir::new().unwrap();
    let projects = create_project(temp_dir.path(), "pets");

    let output = lobe_export(&projects)
        .args(["--json", "projects"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["projects"][0]["id"], "pets");
    assert_eq!(listing["projects"][0]["blob_count"], 3);
    assert_eq!(listing["projects"][0]["has_database"], true);

    let output = lobe_export(&projects)
        .args(["--json", "labels", "--project", "pets"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let labels: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(labels["total"], 3);
    assert_eq!(labels["labels"][0]["label"], "cat");
    assert_eq!(labels["labels"][0]["count"], 2);
    assert_eq!(labels["labels"][1]["label"], "dog");
}

#[test]
fn test_version_json() {
    let output = Command::cargo_bin("lobe-export")
        .unwrap()
        .args(["--json", "version"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert!(info["sqlite"].as_str().unwrap().starts_with('3'));
}
