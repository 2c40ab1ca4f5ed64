// Archive extraction for both distribution formats


use gosdk::ErrorKind;
use gosdk::extract::{self, ArchiveFormat};
use gosdk::Sdk;
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use test_helpers::{Entry, TestEnvironment};
use walkdir::WalkDir;

fn distribution() -> Vec<Entry> {
    vec![
        Entry::dir("go/"),
        Entry::dir("go/bin/"),
        Entry::file("go/bin/go", 0o755, b"#!/bin/sh\necho hi\n"),
        Entry::dir("go/src/"),
        Entry::dir("go/src/fmt/"),
        Entry::file("go/src/fmt/print.go", 0o644, b"package fmt\n"),
        Entry::file("go/VERSION", 0o644, b"go1.21.5\n"),
    ]
}

fn write_archive(env: &TestEnvironment, name: &str, bytes: Vec<u8>) -> PathBuf {
    let path = env.base.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn relative_tree(root: &Path) -> Vec<String> {
    let mut entries: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| {
            e.unwrap()
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    entries.sort();
    entries
}

fn expected_tree() -> Vec<String> {
    let mut expected: Vec<String> = [
        "VERSION",
        "bin",
        "bin/go",
        "src",
        "src/fmt",
        "src/fmt/print.go",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    expected.sort();
    expected
}

fn assert_extracted(root: &Path) {
    assert_eq!(relative_tree(root), expected_tree());
    assert!(!root.join("go").exists());
    assert_eq!(fs::read(root.join("bin/go")).unwrap(), b"#!/bin/sh\necho hi\n");
    assert_eq!(
        fs::read_to_string(root.join("src/fmt/print.go")).unwrap(),
        "package fmt\n"
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = |p: &str| fs::metadata(root.join(p)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode("bin/go"), 0o755);
        assert_eq!(mode("VERSION") & 0o111, 0);
    }
}

#[test]
fn test_extract_tar_gz() {
    let env = TestEnvironment::new();
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&distribution()));
    let root = env.base.join("sdk");

    extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap();
    assert_extracted(&root);
}

#[test]
fn test_extract_zip() {
    let env = TestEnvironment::new();
    let archive = write_archive(&env, "go.zip", test_helpers::zip(&distribution()));
    let root = env.base.join("sdk");

    extract::extract_to(&archive, &root, ArchiveFormat::Zip).unwrap();
    assert_extracted(&root);
}

#[test]
fn test_format_follows_target_os() {
    let env = TestEnvironment::new();
    let archive = write_archive(&env, "go.zip", test_helpers::zip(&distribution()));
    let sdk = Sdk {
        version: Version::new(1, 21, 5),
        os: "windows".to_string(),
        arch: "amd64".to_string(),
        root: env.base.join("windows-sdk"),
        binary: env.base.join("windows-sdk/bin/go.exe"),
    };

    extract::extract(&archive, &sdk).unwrap();
    assert!(sdk.root.join("bin/go").exists());
}

#[test]
fn test_extract_is_idempotent() {
    let env = TestEnvironment::new();
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&distribution()));
    let root = env.base.join("sdk");

    extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap();
    fs::write(root.join("VERSION"), "stale").unwrap();
    extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap();

    assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "go1.21.5\n");
}

#[test]
fn test_extract_creates_missing_parents() {
    let env = TestEnvironment::new();
    let entries = vec![Entry::file("go/pkg/tool/linux_amd64/vet", 0o755, b"vet")];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));
    let root = env.base.join("sdk");

    extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap();
    assert_eq!(fs::read(root.join("pkg/tool/linux_amd64/vet")).unwrap(), b"vet");
}

#[test]
fn test_wrong_format_is_an_error() {
    let env = TestEnvironment::new();
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&distribution()));

    let err = extract::extract_to(&archive, &env.base.join("sdk"), ArchiveFormat::Zip).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
}

#[test]
fn test_missing_archive() {
    let env = TestEnvironment::new();
    let err = extract::extract_to(
        &env.base.join("nope.tar.gz"),
        &env.base.join("sdk"),
        ArchiveFormat::TarGz,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_special_entries_are_skipped() {
    let env = TestEnvironment::new();
    let entries = vec![
        Entry::dir("go/"),
        Entry::fifo("go/pipe"),
        Entry::file("go/VERSION", 0o644, b"go1.21.5\n"),
    ];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));
    let root = env.base.join("sdk");

    extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap();
    assert!(fs::symlink_metadata(root.join("pipe")).is_err());
    assert!(root.join("VERSION").exists());
}

#[test]
fn test_parent_dir_entry_is_rejected() {
    let env = TestEnvironment::new();
    let entries = vec![Entry::file("go/../escaped", 0o644, b"x")];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));

    let err = extract::extract_to(&archive, &env.base.join("sdk"), ArchiveFormat::TarGz)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(!env.base.join("escaped").exists());
}

#[test]
fn test_parent_dir_entry_is_rejected_in_zip() {
    let env = TestEnvironment::new();
    let entries = vec![Entry::file("go/../escaped", 0o644, b"x")];
    let archive = write_archive(&env, "go.zip", test_helpers::zip(&entries));

    let err = extract::extract_to(&archive, &env.base.join("sdk"), ArchiveFormat::Zip)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(!env.base.join("escaped").exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_is_recreated() {
    let env = TestEnvironment::new();
    let entries = vec![
        Entry::dir("go/"),
        Entry::dir("go/bin/"),
        Entry::file("go/bin/go", 0o755, b"#!/bin/sh\n"),
        Entry::dir("go/misc/"),
        Entry::symlink("go/misc/go", "../bin/go"),
    ];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));
    let root = env.base.join("sdk");

    extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap();
    assert_eq!(
        fs::read_link(root.join("misc/go")).unwrap(),
        PathBuf::from("../bin/go")
    );
    assert_eq!(fs::read(root.join("misc/go")).unwrap(), b"#!/bin/sh\n");
}

#[cfg(unix)]
#[test]
fn test_absolute_symlink_is_rejected() {
    let env = TestEnvironment::new();
    let outside = env.base.join("outside");
    fs::create_dir_all(&outside).unwrap();
    let entries = vec![
        Entry::dir("go/"),
        Entry::symlink("go/escape", outside.to_str().unwrap()),
        Entry::file("go/escape/written", 0o644, b"x"),
    ];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));
    let root = env.base.join("sdk");

    let err = extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(!outside.join("written").exists());
    assert!(fs::symlink_metadata(root.join("escape")).is_err());
}

#[cfg(unix)]
#[test]
fn test_relative_symlink_out_of_root_is_rejected() {
    let env = TestEnvironment::new();
    fs::create_dir_all(env.base.join("outside")).unwrap();
    let entries = vec![
        Entry::dir("go/"),
        Entry::symlink("go/escape", "../outside"),
        Entry::file("go/escape/written", 0o644, b"x"),
    ];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));

    let err = extract::extract_to(&archive, &env.base.join("sdk"), ArchiveFormat::TarGz)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(!env.base.join("outside/written").exists());
}

#[cfg(unix)]
#[test]
fn test_existing_link_out_of_root_is_not_followed() {
    let env = TestEnvironment::new();
    let outside = env.base.join("outside");
    fs::create_dir_all(&outside).unwrap();
    let root = env.base.join("sdk");
    fs::create_dir_all(&root).unwrap();
    std::os::unix::fs::symlink(&outside, root.join("escape")).unwrap();

    let entries = vec![Entry::file("go/escape/written", 0o644, b"x")];
    let archive = write_archive(&env, "go.tar.gz", test_helpers::tar_gz(&entries));

    let err = extract::extract_to(&archive, &root, ArchiveFormat::TarGz).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(!outside.join("written").exists());

    let archive = write_archive(&env, "go.zip", test_helpers::zip(&entries));
    let err = extract::extract_to(&archive, &root, ArchiveFormat::Zip).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(!outside.join("written").exists());
}
