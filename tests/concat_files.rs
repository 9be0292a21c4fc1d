// tests/concat_files.rs

use std::fs;
use std::path::{Path, PathBuf};

use readqc::fs::mock::MockFileSystem;
use readqc::fs::{FileSystem, RealFileSystem, concat_files, partial_path};

#[test]
fn fragments_are_joined_in_list_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("lane2.fq");
    let b = dir.path().join("lane1.fq");
    fs::write(&a, "@r2\nGG\n+\nII\n").unwrap();
    fs::write(&b, "@r1\nAA\n+\nII\n").unwrap();
    let dest = dir.path().join("S_R1.fastq");

    let bytes = concat_files(&RealFileSystem, &[a, b], &dest).unwrap();

    let merged = fs::read_to_string(&dest).unwrap();
    assert_eq!(merged, "@r2\nGG\n+\nII\n@r1\nAA\n+\nII\n");
    assert_eq!(bytes, merged.len() as u64);
    assert!(!partial_path(&dest).exists());
}

#[test]
fn missing_fragment_leaves_no_output_behind() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.fq");
    fs::write(&a, "data").unwrap();
    let dest = dir.path().join("out.fastq");

    let result = concat_files(&RealFileSystem, &[a, dir.path().join("gone.fq")], &dest);

    assert!(result.is_err());
    assert!(!dest.exists());
    assert!(!partial_path(&dest).exists());
}

#[test]
fn empty_source_list_is_an_error() {
    let fs = MockFileSystem::new();
    assert!(concat_files(&fs, &[], Path::new("/mock/out.fastq")).is_err());
}

#[test]
fn works_against_the_mock_filesystem() {
    let fs = MockFileSystem::new();
    fs.add_file("/raw/a", "AAA");
    fs.add_file("/raw/b", "BBB");
    fs.add_dir("/w/S/trimming_results");
    let dest = PathBuf::from("/w/S/trimming_results/S_R1.fastq");

    concat_files(
        &fs,
        &[PathBuf::from("/raw/b"), PathBuf::from("/raw/a")],
        &dest,
    )
    .unwrap();

    assert_eq!(fs.contents(&dest).unwrap(), b"BBBAAA");
    assert!(!fs.exists(&partial_path(&dest)));
}

#[test]
fn unwritable_destination_fails_cleanly() {
    let fs = MockFileSystem::new();
    fs.add_file("/raw/a", "AAA");
    fs.add_dir("/locked");
    fs.deny_writes_under("/locked");

    let dest = Path::new("/locked/out.fastq");
    assert!(concat_files(&fs, &[PathBuf::from("/raw/a")], dest).is_err());
    assert!(!fs.exists(dest));
}

#[test]
fn partial_path_is_a_sibling() {
    assert_eq!(
        partial_path(Path::new("/w/S_R1.fastq")),
        PathBuf::from("/w/S_R1.fastq.partial")
    );
}
