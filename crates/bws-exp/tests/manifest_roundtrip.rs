use std::fs;

use bws_exp::{
    hash_files, manifest_path_for, read_manifest, stable_hash_string, write_manifest,
    ManifestBuilder,
};
use tempfile::tempdir;

#[test]
fn manifests_survive_a_file_round_trip() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("items.txt");
    fs::write(&input, "apple\npear\nplum\n").expect("write input");
    let artefact = dir.path().join("design.csv");
    let output = b"option1,option2\napple,pear\n";
    fs::write(&artefact, output).expect("write artefact");

    let manifest = ManifestBuilder::new("generate")
        .input_hash(hash_files(&[&input]).expect("hash"))
        .seed(Some(42))
        .parameter("strategy", "norepeateven")
        .parameter("k", 2)
        .finish(output);
    let path = manifest_path_for(&artefact);
    write_manifest(&path, &manifest).expect("write manifest");

    let restored = read_manifest(&path).expect("read manifest");
    assert_eq!(restored, manifest);
    assert_eq!(restored.seed, Some(42));
    assert!(path.to_string_lossy().ends_with("design.csv.manifest.json"));
}

#[test]
fn file_hashes_depend_on_boundaries() {
    let dir = tempdir().expect("tempdir");
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    fs::write(&a, "x,y").expect("write");
    fs::write(&b, "z").expect("write");
    let split = hash_files(&[&a, &b]).expect("hash");

    fs::write(&a, "x,").expect("write");
    fs::write(&b, "yz").expect("write");
    assert_ne!(split, hash_files(&[&a, &b]).expect("hash"));
}

#[test]
fn stable_hashes_ignore_field_order() {
    let left = serde_json::json!({"k": 4, "strategy": "even"});
    let right = serde_json::json!({"strategy": "even", "k": 4});
    assert_eq!(
        stable_hash_string(&left).expect("hash"),
        stable_hash_string(&right).expect("hash")
    );
}
