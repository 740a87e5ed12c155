//! End-to-end tests for the docrel binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DOCS: &str = r#"[
  {"title": "Skai TV",
   "sents": [["Skai", "TV", "is", "based", "in", "Piraeus", "."], ["It", "is", "Greek", "."]],
   "vertexSet": [
     [{"name": "Skai TV", "sent_id": 0, "pos": [0, 2], "type": "ORG"}],
     [{"name": "Piraeus", "sent_id": 0, "pos": [5, 6], "type": "LOC"}],
     [{"name": "Greek", "sent_id": 1, "pos": [2, 3], "type": "LOC"}]
   ],
   "labels": [{"h": 0, "t": 1, "r": "P159", "evidence": [0]},
              {"h": 0, "t": 2, "r": "P17", "evidence": [0, 1]}]}
]"#;

const CORRUPT: &str = r#"[
  {"title": "fine", "sents": [["a", "b"]],
   "vertexSet": [[{"sent_id": 0, "pos": [0, 1], "type": "PER"}]], "labels": []},
  {"title": "bad span", "sents": [["a", "b"]],
   "vertexSet": [[{"sent_id": 0, "pos": [1, 5], "type": "PER"}]], "labels": []},
  {"title": "bad relation", "sents": [["a", "b"]],
   "vertexSet": [[{"sent_id": 0, "pos": [0, 1], "type": "PER"}],
                 [{"sent_id": 0, "pos": [1, 2], "type": "ORG"}]],
   "labels": [{"h": 0, "t": 1, "r": "P999"}]}
]"#;

const RELATIONS: &str = r#"{"NA": 0, "P159": 1, "P17": 2}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut vocab: Vec<String> = vec!["[PAD]".into()];
        vocab.extend((1..=10).map(|i| format!("[unused{}]", i)));
        vocab.extend(
            ["[UNK]", "[CLS]", "[SEP]", "Skai", "TV", "is", "based", "in", "Piraeus", ".", "It", "Greek"]
                .iter()
                .map(|s| s.to_string()),
        );
        std::fs::write(dir.path().join("vocab.txt"), vocab.join("\n")).unwrap();
        std::fs::write(dir.path().join("docs.json"), DOCS).unwrap();
        std::fs::write(dir.path().join("corrupt.json"), CORRUPT).unwrap();
        std::fs::write(dir.path().join("rel2id.json"), RELATIONS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn docrel() -> Command {
    Command::cargo_bin("docrel").unwrap()
}

fn build(fx: &Fixture, split: &str, extra: &[&str]) -> Command {
    let mut cmd = docrel();
    cmd.arg("build")
        .arg("-i")
        .arg(fx.path("docs.json"))
        .args(["-s", split, "--max-length", "32"])
        .arg("--vocab")
        .arg(fx.path("vocab.txt"))
        .arg("-r")
        .arg(fx.path("rel2id.json"))
        .args(extra);
    cmd
}

fn lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8(stdout.to_vec())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_help_lists_commands() {
    docrel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_build_test_split() {
    let fx = Fixture::new();
    let out = build(&fx, "test", &[]).assert().success();
    let examples = lines(&out.get_output().stdout);
    assert_eq!(examples.len(), 1);

    let ex = &examples[0];
    assert_eq!(ex["title"], "Skai TV");
    assert_eq!(ex["policy"], "exhaustive_eval");
    let ids = ex["token_ids"].as_array().unwrap();
    assert_eq!(ids.len(), 32);
    // [CLS] is line 12 of the vocabulary, [unused1] line 1
    assert_eq!(ids[0], 12);
    assert_eq!(ids[1], 1);
    let mask = ex["label_mask"].as_array().unwrap();
    assert_eq!(mask.len(), 1800);
    assert_eq!(mask.iter().filter(|m| **m == 1).count(), 6);
    assert_eq!(ex["pair_ids"].as_array().unwrap().len(), 6);
}

#[test]
fn test_build_train_is_seeded() {
    let fx = Fixture::new();
    let a = build(&fx, "train", &["--seed", "3"]).assert().success();
    let b = build(&fx, "train", &["--seed", "3"]).assert().success();
    assert_eq!(a.get_output().stdout, b.get_output().stdout);

    let examples = lines(&a.get_output().stdout);
    assert_eq!(examples[0]["policy"], "training_sampled");
    // 2 positives, 4 negatives available, 3 per positive allowed
    assert_eq!(examples[0]["pair_ids"].as_array().unwrap().len(), 6);
}

#[test]
fn test_build_writes_output_file() {
    let fx = Fixture::new();
    let output = fx.path("out/valid.jsonl");
    build(&fx, "valid", &["--entity-types", "-o"])
        .arg(&output)
        .assert()
        .success();
    let content = std::fs::read_to_string(&output).unwrap();
    let ex: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(ex["entity_types"][0][0], "ORG");
}

#[test]
fn test_build_with_incomplete_scores_falls_back() {
    let fx = Fixture::new();
    let scores = fx.path("scores");
    std::fs::create_dir(&scores).unwrap();
    build(&fx, "valid", &["--scores"])
        .arg(&scores)
        .assert()
        .success()
        .stderr(predicate::str::contains("incomplete score files"));
}

#[test]
fn test_build_requires_tokenizer() {
    let fx = Fixture::new();
    docrel()
        .arg("build")
        .arg("-i")
        .arg(fx.path("docs.json"))
        .arg("-r")
        .arg(fx.path("rel2id.json"))
        .assert()
        .failure();
}

#[test]
fn test_build_fails_on_corrupt_input() {
    let fx = Fixture::new();
    docrel()
        .arg("build")
        .arg("-i")
        .arg(fx.path("corrupt.json"))
        .args(["-s", "valid", "--vocab"])
        .arg(fx.path("vocab.txt"))
        .arg("-r")
        .arg(fx.path("rel2id.json"))
        .assert()
        .failure();
}

#[test]
fn test_stats_json() {
    let fx = Fixture::new();
    let out = docrel()
        .arg("stats")
        .arg("-i")
        .arg(fx.path("docs.json"))
        .arg("-r")
        .arg(fx.path("rel2id.json"))
        .arg("--json")
        .assert()
        .success();
    let stats: serde_json::Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(stats["documents"], 1);
    assert_eq!(stats["positive_pairs"], 2);
    assert_eq!(stats["na_pairs"], 4);
}

#[test]
fn test_validate_reports_every_corrupt_document() {
    let fx = Fixture::new();
    docrel()
        .arg("validate")
        .arg("-i")
        .arg(fx.path("corrupt.json"))
        .arg("-r")
        .arg(fx.path("rel2id.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad span"))
        .stderr(predicate::str::contains("bad relation"))
        .stdout(predicate::str::contains("2 corrupt documents"));
}

#[test]
fn test_validate_clean_file() {
    let fx = Fixture::new();
    validate_ok(&fx.path("docs.json"), &fx.path("rel2id.json"));
}

fn validate_ok(input: &Path, relations: &Path) {
    docrel()
        .arg("validate")
        .arg("-i")
        .arg(input)
        .arg("-r")
        .arg(relations)
        .assert()
        .success()
        .stdout(predicate::str::contains("All valid"));
}
