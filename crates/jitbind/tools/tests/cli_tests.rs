//! Command tests against the bundled API description

use jitbind_tools::cli::DialectArg;
use jitbind_tools::{CheckArgs, GenerateArgs, ToolError, run_check, run_generate};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use test_case::test_case;

fn sample_api() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("api/jitbuilder.api.json")
}

fn generate_args(out: &TempDir, dialect: Option<DialectArg>) -> GenerateArgs {
    GenerateArgs {
        api: sample_api(),
        out: out.path().to_path_buf(),
        config: None,
        dialect,
        parallel: false,
    }
}

fn file_count(dir: PathBuf) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn test_generate_writes_every_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let summary = run_generate(&generate_args(&temp_dir, None)).unwrap();

    assert!(summary.report.is_success());
    assert_eq!(summary.report.written.len(), summary.stats.artifact_count);
    for path in &summary.report.written {
        assert!(path.is_file(), "{} was not written", path.display());
    }

    let flat_header = fs::read_to_string(temp_dir.path().join("c/IlBuilder.h")).unwrap();
    assert!(flat_header.contains("IlValue * IB_Add(IlBuilder * self, IlValue * left, IlValue * right);"));
    let oo_header = fs::read_to_string(temp_dir.path().join("cpp/MethodBuilder.hpp")).unwrap();
    assert!(oo_header.contains("class MethodBuilder : public IlBuilder {"));
    assert!(temp_dir.path().join("c/JitBuilder.h").is_file());
    assert!(temp_dir.path().join("cpp/BindingSupport.hpp").is_file());
}

#[test_case(DialectArg::Flat, 17, 0 ; "flat only")]
#[test_case(DialectArg::Oo, 0, 17 ; "object oriented only")]
#[test_case(DialectArg::Both, 17, 17 ; "both dialects")]
fn test_dialect_selection(dialect: DialectArg, flat_files: usize, oo_files: usize) {
    let temp_dir = TempDir::new().unwrap();
    run_generate(&generate_args(&temp_dir, Some(dialect))).unwrap();

    assert_eq!(file_count(temp_dir.path().join("c")), flat_files);
    assert_eq!(file_count(temp_dir.path().join("cpp")), oo_files);
}

#[test]
fn test_config_file_is_applied() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("jitbind.toml");
    fs::write(&config, "[generator]\ndialects = [\"object_oriented\"]\naggregate_name = \"Jit\"\n").unwrap();

    let out = temp_dir.path().join("out");
    let args = GenerateArgs {
        api: sample_api(),
        out: out.clone(),
        config: Some(config),
        dialect: None,
        parallel: true,
    };
    run_generate(&args).unwrap();

    assert!(out.join("cpp/Jit.hpp").is_file());
    assert!(!out.join("c").exists());
}

#[test]
fn test_invalid_api_fails() {
    let temp_dir = TempDir::new().unwrap();
    let api = temp_dir.path().join("broken.json");
    fs::write(&api, r#"{ "classes": [ { "name": "IlBuilder", "shortName": "IB", "flags": ["creatable"] } ] }"#).unwrap();

    let mut args = generate_args(&temp_dir, None);
    args.api = api;
    assert!(matches!(run_generate(&args), Err(ToolError::Schema(_))));
}

#[test]
fn test_missing_api_fails() {
    let args = CheckArgs {
        api: PathBuf::from("does/not/exist.json"),
        json: false,
    };
    assert!(matches!(run_check(&args), Err(ToolError::Read { .. })));
}

#[test]
fn test_check_summary() {
    let args = CheckArgs {
        api: sample_api(),
        json: true,
    };
    let summary = run_check(&args).unwrap();
    assert_eq!(summary.classes, 7);
    assert_eq!(summary.free_functions, 3);
    assert_eq!(summary.callbacks, 2);
    assert_eq!(summary.artifacts, 2 * (7 * 2 + 3));

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["classes"], 7);
}
