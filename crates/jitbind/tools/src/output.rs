//! Writing artifacts to disk
//!
//! Each artifact goes to a temporary file beside its target and is renamed
//! into place, so a failed write never leaves a truncated artifact behind.
//! Failures are collected per class; the remaining classes are still written.

use jitbind_codegen::{Artifact, DialectOutput};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Unit name reported for artifacts that belong to no class
pub const AGGREGATE_UNIT: &str = "<aggregate>";

#[derive(Debug)]
pub struct WriteFailure {
    /// Class the artifact belongs to, or [`AGGREGATE_UNIT`]
    pub unit: String,
    pub path: PathBuf,
    pub error: io::Error,
}

#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Units with at least one failed artifact, in failure order
    pub fn failed_units(&self) -> Vec<String> {
        let mut units: Vec<String> = Vec::new();
        for failure in &self.failures {
            if !units.contains(&failure.unit) {
                units.push(failure.unit.clone());
            }
        }
        units
    }

    pub fn merge(&mut self, other: WriteReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }
}

/// Writes artifacts below an output root
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one artifact atomically and return its final path
    pub fn write(&self, artifact: &Artifact) -> io::Result<PathBuf> {
        let target = self.root.join(&artifact.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let file_name = target
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "artifact path has no file name"))?;
        let mut temp_name = OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        let temp = target.with_file_name(temp_name);

        let result = fs::write(&temp, &artifact.contents).and_then(|()| fs::rename(&temp, &target));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result.map(|()| target)
    }

    /// Write every artifact of one dialect
    pub fn write_output(&self, output: &DialectOutput) -> WriteReport {
        let mut report = WriteReport::default();
        for artifact in output.artifacts() {
            let unit = artifact.owner.clone().unwrap_or_else(|| AGGREGATE_UNIT.to_string());
            match self.write(artifact) {
                Ok(path) => {
                    debug!(path = %path.display(), bytes = artifact.size(), "Wrote artifact");
                    report.written.push(path);
                }
                Err(error) => {
                    warn!(unit = %unit, path = %artifact.path.display(), %error, "Failed to write artifact");
                    report.failures.push(WriteFailure {
                        unit,
                        path: artifact.path.clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jitbind_codegen::{ArtifactKind, ClassArtifacts, Dialect};
    use tempfile::TempDir;

    fn artifact(path: &str, kind: ArtifactKind, owner: Option<&str>) -> Artifact {
        Artifact {
            path: PathBuf::from(path),
            kind,
            dialect: Dialect::Flat,
            owner: owner.map(str::to_string),
            contents: format!("// {path}\n"),
        }
    }

    fn output() -> DialectOutput {
        let class = |name: &str| ClassArtifacts {
            class: name.to_string(),
            header: artifact(&format!("c/{name}.h"), ArtifactKind::ClassHeader, Some(name)),
            body: artifact(&format!("c/{name}.cpp"), ArtifactKind::ClassBody, Some(name)),
            function_count: 0,
        };
        DialectOutput {
            dialect: Dialect::Flat,
            classes: vec![class("IlValue"), class("IlBuilder")],
            aggregate_header: artifact("c/JitBuilder.h", ArtifactKind::AggregateHeader, None),
            aggregate_body: artifact("c/JitBuilder.cpp", ArtifactKind::AggregateBody, None),
            support_header: artifact("c/BindingSupport.hpp", ArtifactKind::SupportHeader, None),
        }
    }

    #[test]
    fn test_writes_every_artifact_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        let report = writer.write_output(&output());

        assert!(report.is_success());
        assert_eq!(report.written.len(), 7);
        let entries: Vec<_> = fs::read_dir(temp_dir.path().join("c")).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(entries.len(), 7);
        assert!(entries.iter().all(|name| !name.to_string_lossy().ends_with(".tmp")));
        assert_eq!(fs::read_to_string(temp_dir.path().join("c/IlBuilder.h")).unwrap(), "// c/IlBuilder.h\n");
    }

    #[test]
    fn test_failure_is_reported_per_class() {
        let temp_dir = TempDir::new().unwrap();
        // a directory in the way makes the rename fail
        fs::create_dir_all(temp_dir.path().join("c/IlValue.cpp")).unwrap();

        let report = ArtifactWriter::new(temp_dir.path()).write_output(&output());
        assert_eq!(report.failed_units(), ["IlValue"]);
        assert_eq!(report.written.len(), 6);
        assert!(temp_dir.path().join("c/IlBuilder.cpp").is_file());
        assert!(!temp_dir.path().join("c/.IlValue.cpp.tmp").exists());
    }

    #[test]
    fn test_overwrites_existing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        let mut header = artifact("c/IlValue.h", ArtifactKind::ClassHeader, Some("IlValue"));
        writer.write(&header).unwrap();
        header.contents = "// regenerated\n".to_string();
        let path = writer.write(&header).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "// regenerated\n");
    }
}
