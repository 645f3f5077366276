//! Subprocess bridge to the external analysis worker.
//!
//! The worker is any executable honouring two subcommands:
//! - `probe --input <movie> <decoder flags>` prints the experiment shape
//!   as JSON (`{"positions": n, "channels": n, "timepoints": n}`) on
//!   stdout and exits non-zero if the movie cannot be opened,
//! - `run --input <movie> --output-dir <dir> --config <file>
//!   [--save-format a,b] <decoder flags>` performs the full analysis
//!   with its own progress output inherited on the console.
//!
//! Probing happens eagerly when a reader is opened, so movies the worker
//! cannot decode fail at reader construction rather than mid-pipeline.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{BatchSettings, ReaderSettings};

use super::types::{
    AnalysisBackend, AnalysisPipeline, BackendError, BackendResult, DecoderKind, ExperimentReader,
    ExperimentShape, PipelineConfig,
};

/// Backend that drives the analysis worker as a child process.
pub struct ProcessBackend {
    /// Worker executable name or path.
    worker: String,
    /// Extra arguments placed before the subcommand.
    worker_args: Vec<String>,
    /// Decoder parameters forwarded on every invocation.
    reader: ReaderSettings,
}

impl ProcessBackend {
    /// Create a backend for the given worker command.
    pub fn new(
        worker: impl Into<String>,
        worker_args: Vec<String>,
        reader: ReaderSettings,
    ) -> Self {
        Self {
            worker: worker.into(),
            worker_args,
            reader,
        }
    }

    /// Create a backend from the driver settings.
    pub fn from_settings(settings: &BatchSettings) -> Self {
        Self::new(
            settings.pipeline.worker.clone(),
            settings.pipeline.worker_args.clone(),
            settings.reader.clone(),
        )
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.worker);
        cmd.args(&self.worker_args);
        cmd
    }

    fn push_decoder_args(&self, cmd: &mut Command) {
        match self.reader.decoder {
            DecoderKind::Bioformats => {
                cmd.arg("--bioformats");
            }
            DecoderKind::Pattern => {
                cmd.arg("--prototype").arg(&self.reader.prototype);
                cmd.arg("--file-order").arg(&self.reader.file_order);
                cmd.arg("--index-base").arg(self.reader.index_base.to_string());
            }
        }
    }

    /// Ask the worker for the experiment shape of one movie.
    fn probe(&self, input: &Path) -> BackendResult<ExperimentShape> {
        tracing::debug!("Probing movie: {}", input.display());

        let mut cmd = self.base_command();
        cmd.arg("probe").arg("--input").arg(input);
        self.push_decoder_args(&mut cmd);

        let output = cmd
            .output()
            .map_err(|e| BackendError::io(format!("running {} probe", self.worker), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::command_failed(
                self.worker.as_str(),
                output.status.code().unwrap_or(-1),
                stderr.trim().to_string(),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| BackendError::parse("probe output", e.to_string()))
    }
}

impl AnalysisBackend for ProcessBackend {
    fn load_pipeline_config(&self, path: &Path) -> BackendResult<PipelineConfig> {
        if !path.exists() {
            return Err(BackendError::file_not_found(path));
        }

        tracing::info!("Pipeline configuration: {}", path.display());
        Ok(PipelineConfig::new(path))
    }

    fn open_reader(&self, input: &Path) -> BackendResult<Box<dyn ExperimentReader>> {
        if !input.exists() {
            return Err(BackendError::file_not_found(input));
        }

        let shape = self.probe(input)?;
        Ok(Box::new(ProcessReader {
            input: input.to_path_buf(),
            shape,
        }))
    }

    fn create_pipeline(
        &self,
        reader: Box<dyn ExperimentReader>,
        config: &PipelineConfig,
        output_dir: &Path,
    ) -> BackendResult<Box<dyn AnalysisPipeline>> {
        if !output_dir.is_dir() {
            return Err(BackendError::invalid_input(format!(
                "output directory missing: {}",
                output_dir.display()
            )));
        }

        let mut cmd = self.base_command();
        cmd.arg("run")
            .arg("--input")
            .arg(reader.input_path())
            .arg("--output-dir")
            .arg(output_dir)
            .arg("--config")
            .arg(config.source());

        if let Some(formats) = config.save_format() {
            cmd.arg("--save-format").arg(formats.join(","));
        }

        self.push_decoder_args(&mut cmd);

        Ok(Box::new(ProcessPipeline {
            tool: self.worker.clone(),
            command: cmd,
        }))
    }
}

/// Reader handle backed by an up-front worker probe.
struct ProcessReader {
    input: PathBuf,
    shape: ExperimentShape,
}

impl ExperimentReader for ProcessReader {
    fn input_path(&self) -> &Path {
        &self.input
    }

    fn shape(&self) -> BackendResult<ExperimentShape> {
        Ok(self.shape)
    }
}

/// One prepared worker invocation, run to completion with inherited stdio.
struct ProcessPipeline {
    tool: String,
    command: Command,
}

impl AnalysisPipeline for ProcessPipeline {
    fn run(&mut self) -> BackendResult<()> {
        tracing::debug!("Running analysis worker: {:?}", self.command);

        let status = self
            .command
            .status()
            .map_err(|e| BackendError::io(format!("running {} run", self.tool), e))?;

        if !status.success() {
            return Err(BackendError::command_failed(
                self.tool.as_str(),
                status.code().unwrap_or(-1),
                "analysis worker reported failure",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn backend_with(worker: &str, args: &[&str]) -> ProcessBackend {
        ProcessBackend::new(
            worker,
            args.iter().map(|s| s.to_string()).collect(),
            ReaderSettings::default(),
        )
    }

    #[test]
    fn load_config_requires_existing_file() {
        let backend = backend_with("analysis-worker", &[]);
        let result = backend.load_pipeline_config(Path::new("/nonexistent/pipeline.json"));
        assert!(matches!(result, Err(BackendError::FileNotFound { .. })));
    }

    #[test]
    fn load_config_keeps_source_path() {
        let dir = tempdir().unwrap();
        let config_file = dir.path().join("pipeline.json");
        fs::write(&config_file, b"{}").unwrap();

        let backend = backend_with("analysis-worker", &[]);
        let config = backend.load_pipeline_config(&config_file).unwrap();
        assert_eq!(config.source(), config_file.as_path());
    }

    #[test]
    fn open_reader_missing_movie_fails() {
        let backend = backend_with("analysis-worker", &[]);
        let result = backend.open_reader(Path::new("/nonexistent/movie.tif"));
        assert!(matches!(result, Err(BackendError::FileNotFound { .. })));
    }

    #[test]
    fn open_reader_parses_probe_json() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();

        // Stub worker: ignores its arguments and prints a fixed shape
        let backend = backend_with(
            "sh",
            &[
                "-c",
                r#"echo '{"positions": 4, "channels": 2, "timepoints": 120}'"#,
                "probe-stub",
            ],
        );

        let reader = backend.open_reader(&movie).unwrap();
        let shape = reader.shape().unwrap();
        assert_eq!(shape.positions, 4);
        assert_eq!(shape.channels, 2);
        assert_eq!(shape.timepoints, 120);
        assert_eq!(reader.input_path(), movie.as_path());
    }

    #[test]
    fn open_reader_surfaces_worker_failure() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();

        let backend =
            backend_with("sh", &["-c", "echo 'cannot decode' >&2; exit 3", "probe-stub"]);

        let result = backend.open_reader(&movie);
        match result {
            Err(BackendError::CommandFailed { exit_code, message, .. }) => {
                assert_eq!(exit_code, 3);
                assert!(message.contains("cannot decode"));
            }
            other => panic!("expected CommandFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn probe_passes_bioformats_flag() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();

        // Stub succeeds only when the flag is on the command line
        let backend = backend_with(
            "sh",
            &[
                "-c",
                r#"case "$*" in *--bioformats*) echo '{"positions": 1, "channels": 1, "timepoints": 1}';; *) exit 9;; esac"#,
                "worker-stub",
            ],
        );

        assert!(backend.open_reader(&movie).is_ok());
    }

    #[test]
    fn probe_passes_pattern_decoder_flags() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();

        let mut reader = ReaderSettings::default();
        reader.decoder = DecoderKind::Pattern;
        reader.prototype = "pos%02i.tif".to_string();
        reader.index_base = 1;

        let script = r#"case "$*" in *"--prototype pos%02i.tif"*"--file-order pct"*"--index-base 1"*) echo '{"positions": 1, "channels": 1, "timepoints": 1}';; *) exit 9;; esac"#;
        let backend = ProcessBackend::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "worker-stub".to_string()],
            reader,
        );

        assert!(backend.open_reader(&movie).is_ok());
    }

    #[test]
    fn open_reader_rejects_garbage_probe_output() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();

        let backend = backend_with("sh", &["-c", "echo not-json", "probe-stub"]);

        let result = backend.open_reader(&movie);
        assert!(matches!(result, Err(BackendError::Parse { .. })));
    }

    #[test]
    fn create_pipeline_requires_output_dir() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();

        let backend = backend_with(
            "sh",
            &[
                "-c",
                r#"echo '{"positions": 1, "channels": 1, "timepoints": 1}'"#,
                "probe-stub",
            ],
        );
        let reader = backend.open_reader(&movie).unwrap();

        let config = PipelineConfig::new(dir.path().join("pipeline.json"));
        let result = backend.create_pipeline(reader, &config, &dir.path().join("absent"));
        assert!(matches!(result, Err(BackendError::InvalidInput(_))));
    }

    #[test]
    fn pipeline_run_reports_exit_code() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let backend = backend_with(
            "sh",
            &[
                "-c",
                r#"case "$1" in probe) echo '{"positions": 1, "channels": 1, "timepoints": 1}';; run) exit 2;; esac"#,
                "worker-stub",
            ],
        );

        let reader = backend.open_reader(&movie).unwrap();
        let config = PipelineConfig::new(dir.path().join("pipeline.json"));
        let mut pipeline = backend.create_pipeline(reader, &config, &out).unwrap();

        match pipeline.run() {
            Err(BackendError::CommandFailed { exit_code, .. }) => assert_eq!(exit_code, 2),
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn pipeline_run_succeeds_on_zero_exit() {
        let dir = tempdir().unwrap();
        let movie = dir.path().join("movie.tif");
        fs::write(&movie, b"x").unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let backend = backend_with(
            "sh",
            &[
                "-c",
                r#"case "$1" in probe) echo '{"positions": 1, "channels": 1, "timepoints": 1}';; run) exit 0;; esac"#,
                "worker-stub",
            ],
        );

        let reader = backend.open_reader(&movie).unwrap();
        let config = PipelineConfig::new(dir.path().join("pipeline.json"));
        let mut pipeline = backend.create_pipeline(reader, &config, &out).unwrap();

        assert!(pipeline.run().is_ok());
    }
}
