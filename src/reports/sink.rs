use std::{fs, path::PathBuf};

use derive_new::new;

use super::{Artifact, ReportError};

/// A destination for report artifacts, grouped by model label
pub trait Sink: Send + Sync {
    /// Store one artifact of a model run
    fn write(&self, model_label: &str, artifact: &Artifact) -> Result<(), ReportError>;
}

/// Writes artifacts to `<output_dir>/<model_label>/<file_name>`
#[derive(Debug, Clone, new)]
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    /// The directory holding a model's artifacts
    pub fn run_dir(&self, model_label: &str) -> PathBuf {
        self.output_dir.join(model_label)
    }
}

impl Sink for FileSink {
    fn write(&self, model_label: &str, artifact: &Artifact) -> Result<(), ReportError> {
        let dir = self.run_dir(model_label);

        fs::create_dir_all(&dir).map_err(|source| ReportError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(&artifact.file_name);
        fs::write(&path, &artifact.contents).map_err(|source| ReportError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn writes_under_the_model_label() {
        let output_dir =
            env::temp_dir().join(format!("sentiment-bench-sink-{}", std::process::id()));
        let sink = FileSink::new(output_dir.clone());

        sink.write("bert-base", &Artifact::new("a.txt".to_string(), "hello".to_string()))
            .unwrap();

        let written = fs::read_to_string(output_dir.join("bert-base").join("a.txt")).unwrap();
        assert_eq!(written, "hello");

        fs::remove_dir_all(output_dir).unwrap();
    }

    #[test]
    fn reports_the_failing_path() {
        let file =
            env::temp_dir().join(format!("sentiment-bench-sink-file-{}", std::process::id()));
        fs::write(&file, "not a directory").unwrap();

        let err = FileSink::new(file.clone())
            .write("bert-base", &Artifact::new("a.txt".to_string(), String::new()))
            .unwrap_err();

        assert!(matches!(err, ReportError::Io { ref path, .. } if path.starts_with(&file)));

        fs::remove_file(file).unwrap();
    }
}
