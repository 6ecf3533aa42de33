//! Loading pipeline configuration from disk.

use std::fs;
use std::path::Path;

use lexis_types::{ConfigError, PipelineConfig};

/// Reads, parses and validates a JSON configuration file.
///
/// Missing fields take their defaults, so `{}` is the default
/// configuration.
pub fn load(path: impl AsRef<Path>) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = PipelineConfig::from_json_str(&text)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), version = config.version, "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_object_is_default() {
        let file = write_config("{}");
        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.version, lexis_types::RULESET_VERSION);
        assert!(!cfg.normalization.key.fold_case);
    }

    #[test]
    fn overrides_are_applied() {
        let file = write_config(r#"{"normalization": {"key": {"fold_case": true}}}"#);
        let cfg = load(file.path()).unwrap();
        assert!(cfg.normalization.key.fold_case);
        assert!(cfg.normalization.key.strip_diacritics);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let file = write_config(r#"{"version": 99}"#);
        assert!(matches!(
            load(file.path()),
            Err(ConfigError::VersionMismatch { found: 99, .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match load(&path) {
            Err(ConfigError::Read { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let file = write_config("{ not json");
        assert!(matches!(load(file.path()), Err(ConfigError::Parse(_))));
    }
}
