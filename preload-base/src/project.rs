use crate::PreloadResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_io_thread_count() -> usize {
    4
}

#[derive(Serialize, Deserialize)]
pub struct PreloadProjectConfigurationJson {
    pub asset_root_path: String,
    pub sources_manifest_path: String,
    #[serde(default = "default_io_thread_count")]
    pub io_thread_count: usize,
}

#[derive(Debug, Clone)]
pub struct PreloadProjectConfiguration {
    // Directory that request paths in the source manifest are relative to
    pub asset_root_path: PathBuf,

    // Path to the source manifest listing everything that must load before the scene is ready.
    // Unlike the other path, this is a path to a FILE
    pub sources_manifest_path: PathBuf,

    // Number of worker threads reading and decoding files
    pub io_thread_count: usize,
}

impl PreloadProjectConfiguration {
    pub fn unverified_absolute_path(
        root_path: &Path,
        json_path: &str,
    ) -> PathBuf {
        if Path::new(json_path).is_absolute() {
            PathBuf::from(json_path)
        } else {
            root_path.join(json_path)
        }
    }

    // root_path is the directory the json file is in. Relative paths in the file are joined onto it
    pub fn from_json(
        root_path: &Path,
        json: PreloadProjectConfigurationJson,
    ) -> PreloadResult<Self> {
        if json.io_thread_count == 0 {
            return Err("io_thread_count must be at least 1".into());
        }

        Ok(PreloadProjectConfiguration {
            asset_root_path: Self::unverified_absolute_path(root_path, &json.asset_root_path),
            sources_manifest_path: Self::unverified_absolute_path(
                root_path,
                &json.sources_manifest_path,
            ),
            io_thread_count: json.io_thread_count,
        })
    }

    pub fn read_from_path(path: &Path) -> PreloadResult<Self> {
        log::info!("Reading project configuration {:?}", path);
        let file_contents = std::fs::read_to_string(path)?;
        let config_json: PreloadProjectConfigurationJson = serde_json::from_str(&file_contents)?;
        let root_path = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json(root_path, config_json)
    }

    // Walks up from the given directory looking for a preload.json
    pub fn locate_project_file(search_location: &Path) -> PreloadResult<PathBuf> {
        let mut path = Some(search_location);
        while let Some(p) = path {
            let config_path = p.join("preload.json");
            if config_path.exists() {
                return Ok(config_path);
            }

            path = p.parent();
        }

        Err(format!(
            "preload.json not found in {:?} or any parent directory",
            search_location
        )
        .into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_temp_config(contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("preload-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preload.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let path = write_temp_config(
            r#"{ "asset_root_path": "static", "sources_manifest_path": "static/sources.json" }"#,
        );
        let config_dir = path.parent().unwrap().to_path_buf();

        let config = PreloadProjectConfiguration::read_from_path(&path).unwrap();
        assert_eq!(config.asset_root_path, config_dir.join("static"));
        assert_eq!(
            config.sources_manifest_path,
            config_dir.join("static").join("sources.json")
        );
        assert_eq!(config.io_thread_count, 4);

        let located = PreloadProjectConfiguration::locate_project_file(&config_dir).unwrap();
        assert_eq!(located, path);

        std::fs::remove_dir_all(config_dir).unwrap();
    }

    #[test]
    fn absolute_paths_are_kept() {
        let root = std::env::temp_dir();
        let absolute = root.join("elsewhere");
        let json = PreloadProjectConfigurationJson {
            asset_root_path: absolute.to_string_lossy().to_string(),
            sources_manifest_path: "sources.json".to_string(),
            io_thread_count: 2,
        };

        let config = PreloadProjectConfiguration::from_json(Path::new("/project"), json).unwrap();
        assert_eq!(config.asset_root_path, absolute);
        assert_eq!(config.sources_manifest_path, Path::new("/project").join("sources.json"));
        assert_eq!(config.io_thread_count, 2);
    }

    #[test]
    fn zero_io_threads_rejected() {
        let json = PreloadProjectConfigurationJson {
            asset_root_path: "a".to_string(),
            sources_manifest_path: "b".to_string(),
            io_thread_count: 0,
        };
        assert!(PreloadProjectConfiguration::from_json(Path::new("/project"), json).is_err());
    }
}
