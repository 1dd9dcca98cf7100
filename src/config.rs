use anyhow::{Context, Result};
use slide_engine::Config;
use std::path::Path;

/// Load the config at `path`, writing the defaults there first if the file
/// does not exist yet.
pub fn load_or_create(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, config.to_json_pretty() + "\n")
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(config);
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = Config::from_json_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("mdslides-config-test").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = scratch("create");
        let path = dir.join("nested/mdslides.json");

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // Second load reads the written file back.
        let again = load_or_create(&path).unwrap();
        assert_eq!(again, config);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn existing_file_overrides_defaults() {
        let dir = scratch("existing");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mdslides.json");
        std::fs::write(&path, r#"{"PAGE_LAYOUT": {"IMAGE_WIDTH": 640}}"#).unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.page_layout.image_width, 640);
        assert_eq!(config.page_layout.image_height, 1080);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = scratch("invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mdslides.json");
        std::fs::write(&path, r##"{"COLORS": {"TEXT": "#zzz"}}"##).unwrap();

        let err = load_or_create(&path).unwrap_err();
        assert!(format!("{err:#}").contains("mdslides.json"));
        assert!(format!("{err:#}").contains("#zzz"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
