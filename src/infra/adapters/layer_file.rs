use std::fs;
use std::path::{Path, PathBuf};

use layerscope_domain::Layer;

#[derive(Debug, thiserror::Error)]
pub enum LayerFileError {
    #[error("failed to read layer {path}: {message}")]
    ReadError { path: PathBuf, message: String },
    #[error("failed to write layer {path}: {message}")]
    WriteError { path: PathBuf, message: String },
    #[error("invalid layer {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },
}

pub fn load_layer(path: &Path) -> Result<Layer, LayerFileError> {
    let content = fs::read_to_string(path).map_err(|e| LayerFileError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| LayerFileError::InvalidFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Writes the layer as pretty-printed JSON with a trailing newline.
pub fn save_layer(path: &Path, layer: &Layer) -> Result<(), LayerFileError> {
    let write_error = |message: String| LayerFileError::WriteError {
        path: path.to_path_buf(),
        message,
    };
    let mut content = serde_json::to_string_pretty(layer).map_err(|e| write_error(e.to_string()))?;
    content.push('\n');
    fs::write(path, content).map_err(|e| write_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerscope_domain::LayerKind;
    use layerscope_domain::layer::{QUERY, TABLE_NAME};
    use tempfile::TempDir;

    #[test]
    fn saved_layer_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layer.json");
        let layer = Layer::new(LayerKind::Carto)
            .with_option(QUERY, "SELECT * FROM roads")
            .with_option(TABLE_NAME, "roads");

        save_layer(&path, &layer).unwrap();
        let loaded = load_layer(&path).unwrap();

        assert_eq!(loaded, layer);
    }

    #[test]
    fn unknown_kind_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layer.json");
        fs::write(&path, r#"{"kind": "wadus", "options": {}}"#).unwrap();

        let result = load_layer(&path);

        assert!(matches!(result, Err(LayerFileError::InvalidFormat { .. })));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_layer(&temp_dir.path().join("absent.json"));

        assert!(matches!(result, Err(LayerFileError::ReadError { .. })));
    }

    #[test]
    fn writing_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("layer.json");

        let result = save_layer(&path, &Layer::new(LayerKind::Tiled));

        assert!(matches!(result, Err(LayerFileError::WriteError { .. })));
    }
}
