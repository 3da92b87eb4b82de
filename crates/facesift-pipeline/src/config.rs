use std::path::PathBuf;

/// Euclidean distance threshold for a positive match, over L2-normalized
/// ArcFace embeddings. Equivalent to a cosine similarity of ~0.40.
pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 1.10;

/// File extensions recognized as candidate photos.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Pipeline configuration, loaded from environment variables with defaults.
/// CLI flags may override individual fields after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Maximum embedding distance for a candidate to count as a match.
    pub distance_threshold: f32,
    /// Recognized image extensions, lowercase, without dots.
    pub extensions: Vec<String>,
    /// Whether to descend into subdirectories of the source folder.
    pub recursive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: facesift_core::default_model_dir(),
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            recursive: false,
        }
    }
}

impl Config {
    /// Load configuration from `FACESIFT_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_dir: std::env::var("FACESIFT_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            distance_threshold: env_f32("FACESIFT_DISTANCE_THRESHOLD", defaults.distance_threshold),
            extensions: std::env::var("FACESIFT_EXTENSIONS")
                .map(|v| parse_extensions(&v))
                .unwrap_or(defaults.extensions),
            recursive: std::env::var("FACESIFT_RECURSIVE")
                .map(|v| v != "0")
                .unwrap_or(defaults.recursive),
        }
    }

    /// Replace the extension list from a comma-separated string
    /// (e.g. `"png,jpg,webp"`). Empty segments and leading dots are dropped.
    pub fn set_extensions(&mut self, list: &str) {
        self.extensions = parse_extensions(list);
    }
}

fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
