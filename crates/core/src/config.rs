//! Configuration management for devmind.
//!
//! This module handles loading and merging configuration from multiple sources,
//! in increasing precedence:
//! - Built-in defaults
//! - Config file (`.devmind/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: relative paths (such as the
//! knowledge-base root) are resolved against the workspace directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
const DEFAULT_COLLECTION: &str = "senior_dev_mind";
const DEFAULT_VECTOR_SIZE: usize = 768;
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";
const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";
const DEFAULT_GEMINI_MODEL: &str = "gemini-embedding-001";
const DEFAULT_HUGGINGFACE_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_KNOWLEDGE_BASE: &str = ".agent";
const DEFAULT_IDENTITY_DOCUMENT: &str = "workflows/senior-dev-rules.md";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .devmind/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Knowledge-base root; relative paths resolve against the workspace
    pub knowledge_base: PathBuf,

    /// Document always loaded in full by the context router
    pub identity_document: String,

    /// Vector store settings
    pub qdrant: QdrantConfig,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Qdrant connection and collection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    /// Dimensionality of every vector in the collection
    pub vector_size: usize,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE,
        }
    }
}

/// Supported embedding backends. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local inference server
    Ollama,
    OpenAi,
    Gemini,
    HuggingFace,
    /// No native embeddings endpoint; uses the sparse hashed embedding
    Groq,
}

impl EmbeddingProviderKind {
    pub const ALL: [EmbeddingProviderKind; 5] = [
        EmbeddingProviderKind::Ollama,
        EmbeddingProviderKind::OpenAi,
        EmbeddingProviderKind::Gemini,
        EmbeddingProviderKind::HuggingFace,
        EmbeddingProviderKind::Groq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProviderKind::Ollama => "ollama",
            EmbeddingProviderKind::OpenAi => "openai",
            EmbeddingProviderKind::Gemini => "gemini",
            EmbeddingProviderKind::HuggingFace => "huggingface",
            EmbeddingProviderKind::Groq => "groq",
        }
    }

    /// Whether this provider talks to a server on the local machine.
    pub fn is_local(&self) -> bool {
        matches!(self, EmbeddingProviderKind::Ollama)
    }
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown embedding provider: '{}'. Supported: {}",
                    s,
                    Self::ALL
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Embedding provider selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub huggingface_api_key: Option<String>,
    pub huggingface_model: String,
    /// Also the designated cloud fallback for the local provider
    pub groq_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Ollama, // Local-first default
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            huggingface_api_key: None,
            huggingface_model: DEFAULT_HUGGINGFACE_MODEL.to_string(),
            groq_api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    knowledge_base: Option<String>,
    identity_document: Option<String>,
    qdrant: Option<QdrantFile>,
    embedding: Option<EmbeddingFile>,
    logging: Option<LoggingFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QdrantFile {
    url: Option<String>,
    api_key: Option<String>,
    collection: Option<String>,
    vector_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingFile {
    provider: Option<String>,
    ollama_url: Option<String>,
    ollama_model: Option<String>,
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    huggingface_api_key: Option<String>,
    huggingface_model: Option<String>,
    groq_api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingFile {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            knowledge_base: PathBuf::from(DEFAULT_KNOWLEDGE_BASE),
            identity_document: DEFAULT_IDENTITY_DOCUMENT.to_string(),
            qdrant: QdrantConfig::default(),
            embedding: EmbeddingConfig::default(),
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and the process environment.
    ///
    /// `workspace` and `config_file` come from the command line when given;
    /// otherwise `DEVMIND_WORKSPACE` / `DEVMIND_CONFIG` are consulted.
    ///
    /// Environment variables:
    /// - `QDRANT_URL`, `QDRANT_API_KEY`, `QDRANT_COLLECTION`, `VECTOR_SIZE`
    /// - `EMBEDDING_PROVIDER`, `OLLAMA_URL`, `OLLAMA_EMBED_MODEL`
    /// - `OPENAI_API_KEY`, `GEMINI_API_KEY`, `HUGGINGFACE_API_KEY`, `HUGGINGFACE_MODEL`
    /// - `GROQ_API_KEY`
    /// - `KNOWLEDGE_BASE_PATH`
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use devmind_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Knowledge base: {:?}", config.knowledge_base_root());
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with_env(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("DEVMIND_WORKSPACE").map(PathBuf::from))
        {
            config.workspace = workspace;
        }
        config.config_file = config_file.or_else(|| env("DEVMIND_CONFIG").map(PathBuf::from));

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.devmind_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        config.apply_env(env)?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(kb) = file.knowledge_base {
            self.knowledge_base = PathBuf::from(kb);
        }
        if let Some(doc) = file.identity_document {
            self.identity_document = doc;
        }

        if let Some(q) = file.qdrant {
            if let Some(url) = q.url {
                self.qdrant.url = url;
            }
            if q.api_key.is_some() {
                self.qdrant.api_key = q.api_key;
            }
            if let Some(collection) = q.collection {
                self.qdrant.collection = collection;
            }
            if let Some(size) = q.vector_size {
                self.qdrant.vector_size = size;
            }
        }

        if let Some(e) = file.embedding {
            if let Some(provider) = e.provider {
                self.embedding.provider = provider.parse()?;
            }
            merge_string(&mut self.embedding.ollama_url, e.ollama_url);
            merge_string(&mut self.embedding.ollama_model, e.ollama_model);
            merge_string(&mut self.embedding.openai_model, e.openai_model);
            merge_string(&mut self.embedding.gemini_model, e.gemini_model);
            merge_string(&mut self.embedding.huggingface_model, e.huggingface_model);
            merge_secret(&mut self.embedding.openai_api_key, e.openai_api_key);
            merge_secret(&mut self.embedding.gemini_api_key, e.gemini_api_key);
            merge_secret(&mut self.embedding.huggingface_api_key, e.huggingface_api_key);
            merge_secret(&mut self.embedding.groq_api_key, e.groq_api_key);
            if let Some(timeout) = e.timeout_secs {
                self.embedding.timeout_secs = timeout;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(format) = logging.format {
                self.log_json = format.eq_ignore_ascii_case("json");
            }
        }

        Ok(())
    }

    fn apply_env<F>(&mut self, env: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("QDRANT_URL") {
            self.qdrant.url = url;
        }
        merge_secret(&mut self.qdrant.api_key, env("QDRANT_API_KEY"));
        if let Some(collection) = env("QDRANT_COLLECTION") {
            self.qdrant.collection = collection;
        }
        if let Some(size) = env("VECTOR_SIZE") {
            self.qdrant.vector_size = size.trim().parse().map_err(|_| {
                AppError::Config(format!("VECTOR_SIZE must be a positive integer, got '{}'", size))
            })?;
        }

        if let Some(provider) = env("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        merge_string(&mut self.embedding.ollama_url, env("OLLAMA_URL"));
        merge_string(&mut self.embedding.ollama_model, env("OLLAMA_EMBED_MODEL"));
        merge_string(&mut self.embedding.huggingface_model, env("HUGGINGFACE_MODEL"));
        merge_secret(&mut self.embedding.openai_api_key, env("OPENAI_API_KEY"));
        merge_secret(&mut self.embedding.gemini_api_key, env("GEMINI_API_KEY"));
        merge_secret(&mut self.embedding.huggingface_api_key, env("HUGGINGFACE_API_KEY"));
        merge_secret(&mut self.embedding.groq_api_key, env("GROQ_API_KEY"));

        if let Some(kb) = env("KNOWLEDGE_BASE_PATH") {
            self.knowledge_base = PathBuf::from(kb);
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }
        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        knowledge_base: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(knowledge_base) = knowledge_base {
            self.knowledge_base = knowledge_base;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .devmind directory.
    pub fn devmind_dir(&self) -> PathBuf {
        self.workspace.join(".devmind")
    }

    /// Absolute knowledge-base root.
    pub fn knowledge_base_root(&self) -> PathBuf {
        if self.knowledge_base.is_absolute() {
            self.knowledge_base.clone()
        } else {
            self.workspace.join(&self.knowledge_base)
        }
    }

    /// Validate settings. Must pass before any command touches the store.
    pub fn validate(&self) -> AppResult<()> {
        if self.qdrant.url.trim().is_empty() {
            return Err(AppError::Config("QDRANT_URL is required".to_string()));
        }
        if self.qdrant.collection.trim().is_empty() {
            return Err(AppError::Config("QDRANT_COLLECTION is required".to_string()));
        }
        if self.qdrant.vector_size == 0 {
            return Err(AppError::Config("VECTOR_SIZE must be greater than zero".to_string()));
        }
        if self.identity_document.trim().is_empty() {
            return Err(AppError::Config("identityDocument must not be empty".to_string()));
        }

        let e = &self.embedding;
        let missing_key = match e.provider {
            EmbeddingProviderKind::Ollama => {
                if e.ollama_url.trim().is_empty() {
                    return Err(AppError::Config(
                        "OLLAMA_URL is required when using the ollama provider".to_string(),
                    ));
                }
                None
            }
            EmbeddingProviderKind::OpenAi if is_blank(&e.openai_api_key) => Some("OPENAI_API_KEY"),
            EmbeddingProviderKind::Gemini if is_blank(&e.gemini_api_key) => Some("GEMINI_API_KEY"),
            EmbeddingProviderKind::HuggingFace if is_blank(&e.huggingface_api_key) => {
                Some("HUGGINGFACE_API_KEY")
            }
            EmbeddingProviderKind::Groq if is_blank(&e.groq_api_key) => Some("GROQ_API_KEY"),
            _ => None,
        };

        if let Some(var) = missing_key {
            return Err(AppError::Config(format!(
                "{} is required when using the {} provider",
                var, e.provider
            )));
        }

        Ok(())
    }

    /// Ensure the knowledge-base root exists (needed by ingestion commands).
    pub fn validate_knowledge_base(&self) -> AppResult<()> {
        let root = self.knowledge_base_root();
        if !root.is_dir() {
            return Err(AppError::Config(format!(
                "Knowledge base directory does not exist: {:?}",
                root
            )));
        }
        Ok(())
    }
}

fn merge_string(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            *target = v;
        }
    }
}

fn merge_secret(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            *target = Some(v);
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Ollama);
        assert_eq!(config.qdrant.collection, "senior_dev_mind");
        assert_eq!(config.qdrant.vector_size, 768);
        assert_eq!(config.identity_document, "workflows/senior-dev-rules.md");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_devmind_dir() {
        let config = AppConfig::default();
        assert!(config.devmind_dir().ends_with(".devmind"));
    }

    #[test]
    fn test_knowledge_base_resolves_against_workspace() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with_env(Some(temp.path().to_path_buf()), None, env_from(&[]))
            .unwrap();
        assert_eq!(config.knowledge_base_root(), temp.path().join(".agent"));
    }

    #[test]
    fn test_env_overrides() {
        let temp = TempDir::new().unwrap();
        let env = env_from(&[
            ("QDRANT_URL", "http://qdrant:6334"),
            ("QDRANT_COLLECTION", "rules"),
            ("VECTOR_SIZE", "384"),
            ("EMBEDDING_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("KNOWLEDGE_BASE_PATH", "/srv/kb"),
        ]);

        let config = AppConfig::load_with_env(Some(temp.path().to_path_buf()), None, env).unwrap();

        assert_eq!(config.qdrant.url, "http://qdrant:6334");
        assert_eq!(config.qdrant.collection, "rules");
        assert_eq!(config.qdrant.vector_size, 384);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::OpenAi);
        assert_eq!(config.embedding.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.knowledge_base_root(), PathBuf::from("/srv/kb"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_vector_size_env() {
        let temp = TempDir::new().unwrap();
        let env = env_from(&[("VECTOR_SIZE", "big")]);
        let result = AppConfig::load_with_env(Some(temp.path().to_path_buf()), None, env);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_yaml_merge_then_env_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".devmind");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.yaml"),
            r#"
knowledgeBase: kb
identityDocument: workflows/identity.md
qdrant:
  url: http://from-yaml:6334
  collection: yaml_collection
  vectorSize: 512
embedding:
  provider: groq
  groqApiKey: gsk-yaml
logging:
  level: warn
  color: false
  format: json
"#,
        )
        .unwrap();

        let env = env_from(&[("QDRANT_COLLECTION", "env_collection")]);
        let config = AppConfig::load_with_env(Some(temp.path().to_path_buf()), None, env).unwrap();

        assert_eq!(config.qdrant.url, "http://from-yaml:6334");
        assert_eq!(config.qdrant.collection, "env_collection");
        assert_eq!(config.qdrant.vector_size, 512);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Groq);
        assert_eq!(config.identity_document, "workflows/identity.md");
        assert_eq!(config.knowledge_base_root(), temp.path().join("kb"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
        assert!(config.log_json);
    }

    #[test]
    fn test_explicit_missing_config_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_with_env(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
            env_from(&[]),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden =
            config.with_overrides(Some(PathBuf::from("/tmp/kb")), None, true, false);

        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
        assert_eq!(overridden.knowledge_base_root(), PathBuf::from("/tmp/kb"));
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(
            "Ollama".parse::<EmbeddingProviderKind>().unwrap(),
            EmbeddingProviderKind::Ollama
        );
        assert_eq!(
            "huggingface".parse::<EmbeddingProviderKind>().unwrap(),
            EmbeddingProviderKind::HuggingFace
        );
        let err = "cohere".parse::<EmbeddingProviderKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));

        assert!(EmbeddingProviderKind::Ollama.is_local());
        assert!(!EmbeddingProviderKind::Groq.is_local());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cloud_provider_requires_key() {
        let mut config = AppConfig::default();
        config.embedding.provider = EmbeddingProviderKind::Gemini;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        config.embedding.gemini_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_vector_size() {
        let mut config = AppConfig::default();
        config.qdrant.vector_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_knowledge_base_missing() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_with_env(Some(temp.path().to_path_buf()), None, env_from(&[]))
            .unwrap();
        assert!(config.validate_knowledge_base().is_err());

        std::fs::create_dir_all(temp.path().join(".agent")).unwrap();
        assert!(config.validate_knowledge_base().is_ok());
    }
}
