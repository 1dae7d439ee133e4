//! Runtime configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional YAML settings file, then environment variables (a `.env` file is
//! loaded into the environment first). Secrets are only read from the
//! environment.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{ChunkingConfig, DomainError, PromptTemplate, DEFAULT_ANSWER_TEMPLATE};
use crate::infrastructure::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::infrastructure::llm::DEFAULT_CHAT_MODEL;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_SETTINGS_FILE: &str = "config.yaml";

pub mod env {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const CHAT_MODEL: &str = "OPENAI_CHAT_MODEL";
    pub const TEMPERATURE: &str = "OPENAI_TEMPERATURE";
    pub const EMBEDDING_MODEL: &str = "OPENAI_EMBEDDING_MODEL";
    pub const QDRANT_URL: &str = "QDRANT_URL";
    pub const QDRANT_API_KEY: &str = "QDRANT_API_KEY";
    pub const COLLECTION: &str = "QDRANT_COLLECTION";
    pub const PDF_PATH: &str = "PDF_PATH";
    pub const TOP_K: &str = "TOPK";
    pub const SETTINGS_FILE: &str = "PDF_RAG_CONFIG";
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub ingestion: IngestionConfig,
    pub rag: RagConfig,
    pub chunking: ChunkingConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub url: String,
    pub collection: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl fmt::Debug for VectorStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStoreConfig")
            .field("url", &self.url)
            .field("collection", &self.collection)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub pdf_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub answer: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            answer: DEFAULT_ANSWER_TEMPLATE.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, the settings file and the process environment.
    ///
    /// The settings file is `$PDF_RAG_CONFIG` when set (and must then exist),
    /// otherwise `config.yaml` in the working directory if present.
    pub fn load() -> Result<Self, DomainError> {
        dotenvy::dotenv().ok();

        let settings = match std::env::var(env::SETTINGS_FILE) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from(DEFAULT_SETTINGS_FILE)).filter(|p| p.is_file()),
        };

        Self::from_sources(settings.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        settings: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DomainError> {
        let mut config = match settings {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            DomainError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), DomainError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if get(env::OPENAI_API_KEY).is_none() {
            return Err(missing(env::OPENAI_API_KEY));
        }

        if let Some(v) = get(env::CHAT_MODEL) {
            self.llm.model = v;
        }
        if let Some(v) = get(env::TEMPERATURE) {
            self.llm.temperature = parse(env::TEMPERATURE, &v)?;
        }
        if let Some(v) = get(env::EMBEDDING_MODEL) {
            self.embedding.model = v;
        }
        if let Some(v) = get(env::QDRANT_URL) {
            self.vector_store.url = v;
        }
        if let Some(v) = get(env::COLLECTION) {
            self.vector_store.collection = v;
        }
        self.vector_store.api_key = get(env::QDRANT_API_KEY);
        if let Some(v) = get(env::PDF_PATH) {
            self.ingestion.pdf_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get(env::TOP_K) {
            self.rag.top_k = parse(env::TOP_K, &v)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.vector_store.url.trim().is_empty() {
            return Err(missing(env::QDRANT_URL));
        }
        if self.vector_store.collection.trim().is_empty() {
            return Err(missing(env::COLLECTION));
        }
        if self.llm.model.trim().is_empty() {
            return Err(DomainError::config("chat model name cannot be empty"));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(DomainError::config("embedding model name cannot be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DomainError::config(format!(
                "invalid temperature: {} (must be between 0.0 and 2.0)",
                self.llm.temperature
            )));
        }
        if self.rag.top_k == 0 {
            return Err(DomainError::config("top_k must be at least 1"));
        }
        if self.chunking.chunk_size == 0 {
            return Err(DomainError::config("chunk_size must be at least 1"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(DomainError::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        self.prompt_template()?;
        Ok(())
    }

    pub fn prompt_template(&self) -> Result<PromptTemplate, DomainError> {
        PromptTemplate::new(self.prompts.answer.clone())
    }

    /// The PDF to ingest. Only ingestion needs it.
    pub fn require_pdf_path(&self) -> Result<&Path, DomainError> {
        self.ingestion
            .pdf_path
            .as_deref()
            .ok_or_else(|| missing(env::PDF_PATH))
    }
}

fn missing(key: &str) -> DomainError {
    DomainError::config(format!("environment variable {key} is not set"))
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DomainError>
where
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| DomainError::config(format!("invalid value for {key} ({value:?}): {e}")))
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

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (env::OPENAI_API_KEY, "sk-test"),
            (env::QDRANT_URL, "http://localhost:6334"),
            (env::COLLECTION, "manual"),
        ]
    }

    #[test]
    fn test_defaults_with_required_env() {
        let config = AppConfig::from_sources(None, env_from(&required())).unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.rag.top_k, 10);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 150);
        assert_eq!(config.vector_store.collection, "manual");
        assert!(config.vector_store.api_key.is_none());
        assert!(config.ingestion.pdf_path.is_none());
    }

    #[test]
    fn test_missing_required_values() {
        for key in [env::OPENAI_API_KEY, env::QDRANT_URL, env::COLLECTION] {
            let vars: Vec<_> = required().into_iter().filter(|(k, _)| *k != key).collect();
            let err = AppConfig::from_sources(None, env_from(&vars)).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars: Vec<_> = required()
            .into_iter()
            .filter(|(k, _)| *k != env::OPENAI_API_KEY)
            .collect();
        vars.push((env::OPENAI_API_KEY, "   "));
        assert!(AppConfig::from_sources(None, env_from(&vars)).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut vars = required();
        vars.extend([
            (env::CHAT_MODEL, "gpt-4o"),
            (env::TEMPERATURE, "0.7"),
            (env::EMBEDDING_MODEL, "text-embedding-3-large"),
            (env::TOP_K, "3"),
            (env::PDF_PATH, "docs/manual.pdf"),
            (env::QDRANT_API_KEY, "secret"),
        ]);
        let config = AppConfig::from_sources(None, env_from(&vars)).unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        assert_eq!(config.rag.top_k, 3);
        assert_eq!(
            config.require_pdf_path().unwrap(),
            Path::new("docs/manual.pdf")
        );
        assert_eq!(config.vector_store.api_key.as_deref(), Some("secret"));
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        for (key, value) in [
            (env::TOP_K, "ten"),
            (env::TOP_K, "0"),
            (env::TEMPERATURE, "hot"),
            (env::TEMPERATURE, "3.5"),
        ] {
            let mut vars = required();
            vars.push((key, value));
            assert!(
                AppConfig::from_sources(None, env_from(&vars)).is_err(),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_require_pdf_path() {
        let config = AppConfig::from_sources(None, env_from(&required())).unwrap();
        let err = config.require_pdf_path().unwrap_err();
        assert!(err.to_string().contains(env::PDF_PATH));
    }

    #[test]
    fn test_settings_file_with_env_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  model: gpt-4.1-mini
  temperature: 0.2
vector_store:
  url: http://qdrant:6334
  collection: from-file
rag:
  top_k: 4
chunking:
  chunk_size: 500
  chunk_overlap: 50
prompts:
  answer: "Context: {context}\nQuestion: {question}"
"#,
        )
        .unwrap();

        let vars = [
            (env::OPENAI_API_KEY, "sk-test"),
            (env::COLLECTION, "from-env"),
        ];
        let config = AppConfig::from_sources(Some(&path), env_from(&vars)).unwrap();

        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.vector_store.url, "http://qdrant:6334");
        assert_eq!(config.vector_store.collection, "from-env");
        assert_eq!(config.rag.top_k, 4);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(
            config.prompt_template().unwrap().render("c", "q"),
            "Context: c\nQuestion: q"
        );
    }

    #[test]
    fn test_settings_file_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "chunking:\n  chunk_size: 100\n  chunk_overlap: 100\n").unwrap();

        let err = AppConfig::from_sources(Some(&path), env_from(&required())).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));

        std::fs::write(&path, "prompts:\n  answer: \"no placeholders\"\n").unwrap();
        assert!(AppConfig::from_sources(Some(&path), env_from(&required())).is_err());

        std::fs::write(&path, "unknown_section: true\n").unwrap();
        assert!(AppConfig::from_sources(Some(&path), env_from(&required())).is_err());
    }

    #[test]
    fn test_missing_settings_file() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::from_sources(Some(&dir.path().join("nope.yaml")), env_from(&required()))
            .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
