use crate::domain::document::{Document, DocumentQuery};
use super::is_path_component;
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static NUMERIC_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(\d+)-(\d+)$").expect("valid range pattern"));

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("invalid document reference: {0}")]
    Invalid(String),
    #[error("document store error: {0}")]
    Storage(String),
}

/// Resolves document references into ordered, segmented documents
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Resolve a comma-separated list of references, at most
    /// `query.max_results` documents, in reference order
    async fn resolve(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError>;

    /// Load a single document. Without an author the first available
    /// translation in `lang` is used.
    async fn load_document(
        &self,
        sutta_uid: &str,
        lang: &str,
        author: Option<&str>,
    ) -> Result<Document, DocumentStoreError>;
}

/// A parsed `uid[/lang[/author]]` reference
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    pub sutta_uid: String,
    pub lang: Option<String>,
    pub author: Option<String>,
}

impl DocumentRef {
    pub fn parse(reference: &str) -> Result<Self, DocumentStoreError> {
        let mut parts = reference.trim().split('/').map(str::trim);
        let sutta_uid = parts
            .next()
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| DocumentStoreError::Invalid(reference.to_string()))?
            .to_lowercase();
        let lang = parts.next().filter(|s| !s.is_empty()).map(str::to_lowercase);
        let author = parts.next().filter(|s| !s.is_empty()).map(str::to_lowercase);
        Ok(Self {
            sutta_uid,
            lang,
            author,
        })
    }

    /// Expand a trailing numeric range (`an3.76-77` -> `an3.76`, `an3.77`)
    pub fn expand(&self, limit: usize) -> Vec<DocumentRef> {
        let Some(caps) = NUMERIC_RANGE.captures(&self.sutta_uid) else {
            return vec![self.clone()];
        };
        let (Ok(start), Ok(end)) = (caps[2].parse::<u32>(), caps[3].parse::<u32>()) else {
            return vec![self.clone()];
        };
        if start > end {
            return vec![self.clone()];
        }
        (start..=end)
            .take(limit)
            .map(|n| DocumentRef {
                sutta_uid: format!("{}{}", &caps[1], n),
                lang: self.lang.clone(),
                author: self.author.clone(),
            })
            .collect()
    }
}

/// Documents stored as JSON files at `{root}/{lang}/{author}/{sutta_uid}.json`
pub struct JsonDocumentRepository {
    root: PathBuf,
}

impl JsonDocumentRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, lang: &str, author: &str, sutta_uid: &str) -> PathBuf {
        self.root
            .join(lang)
            .join(author)
            .join(format!("{}.json", sutta_uid))
    }

    async fn find_author(&self, sutta_uid: &str, lang: &str) -> Option<String> {
        let mut entries = tokio::fs::read_dir(self.root.join(lang)).await.ok()?;
        let mut authors = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str().filter(|n| is_path_component(n)) {
                authors.push(name.to_string());
            }
        }
        authors.sort();
        for author in authors {
            let path = self.document_path(lang, &author, sutta_uid);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Some(author);
            }
        }
        None
    }
}

#[async_trait]
impl DocumentRepository for JsonDocumentRepository {
    async fn resolve(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError> {
        let mut documents = Vec::new();
        for reference in query.pattern.split(',').filter(|r| !r.trim().is_empty()) {
            let parsed = DocumentRef::parse(reference)?;
            for doc_ref in parsed.expand(query.max_results) {
                if documents.len() >= query.max_results {
                    break;
                }
                let lang = doc_ref.lang.as_deref().unwrap_or(&query.lang);
                let document = self
                    .load_document(&doc_ref.sutta_uid, lang, doc_ref.author.as_deref())
                    .await?;
                documents.push(document);
            }
        }

        if documents.is_empty() {
            return Err(DocumentStoreError::NotFound(query.pattern.clone()));
        }

        tracing::info!(
            pattern = %query.pattern,
            documents = ?documents.iter().map(|d| d.sutta_uid.as_str()).collect::<Vec<_>>(),
            "Pattern resolved"
        );
        Ok(documents)
    }

    async fn load_document(
        &self,
        sutta_uid: &str,
        lang: &str,
        author: Option<&str>,
    ) -> Result<Document, DocumentStoreError> {
        if let Some(bad) = [sutta_uid, lang, author.unwrap_or(lang)]
            .into_iter()
            .find(|part| !is_path_component(part))
        {
            return Err(DocumentStoreError::Invalid(bad.to_string()));
        }
        let author = match author {
            Some(author) => author.to_string(),
            None => self.find_author(sutta_uid, lang).await.ok_or_else(|| {
                DocumentStoreError::NotFound(format!("{}/{}", sutta_uid, lang))
            })?,
        };
        let path = self.document_path(lang, &author, sutta_uid);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocumentStoreError::NotFound(format!(
                    "{}/{}/{}",
                    sutta_uid, lang, author
                )))
            }
            Err(e) => return Err(DocumentStoreError::Storage(e.to_string())),
        };
        serde_json::from_str(&json)
            .map_err(|e| DocumentStoreError::Storage(format!("{}: {}", path.display(), e)))
    }
}
