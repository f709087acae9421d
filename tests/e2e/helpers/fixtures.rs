use anyhow::Result;
use std::path::PathBuf;
use suttavoice_backend::domain::document::{Document, Segment};

pub struct TestFixtures {
    documents_root: PathBuf,
    recordings_root: PathBuf,
}

impl TestFixtures {
    pub fn new(documents_root: PathBuf, recordings_root: PathBuf) -> Self {
        Self {
            documents_root,
            recordings_root,
        }
    }

    /// Document with `count` segments `{sutta_uid}:1.{i}` in Pali and English
    pub fn document(sutta_uid: &str, author: &str, count: usize) -> Document {
        Document {
            sutta_uid: sutta_uid.to_string(),
            lang: "en".to_string(),
            author: author.to_string(),
            title: Some(format!("Title of {}", sutta_uid)),
            segments: (1..=count)
                .map(|i| {
                    Segment::new(format!("{}:1.{}", sutta_uid, i))
                        .with_text("pli", format!("pali text {}", i))
                        .with_text("en", format!("english text {}", i))
                })
                .collect(),
        }
    }

    pub async fn create_document(&self, document: &Document) -> Result<()> {
        let dir = self
            .documents_root
            .join(&document.lang)
            .join(&document.author);
        tokio::fs::create_dir_all(&dir).await?;
        let json = serde_json::to_vec(document)?;
        tokio::fs::write(dir.join(format!("{}.json", document.sutta_uid)), json).await?;
        Ok(())
    }

    pub async fn create_recording(
        &self,
        lang: &str,
        reader: &str,
        scid: &str,
        bytes: &[u8],
    ) -> Result<()> {
        let dir = self.recordings_root.join(lang).join(reader);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(format!("{}.mp3", scid.replace(':', "_"))), bytes).await?;
        Ok(())
    }
}
