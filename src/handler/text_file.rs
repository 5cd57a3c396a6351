//! Default handler: save fetched text to a file
//!
//! Parse returns the fetched text verbatim as payload; archive writes it to a
//! file named from the last path segment of the target. This handler exists
//! so the engine can be exercised without any site-specific code.

use crate::engine::{Request, WorkQueue};
use crate::handler::{HandlerResult, JobHandler, ParseOutcome};
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;

/// Page text paired with the file name it will be saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub file_name: String,
    pub body: String,
}

/// Handler that archives every fetched page as a text file
pub struct TextFileHandler {
    out_dir: PathBuf,
}

impl TextFileHandler {
    /// Creates a handler writing into `out_dir` (created on first archive)
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

/// Derives a file name from the last path segment of a target
///
/// Falls back to "index" for targets ending in a separator.
fn file_name_for(target: &str) -> String {
    target
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("index")
        .to_string()
}

#[async_trait]
impl JobHandler for TextFileHandler {
    type Payload = SavedPage;

    async fn parse(
        &self,
        text: &str,
        request: &Request,
        _queue: &WorkQueue,
    ) -> HandlerResult<ParseOutcome<Self::Payload>> {
        tracing::debug!("parse: {}", request.target());
        Ok(ParseOutcome::Payload(SavedPage {
            file_name: file_name_for(request.target()),
            body: text.to_string(),
        }))
    }

    async fn archive(&self, payload: Self::Payload) -> HandlerResult<()> {
        tracing::debug!("archive: {}", payload.file_name);
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let path = self.out_dir.join(&payload.file_name);
        tokio::fs::write(&path, payload.body.as_bytes())
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_last_segment() {
        assert_eq!(file_name_for("http://example.com/a/b/page.html"), "page.html");
        assert_eq!(file_name_for("http://example.com/item"), "item");
    }

    #[test]
    fn test_file_name_fallback_for_trailing_slash() {
        assert_eq!(file_name_for("http://example.com/"), "index");
    }

    #[test]
    fn test_file_name_bare_host() {
        assert_eq!(file_name_for("http://example.com"), "example.com");
    }

    #[tokio::test]
    async fn test_parse_returns_text_verbatim() {
        let handler = TextFileHandler::new("/tmp/unused");
        let queue = WorkQueue::new();
        let request = Request::new("http://example.com/page.html");

        let outcome = handler.parse("hello world", &request, &queue).await.unwrap();
        match outcome {
            ParseOutcome::Payload(page) => {
                assert_eq!(page.file_name, "page.html");
                assert_eq!(page.body, "hello world");
            }
            other => panic!("expected payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_archive_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let handler = TextFileHandler::new(dir.path());

        handler
            .archive(SavedPage {
                file_name: "out.txt".to_string(),
                body: "payload".to_string(),
            })
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(written, "payload");
    }
}
