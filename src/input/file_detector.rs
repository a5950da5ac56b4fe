//! Document format detection

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Markdown,
    Pdf,
    Docx,
    Doc,
    Unknown,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" => DocumentFormat::Text,
            "md" | "markdown" => DocumentFormat::Markdown,
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "doc" => DocumentFormat::Doc,
            _ => DocumentFormat::Unknown,
        }
    }

    /// Classify a document from its declared content type and its location.
    ///
    /// Either hint is enough; plain text wins over everything else, then
    /// markdown, PDF, DOCX and legacy DOC.
    pub fn detect(content_type: Option<&str>, location: &str) -> Self {
        let content_type = content_type.unwrap_or("").to_lowercase();
        let by_ext = location_extension(location)
            .map(|ext| Self::from_extension(&ext))
            .unwrap_or(DocumentFormat::Unknown);

        if content_type.contains("text/plain") || by_ext == DocumentFormat::Text {
            DocumentFormat::Text
        } else if content_type.contains("text/markdown") || by_ext == DocumentFormat::Markdown {
            DocumentFormat::Markdown
        } else if content_type.contains("pdf") || by_ext == DocumentFormat::Pdf {
            DocumentFormat::Pdf
        } else if content_type.contains("wordprocessingml") || by_ext == DocumentFormat::Docx {
            DocumentFormat::Docx
        } else if content_type.contains("msword") || by_ext == DocumentFormat::Doc {
            DocumentFormat::Doc
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Lower-cased extension of the last path segment. URLs are judged by their
/// path only, so query strings and fragments do not hide the suffix.
pub fn location_extension(location: &str) -> Option<String> {
    let path = match Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location.to_string(),
    };

    let segment = path.rsplit(['/', '\\']).next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(DocumentFormat::detect(Some("text/plain; charset=utf-8"), "https://x/cv"), DocumentFormat::Text);
        assert_eq!(DocumentFormat::detect(Some("application/pdf"), "https://x/cv"), DocumentFormat::Pdf);
        assert_eq!(
            DocumentFormat::detect(
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                "https://x/cv"
            ),
            DocumentFormat::Docx
        );
        assert_eq!(DocumentFormat::detect(Some("application/msword"), "https://x/cv"), DocumentFormat::Doc);
        assert_eq!(DocumentFormat::detect(Some("application/octet-stream"), "https://x/cv"), DocumentFormat::Unknown);
    }

    #[test]
    fn test_suffix_detection() {
        assert_eq!(DocumentFormat::detect(None, "https://cdn.example.com/u/cv.PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::detect(None, "https://cdn.example.com/u/cv.docx?sig=abc"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::detect(None, "https://cdn.example.com/u/cv.doc#page=2"), DocumentFormat::Doc);
        assert_eq!(DocumentFormat::detect(None, "resumes/jane.txt"), DocumentFormat::Text);
        assert_eq!(DocumentFormat::detect(None, "resumes/jane.md"), DocumentFormat::Markdown);
        assert_eq!(DocumentFormat::detect(None, "resumes/jane"), DocumentFormat::Unknown);
    }

    #[test]
    fn test_plain_text_takes_precedence() {
        // A text/plain response wins even if the URL says otherwise.
        assert_eq!(DocumentFormat::detect(Some("text/plain"), "https://x/cv.pdf"), DocumentFormat::Text);
    }

    #[test]
    fn test_location_extension() {
        assert_eq!(location_extension("https://x.io/a/b/resume.Pdf?x=1").as_deref(), Some("pdf"));
        assert_eq!(location_extension("/home/jane/cv.docx").as_deref(), Some("docx"));
        assert_eq!(location_extension("https://x.io/a/b/"), None);
        assert_eq!(location_extension("noext"), None);
    }
}
