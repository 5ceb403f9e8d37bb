use crate::config::UploadConfig;
use crate::models::{ORIGINAL_BUNDLE, PRESERVATION_BUNDLE};

/// MIME type reported for bitstreams of unknown format
pub const OCTET_STREAM: &str = "application/octet-stream";

/// File categories a submission must contain and where they are filed.
///
/// A file's category is its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub required_files: Vec<String>,
    /// Categories filed into the preservation bundle
    pub hidden_files: Vec<String>,
    pub required_mime_type: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            required_files: config.required_files.clone(),
            hidden_files: config.hidden_files.clone(),
            required_mime_type: config.required_mime_type.clone(),
        }
    }

    /// Bundle a file with this description belongs in.
    pub fn bundle_for(&self, description: Option<&str>) -> &'static str {
        match description {
            Some(d) if self.hidden_files.iter().any(|h| h == d) => PRESERVATION_BUNDLE,
            _ => ORIGINAL_BUNDLE,
        }
    }

    /// Required categories joined for display: `A, B, C, D, and E`.
    pub fn list_required(&self) -> String {
        match self.required_files.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!("{}, and {}", init.join(", "), last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.required_files,
            vec![
                "Application Form",
                "Essay",
                "Research Paper",
                "Bibliography",
                "Letter of Support"
            ]
        );
        assert_eq!(policy.hidden_files, vec!["Application Form", "Letter of Support"]);
        assert_eq!(policy.required_mime_type, "application/pdf");
    }

    #[test]
    fn test_bundle_for() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.bundle_for(Some("Letter of Support")), PRESERVATION_BUNDLE);
        assert_eq!(policy.bundle_for(Some("letter of support")), ORIGINAL_BUNDLE);
        assert_eq!(policy.bundle_for(Some("Essay")), ORIGINAL_BUNDLE);
        assert_eq!(policy.bundle_for(None), ORIGINAL_BUNDLE);
    }

    #[test]
    fn test_list_required() {
        let mut policy = UploadPolicy::default();
        assert_eq!(
            policy.list_required(),
            "Application Form, Essay, Research Paper, Bibliography, and Letter of Support"
        );

        policy.required_files = vec!["A".into(), "B".into()];
        assert_eq!(policy.list_required(), "A, and B");

        policy.required_files = vec!["A".into()];
        assert_eq!(policy.list_required(), "A");

        policy.required_files.clear();
        assert_eq!(policy.list_required(), "");
    }
}
