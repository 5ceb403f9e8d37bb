use crate::content::ContentStore;
use crate::error::AppResult;
use crate::models::BitstreamFormat;

/// Registry lookup by file name extension
pub struct FormatIdentifier;

impl FormatIdentifier {
    /// Lower-cased text after the last `.`, if any.
    pub fn extension(name: &str) -> Option<String> {
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// Guesses the format of a file from its name. `None` means unknown.
    pub async fn guess(
        store: &mut dyn ContentStore,
        name: &str,
    ) -> AppResult<Option<BitstreamFormat>> {
        match Self::extension(name) {
            Some(ext) => store.find_format_by_extension(&ext).await,
            None => Ok(None),
        }
    }
}
