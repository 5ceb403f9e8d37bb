mod bitstream;
mod bitstream_format;
mod bundle;
mod item;
mod workspace_item;

pub use bitstream::{Bitstream, BundleBitstream, NewBitstream};
pub use bitstream_format::{BitstreamFormat, FormatSupportLevel, NewBitstreamFormat};
pub use bundle::{Bundle, NewBundle, ORIGINAL_BUNDLE, PRESERVATION_BUNDLE};
pub use item::{Item, NewItem};
pub use workspace_item::{NewWorkspaceItem, WorkspaceItem};
