//! Media module: link classification and media source resolution.

pub mod classify;
pub mod extension;
pub mod gallery;
pub mod preview;

pub use classify::{classify, ContentKind};
pub use extension::{default_extension, extension_for_mime, extension_from_url};
pub use gallery::{resolve_items, GalleryItem, UnresolvedItem};
pub use preview::{best_preview, PreviewMedia};
