//! The `app` domain: global layout, navigation, index and not-found pages.

use std::path::Path;

use nsview::vfs::DirFs;
use nsview::{RendererBuilder, VfsError};

pub const NAMESPACE: &str = "app";
pub const INDEX_TEMPLATE: &str = "app/index.html";
pub const NOT_FOUND_TEMPLATE: &str = "app/notfound.html";

/// Register the app views as a global namespace and designate the not-found
/// page. The index is the root template given to [`RendererBuilder::new`].
pub fn register(builder: &mut RendererBuilder, views_root: &Path) -> Result<(), VfsError> {
    builder.register_namespace(NAMESPACE, DirFs::new(views_root.join(NAMESPACE)), true)?;
    builder.set_not_found(NOT_FOUND_TEMPLATE);
    Ok(())
}
