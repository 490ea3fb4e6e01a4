use std::path::Path;

use tracing::{debug, trace};

use crate::error::{FsError, Result};
use crate::native::NativeFs;
use crate::status::{FileStatus, StatusContext, file_status};

/// Lists the statuses of the children of a directory, or the status of the path
/// itself when it is not a directory. Order is unspecified.
///
/// A child that vanishes between enumeration and inspection is left out, so the
/// result may never have existed as a whole at any single instant. Any other
/// failure on a child aborts the listing.
pub(crate) fn list_status<N>(native: &N, path: &Path, ctx: &StatusContext) -> Result<Vec<FileStatus>>
where
    N: NativeFs + ?Sized,
{
    let path = ctx.absolutize(path);
    // a link to a directory is not itself a directory
    if !native.is_directory_no_follow(&path) {
        return Ok(vec![file_status(native, &path, ctx)?]);
    }

    let children = native
        .read_dir(&path)
        .map_err(|e| FsError::from_io(&path, e))?;
    let mut statuses = Vec::with_capacity(children.len());
    for child in children {
        match file_status(native, &child, ctx) {
            Ok(status) => statuses.push(status),
            Err(e) if e.is_not_found() => {
                debug!("{} disappeared while listing, skipping", child.display());
            }
            Err(e) => return Err(e),
        }
    }
    trace!(path = %path.display(), entries = statuses.len(), "list status");
    Ok(statuses)
}
