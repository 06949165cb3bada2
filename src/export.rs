use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::ExportError;
use crate::raster::ImageBlob;

pub const CERTIFICATE_SUFFIX: &str = "_certificate.png";

/// `{identifier}_certificate.png`, with anything that would leave the
/// output directory replaced by `_`.
pub fn certificate_filename(identifier: &str) -> String {
    let stem: String = identifier
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{}{}", stem, CERTIFICATE_SUFFIX)
}

/// Write the blob next to its destination first and move it into place,
/// so a reader never sees a half-written image.
pub fn save_blob(
    blob: &ImageBlob,
    dest_dir: impl AsRef<Path>,
    filename: &str,
) -> Result<PathBuf, ExportError> {
    let dest_dir = dest_dir.as_ref();
    fs::create_dir_all(dest_dir)?;

    let target = dest_dir.join(filename);
    let partial = dest_dir.join(format!(".{}.part", filename));
    let saved = fs::write(&partial, &blob.png)
        .and_then(|()| fs::rename(&partial, &target));
    if let Err(e) = saved {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    debug!(
        "Saved {}x{} certificate to {}",
        blob.width,
        blob.height,
        target.display()
    );
    Ok(target)
}
