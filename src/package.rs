use std::io::{self, Cursor, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::template::{DOCUMENT_PART, Template};

/// Write the template package with `document_xml` as its main document part.
///
/// Every other entry is copied raw (still compressed), so headers, footers,
/// styles and media come out byte-identical. The new main part reuses the
/// template entry's timestamp, which keeps repeated runs byte-identical too.
pub fn write_package<W: Write + Seek>(
    template: &Template,
    document_xml: &[u8],
    writer: W,
) -> ZipResult<W> {
    let mut archive = ZipArchive::new(Cursor::new(template.package()))?;
    let mut zip = ZipWriter::new(writer);

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        if file.name() == DOCUMENT_PART {
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(file.last_modified());
            zip.start_file(DOCUMENT_PART, options)?;
            zip.write_all(document_xml)?;
        } else {
            zip.raw_copy_file(file)?;
        }
    }

    zip.finish()
}

/// Write the package to `output` atomically.
///
/// The package is built in a temporary file next to `output` and renamed into
/// place once complete. On any failure the temporary file is removed and
/// `output` is left untouched.
pub fn save(template: &Template, document_xml: &[u8], output: &Path) -> Result<()> {
    let write_err = |source: io::Error| Error::OutputWrite {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(&write_err)?;
    write_package(template, document_xml, tmp.as_file_mut())
        .map_err(|e| write_err(e.into()))?;
    tmp.as_file().sync_all().map_err(&write_err)?;
    tmp.persist(output).map_err(|e| write_err(e.error))?;

    log::info!("wrote {}", output.display());
    Ok(())
}
