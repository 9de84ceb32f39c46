//! Batch validation for dropped files.
//!
//! A drop is accepted or refused as a whole: one file of the wrong class or
//! over the size limit blocks every file delivered with it.

use crate::models::file::FileEntry;
use crate::models::options::{FileClass, UploadOptions};
use crate::models::upload::Rejection;

pub fn check_files(files: &[FileEntry], options: &UploadOptions) -> Result<(), Rejection> {
    if files.len() > options.max_batch_count {
        return Err(Rejection::TooManyFiles {
            max: options.max_batch_count,
        });
    }

    let max_bytes = options.max_size_bytes();
    for file in files {
        if options.file_class != FileClass::All && !options.file_class.admits(&file.mime_type) {
            return Err(Rejection::DisallowedType {
                class: options.file_class.to_string(),
                file_name: file.file_name.clone(),
            });
        }
        if file.file_size > max_bytes {
            return Err(Rejection::TooLarge {
                file_name: file.file_name.clone(),
                max_mib: options.max_size_mib,
            });
        }
    }

    Ok(())
}
