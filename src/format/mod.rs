//! On-disk formats: particle box files and the marked-image list.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use partbox::format::{BoxFileCodec, box_path_for};
//!
//! let decoded = BoxFileCodec::read(&box_path_for(&image), &calibration)?;
//! let text = BoxFileCodec::encode(&decoded.store, &calibration, box_size);
//! ```

mod box_file;
mod error;
mod marked_list;

pub use box_file::{
    BOX_EXTENSION, BoxFileCodec, BoxRow, DecodedBoxFile, SaveOutcome, box_path_for, parse_row,
};
pub use error::FormatError;
pub use marked_list::{MARKED_LIST_FILENAME, MarkedImages};
