//! File store and line operations.
//!
//! Uploads are written to a date-organized blob directory and indexed in
//! SQLite. Everything else reads them back as lines: random picks, longest
//! lines, and the representation a client asked for.

pub mod index;
pub mod lines;
pub mod negotiate;
pub mod rank;
pub mod schema;
pub mod select;
pub mod storage;
pub mod upload;

pub use index::FileIndex;
pub use lines::read_lines;
pub use negotiate::{negotiate, MediaType, Payload, Rendered, Value};
pub use rank::{longest_lines, top_longest, LONGEST_ALL, LONGEST_PER_FILE};
pub use schema::{LineRecord, NewFile, StoredFile, UploadedFile};
pub use select::{most_common_char, pick_random_file, pick_random_line};
pub use storage::FileStorage;
pub use upload::{save_upload, Upload};
