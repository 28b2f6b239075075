mod page;
mod spa;
mod timestamp;

pub use page::{Page, PageKey, PageType};
pub use spa::{FileKind, SpaFile, SpaGroup};
pub use timestamp::Timestamp;
