mod book;
mod file;
mod genre;

pub use self::book::Book;
pub use self::file::BookFile;
pub(crate) use self::file::{FileRow, path_to_row};
pub use self::genre::Genre;
