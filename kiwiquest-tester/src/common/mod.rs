pub mod util;

pub use util::{split_csv, write_save_artifact};
