//! Command implementations for OxiRes CLI.

pub mod compress;
pub mod expand;
pub mod measure;
pub mod pack;
pub mod unpack;

pub use compress::{CompressOptions, cmd_compress};
pub use expand::{ExpandOptions, cmd_expand};
pub use measure::cmd_measure;
pub use pack::cmd_pack;
pub use unpack::{UnpackOptions, cmd_unpack};
