//! Script markup parser.
//!
//! Turns raw narration markup (bracketed speaker tags, sticky visual
//! tags, metadata tags, a closing marker) into an ordered list of
//! [`Turn`](relato_models::Turn)s, plus a JSON manifest writer for
//! debugging and reproducibility.

pub mod error;
pub mod manifest;
pub mod parser;

pub use error::{ScriptError, ScriptResult};
pub use manifest::write_manifest;
pub use parser::{parse_script, parse_script_file};
