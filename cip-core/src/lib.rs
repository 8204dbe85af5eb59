//! Parser for CIP monster definition files.

pub mod config;
pub mod element;
pub mod enclosure;
pub mod error;
pub mod file_utils;
pub mod grammar;
pub mod models;
pub mod monster;
pub mod reader;

pub use config::ScanConfig;
pub use error::{CipError, Result};
pub use models::MonsterRecord;
pub use monster::{MonsterAssembler, load_monster_directory, parse_monster_file, parse_monster_lines};
pub use reader::{PropertyPairs, read_property_pairs};
