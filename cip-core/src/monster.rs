//! Assembling a [`MonsterRecord`] out of a monster file.

use crate::config::ScanConfig;
use crate::element::{self, Element};
use crate::error::Result;
use crate::file_utils::find_files_with_extension;
use crate::grammar::{
    parse_integer, parse_inventory_table, parse_outfit, parse_phrase_list, parse_skill_table,
    parse_spell_rules, parse_strategy,
};
use crate::models::{BloodType, CreatureFlag, MonsterRecord, Outfit};
use crate::reader::{PropertyPairs, open_cip_lines, read_property_pairs};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Accumulates property pairs into a monster record.
#[derive(Debug, Default)]
pub struct MonsterAssembler {
    record: MonsterRecord,
}

impl MonsterAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one property pair. `name` must already be lowercase.
    pub fn apply(&mut self, name: &str, value: &str) -> Result<()> {
        trace!("Applying property {} = {}", name, value);
        let record = &mut self.record;

        match name {
            "racenumber" => record.race_id = parse_integer(name, value)?,
            "name" => record.name = unquote(value).to_string(),
            "article" => record.article = unquote(value).to_string(),
            "outfit" => {
                let (id, head, body, legs, feet) = parse_outfit(value)?;
                record.outfit = Outfit::classify(id, head, body, legs, feet);
            }
            "corpse" => record.corpse = parse_integer(name, value)?,
            "blood" => match BloodType::from_cip_name(value) {
                Some(blood_type) => record.blood_type = blood_type,
                None => debug!("Ignoring unknown blood type {}", value),
            },
            "experience" => record.experience = parse_integer(name, value)?,
            "summoncost" => record.summon_cost = parse_integer(name, value)?,
            "fleethreshold" => record.flee_threshold = parse_integer(name, value)?,
            "attack" => record.attack = parse_integer(name, value)?,
            "defend" => record.defense = parse_integer(name, value)?,
            "armor" => record.armor = parse_integer(name, value)?,
            "poison" => debug!("Poison {} is left to the condition system", value),
            "losetarget" => record.lose_target = parse_integer(name, value)?,
            "strategy" => record.strategy = parse_strategy(value)?,
            "flags" => {
                let elements = element::parse(value)?.unwrap_or_default();
                for flag_name in flag_names(&elements) {
                    match CreatureFlag::from_cip_name(flag_name) {
                        Some(flag) => {
                            record.flags.insert(flag);
                        }
                        None => debug!("Ignoring unknown creature flag {}", flag_name),
                    }
                }
            }
            "skills" => record.skills = parse_skill_table(value)?,
            "spells" => record.spells = parse_spell_rules(value)?,
            "inventory" => record.inventory = parse_inventory_table(value)?,
            "talk" => record.phrases = parse_phrase_list(value)?,
            _ => debug!("Ignoring unknown property {}", name),
        }

        Ok(())
    }

    pub fn finish(self) -> MonsterRecord {
        self.record
    }
}

/// Bare flag names among the top-level elements.
///
/// `{KickBoxes, NoPoison}` gives one flag element per name, while
/// `(KickBoxes NoPoison)` gives a single id-less element whose attributes
/// are all bare names.
fn flag_names(elements: &[Element]) -> Vec<&str> {
    let mut names = Vec::new();
    for element in elements {
        if element.is_flag() {
            names.push(element.attributes[0].name.as_str());
        } else if element.id.is_none()
            && !element.attributes.is_empty()
            && element.attributes.iter().all(|attr| attr.value.is_none())
        {
            names.extend(element.attributes.iter().map(|attr| attr.name.as_str()));
        }
    }
    names
}

/// Strip one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn assemble<I>(pairs: PropertyPairs<I>) -> Result<MonsterRecord>
where
    I: Iterator<Item = Result<String>>,
{
    let mut assembler = MonsterAssembler::new();
    for pair in pairs {
        let (name, value) = pair?;
        assembler.apply(&name, &value)?;
    }
    Ok(assembler.finish())
}

/// Decode a monster from in-memory lines.
pub fn parse_monster_lines<I, S>(lines: I) -> Result<MonsterRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    assemble(read_property_pairs(lines))
}

/// Decode a monster file. Returns `Ok(None)` if the file does not exist.
pub fn parse_monster_file(path: &Path) -> Result<Option<MonsterRecord>> {
    let Some(lines) = open_cip_lines(path)? else {
        debug!("Monster file {:?} does not exist", path);
        return Ok(None);
    };

    assemble(PropertyPairs::new(lines)).map(Some)
}

/// Decode every monster file below `dir`, one file at a time.
pub fn load_monster_directory(dir: &Path, config: &ScanConfig) -> Result<Vec<(PathBuf, MonsterRecord)>> {
    let files = find_files_with_extension(dir, &config.extension)?;
    info!("Found {} .{} files in {:?}", files.len(), config.extension, dir);

    let mut monsters = Vec::with_capacity(files.len());
    for path in files {
        match parse_monster_file(&path) {
            Ok(Some(record)) => monsters.push((path, record)),
            Ok(None) => warn!("Monster file {:?} disappeared during scan", path),
            Err(e) if config.stop_on_error => return Err(e),
            Err(e) => warn!("Failed to parse {:?}: {}", path, e),
        }
    }

    Ok(monsters)
}
