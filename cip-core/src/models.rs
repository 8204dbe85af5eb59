//! Data models for decoded CIP monster files.

use crate::error::Result;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// How an outfit should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutfitType {
    /// A fully defined outfit with colours.
    #[default]
    Outfit,
    /// Only a race look, no colours.
    Race,
    Invisible,
    /// Looks like an item. Never produced by the monster file classification.
    Item,
}

/// A creature look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Outfit {
    pub kind: OutfitType,
    pub id: u16,
    pub head: u8,
    pub body: u8,
    pub legs: u8,
    pub feet: u8,
}

impl Outfit {
    /// Build an outfit from raw values, deriving its type.
    ///
    /// A zero look type is invisible; a look type with all colours zero is a
    /// plain race look.
    pub fn classify(id: u16, head: u8, body: u8, legs: u8, feet: u8) -> Self {
        let colours = u32::from(head) + u32::from(body) + u32::from(legs) + u32::from(feet);
        let kind = if id == 0 {
            OutfitType::Invisible
        } else if colours == 0 {
            OutfitType::Race
        } else {
            OutfitType::Outfit
        };

        Self {
            kind,
            id,
            head,
            body,
            legs,
            feet,
        }
    }
}

/// Attack target selection weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Strategy {
    pub closest: u8,
    pub weakest: u8,
    pub strongest: u8,
    pub random: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEntry {
    pub name: String,
    pub default_level: u32,
    pub current_level: u32,
    pub max_level: u32,
    pub target_count: u32,
    pub count_increase_factor: u32,
    pub increaser_per_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpellCastType {
    /// Cast on itself.
    Actor,
    /// Cast as a cone towards the facing direction.
    Angle,
    Destination,
    /// Cast around its own position.
    Origin,
    Victim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpellEffectType {
    Damage,
    Drunken,
    Field,
    Healing,
    Outfit,
    Speed,
    Strength,
    Summon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellCondition {
    pub cast_type: SpellCastType,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellEffect {
    pub effect_type: SpellEffectType,
    pub values: Vec<i64>,
    /// The look argument of an `Outfit` effect, if one was given.
    pub look: Option<Outfit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellRule {
    pub condition: SpellCondition,
    pub effect: SpellEffect,
    pub chance: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub type_id: u16,
    pub max_amount: u8,
    pub drop_chance: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BloodType {
    #[default]
    Blood,
    Slime,
    Bones,
    Fire,
    Energy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CreatureFlag {
    KickBoxes,
    KickCreatures,
    SeeInvisible,
    Unpushable,
    DistanceFighting,
    NoSummon,
    NoIllusion,
    NoConvince,
    NoBurning,
    NoPoison,
    NoEnergy,
    NoHit,
    NoLifeDrain,
    NoParalyze,
}

lazy_static! {
    static ref BLOOD_TYPES: HashMap<&'static str, BloodType> = HashMap::from([
        ("Blood", BloodType::Blood),
        ("Slime", BloodType::Slime),
        ("Bones", BloodType::Bones),
        ("Fire", BloodType::Fire),
        ("Energy", BloodType::Energy),
    ]);
    static ref CREATURE_FLAGS: HashMap<&'static str, CreatureFlag> = HashMap::from([
        ("KickBoxes", CreatureFlag::KickBoxes),
        ("KickCreatures", CreatureFlag::KickCreatures),
        ("SeeInvisible", CreatureFlag::SeeInvisible),
        ("Unpushable", CreatureFlag::Unpushable),
        ("DistanceFighting", CreatureFlag::DistanceFighting),
        ("NoSummon", CreatureFlag::NoSummon),
        ("NoIllusion", CreatureFlag::NoIllusion),
        ("NoConvince", CreatureFlag::NoConvince),
        ("NoBurning", CreatureFlag::NoBurning),
        ("NoPoison", CreatureFlag::NoPoison),
        ("NoEnergy", CreatureFlag::NoEnergy),
        ("NoHit", CreatureFlag::NoHit),
        ("NoLifeDrain", CreatureFlag::NoLifeDrain),
        ("NoParalyze", CreatureFlag::NoParalyze),
    ]);
    static ref CAST_TYPES: HashMap<&'static str, SpellCastType> = HashMap::from([
        ("Actor", SpellCastType::Actor),
        ("Angle", SpellCastType::Angle),
        ("Destination", SpellCastType::Destination),
        ("Origin", SpellCastType::Origin),
        ("Victim", SpellCastType::Victim),
    ]);
    static ref EFFECT_TYPES: HashMap<&'static str, SpellEffectType> = HashMap::from([
        ("Damage", SpellEffectType::Damage),
        ("Drunken", SpellEffectType::Drunken),
        ("Field", SpellEffectType::Field),
        ("Healing", SpellEffectType::Healing),
        ("Outfit", SpellEffectType::Outfit),
        ("Speed", SpellEffectType::Speed),
        ("Strength", SpellEffectType::Strength),
        ("Summon", SpellEffectType::Summon),
    ]);
}

impl BloodType {
    /// Look up a blood type by its exact CIP name.
    pub fn from_cip_name(name: &str) -> Option<Self> {
        BLOOD_TYPES.get(name).copied()
    }
}

impl CreatureFlag {
    /// Look up a creature flag by its exact CIP name.
    pub fn from_cip_name(name: &str) -> Option<Self> {
        CREATURE_FLAGS.get(name).copied()
    }
}

impl SpellCastType {
    pub fn from_cip_name(name: &str) -> Option<Self> {
        CAST_TYPES.get(name).copied()
    }
}

impl SpellEffectType {
    pub fn from_cip_name(name: &str) -> Option<Self> {
        EFFECT_TYPES.get(name).copied()
    }
}

/// Everything decoded from one monster file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonsterRecord {
    pub race_id: u32,
    pub name: String,
    pub article: String,
    pub outfit: Outfit,
    pub corpse: u32,
    pub blood_type: BloodType,
    pub experience: u32,
    pub summon_cost: u16,
    pub flee_threshold: u16,
    pub attack: u16,
    pub defense: u16,
    pub armor: u16,
    pub lose_target: u8,
    pub strategy: Strategy,
    pub flags: BTreeSet<CreatureFlag>,
    pub skills: Vec<SkillEntry>,
    pub spells: Vec<SpellRule>,
    pub inventory: Vec<InventoryEntry>,
    pub phrases: Vec<String>,
}

impl MonsterRecord {
    pub fn skill(&self, name: &str) -> Option<&SkillEntry> {
        self.skills.iter().find(|skill| skill.name == name)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
