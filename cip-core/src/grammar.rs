//! Grammars for individual monster property values.
//!
//! ```text
//! Outfit    = (130, 0-52-128-95)
//! Strategy  = (100, 0, 0, 0)
//! Skills    = {(HitPoints, 3200, 0, 3200, 0, 0, 0), (GoStrength, 75, 0, 75, 0, 0, 0)}
//! Spells    = {Victim (7, 0, 14) -> Speed (-80, 20, 40) : 9}
//! Inventory = {(3567, 1, 20), (3600, 1, 110)}
//! Talk      = {"We don't like intruders!"}
//! ```
//!
//! List values take `{…}` or `(…)` as their outer bracket and separate items
//! with commas, whitespace or both.

use crate::error::{CipError, Result};
use crate::models::{
    InventoryEntry, Outfit, SkillEntry, SpellCastType, SpellCondition, SpellEffect,
    SpellEffectType, SpellRule, Strategy,
};
use std::str::FromStr;

/// Raw outfit values: look type, then head, body, legs and feet colours.
pub type OutfitValues = (u16, u8, u8, u8, u8);

/// Parse a whole value as an integer of the given width.
pub fn parse_integer<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CipError::invalid_number(field, value))
}

/// Character cursor over one property value.
struct ValueCursor<'a> {
    what: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> ValueCursor<'a> {
    fn new(what: &'a str, text: &str) -> Self {
        Self {
            what,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.get(self.pos).copied()
    }

    fn error(&self, expected: &str) -> CipError {
        match self.chars.get(self.pos) {
            Some(found) => CipError::Grammar(format!(
                "expected {} in {} at position {}, found '{}'",
                expected, self.what, self.pos, found
            )),
            None => CipError::Grammar(format!(
                "expected {} in {}, found end of value",
                expected, self.what
            )),
        }
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", ch)))
        }
    }

    /// Consume an opening bracket and return its closer.
    fn open(&mut self) -> Result<char> {
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                Ok('}')
            }
            Some('(') => {
                self.pos += 1;
                Ok(')')
            }
            _ => Err(self.error("'{' or '('")),
        }
    }

    fn finish(&mut self) -> Result<()> {
        if self.peek().is_some() {
            return Err(self.error("end of value"));
        }
        Ok(())
    }

    fn identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.chars.len()
            && (self.chars[self.pos].is_alphanumeric() || self.chars[self.pos] == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("a name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn number<T: TryFrom<i64>>(&mut self, field: &str) -> Result<T> {
        self.skip_whitespace();
        let start = self.pos;
        if matches!(self.chars.get(self.pos), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while self.pos < self.chars.len()
            && (self.chars[self.pos].is_alphanumeric() || matches!(self.chars[self.pos], '.' | '_'))
        {
            self.pos += 1;
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<i64>()
            .ok()
            .and_then(|wide| T::try_from(wide).ok())
            .ok_or_else(|| CipError::invalid_number(field, &literal))
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect('"')?;
        let start = self.pos;
        while self.pos < self.chars.len() && self.chars[self.pos] != '"' {
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            return Err(CipError::UnterminatedQuote(self.chars[start - 1..].iter().collect()));
        }
        let text = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(text)
    }

    /// `(lookType, head-body-legs-feet)`, colours may also be comma separated.
    fn look(&mut self) -> Result<OutfitValues> {
        let close = self.open()?;
        let id = self.number("outfit look type")?;
        self.expect(',')?;
        let head = self.number("outfit head colour")?;
        self.colour_separator()?;
        let body = self.number("outfit body colour")?;
        self.colour_separator()?;
        let legs = self.number("outfit legs colour")?;
        self.colour_separator()?;
        let feet = self.number("outfit feet colour")?;
        self.expect(close)?;
        Ok((id, head, body, legs, feet))
    }

    fn colour_separator(&mut self) -> Result<()> {
        if self.eat('-') || self.eat(',') {
            Ok(())
        } else {
            Err(self.error("'-' between outfit colours"))
        }
    }

    /// `(a, b, …)` of signed integers, possibly empty.
    fn integer_tuple(&mut self, field: &str) -> Result<Vec<i64>> {
        self.expect('(')?;
        let mut values = Vec::new();
        if self.eat(')') {
            return Ok(values);
        }
        loop {
            values.push(self.number(field)?);
            if !self.eat(',') {
                break;
            }
        }
        self.expect(')')?;
        Ok(values)
    }

    /// A bracketed list of items; the list must be the whole value.
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let close = self.open()?;
        let mut items = Vec::new();
        loop {
            while self.eat(',') {}
            if self.eat(close) {
                break;
            }
            if self.peek().is_none() {
                return Err(CipError::UnbalancedEnclosure(format!(
                    "missing '{}' at end of {}",
                    close, self.what
                )));
            }
            items.push(item(self)?);
        }
        self.finish()?;
        Ok(items)
    }
}

/// Parse `Outfit = (130, 0-52-128-95)`.
pub fn parse_outfit(value: &str) -> Result<OutfitValues> {
    let mut cursor = ValueCursor::new("outfit", value);
    let look = cursor.look()?;
    cursor.finish()?;
    Ok(look)
}

/// Parse `Strategy = (closest, weakest, strongest, random)`.
pub fn parse_strategy(value: &str) -> Result<Strategy> {
    let mut cursor = ValueCursor::new("strategy", value);
    let close = cursor.open()?;
    let closest = cursor.number("strategy closest")?;
    cursor.expect(',')?;
    let weakest = cursor.number("strategy weakest")?;
    cursor.expect(',')?;
    let strongest = cursor.number("strategy strongest")?;
    cursor.expect(',')?;
    let random = cursor.number("strategy random")?;
    cursor.expect(close)?;
    cursor.finish()?;

    Ok(Strategy {
        closest,
        weakest,
        strongest,
        random,
    })
}

fn skill_levels(cursor: &mut ValueCursor<'_>, name: String) -> Result<SkillEntry> {
    let default_level = cursor.number("skill default level")?;
    cursor.expect(',')?;
    let current_level = cursor.number("skill current level")?;
    cursor.expect(',')?;
    let max_level = cursor.number("skill maximum level")?;
    cursor.expect(',')?;
    let target_count = cursor.number("skill target count")?;
    cursor.expect(',')?;
    let count_increase_factor = cursor.number("skill count increase factor")?;
    cursor.expect(',')?;
    let increaser_per_level = cursor.number("skill increaser per level")?;
    cursor.expect(')')?;

    Ok(SkillEntry {
        name,
        default_level,
        current_level,
        max_level,
        target_count,
        count_increase_factor,
        increaser_per_level,
    })
}

/// Parse a skill table, items written as `(Name, …)` or `Name(…)`.
pub fn parse_skill_table(value: &str) -> Result<Vec<SkillEntry>> {
    ValueCursor::new("skills", value).list(|cursor| {
        if cursor.eat('(') {
            let name = cursor.identifier()?;
            cursor.expect(',')?;
            skill_levels(cursor, name)
        } else {
            let name = cursor.identifier()?;
            cursor.expect('(')?;
            skill_levels(cursor, name)
        }
    })
}

fn spell_rule(cursor: &mut ValueCursor<'_>) -> Result<SpellRule> {
    let cast_name = cursor.identifier()?;
    let cast_type = SpellCastType::from_cip_name(&cast_name)
        .ok_or_else(|| CipError::Grammar(format!("unknown spell cast type {}", cast_name)))?;
    let condition_values = cursor.integer_tuple("spell condition value")?;

    cursor.expect('-')?;
    cursor.expect('>')?;

    let effect_name = cursor.identifier()?;
    let effect_type = SpellEffectType::from_cip_name(&effect_name)
        .ok_or_else(|| CipError::Grammar(format!("unknown spell effect type {}", effect_name)))?;

    let mut effect_values = Vec::new();
    let mut look = None;
    cursor.expect('(')?;
    if !cursor.eat(')') {
        loop {
            if cursor.peek() == Some('(') {
                let (id, head, body, legs, feet) = cursor.look()?;
                look = Some(Outfit::classify(id, head, body, legs, feet));
            } else {
                effect_values.push(cursor.number("spell effect value")?);
            }
            if !cursor.eat(',') {
                break;
            }
        }
        cursor.expect(')')?;
    }

    cursor.expect(':')?;
    let chance = cursor.number("spell chance")?;

    Ok(SpellRule {
        condition: SpellCondition {
            cast_type,
            values: condition_values,
        },
        effect: SpellEffect {
            effect_type,
            values: effect_values,
            look,
        },
        chance,
    })
}

/// Parse `Spells = {Cast (…) -> Effect (…) : chance, …}`.
pub fn parse_spell_rules(value: &str) -> Result<Vec<SpellRule>> {
    ValueCursor::new("spells", value).list(spell_rule)
}

/// Parse `Inventory = {(typeId, maxAmount, dropChance), …}`.
pub fn parse_inventory_table(value: &str) -> Result<Vec<InventoryEntry>> {
    ValueCursor::new("inventory", value).list(|cursor| {
        cursor.expect('(')?;
        let type_id = cursor.number("inventory type id")?;
        cursor.expect(',')?;
        let max_amount = cursor.number("inventory maximum amount")?;
        cursor.expect(',')?;
        let drop_chance = cursor.number("inventory drop chance")?;
        cursor.expect(')')?;

        Ok(InventoryEntry {
            type_id,
            max_amount,
            drop_chance,
        })
    })
}

/// Parse `Talk = {"…", "…"}` into the phrases without their quotes.
pub fn parse_phrase_list(value: &str) -> Result<Vec<String>> {
    ValueCursor::new("talk", value).list(ValueCursor::quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outfit() {
        assert_eq!(parse_outfit("(130, 0-52-128-95)").unwrap(), (130, 0, 52, 128, 95));
        assert_eq!(parse_outfit("  (0, 0-0-0-0) ").unwrap(), (0, 0, 0, 0, 0));
        assert_eq!(parse_outfit("(35, 1, 2, 3, 4)").unwrap(), (35, 1, 2, 3, 4));
    }

    #[test]
    fn test_parse_outfit_bad_colour() {
        let err = parse_outfit("(130, 0-52-300-95)").unwrap_err();
        assert!(matches!(err, CipError::InvalidNumber { .. }));
    }

    #[test]
    fn test_parse_strategy() {
        let strategy = parse_strategy("(100,0,0,0)").unwrap();
        assert_eq!(
            strategy,
            Strategy {
                closest: 100,
                weakest: 0,
                strongest: 0,
                random: 0
            }
        );
        assert_eq!(parse_strategy(" ( 10, 20, 30, 40 ) ").unwrap().random, 40);
    }

    #[test]
    fn test_parse_strategy_invalid_number() {
        let err = parse_strategy("(100, x, 0, 0)").unwrap_err();
        assert!(err.is_format_error());
        assert!(matches!(err, CipError::InvalidNumber { ref value, .. } if value == "x"));
    }

    #[test]
    fn test_parse_skills_call_form() {
        let skills =
            parse_skill_table("( HitPoints(3200,3200,3200,0,0,0) GoStrength(75,75,75,0,0,0) )").unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].name, "HitPoints");
        assert_eq!(skills[0].default_level, 3200);
        assert_eq!(skills[1].name, "GoStrength");
        assert_eq!(skills[1].default_level, 75);
    }

    #[test]
    fn test_parse_skills_tuple_form() {
        let skills = parse_skill_table(
            "{(HitPoints, 3200, 0, 3200, 0, 0, 0), (FistFighting, 50, 50, 50, 100, 1000, 1)}",
        )
        .unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(
            skills[1],
            SkillEntry {
                name: "FistFighting".to_string(),
                default_level: 50,
                current_level: 50,
                max_level: 50,
                target_count: 100,
                count_increase_factor: 1000,
                increaser_per_level: 1,
            }
        );
    }

    #[test]
    fn test_parse_skills_negative_level_fails() {
        assert!(parse_skill_table("{(HitPoints, -1, 0, 0, 0, 0, 0)}").is_err());
    }

    #[test]
    fn test_parse_spell_rules() {
        let rules = parse_spell_rules(
            "{Actor (13) -> Healing (80, 20) : 4,
              Victim (7, 0, 14) -> Speed (-80, 20, 40) : 9,
              Origin (0, 13) -> Summon (67, 1) : 10,
              Angle (0, 8, 12) -> Damage (8, 175, 30) : 8}",
        )
        .unwrap();

        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].condition.cast_type, SpellCastType::Actor);
        assert_eq!(rules[0].condition.values, vec![13]);
        assert_eq!(rules[0].effect.effect_type, SpellEffectType::Healing);
        assert_eq!(rules[0].effect.values, vec![80, 20]);
        assert_eq!(rules[0].chance, 4);

        assert_eq!(rules[1].effect.values, vec![-80, 20, 40]);
        assert_eq!(rules[2].effect.effect_type, SpellEffectType::Summon);
        assert_eq!(rules[3].condition.cast_type, SpellCastType::Angle);
        assert_eq!(rules[3].chance, 8);
    }

    #[test]
    fn test_parse_spell_outfit_effect() {
        let rules = parse_spell_rules("{Actor (13) -> Outfit ((0, 0-0-0-0), 20) : 10}").unwrap();
        let effect = &rules[0].effect;
        assert_eq!(effect.effect_type, SpellEffectType::Outfit);
        assert_eq!(effect.values, vec![20]);
        assert_eq!(effect.look.map(|look| look.kind), Some(crate::models::OutfitType::Invisible));
    }

    #[test]
    fn test_parse_spell_unknown_cast_type() {
        let err = parse_spell_rules("{Nowhere (1) -> Damage (1, 2, 3) : 4}").unwrap_err();
        assert!(matches!(err, CipError::Grammar(_)));
    }

    #[test]
    fn test_parse_inventory_whitespace_separated() {
        let inventory = parse_inventory_table("( (3567,1,20) (3600,1,110) )").unwrap();
        assert_eq!(
            inventory,
            vec![
                InventoryEntry {
                    type_id: 3567,
                    max_amount: 1,
                    drop_chance: 20
                },
                InventoryEntry {
                    type_id: 3600,
                    max_amount: 1,
                    drop_chance: 110
                },
            ]
        );
    }

    #[test]
    fn test_parse_inventory_empty() {
        assert!(parse_inventory_table("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_inventory_unclosed() {
        let err = parse_inventory_table("{(3567, 1, 20)").unwrap_err();
        assert!(matches!(err, CipError::UnbalancedEnclosure(_)));
    }

    #[test]
    fn test_parse_phrases() {
        let phrases = parse_phrase_list(
            r#"{"Learn the secret of our magic! YOUR death!", "Even a rat is a better mage than you."}"#,
        )
        .unwrap();
        assert_eq!(
            phrases,
            vec![
                "Learn the secret of our magic! YOUR death!",
                "Even a rat is a better mage than you."
            ]
        );
    }

    #[test]
    fn test_parse_phrases_unterminated() {
        let err = parse_phrase_list(r#"{"Even a rat}"#).unwrap_err();
        assert!(matches!(err, CipError::UnterminatedQuote(_)));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer::<u16>("attack", " 40 ").unwrap(), 40);
        assert!(parse_integer::<u8>("losetarget", "256").is_err());
    }
}
