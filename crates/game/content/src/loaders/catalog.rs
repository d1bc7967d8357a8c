//! Id-keyed RON catalogs with versioned records.
//!
//! A catalog file is a RON map from id to record:
//!
//! ```ron
//! {
//!     "fireball": (name: "Fireball", effects: [damage(amount: 40.0, damage_type: fire)]),
//!     "fireball@v2": (effects: [damage(amount: 55.0, damage_type: fire)]),
//! }
//! ```
//!
//! A key of the form `base@version` holds only the fields that differ from
//! `base`. Records are merged one level deep before they are typed, so the
//! version replaces whole fields and never patches inside one.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, anyhow};
use ron::value::RawValue;
use serde::de::{DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Splits `"fireball@v2"` into `("fireball", Some("v2"))`.
pub fn split_version(id: &str) -> (&str, Option<&str>) {
    match id.split_once('@') {
        Some((base, version)) => (base, Some(version)),
        None => (id, None),
    }
}

/// Top-level fields of one record, kept as RON source text.
#[derive(Clone, Debug, Default)]
struct Fields(BTreeMap<String, String>);

impl Fields {
    fn overlay(&self, patch: &Fields) -> Fields {
        let mut merged = self.0.clone();
        merged.extend(patch.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Fields(merged)
    }

    fn to_ron(&self) -> String {
        let mut out = String::from("(\n");
        for (key, raw) in &self.0 {
            // A raw value may end in a line comment, so the comma gets its own line.
            out.push_str(key);
            out.push_str(": ");
            out.push_str(raw.trim());
            out.push_str("\n,\n");
        }
        out.push(')');
        out
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a record in `(field: value, ...)` form")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Fields, A::Error> {
                let mut fields = BTreeMap::new();
                while let Some((key, raw)) = map.next_entry::<String, Box<RawValue>>()? {
                    fields.insert(key, raw.get_ron().to_owned());
                }
                Ok(Fields(fields))
            }
        }

        deserializer.deserialize_struct("", &[], FieldsVisitor)
    }
}

/// Typed records keyed by id, versioned ids already merged.
#[derive(Clone, Debug)]
pub struct Catalog<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: DeserializeOwned> Catalog<T> {
    /// Load a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Parse catalog source text, resolving every `base@version` key.
    ///
    /// Versioned records and their bases must be written in `(field: value)`
    /// form; any other record may use whatever syntax its type accepts.
    pub fn parse(content: &str) -> LoadResult<Self> {
        let raw: BTreeMap<String, Box<RawValue>> =
            ron::from_str(content).context("Failed to parse catalog RON")?;

        let mut entries = BTreeMap::new();
        for (id, record) in &raw {
            let parsed = match split_version(id) {
                (_, None) => ron::from_str::<T>(record.get_ron()),
                (base, Some(_)) => {
                    let base_record = raw
                        .get(base)
                        .ok_or_else(|| anyhow!("versioned record {id} has no base record {base}"))?;
                    let merged = fields_of(base_record)?.overlay(&fields_of(record)?);
                    ron::from_str::<T>(&merged.to_ron())
                }
            };
            let record = parsed.with_context(|| format!("Failed to parse record {id}"))?;
            entries.insert(id.clone(), record);
        }
        tracing::debug!(records = entries.len(), "catalog parsed");
        Ok(Self { entries })
    }
}

fn fields_of(record: &RawValue) -> LoadResult<Fields> {
    ron::from_str(record.get_ron()).context("versioned records must use `(field: value)` form")
}

impl<T> Catalog<T> {
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, T> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::env::SpellEffect;
    use game_core::state::{DamageType, ResourceKind};
    use game_core::{SpellDefinition, TargetKind};

    const SPELLS: &str = r#"
    {
        "fireball": (
            name: "Fireball",
            cost: (resource: mana, amount: 20.0),
            effects: [damage(amount: 40.0, damage_type: fire)],
            can_crit: true,
        ),
        // Stronger, pricier rework.
        "fireball@v2": (
            cost: (resource: mana, amount: 30.0),
            effects: [damage(amount: 55.0, damage_type: fire)], // fire only
        ),
        "mend": (
            name: "Mend",
            target: ally,
            effects: [heal(amount: 25.0)],
        ),
    }
    "#;

    #[test]
    fn split_version_finds_the_suffix() {
        assert_eq!(split_version("fireball@v2"), ("fireball", Some("v2")));
        assert_eq!(split_version("fireball"), ("fireball", None));
    }

    #[test]
    fn versioned_record_overrides_base_fields() {
        let catalog = Catalog::<SpellDefinition>::parse(SPELLS).unwrap();
        assert_eq!(catalog.len(), 3);

        let base = catalog.get("fireball").unwrap();
        let v2 = catalog.get("fireball@v2").unwrap();

        assert_eq!(v2.name, "Fireball");
        assert!(v2.can_crit);
        assert_eq!(v2.cost.amount, 30.0);
        assert_eq!(v2.cost.resource, ResourceKind::Mana);
        assert_eq!(
            v2.effects,
            vec![SpellEffect::Damage {
                amount: 55.0,
                damage_type: DamageType::Fire,
                lifesteal_ratio: 0.0,
            }]
        );
        assert_eq!(base.cost.amount, 20.0);
        assert_eq!(catalog.get("mend").unwrap().target, TargetKind::Ally);
    }

    #[test]
    fn unknown_ids_are_absent() {
        let catalog = Catalog::<SpellDefinition>::parse(SPELLS).unwrap();
        assert!(catalog.get("fireball@v3").is_none());
        assert!(!catalog.contains("frostbolt"));
    }

    #[test]
    fn version_without_base_is_rejected() {
        let err = Catalog::<SpellDefinition>::parse(r#"{ "bolt@v2": (name: "Bolt", effects: []) }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("no base record bolt"));
    }

    #[test]
    fn bad_record_names_its_id() {
        let err = Catalog::<SpellDefinition>::parse(r#"{ "bolt": (name: "Bolt") }"#).unwrap_err();
        assert!(format!("{err:#}").contains("record bolt"));
    }
}
