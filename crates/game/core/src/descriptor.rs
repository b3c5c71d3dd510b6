//! Tower type descriptors (flyweights) and the card records they come from.
//!
//! A [`TowerDescriptor`] holds everything shared by all towers of one family:
//! resolved visuals and combat stats. Descriptors are shared behind `Arc` and
//! replaced wholesale on modification, so a reader never observes a partially
//! updated descriptor.

use std::sync::Arc;

use crate::error::{ErrorSeverity, GameError};
use crate::types::TowerTypeId;

/// Resolved reference to an externally loaded visual resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    /// Key the resource was resolved from.
    pub key: Arc<str>,
    /// Resolver-assigned identifier.
    pub id: u64,
}

impl AssetHandle {
    pub fn new(key: impl AsRef<str>, id: u64) -> Self {
        Self {
            key: Arc::from(key.as_ref()),
            id,
        }
    }
}

/// A named visual plus its resolved handle.
///
/// `handle` is `None` when resolution failed and the descriptor fell back to a
/// placeholder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Visual {
    pub name: String,
    pub handle: Option<AssetHandle>,
}

impl Visual {
    pub fn resolved(name: impl Into<String>, handle: AssetHandle) -> Self {
        Self {
            name: name.into(),
            handle: Some(handle),
        }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.handle.is_some()
    }
}

/// One row of the card table.
///
/// Field names on the wire follow the card list format
/// (`CardID`, `CardIcon`, `ManaCost`, `HorizontalCellsRange`, ...).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct CardRecord {
    #[cfg_attr(feature = "serde", serde(rename = "CardID", with = "card_id"))]
    pub card_id: TowerTypeId,
    pub card_icon: String,
    pub level: i32,
    pub mana_cost: i32,
    #[cfg_attr(feature = "serde", serde(rename = "Type"))]
    pub kind: String,
    pub horizontal_cells_range: i32,
    pub vertical_cells_range: i32,
    pub damage: i32,
    pub fire_cooldown: f32,
    pub projectile_sprite: String,
    pub initial_hp: i32,
}

/// Card ids are strings in the card list; integers are accepted as well.
#[cfg(feature = "serde")]
mod card_id {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::types::TowerTypeId;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(id: &TowerTypeId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TowerTypeId, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(TowerTypeId(value)),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map(TowerTypeId)
                .map_err(|_| D::Error::custom(format!("invalid card id '{text}'"))),
        }
    }
}

/// The four visuals resolved for a descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DescriptorVisuals {
    pub tower_sprite: Visual,
    pub card_icon: Visual,
    pub type_icon: Visual,
    pub projectile_sprite: Visual,
}

/// Shared, per-family tower data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TowerDescriptor {
    pub type_id: TowerTypeId,
    pub tower_sprite: Visual,
    pub card_icon: Visual,
    pub type_icon: Visual,
    pub projectile_sprite: Visual,
    pub mana_cost: i32,
    pub stars: i32,
    /// Horizontal reach, in cells.
    pub horizontal_range: i32,
    /// Vertical reach, in cells.
    pub vertical_range: i32,
    pub damage: i32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    pub initial_hp: i32,
}

impl TowerDescriptor {
    pub fn from_record(record: &CardRecord, visuals: DescriptorVisuals) -> Self {
        Self {
            type_id: record.card_id,
            tower_sprite: visuals.tower_sprite,
            card_icon: visuals.card_icon,
            type_icon: visuals.type_icon,
            projectile_sprite: visuals.projectile_sprite,
            mana_cost: record.mana_cost,
            stars: record.level,
            horizontal_range: record.horizontal_cells_range,
            vertical_range: record.vertical_cells_range,
            damage: record.damage,
            fire_cooldown: record.fire_cooldown,
            initial_hp: record.initial_hp,
        }
    }

    /// Rehydrates the card record this descriptor currently represents.
    pub fn to_record(&self) -> CardRecord {
        CardRecord {
            card_id: self.type_id,
            card_icon: self.card_icon.name.clone(),
            level: self.stars,
            mana_cost: self.mana_cost,
            kind: self.type_icon.name.clone(),
            horizontal_cells_range: self.horizontal_range,
            vertical_cells_range: self.vertical_range,
            damage: self.damage,
            fire_cooldown: self.fire_cooldown,
            projectile_sprite: self.projectile_sprite.name.clone(),
            initial_hp: self.initial_hp,
        }
    }

    /// Reads a field as a [`FieldValue`].
    pub fn get(&self, field: DescriptorField) -> FieldValue {
        match field {
            DescriptorField::TypeId => FieldValue::Int(self.type_id.0 as i32),
            DescriptorField::TowerSprite => FieldValue::Visual(self.tower_sprite.clone()),
            DescriptorField::CardIcon => FieldValue::Visual(self.card_icon.clone()),
            DescriptorField::TypeIcon => FieldValue::Visual(self.type_icon.clone()),
            DescriptorField::ProjectileSprite => {
                FieldValue::Visual(self.projectile_sprite.clone())
            }
            DescriptorField::ManaCost => FieldValue::Int(self.mana_cost),
            DescriptorField::Stars => FieldValue::Int(self.stars),
            DescriptorField::HorizontalRange => FieldValue::Int(self.horizontal_range),
            DescriptorField::VerticalRange => FieldValue::Int(self.vertical_range),
            DescriptorField::Damage => FieldValue::Int(self.damage),
            DescriptorField::FireCooldown => FieldValue::Float(self.fire_cooldown),
            DescriptorField::InitialHp => FieldValue::Int(self.initial_hp),
        }
    }

    /// Writes `value` into `field`.
    ///
    /// The descriptor is left untouched when the field is read-only or the
    /// value has the wrong type.
    pub fn apply(&mut self, field: DescriptorField, value: FieldValue) -> Result<(), ModifyError> {
        use DescriptorField as F;

        if !field.is_writable() {
            return Err(ModifyError::ReadOnly(field));
        }

        match (field, value) {
            (F::CardIcon, FieldValue::Visual(v)) => self.card_icon = v,
            (F::TypeIcon, FieldValue::Visual(v)) => self.type_icon = v,
            (F::ProjectileSprite, FieldValue::Visual(v)) => self.projectile_sprite = v,
            (F::ManaCost, FieldValue::Int(v)) => self.mana_cost = v,
            (F::Stars, FieldValue::Int(v)) => self.stars = v,
            (F::HorizontalRange, FieldValue::Int(v)) => self.horizontal_range = v,
            (F::VerticalRange, FieldValue::Int(v)) => self.vertical_range = v,
            (F::Damage, FieldValue::Int(v)) => self.damage = v,
            (F::InitialHp, FieldValue::Int(v)) => self.initial_hp = v,
            (F::FireCooldown, FieldValue::Float(v)) => self.fire_cooldown = v,
            (F::FireCooldown, FieldValue::Int(v)) => self.fire_cooldown = v as f32,
            (field, value) => {
                return Err(ModifyError::TypeMismatch {
                    field,
                    expected: field.value_kind(),
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }
}

/// Closed set of descriptor fields addressable by the modify entry point.
///
/// Parses both the card-list property names (`"Damage"`, `"ManaCost"`,
/// `"HorizontalCellsRange"`) and snake_case names, case-insensitively.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DescriptorField {
    #[strum(to_string = "type_id", serialize = "TypeId", serialize = "CardID")]
    TypeId,
    #[strum(to_string = "tower_sprite", serialize = "TowerSprite")]
    TowerSprite,
    #[strum(to_string = "card_icon", serialize = "CardIcon")]
    CardIcon,
    #[strum(to_string = "type_icon", serialize = "TypeIcon", serialize = "Type")]
    TypeIcon,
    #[strum(to_string = "projectile_sprite", serialize = "ProjectileSprite")]
    ProjectileSprite,
    #[strum(to_string = "mana_cost", serialize = "ManaCost")]
    ManaCost,
    #[strum(to_string = "stars", serialize = "Level")]
    Stars,
    #[strum(
        to_string = "horizontal_range",
        serialize = "HorizontalCellsRange",
        serialize = "horizontal_cells_range"
    )]
    HorizontalRange,
    #[strum(
        to_string = "vertical_range",
        serialize = "VerticalCellsRange",
        serialize = "vertical_cells_range"
    )]
    VerticalRange,
    #[strum(to_string = "damage")]
    Damage,
    #[strum(to_string = "fire_cooldown", serialize = "FireCooldown")]
    FireCooldown,
    #[strum(to_string = "initial_hp", serialize = "InitialHp")]
    InitialHp,
}

impl DescriptorField {
    /// Identity and the tower sprite are fixed for the descriptor's lifetime.
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::TypeId | Self::TowerSprite)
    }

    pub const fn value_kind(self) -> &'static str {
        match self {
            Self::TowerSprite | Self::CardIcon | Self::TypeIcon | Self::ProjectileSprite => {
                "visual"
            }
            Self::FireCooldown => "float",
            _ => "int",
        }
    }
}

/// Typed value written through [`TowerDescriptor::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i32),
    Float(f32),
    Visual(Visual),
}

impl FieldValue {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Visual(_) => "visual",
        }
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Visual> for FieldValue {
    fn from(value: Visual) -> Self {
        Self::Visual(value)
    }
}

/// Rejected descriptor mutation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ModifyError {
    #[error("unknown descriptor field '{0}'")]
    UnknownField(String),

    #[error("descriptor field '{0}' is read-only")]
    ReadOnly(DescriptorField),

    #[error("descriptor field '{field}' expects a {expected} value, got {found}")]
    TypeMismatch {
        field: DescriptorField,
        expected: &'static str,
        found: &'static str,
    },
}

impl GameError for ModifyError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownField(_) => "MODIFY_UNKNOWN_FIELD",
            Self::ReadOnly(_) => "MODIFY_READ_ONLY",
            Self::TypeMismatch { .. } => "MODIFY_TYPE_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn sample() -> TowerDescriptor {
        let record = CardRecord {
            card_id: TowerTypeId(1),
            card_icon: "ArrowIcon".into(),
            level: 2,
            mana_cost: 3,
            kind: "Ranged".into(),
            horizontal_cells_range: 2,
            vertical_cells_range: 1,
            damage: 4,
            fire_cooldown: 1.0,
            projectile_sprite: "Arrow".into(),
            initial_hp: 20,
        };
        let visuals = DescriptorVisuals {
            tower_sprite: Visual::placeholder("Tower_1"),
            card_icon: Visual::placeholder("ArrowIcon"),
            type_icon: Visual::placeholder("Ranged"),
            projectile_sprite: Visual::placeholder("Arrow"),
        };
        TowerDescriptor::from_record(&record, visuals)
    }

    #[test]
    fn field_names_parse_from_card_properties() {
        let parse = |name: &str| DescriptorField::from_str(name).ok();
        assert_eq!(parse("Damage"), Some(DescriptorField::Damage));
        assert_eq!(parse("ManaCost"), Some(DescriptorField::ManaCost));
        assert_eq!(parse("mana_cost"), Some(DescriptorField::ManaCost));
        assert_eq!(
            parse("HorizontalCellsRange"),
            Some(DescriptorField::HorizontalRange)
        );
        assert_eq!(parse("Level"), Some(DescriptorField::Stars));
        assert_eq!(parse("Speed"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for field in DescriptorField::iter() {
            assert_eq!(DescriptorField::from_str(&field.to_string()), Ok(field));
        }
    }

    #[test]
    fn apply_writes_typed_values() {
        let mut descriptor = sample();
        descriptor.apply(DescriptorField::Damage, 9.into()).unwrap();
        descriptor.apply(DescriptorField::FireCooldown, 0.5_f32.into()).unwrap();
        descriptor
            .apply(DescriptorField::CardIcon, Visual::placeholder("Gold").into())
            .unwrap();

        assert_eq!(descriptor.damage, 9);
        assert_eq!(descriptor.fire_cooldown, 0.5);
        assert_eq!(descriptor.card_icon.name, "Gold");
    }

    #[test]
    fn read_only_and_mismatched_writes_leave_descriptor_unchanged() {
        let mut descriptor = sample();
        let before = descriptor.clone();

        assert_eq!(
            descriptor.apply(DescriptorField::TypeId, 7.into()),
            Err(ModifyError::ReadOnly(DescriptorField::TypeId))
        );
        assert!(matches!(
            descriptor.apply(DescriptorField::Damage, 1.5_f32.into()),
            Err(ModifyError::TypeMismatch { expected: "int", found: "float", .. })
        ));
        assert_eq!(descriptor, before);
    }

    #[test]
    fn to_record_reflects_current_stats() {
        let mut descriptor = sample();
        descriptor.apply(DescriptorField::ManaCost, 5.into()).unwrap();

        let record = descriptor.to_record();
        assert_eq!(record.mana_cost, 5);
        assert_eq!(record.level, 2);
        assert_eq!(record.kind, "Ranged");
        assert_eq!(record.card_id, TowerTypeId(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn card_record_accepts_string_and_numeric_ids() {
        let json = r#"{
            "CardID": "3", "CardIcon": "Cannon", "Level": 1, "ManaCost": 4,
            "Type": "Siege", "HorizontalCellsRange": 1, "VerticalCellsRange": 3,
            "Damage": 6, "FireCooldown": 2, "ProjectileSprite": "Ball", "InitialHp": 30
        }"#;
        let record: CardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.card_id, TowerTypeId(3));
        assert_eq!(record.fire_cooldown, 2.0);

        let numeric = json.replace(r#""CardID": "3""#, r#""CardID": 3"#);
        let record: CardRecord = serde_json::from_str(&numeric).unwrap();
        assert_eq!(record.card_id, TowerTypeId(3));

        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["CardID"], "3");
        assert_eq!(encoded["Type"], "Siege");
    }
}
