//! Closed key sets used across the engine, and the fixed-size tables indexed
//! by them.
//!
//! Every per-workforce, per-expertise and per-infrastructure record is a
//! plain struct with one field per key, so a missing entry is a compile
//! error rather than a runtime lookup miss.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// A string did not name a member of a closed key set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a key enum together with a table struct holding one `T` per key.
macro_rules! keyed_table {
    (
        $(#[$key_meta:meta])*
        key $key:ident ($kind:literal);
        $(#[$table_meta:meta])*
        table $table:ident;
        { $( $variant:ident => $field:ident = $name:literal ),+ $(,)? }
    ) => {
        $(#[$key_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $key {
            $( #[serde(rename = $name)] $variant, )+
        }

        impl $key {
            pub const ALL: &'static [$key] = &[$( $key::$variant ),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $key::$variant => $name, )+
                }
            }
        }

        impl fmt::Display for $key {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $key {
            type Err = UnknownKey;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok($key::$variant), )+
                    _ => Err(UnknownKey {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        $(#[$table_meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $table<T> {
            $( pub $field: T, )+
        }

        impl<T> $table<T> {
            /// Build a table by evaluating `f` once per key, in declaration order.
            pub fn from_fn(mut f: impl FnMut($key) -> T) -> Self {
                Self {
                    $( $field: f($key::$variant), )+
                }
            }

            /// Iterate `(key, value)` pairs in declaration order.
            pub fn iter(&self) -> impl Iterator<Item = ($key, &T)> + '_ {
                $key::ALL.iter().map(move |&key| (key, &self[key]))
            }

            pub fn map<U>(&self, mut f: impl FnMut($key, &T) -> U) -> $table<U> {
                $table::from_fn(|key| f(key, &self[key]))
            }
        }

        impl<T> Index<$key> for $table<T> {
            type Output = T;

            fn index(&self, key: $key) -> &T {
                match key {
                    $( $key::$variant => &self.$field, )+
                }
            }
        }

        impl<T> IndexMut<$key> for $table<T> {
            fn index_mut(&mut self, key: $key) -> &mut T {
                match key {
                    $( $key::$variant => &mut self.$field, )+
                }
            }
        }
    };
}

keyed_table! {
    /// The five population tiers.
    key WorkforceType ("workforce type");
    /// One value per workforce type.
    table PerWorkforce;
    {
        Pioneer => pioneer = "PIONEER",
        Settler => settler = "SETTLER",
        Technician => technician = "TECHNICIAN",
        Engineer => engineer = "ENGINEER",
        Scientist => scientist = "SCIENTIST",
    }
}

keyed_table! {
    /// Expertise category of a production building. Experts, COGC
    /// advertising programs and faction bonuses all key on it.
    key ExpertiseType ("expertise");
    /// One value per expertise category.
    table PerExpertise;
    {
        Agriculture => agriculture = "AGRICULTURE",
        Chemistry => chemistry = "CHEMISTRY",
        Construction => construction = "CONSTRUCTION",
        Electronics => electronics = "ELECTRONICS",
        FoodIndustries => food_industries = "FOOD_INDUSTRIES",
        FuelRefining => fuel_refining = "FUEL_REFINING",
        Manufacturing => manufacturing = "MANUFACTURING",
        Metallurgy => metallurgy = "METALLURGY",
        ResourceExtraction => resource_extraction = "RESOURCE_EXTRACTION",
    }
}

keyed_table! {
    /// Habitation and storage buildings a plan can install.
    key InfrastructureType ("infrastructure building");
    /// One value per infrastructure building.
    table PerInfrastructure;
    {
        Hb1 => hb1 = "HB1",
        Hb2 => hb2 = "HB2",
        Hb3 => hb3 = "HB3",
        Hb4 => hb4 = "HB4",
        Hb5 => hb5 = "HB5",
        Hbb => hbb = "HBB",
        Hbc => hbc = "HBC",
        Hbm => hbm = "HBM",
        Hbl => hbl = "HBL",
        Sto => sto = "STO",
    }
}

// ---------------------------------------------------------------------------
// COGC program
// ---------------------------------------------------------------------------

/// The program a planet's Chamber of Global Commerce is running.
///
/// Serialized as the raw game string: `---`, `Invalid`, an expertise key for
/// advertising programs, or a plural workforce key (`PIONEERS`, ...) for
/// workforce programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CogcProgram {
    #[default]
    None,
    /// Placeholder the raw game data carries for unmapped programs.
    Invalid,
    Advertising(ExpertiseType),
    Workforce(WorkforceType),
}

impl CogcProgram {
    /// The expertise this program advertises, if it is an advertising program.
    pub fn advertised(self) -> Option<ExpertiseType> {
        match self {
            CogcProgram::Advertising(expertise) => Some(expertise),
            _ => None,
        }
    }
}

impl fmt::Display for CogcProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CogcProgram::None => f.write_str("---"),
            CogcProgram::Invalid => f.write_str("Invalid"),
            CogcProgram::Advertising(expertise) => f.write_str(expertise.as_str()),
            CogcProgram::Workforce(workforce) => write!(f, "{}S", workforce.as_str()),
        }
    }
}

impl FromStr for CogcProgram {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "---" => return Ok(CogcProgram::None),
            "Invalid" => return Ok(CogcProgram::Invalid),
            _ => {}
        }
        if let Ok(expertise) = s.parse::<ExpertiseType>() {
            return Ok(CogcProgram::Advertising(expertise));
        }
        s.strip_suffix('S')
            .and_then(|singular| singular.parse::<WorkforceType>().ok())
            .map(CogcProgram::Workforce)
            .ok_or_else(|| UnknownKey {
                kind: "COGC program",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for CogcProgram {
    type Error = UnknownKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CogcProgram> for String {
    fn from(program: CogcProgram) -> Self {
        program.to_string()
    }
}
