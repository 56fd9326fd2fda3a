use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// License exam tier. Each one owns an independent question pool and
/// independent progress.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Technician,
    General,
    Extra,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Technician, Category::General, Category::Extra];

    pub fn to_key(self) -> &'static str {
        match self {
            Category::Technician => "technician",
            Category::General => "general",
            Category::Extra => "extra",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "technician" => Some(Category::Technician),
            "general" => Some(Category::General),
            "extra" => Some(Category::Extra),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Technician => "Technician",
            Category::General => "General",
            Category::Extra => "Amateur Extra",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(&s.trim().to_ascii_lowercase()).ok_or_else(|| {
            format!("unknown category '{s}' (expected technician, general or extra)")
        })
    }
}
