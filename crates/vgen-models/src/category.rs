//! Product category definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product category a daily price video is generated for.
///
/// Serialized as the label the generation service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Vegetables
    #[serde(rename = "蔬菜")]
    Vegetables,
    /// Fruit
    #[serde(rename = "水果")]
    Fruit,
    /// Fish and other aquatic products
    #[serde(rename = "水产")]
    Aquatic,
    /// Meat, poultry and eggs
    #[serde(rename = "肉禽蛋")]
    MeatPoultryEggs,
}

impl Category {
    /// Every category, in the order a run processes them.
    pub const ALL: &'static [Category] = &[
        Category::Vegetables,
        Category::Fruit,
        Category::Aquatic,
        Category::MeatPoultryEggs,
    ];

    /// Label sent to the generation service.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Vegetables => "蔬菜",
            Category::Fruit => "水果",
            Category::Aquatic => "水产",
            Category::MeatPoultryEggs => "肉禽蛋",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
