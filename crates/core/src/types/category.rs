//! Product categories.
//!
//! The storefront has a fixed, small set of categories. The slug is what
//! gets stored and sent over the wire.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a slug does not name a category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// A storefront category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Brincos,
    Colares,
    Pulseiras,
    Aneis,
    Lencos,
    Kits,
    Promocoes,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 7] = [
        Self::Brincos,
        Self::Colares,
        Self::Pulseiras,
        Self::Aneis,
        Self::Lencos,
        Self::Kits,
        Self::Promocoes,
    ];

    /// URL slug, also the stored value.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Brincos => "brincos",
            Self::Colares => "colares",
            Self::Pulseiras => "pulseiras",
            Self::Aneis => "aneis",
            Self::Lencos => "lencos",
            Self::Kits => "kits",
            Self::Promocoes => "promocoes",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brincos => "Brincos",
            Self::Colares => "Colares",
            Self::Pulseiras => "Pulseiras",
            Self::Aneis => "Anéis",
            Self::Lencos => "Lenços",
            Self::Kits => "Kits",
            Self::Promocoes => "Promoções",
        }
    }

    /// Short description shown on category listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Brincos => "Brilho leve e formatos orgânicos com banho champanhe.",
            Self::Colares => "Correntes delicadas, pingentes geométricos e pérolas.",
            Self::Pulseiras => "Camadas sutis para acompanhar o movimento diário.",
            Self::Aneis => "Volumes macios, conforto para uso prolongado.",
            Self::Lencos => "Tons areia e dourado suave para compor o look.",
            Self::Kits => "Combinações pensadas para presentear com acolhimento.",
            Self::Promocoes => "Seleção com valores especiais por tempo limitado.",
        }
    }

    /// Parse a stored slug, falling back to the first category.
    ///
    /// Records written by older tooling may carry slugs that are no longer
    /// in the set; they are shown under the default category rather than
    /// being dropped from the catalog.
    #[must_use]
    pub fn from_slug_or_default(slug: &str) -> Self {
        slug.parse().unwrap_or(Self::Brincos)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == s)
            .ok_or_else(|| CategoryError(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrips_every_slug() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(
            "relogios".parse::<Category>(),
            Err(CategoryError("relogios".to_string()))
        );
    }

    #[test]
    fn test_from_slug_or_default() {
        assert_eq!(Category::from_slug_or_default("kits"), Category::Kits);
        assert_eq!(Category::from_slug_or_default("relogios"), Category::Brincos);
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&Category::Promocoes).unwrap();
        assert_eq!(json, "\"promocoes\"");
    }
}
