//! Evidence categories.
//!
//! Every uploaded file belongs to exactly one of four fixed groupings. The
//! model receives them in canonical order, each preceded by its section
//! marker, so owner evidence is never read as buyer evidence.

use serde::{Deserialize, Serialize};

/// Evidence grouping of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Identity documents of the current owners (sellers)
    Owner,
    /// Identity documents of the buyers
    Buyer,
    /// Land registry, tax registry and energy certificates of the property
    Property,
    /// The promissory purchase-and-sale contract (CPCV) under validation
    #[serde(alias = "CPCV")]
    Contract,
}

impl Category {
    /// All categories in canonical payload order.
    pub const ALL: [Self; 4] = [Self::Owner, Self::Buyer, Self::Property, Self::Contract];

    /// 1-based section number in the model payload.
    #[inline]
    #[must_use = "returns the section number"]
    pub const fn section_number(self) -> usize {
        match self {
            Self::Owner => 1,
            Self::Buyer => 2,
            Self::Property => 3,
            Self::Contract => 4,
        }
    }

    /// Boundary marker emitted before this category's evidence.
    #[must_use = "returns the section marker text"]
    pub fn section_marker(self) -> String {
        let label = match self {
            Self::Owner => "OWNER DOCUMENTS",
            Self::Buyer => "BUYER DOCUMENTS",
            Self::Property => "PROPERTY DOCUMENTS",
            Self::Contract => "CPCV",
        };
        format!("--- SECTION {}: {label} ---", self.section_number())
    }

    /// Step title shown to the person uploading.
    #[must_use = "returns the step title"]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Owner => "Documentos do Proprietário",
            Self::Buyer => "Documentos do Comprador",
            Self::Property => "Documentos do Imóvel",
            Self::Contract => "CPCV",
        }
    }

    /// What documents are expected for this step.
    #[must_use = "returns the step description"]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Owner | Self::Buyer => {
                "Cartão de Cidadão, Passaporte ou Título de residência."
            }
            Self::Property => {
                "Caderneta Predial, Certidão do Registo Predial e Certificado Energético."
            }
            Self::Contract => "Contrato Promessa de Compra e Venda (rascunho ou assinado).",
        }
    }

    /// Lower-case identifier used on the command line.
    #[must_use = "returns the short name"]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Buyer => "buyer",
            Self::Property => "property",
            Self::Contract => "contract",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" | "owners" | "seller" => Ok(Self::Owner),
            "buyer" | "buyers" => Ok(Self::Buyer),
            "property" => Ok(Self::Property),
            "contract" | "cpcv" => Ok(Self::Contract),
            _ => Err(format!(
                "unknown category '{s}'. Valid options: owner, buyer, property, contract"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let numbers: Vec<usize> = Category::ALL.iter().map(|c| c.section_number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);

        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn test_section_markers() {
        assert_eq!(
            Category::Owner.section_marker(),
            "--- SECTION 1: OWNER DOCUMENTS ---"
        );
        assert_eq!(Category::Contract.section_marker(), "--- SECTION 4: CPCV ---");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::Property).unwrap(),
            "\"PROPERTY\""
        );
        let parsed: Category = serde_json::from_str("\"CPCV\"").unwrap();
        assert_eq!(parsed, Category::Contract);
        let parsed: Category = serde_json::from_str("\"CONTRACT\"").unwrap();
        assert_eq!(parsed, Category::Contract);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("owner".parse::<Category>().unwrap(), Category::Owner);
        assert_eq!("BUYER".parse::<Category>().unwrap(), Category::Buyer);
        assert_eq!("cpcv".parse::<Category>().unwrap(), Category::Contract);
        assert!("tenant".parse::<Category>().is_err());

        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
        }
    }
}
