use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Membership,
    Credits,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Membership => "membership",
            ProductType::Credits => "credits",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "membership" => Some(ProductType::Membership),
            "credits" => Some(ProductType::Credits),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayMethod {
    #[default]
    Wechat,
    Alipay,
}

impl PayMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayMethod::Wechat => "wechat",
            PayMethod::Alipay => "alipay",
        }
    }
}

impl fmt::Display for PayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user picked on the pricing page.
///
/// Both fields arrive from query parameters and may be absent; the requestor
/// refuses to call the backend until both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSelection {
    pub product_type: Option<String>,
    pub product_id: Option<String>,
    pub pay_method: PayMethod,
}

impl ProductSelection {
    pub fn new(
        product_type: impl Into<String>,
        product_id: impl Into<String>,
        pay_method: PayMethod,
    ) -> Self {
        Self {
            product_type: Some(product_type.into()),
            product_id: Some(product_id.into()),
            pay_method,
        }
    }

    /// Returns `(product_type, product_id)` when both are non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        let product_type = self.product_type.as_deref().filter(|s| !s.is_empty())?;
        let product_id = self.product_id.as_deref().filter(|s| !s.is_empty())?;
        Some((product_type, product_id))
    }

    /// Catalog entry for this selection, if it names a known product.
    pub fn catalog_entry(&self) -> Option<&'static CatalogEntry> {
        let (product_type, product_id) = self.complete()?;
        lookup(ProductType::parse(product_type)?, product_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub product_type: ProductType,
    pub id: &'static str,
    pub name: &'static str,
    /// List price in yuan. The backend's `pay_amount` is authoritative.
    pub price: f64,
    pub credits: u32,
}

pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        product_type: ProductType::Membership,
        id: "personal",
        name: "个人版会员",
        price: 39.0,
        credits: 50,
    },
    CatalogEntry {
        product_type: ProductType::Membership,
        id: "designer",
        name: "设计师版会员",
        price: 99.0,
        credits: 200,
    },
    CatalogEntry {
        product_type: ProductType::Membership,
        id: "enterprise",
        name: "企业版会员",
        price: 299.0,
        credits: 800,
    },
    CatalogEntry {
        product_type: ProductType::Credits,
        id: "pack_10",
        name: "10次生成",
        price: 9.9,
        credits: 10,
    },
    CatalogEntry {
        product_type: ProductType::Credits,
        id: "pack_40",
        name: "40次生成",
        price: 29.0,
        credits: 40,
    },
    CatalogEntry {
        product_type: ProductType::Credits,
        id: "pack_100",
        name: "100次生成",
        price: 59.0,
        credits: 100,
    },
    CatalogEntry {
        product_type: ProductType::Credits,
        id: "pack_400",
        name: "400次生成",
        price: 199.0,
        credits: 400,
    },
];

pub fn lookup(product_type: ProductType, id: &str) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|e| e.product_type == product_type && e.id == id)
}
