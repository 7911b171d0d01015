//! Static product catalog.
//!
//! Products are compiled in. Prices are whole dirhams in the base currency;
//! cart and wishlist additions copy name, price and image from here so the
//! client never supplies a price.

use rust_decimal::Decimal;
use serde::Serialize;

use noor_core::{CartItem, WishlistItem};

/// Product line a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Everyday,
    Occasion,
    OpenFront,
    Kaftan,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Everyday, Self::Occasion, Self::OpenFront, Self::Kaftan];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Everyday => "everyday",
            Self::Occasion => "occasion",
            Self::OpenFront => "open-front",
            Self::Kaftan => "kaftan",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Everyday => "Everyday Abayas",
            Self::Occasion => "Occasion Abayas",
            Self::OpenFront => "Open-Front Abayas",
            Self::Kaftan => "Kaftans",
        }
    }

    /// Look up a category by its URL slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Whole dirhams.
    #[serde(skip)]
    pub price_aed: u32,
    pub image: &'static str,
    pub category: Category,
    pub sizes: &'static [&'static str],
    pub colors: &'static [&'static str],
}

impl Product {
    /// Price in the base currency.
    #[must_use]
    pub fn price(&self) -> Decimal {
        Decimal::from(self.price_aed)
    }

    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.contains(&size)
    }

    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.contains(&color)
    }

    /// Cart line for this product; options are not validated here.
    #[must_use]
    pub fn cart_item(&self, size: &str, color: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.id.to_string(),
            name: self.name.to_string(),
            unit_price: self.price(),
            image: self.image.to_string(),
            size: size.to_string(),
            color: color.to_string(),
            quantity,
            custom_length: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn wishlist_item(&self) -> WishlistItem {
        WishlistItem {
            product_id: self.id.to_string(),
            name: self.name.to_string(),
            unit_price: self.price(),
            image: self.image.to_string(),
            category: self.category.slug().to_string(),
        }
    }
}

const STANDARD_SIZES: &[&str] = &["50", "52", "54", "56", "58", "60"];

static PRODUCTS: [Product; 8] = [
    Product {
        id: "noor-classic",
        name: "Noor Classic Abaya",
        description: "Closed abaya in matte nida with a relaxed drape and hidden snap front.",
        price_aed: 450,
        image: "/images/products/noor-classic.jpg",
        category: Category::Everyday,
        sizes: STANDARD_SIZES,
        colors: &["Black", "Navy"],
    },
    Product {
        id: "sahar-pleated",
        name: "Sahar Pleated Abaya",
        description: "Everyday abaya with knife pleats on the sleeves and a tie belt.",
        price_aed: 520,
        image: "/images/products/sahar-pleated.jpg",
        category: Category::Everyday,
        sizes: STANDARD_SIZES,
        colors: &["Black", "Mocha", "Olive"],
    },
    Product {
        id: "layla-open",
        name: "Layla Open Abaya",
        description: "Open-front crepe abaya with wide sleeves, worn over a slip dress.",
        price_aed: 600,
        image: "/images/products/layla-open.jpg",
        category: Category::OpenFront,
        sizes: STANDARD_SIZES,
        colors: &["Sand", "Black"],
    },
    Product {
        id: "mira-kimono",
        name: "Mira Kimono Abaya",
        description: "Kimono-cut open abaya in linen blend with contrast piping.",
        price_aed: 480,
        image: "/images/products/mira-kimono.jpg",
        category: Category::OpenFront,
        sizes: STANDARD_SIZES,
        colors: &["Stone", "Charcoal"],
    },
    Product {
        id: "qamar-embroidered",
        name: "Qamar Embroidered Abaya",
        description: "Occasion abaya in silk crepe with hand embroidery along the cuffs.",
        price_aed: 1_200,
        image: "/images/products/qamar-embroidered.jpg",
        category: Category::Occasion,
        sizes: STANDARD_SIZES,
        colors: &["Black", "Emerald"],
    },
    Product {
        id: "yasmin-lace",
        name: "Yasmin Lace Abaya",
        description: "Chiffon abaya with a lace-trimmed hem and matching shayla.",
        price_aed: 950,
        image: "/images/products/yasmin-lace.jpg",
        category: Category::Occasion,
        sizes: &["52", "54", "56", "58"],
        colors: &["Black", "Dusty Rose"],
    },
    Product {
        id: "dana-kaftan",
        name: "Dana Kaftan",
        description: "Lightweight kaftan in printed viscose with a drawstring waist.",
        price_aed: 380,
        image: "/images/products/dana-kaftan.jpg",
        category: Category::Kaftan,
        sizes: &["S/M", "L/XL"],
        colors: &["Ivory", "Terracotta"],
    },
    Product {
        id: "rimal-kaftan",
        name: "Rimal Kaftan",
        description: "Beaded neckline kaftan for evenings at home and Eid gatherings.",
        price_aed: 690,
        image: "/images/products/rimal-kaftan.jpg",
        category: Category::Kaftan,
        sizes: &["S/M", "L/XL"],
        colors: &["Gold", "Midnight"],
    },
];

/// Every product, in display order.
#[must_use]
pub fn all() -> &'static [Product] {
    &PRODUCTS
}

#[must_use]
pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static Product> {
    PRODUCTS.iter().filter(move |p| p.category == category)
}
