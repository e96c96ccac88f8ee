//! # Service Catalog
//!
//! The fixed list of services and categories the booking wizard offers.
//! Entries are static; [`find_service`] hands out owned [`Service`] values
//! ready to be added to a draft.

use serde::Serialize;

use crate::money::Money;
use crate::types::Service;

/// A static catalog row.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub price: Money,
    pub description: &'static str,
    pub category: &'static str,
    pub duration: Option<&'static str>,
    pub disclaimer: Option<&'static str>,
}

impl CatalogEntry {
    pub fn to_service(&self) -> Service {
        Service {
            id: self.id.to_string(),
            name: self.name.to_string(),
            price: self.price,
            description: self.description.to_string(),
            category: self.category.to_string(),
            duration: self.duration.map(str::to_string),
            disclaimer: self.disclaimer.map(str::to_string),
            image_url: None,
            is_active: Some(true),
        }
    }
}

/// A category shown on the services page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const CARPET_DESCRIPTION: &str = "Schedule with us and we will clean the dirt and grime out of your carpets. We have special equipment and preferred cleaning solution to get your floor looking clean again!";

pub static SERVICES: [CatalogEntry; 10] = [
    CatalogEntry {
        id: "min-service",
        name: "Minimum Service Charge",
        price: Money::from_dollars(135),
        description: "$135 minimum applies to all jobs",
        category: "base",
        duration: None,
        disclaimer: None,
    },
    CatalogEntry {
        id: "custom-job",
        name: "Custom Job",
        price: Money::zero(),
        description: "A custom quote will be provided if your job doesn't fall under a standard category.",
        category: "custom-services",
        duration: Some("Up to 4 hours"),
        disclaimer: Some("Please provide as much detail as possible, including pictures."),
    },
    CatalogEntry {
        id: "room-1",
        name: "1 Room",
        price: Money::from_dollars(80),
        description: CARPET_DESCRIPTION,
        category: "carpet-cleaning",
        duration: Some("Up to 2 hours"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "room-2",
        name: "2 Rooms",
        price: Money::from_dollars(150),
        description: CARPET_DESCRIPTION,
        category: "carpet-cleaning",
        duration: Some("Up to 2 hours"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "room-3",
        name: "3 Rooms",
        price: Money::from_dollars(220),
        description: CARPET_DESCRIPTION,
        category: "carpet-cleaning",
        duration: Some("Up to 2 hours"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "loveseat",
        name: "Loveseat or Chair",
        price: Money::from_dollars(10),
        description: "Over time human oils and debris (coins, food, hair) become embedded in the upholstery. We clean off the dirt and grime to make your loveseat or chair smell and feel new again.",
        category: "additional-cleaning",
        duration: Some("Up to 1 hour"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "sofa",
        name: "Sofa",
        price: Money::from_dollars(40),
        description: "Over time human oils and debris (coins, food, hair) become embedded in the upholstery. We clean off the dirt and grime to make your sofa smell and feel new again.",
        category: "additional-cleaning",
        duration: Some("Up to 1 hour"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "sectional-sofa",
        name: "Sectional Sofa",
        price: Money::from_dollars(30),
        description: "Over time human oils and debris (coins, food, hair) become embedded in the upholstery. We clean off the dirt and grime to make your sectional smell and feel new again.",
        category: "additional-cleaning",
        duration: Some("Up to 1 hour"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "rug",
        name: "Rug",
        price: Money::from_dollars(50),
        description: "Get a rug cleaned for one low price. Special equipment and preferred cleaning solution get your rug looking new again.",
        category: "additional-cleaning",
        duration: Some("Up to 1 hour"),
        disclaimer: None,
    },
    CatalogEntry {
        id: "tile",
        name: "Tile",
        price: Money::from_dollars(60),
        description: "Special equipment, tools and techniques to clean a variety of tile.",
        category: "additional-cleaning",
        duration: Some("Up to 1 hour"),
        disclaimer: None,
    },
];

pub static CATEGORIES: [Category; 3] = [
    Category {
        id: "custom-services",
        name: "Custom Services",
        description: "Custom job",
    },
    Category {
        id: "carpet-cleaning",
        name: "Carpet Cleaning",
        description: "1 Room, 2 Rooms, or 3 Rooms Carpet Cleaning",
    },
    Category {
        id: "additional-cleaning",
        name: "Additional Cleaning",
        description: "Loveseat or Chair, Sofa, Sectional Sofa, Rug, Tile",
    },
];

/// Looks up a catalog service by id.
pub fn find_service(id: &str) -> Option<Service> {
    SERVICES.iter().find(|e| e.id == id).map(CatalogEntry::to_service)
}

/// All services in a category, in catalog order.
pub fn services_in_category(category: &str) -> Vec<Service> {
    SERVICES
        .iter()
        .filter(|e| e.category == category)
        .map(CatalogEntry::to_service)
        .collect()
}

pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}
