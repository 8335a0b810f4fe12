//! # Content Store
//!
//! The flat record of user-entered travel fields. Every field is always
//! present; an empty string is a valid value. Elements bind to fields by
//! [`FieldName`] and fall back to their literal content when the field is
//! empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names of the travel fields an element can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Title,
    Date,
    Destination,
    PackageDetails,
    Itinerary,
    Plan,
    Inclusions,
    Exclusions,
    Price,
    Overlays,
}

impl FieldName {
    /// Every field, in form order.
    pub const ALL: [FieldName; 10] = [
        FieldName::Title,
        FieldName::Date,
        FieldName::Destination,
        FieldName::PackageDetails,
        FieldName::Itinerary,
        FieldName::Plan,
        FieldName::Inclusions,
        FieldName::Exclusions,
        FieldName::Price,
        FieldName::Overlays,
    ];

    /// The camelCase key used in JSON and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Date => "date",
            FieldName::Destination => "destination",
            FieldName::PackageDetails => "packageDetails",
            FieldName::Itinerary => "itinerary",
            FieldName::Plan => "plan",
            FieldName::Inclusions => "inclusions",
            FieldName::Exclusions => "exclusions",
            FieldName::Price => "price",
            FieldName::Overlays => "overlays",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown field '{}' (expected one of: {})",
                    s,
                    FieldName::ALL
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// User-entered travel package text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentFields {
    pub title: String,
    pub date: String,
    pub destination: String,
    pub package_details: String,
    pub itinerary: String,
    pub plan: String,
    pub inclusions: String,
    pub exclusions: String,
    pub price: String,
    pub overlays: String,
}

impl Default for ContentFields {
    /// Sample package shown when the editor opens.
    fn default() -> Self {
        Self {
            title: "Amazing Bali Adventure".into(),
            date: "March 15-22, 2024".into(),
            destination: "Bali, Indonesia".into(),
            package_details: "7 Days / 6 Nights".into(),
            itinerary: [
                "Day 1: Arrival & Ubud",
                "Day 2: Rice Terraces",
                "Day 3: Volcano Trek",
                "Day 4: Beach Day",
                "Day 5: Cultural Tour",
                "Day 6: Water Sports",
                "Day 7: Departure",
            ]
            .join("\n"),
            plan: "All-inclusive luxury experience with guided tours and premium accommodations"
                .into(),
            inclusions: "Accommodation, Meals, Transportation, Guide, Activities".into(),
            exclusions: "International Flights, Personal Expenses, Travel Insurance".into(),
            price: "$1,299".into(),
            overlays: "Free WiFi, Airport Transfer, Welcome Drink".into(),
        }
    }
}

impl ContentFields {
    /// All fields set to the empty string.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            destination: String::new(),
            package_details: String::new(),
            itinerary: String::new(),
            plan: String::new(),
            inclusions: String::new(),
            exclusions: String::new(),
            price: String::new(),
            overlays: String::new(),
        }
    }

    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Title => &self.title,
            FieldName::Date => &self.date,
            FieldName::Destination => &self.destination,
            FieldName::PackageDetails => &self.package_details,
            FieldName::Itinerary => &self.itinerary,
            FieldName::Plan => &self.plan,
            FieldName::Inclusions => &self.inclusions,
            FieldName::Exclusions => &self.exclusions,
            FieldName::Price => &self.price,
            FieldName::Overlays => &self.overlays,
        }
    }

    fn slot_mut(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::Title => &mut self.title,
            FieldName::Date => &mut self.date,
            FieldName::Destination => &mut self.destination,
            FieldName::PackageDetails => &mut self.package_details,
            FieldName::Itinerary => &mut self.itinerary,
            FieldName::Plan => &mut self.plan,
            FieldName::Inclusions => &mut self.inclusions,
            FieldName::Exclusions => &mut self.exclusions,
            FieldName::Price => &mut self.price,
            FieldName::Overlays => &mut self.overlays,
        }
    }

    /// Replace one field's text. No validation, no length limit.
    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Iterate `(name, value)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Apply a `field=value` assignment as given on the command line.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), String> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{}'", assignment))?;
        let field: FieldName = name.trim().parse()?;
        // Allow literal \n in shell arguments for multi-line fields
        self.set_field(field, value.replace("\\n", "\n"));
        Ok(())
    }
}
