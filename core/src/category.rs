// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt::Display, str::FromStr};

/// Category of a schedule, which decides how it is drawn on the calendar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A meeting with other people.
    #[default]
    Meeting,

    /// Business trip or customer visit.
    Business,

    /// Out of office.
    Outing,

    /// Day off.
    Holiday,

    /// A deadline, drawn as a marker instead of a strip.
    Deadline,

    /// Anything else.
    Other,
}

const TAG_MEETING: &str = "meeting";
const TAG_BUSINESS: &str = "business";
const TAG_OUTING: &str = "outing";
const TAG_HOLIDAY: &str = "holiday";
const TAG_DEADLINE: &str = "deadline";
const TAG_OTHER: &str = "other";

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Meeting,
        Category::Business,
        Category::Outing,
        Category::Holiday,
        Category::Deadline,
        Category::Other,
    ];

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Meeting => "Meeting",
            Category::Business => "Business",
            Category::Outing => "Outing",
            Category::Holiday => "Holiday",
            Category::Deadline => "Deadline",
            Category::Other => "Other",
        }
    }

    /// Style class used when rendering the category.
    pub fn style(&self) -> &'static str {
        match self {
            Category::Meeting => "category-meeting",
            Category::Business => "category-business",
            Category::Outing => "category-outing",
            Category::Holiday => "category-holiday",
            Category::Deadline => "category-deadline",
            Category::Other => "category-other",
        }
    }

    /// Whether the category is drawn as a deadline marker.
    pub fn is_deadline(&self) -> bool {
        matches!(self, Category::Deadline)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        match self {
            Category::Meeting => TAG_MEETING,
            Category::Business => TAG_BUSINESS,
            Category::Outing => TAG_OUTING,
            Category::Holiday => TAG_HOLIDAY,
            Category::Deadline => TAG_DEADLINE,
            Category::Other => TAG_OTHER,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            TAG_MEETING => Ok(Category::Meeting),
            TAG_BUSINESS => Ok(Category::Business),
            TAG_OUTING => Ok(Category::Outing),
            TAG_HOLIDAY => Ok(Category::Holiday),
            TAG_DEADLINE => Ok(Category::Deadline),
            TAG_OTHER => Ok(Category::Other),
            _ => Err(format!("Unknown category: {value}")),
        }
    }
}
