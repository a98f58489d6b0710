// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::{Entity, EntityKind};

/// A person, who can own schedules and be invited to them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Person {
    /// The unique identifier of the person.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Age, if the person told us.
    #[serde(default)]
    pub age: Option<u32>,

    /// Organization the person belongs to.
    #[serde(default)]
    pub organization: String,
}

impl Entity for Person {
    const KIND: EntityKind = EntityKind::Person;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Draft for a person, used for registering new people.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    /// Identifier chosen by the user, a fresh one is generated when `None`.
    pub id: Option<String>,

    /// Display name.
    pub name: String,

    /// Age, if known.
    pub age: Option<u32>,

    /// Organization the person belongs to.
    pub organization: String,
}

impl PersonDraft {
    pub(crate) fn into_person(self, id: String) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            organization: self.organization,
        }
    }
}
