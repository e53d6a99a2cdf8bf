//! Profile records and the registration form that produces them.
//!
//! A [`Profile`] can only be built from a [`ProfileForm`] that passes the
//! required-field checklist, so every stored record is complete. Once built, a
//! profile is read-only.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Length of generated profile ids.
pub const ID_LEN: usize = 9;

/// Characters used in generated profile ids (lowercase base-36).
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Errors raised while turning form input into a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("missing required field: {0}")]
    MissingField(ProfileField),
}

impl ValidationError {
    /// The field this error refers to.
    #[must_use]
    pub fn field(&self) -> ProfileField {
        match self {
            Self::MissingField(field) => *field,
        }
    }
}

/// Every user-supplied field of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    /// Full name of the individual.
    FullName,
    /// Age, kept as entered.
    Age,
    /// Blood group, e.g. `O+`.
    BloodGroup,
    /// Primary emergency contact name.
    EmergencyContact1Name,
    /// Primary emergency contact phone.
    EmergencyContact1Phone,
    /// Secondary emergency contact name.
    EmergencyContact2Name,
    /// Secondary emergency contact phone.
    EmergencyContact2Phone,
    /// Known medical conditions.
    MedicalConditions,
    /// Known allergies.
    Allergies,
    /// Residential address.
    Address,
}

impl ProfileField {
    /// All fields, in form order.
    pub const ALL: [Self; 10] = [
        Self::FullName,
        Self::Age,
        Self::BloodGroup,
        Self::EmergencyContact1Name,
        Self::EmergencyContact1Phone,
        Self::EmergencyContact2Name,
        Self::EmergencyContact2Phone,
        Self::MedicalConditions,
        Self::Allergies,
        Self::Address,
    ];

    /// Canonical field name, as used in the stored record.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Age => "age",
            Self::BloodGroup => "bloodGroup",
            Self::EmergencyContact1Name => "emergencyContact1Name",
            Self::EmergencyContact1Phone => "emergencyContact1Phone",
            Self::EmergencyContact2Name => "emergencyContact2Name",
            Self::EmergencyContact2Phone => "emergencyContact2Phone",
            Self::MedicalConditions => "medicalConditions",
            Self::Allergies => "allergies",
            Self::Address => "address",
        }
    }

    /// Whether a profile cannot be created without this field.
    #[must_use]
    pub fn is_required(self) -> bool {
        match self {
            Self::FullName
            | Self::Age
            | Self::BloodGroup
            | Self::EmergencyContact1Name
            | Self::EmergencyContact1Phone
            | Self::Address => true,
            Self::EmergencyContact2Name
            | Self::EmergencyContact2Phone
            | Self::MedicalConditions
            | Self::Allergies => false,
        }
    }

    /// Look a field up by its canonical name or its registration-form alias.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "fullName" => Self::FullName,
            "age" => Self::Age,
            "bloodGroup" => Self::BloodGroup,
            "emergencyContact1Name" | "contact1Name" => Self::EmergencyContact1Name,
            "emergencyContact1Phone" | "contact1Phone" => Self::EmergencyContact1Phone,
            "emergencyContact2Name" | "contact2Name" => Self::EmergencyContact2Name,
            "emergencyContact2Phone" | "contact2Phone" => Self::EmergencyContact2Phone,
            "medicalConditions" | "conditions" => Self::MedicalConditions,
            "allergies" => Self::Allergies,
            "address" => Self::Address,
            _ => return None,
        };
        Some(field)
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw registration input, one string per field.
///
/// Blank strings mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    /// Full name.
    pub full_name: String,
    /// Age.
    pub age: String,
    /// Blood group.
    pub blood_group: String,
    /// Primary contact name.
    pub emergency_contact1_name: String,
    /// Primary contact phone.
    pub emergency_contact1_phone: String,
    /// Secondary contact name.
    pub emergency_contact2_name: String,
    /// Secondary contact phone.
    pub emergency_contact2_phone: String,
    /// Medical conditions.
    pub medical_conditions: String,
    /// Allergies.
    pub allergies: String,
    /// Address.
    pub address: String,
}

impl ProfileForm {
    /// Build a form from a generic name/value bag.
    ///
    /// Unknown names are ignored. Later values for the same field win.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (name, value) in fields {
            match ProfileField::from_name(name.as_ref()) {
                Some(field) => form.set(field, value),
                None => debug!("ignoring unknown form field '{}'", name.as_ref()),
            }
        }
        form
    }

    /// Get the value of a field.
    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::Age => &self.age,
            ProfileField::BloodGroup => &self.blood_group,
            ProfileField::EmergencyContact1Name => &self.emergency_contact1_name,
            ProfileField::EmergencyContact1Phone => &self.emergency_contact1_phone,
            ProfileField::EmergencyContact2Name => &self.emergency_contact2_name,
            ProfileField::EmergencyContact2Phone => &self.emergency_contact2_phone,
            ProfileField::MedicalConditions => &self.medical_conditions,
            ProfileField::Allergies => &self.allergies,
            ProfileField::Address => &self.address,
        }
    }

    /// Set the value of a field.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::FullName => &mut self.full_name,
            ProfileField::Age => &mut self.age,
            ProfileField::BloodGroup => &mut self.blood_group,
            ProfileField::EmergencyContact1Name => &mut self.emergency_contact1_name,
            ProfileField::EmergencyContact1Phone => &mut self.emergency_contact1_phone,
            ProfileField::EmergencyContact2Name => &mut self.emergency_contact2_name,
            ProfileField::EmergencyContact2Phone => &mut self.emergency_contact2_phone,
            ProfileField::MedicalConditions => &mut self.medical_conditions,
            ProfileField::Allergies => &mut self.allergies,
            ProfileField::Address => &mut self.address,
        };
        *slot = value.into();
    }

    /// Required fields that are blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| field.is_required() && is_blank(self.get(*field)))
            .collect()
    }

    /// Run the required-field checklist.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first blank required
    /// field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.missing_fields().first() {
            Some(field) => Err(ValidationError::MissingField(*field)),
            None => Ok(()),
        }
    }

    /// Validate the form and build a profile with a fresh id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if a required field is blank.
    pub fn into_profile(self) -> Result<Profile, ValidationError> {
        self.validate()?;
        Ok(self.build(generate_id(), Utc::now()))
    }

    fn build(self, id: String, created_at: DateTime<Utc>) -> Profile {
        Profile {
            id,
            full_name: self.full_name,
            age: self.age,
            blood_group: self.blood_group,
            emergency_contact1_name: self.emergency_contact1_name,
            emergency_contact1_phone: self.emergency_contact1_phone,
            emergency_contact2_name: non_blank(self.emergency_contact2_name),
            emergency_contact2_phone: non_blank(self.emergency_contact2_phone),
            medical_conditions: non_blank(self.medical_conditions),
            allergies: non_blank(self.allergies),
            address: self.address,
            created_at,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: String) -> Option<String> {
    if is_blank(&value) {
        None
    } else {
        Some(value)
    }
}

/// Generate an opaque profile id.
///
/// Collisions are unlikely at the expected cardinality but not ruled out.
#[must_use]
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}

/// An emergency contact as shown on the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contact<'a> {
    /// Contact name.
    pub name: &'a str,
    /// Contact phone number.
    pub phone: &'a str,
}

/// A persisted emergency profile.
///
/// Deserialized records go through the same required-field checklist as the
/// registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredProfile")]
pub struct Profile {
    id: String,
    full_name: String,
    age: String,
    blood_group: String,
    emergency_contact1_name: String,
    emergency_contact1_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_contact2_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_contact2_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    medical_conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allergies: Option<String>,
    address: String,
    created_at: DateTime<Utc>,
}

/// A profile record as found in storage, before it is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    id: String,
    full_name: String,
    age: String,
    blood_group: String,
    emergency_contact1_name: String,
    emergency_contact1_phone: String,
    #[serde(default)]
    emergency_contact2_name: Option<String>,
    #[serde(default)]
    emergency_contact2_phone: Option<String>,
    #[serde(default)]
    medical_conditions: Option<String>,
    #[serde(default)]
    allergies: Option<String>,
    address: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoredProfile> for Profile {
    type Error = ValidationError;

    fn try_from(stored: StoredProfile) -> Result<Self, Self::Error> {
        let form = ProfileForm {
            full_name: stored.full_name,
            age: stored.age,
            blood_group: stored.blood_group,
            emergency_contact1_name: stored.emergency_contact1_name,
            emergency_contact1_phone: stored.emergency_contact1_phone,
            emergency_contact2_name: stored.emergency_contact2_name.unwrap_or_default(),
            emergency_contact2_phone: stored.emergency_contact2_phone.unwrap_or_default(),
            medical_conditions: stored.medical_conditions.unwrap_or_default(),
            allergies: stored.allergies.unwrap_or_default(),
            address: stored.address,
        };
        form.validate()?;
        Ok(form.build(stored.id, stored.created_at))
    }
}

impl Profile {
    /// Opaque id, assigned at creation.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Age as entered.
    #[must_use]
    pub fn age(&self) -> &str {
        &self.age
    }

    /// Blood group.
    #[must_use]
    pub fn blood_group(&self) -> &str {
        &self.blood_group
    }

    /// Residential address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// When the profile was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Medical conditions, if any were recorded.
    #[must_use]
    pub fn medical_conditions(&self) -> Option<&str> {
        present(self.medical_conditions.as_deref())
    }

    /// Allergies, if any were recorded.
    #[must_use]
    pub fn allergies(&self) -> Option<&str> {
        present(self.allergies.as_deref())
    }

    /// The primary emergency contact.
    #[must_use]
    pub fn primary_contact(&self) -> Contact<'_> {
        Contact {
            name: &self.emergency_contact1_name,
            phone: &self.emergency_contact1_phone,
        }
    }

    /// The secondary emergency contact, present only if its phone is set.
    #[must_use]
    pub fn secondary_contact(&self) -> Option<Contact<'_>> {
        present(self.emergency_contact2_phone.as_deref()).map(|phone| Contact {
            name: self.emergency_contact2_name.as_deref().unwrap_or_default(),
            phone,
        })
    }

    /// Initial used for the avatar badge.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.full_name.chars().next()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}
