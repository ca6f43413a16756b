use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Record identifier. Positive, unique, assigned by the store and never reused.
pub type CharacterId = u64;

/// Error returned when a string does not name a known catalog value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value: {0}")]
pub struct UnknownValue(pub String);

/// The five hidden villages a character can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Village {
    Konohagakure,
    Sunagakure,
    Kirigakure,
    Kumogakure,
    Iwagakure,
}

impl Village {
    pub fn as_str(&self) -> &'static str {
        match self {
            Village::Konohagakure => "Konohagakure",
            Village::Sunagakure => "Sunagakure",
            Village::Kirigakure => "Kirigakure",
            Village::Kumogakure => "Kumogakure",
            Village::Iwagakure => "Iwagakure",
        }
    }
}

impl fmt::Display for Village {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Village {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Konohagakure" => Ok(Village::Konohagakure),
            "Sunagakure" => Ok(Village::Sunagakure),
            "Kirigakure" => Ok(Village::Kirigakure),
            "Kumogakure" => Ok(Village::Kumogakure),
            "Iwagakure" => Ok(Village::Iwagakure),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Ninja rank ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rank {
    Genin,
    Chunin,
    Jonin,
    Kage,
    #[serde(rename = "Missing-nin")]
    MissingNin,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Genin => "Genin",
            Rank::Chunin => "Chunin",
            Rank::Jonin => "Jonin",
            Rank::Kage => "Kage",
            Rank::MissingNin => "Missing-nin",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Genin" => Ok(Rank::Genin),
            "Chunin" => Ok(Rank::Chunin),
            "Jonin" => Ok(Rank::Jonin),
            "Kage" => Ok(Rank::Kage),
            "Missing-nin" => Ok(Rank::MissingNin),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Chakra nature of a character's signature techniques.
///
/// Spanish spellings remain accepted on input for compatibility with older
/// clients; responses always carry the English form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
    Lightning,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Earth => "Earth",
            Element::Wind => "Wind",
            Element::Lightning => "Lightning",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fire" | "Fuego" => Ok(Element::Fire),
            "Water" | "Agua" => Ok(Element::Water),
            "Earth" | "Tierra" => Ok(Element::Earth),
            "Wind" | "Viento" => Ok(Element::Wind),
            "Lightning" | "Rayo" => Ok(Element::Lightning),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Character gender. Spanish spellings accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" | "Masculino" => Ok(Gender::Male),
            "Female" | "Femenino" => Ok(Gender::Female),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Whether the character is alive, deceased, or unaccounted for.
/// Spanish spellings accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Alive,
    Deceased,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Alive => "Alive",
            Status::Deceased => "Deceased",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alive" | "Vivo" => Ok(Status::Alive),
            "Deceased" | "Fallecido" => Ok(Status::Deceased),
            "Unknown" | "Desconocido" => Ok(Status::Unknown),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// A character record in the catalog.
///
/// `surname` is stored as a plain string; a missing surname normalizes to
/// the empty string, which is also how the duplicate check treats it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub village: Village,
    pub clan: String,
    pub rank: Rank,
    pub element: Option<Element>,
    pub techniques: Vec<String>,
    pub bloodline: Option<String>,
    pub beast: Option<String>,
    pub status: Status,
    pub gender: Gender,
    pub team: Option<String>,
    pub mentor: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<String>,
    pub specialty: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Build a fresh record from a validated draft.
    pub fn from_draft(id: CharacterId, draft: CharacterDraft, now: DateTime<Utc>) -> Self {
        Character {
            id,
            name: draft.name,
            surname: draft.surname,
            age: draft.age,
            village: draft.village,
            clan: draft.clan,
            rank: draft.rank,
            element: draft.element,
            techniques: draft.techniques,
            bloodline: draft.bloodline,
            beast: draft.beast,
            status: draft.status,
            gender: draft.gender,
            team: draft.team,
            mentor: draft.mentor,
            image: draft.image,
            description: draft.description,
            birth_date: draft.birth_date,
            specialty: draft.specialty,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every field except `id` and `created_at` with the draft's
    /// values. Optional fields absent from the draft become their defaults,
    /// never the previous value.
    pub fn apply_replace(&mut self, draft: CharacterDraft, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Character::from_draft(self.id, draft, now);
        self.created_at = created_at;
    }

    /// Copy the patch's present fields onto this record and refresh
    /// `updated_at`. Returns the wire names of the touched fields,
    /// `"updatedAt"` included.
    pub fn apply_patch(&mut self, patch: &CharacterPatch, now: DateTime<Utc>) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if let Some(name) = &patch.name {
            self.name = name.clone();
            touched.push("name");
        }
        if let Some(surname) = &patch.surname {
            self.surname = surname.clone();
            touched.push("surname");
        }
        if let Some(age) = patch.age {
            self.age = age;
            touched.push("age");
        }
        if let Some(village) = patch.village {
            self.village = village;
            touched.push("village");
        }
        if let Some(clan) = &patch.clan {
            self.clan = clan.clone();
            touched.push("clan");
        }
        if let Some(rank) = patch.rank {
            self.rank = rank;
            touched.push("rank");
        }
        if let Some(element) = patch.element {
            self.element = element;
            touched.push("element");
        }
        if let Some(techniques) = &patch.techniques {
            self.techniques = techniques.clone();
            touched.push("techniques");
        }
        if let Some(bloodline) = &patch.bloodline {
            self.bloodline = bloodline.clone();
            touched.push("bloodline");
        }
        if let Some(beast) = &patch.beast {
            self.beast = beast.clone();
            touched.push("beast");
        }
        if let Some(status) = patch.status {
            self.status = status;
            touched.push("status");
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
            touched.push("gender");
        }
        if let Some(team) = &patch.team {
            self.team = team.clone();
            touched.push("team");
        }
        if let Some(mentor) = &patch.mentor {
            self.mentor = mentor.clone();
            touched.push("mentor");
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
            touched.push("image");
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
            touched.push("description");
        }
        if let Some(birth_date) = &patch.birth_date {
            self.birth_date = birth_date.clone();
            touched.push("birthDate");
        }
        if let Some(specialty) = &patch.specialty {
            self.specialty = specialty.clone();
            touched.push("specialty");
        }
        self.updated_at = now;
        touched.push("updatedAt");
        touched
    }

    /// True when the given name/surname pair matches this record's,
    /// ignoring case.
    pub fn same_identity(&self, name: &str, surname: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
            && self.surname.to_lowercase() == surname.to_lowercase()
    }
}

/// A fully validated create/replace payload: everything a record carries
/// except its identity and timestamps.
#[derive(Debug, Clone)]
pub struct CharacterDraft {
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub village: Village,
    pub clan: String,
    pub rank: Rank,
    pub element: Option<Element>,
    pub techniques: Vec<String>,
    pub bloodline: Option<String>,
    pub beast: Option<String>,
    pub status: Status,
    pub gender: Gender,
    pub team: Option<String>,
    pub mentor: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<String>,
    pub specialty: Option<String>,
}

/// A validated partial update.
///
/// `None` means the request did not mention the field. For nullable fields
/// the inner `Option` distinguishes "set to null" from a new value.
#[derive(Debug, Clone, Default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<u32>,
    pub village: Option<Village>,
    pub clan: Option<String>,
    pub rank: Option<Rank>,
    pub element: Option<Option<Element>>,
    pub techniques: Option<Vec<String>>,
    pub bloodline: Option<Option<String>>,
    pub beast: Option<Option<String>>,
    pub status: Option<Status>,
    pub gender: Option<Gender>,
    pub team: Option<Option<String>>,
    pub mentor: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub birth_date: Option<Option<String>>,
    pub specialty: Option<Option<String>>,
}

impl CharacterPatch {
    /// True when the patch renames the record, which is when the duplicate
    /// check has to run.
    pub fn touches_identity(&self) -> bool {
        self.name.is_some() || self.surname.is_some()
    }
}

/// Pagination metadata for the listing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Echo of the filter and sort parameters a listing applied.
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    pub sort: &'static str,
    pub order: &'static str,
}

/// Response for the listing endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Character>,
    pub meta: PageMeta,
    pub filters_applied: AppliedFilters,
}

/// Response wrapping a single character (get, create, replace).
#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub success: bool,
    pub message: String,
    pub data: Character,
}

/// Response for partial updates, naming the fields that were touched.
#[derive(Debug, Serialize)]
pub struct PatchResponse {
    pub success: bool,
    pub message: String,
    pub data: Character,
    pub updated_fields: Vec<&'static str>,
}

/// Summary of a deleted record. The deletion timestamp is not persisted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCharacter {
    pub id: CharacterId,
    pub name: String,
    pub deleted_at: DateTime<Utc>,
}

/// Response for the delete endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub data: DeletedCharacter,
}

/// Aggregate statistics over the whole catalog.
#[derive(Debug, Serialize)]
pub struct CatalogStats {
    pub total_characters: usize,
    pub by_village: BTreeMap<String, usize>,
    pub by_rank: BTreeMap<String, usize>,
    pub by_gender: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub average_age: u32,
}

/// Response for the stats endpoint.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub message: String,
    pub data: CatalogStats,
}

/// Response for the free-text search endpoint (unpaginated).
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Character>,
    pub search_term: String,
}

/// Payload of the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthInfo {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
    pub version: &'static str,
    pub total_characters: usize,
}

/// Response for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub data: HealthInfo,
}
