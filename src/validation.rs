use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::models::{
    CharacterDraft, CharacterId, CharacterPatch, Element, Gender, Rank, Status, Village,
};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const SURNAME_MAX: usize = 50;
const AGE_MIN: u64 = 1;
const AGE_MAX: u64 = 200;

/// The wire fields a partial update may touch. Anything else is rejected.
const UPDATABLE_FIELDS: [&str; 18] = [
    "name",
    "surname",
    "age",
    "village",
    "clan",
    "rank",
    "element",
    "techniques",
    "bloodline",
    "beast",
    "status",
    "gender",
    "team",
    "mentor",
    "image",
    "description",
    "birthDate",
    "specialty",
];

/// A single field rule violation, as it appears in the `errors` array of a
/// 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a create/replace body against the full rule set.
///
/// The body is inspected as an untyped map so every field rule runs and the
/// caller gets the complete violation list, not just the first failure. A
/// non-object body behaves like an empty map.
pub fn parse_create(body: &Value) -> Result<CharacterDraft, Vec<FieldError>> {
    let empty = Map::new();
    let map = body.as_object().unwrap_or(&empty);
    let mut errors = Vec::new();

    let name = parse_name(map.get("name"), &mut errors);
    let surname = parse_surname(map.get("surname"), &mut errors);
    let age = parse_age(map.get("age"), &mut errors);
    let village = parse_required_enum::<Village>(
        map.get("village"),
        "village",
        "The village is required",
        "Invalid village",
        &mut errors,
    );
    let clan = parse_clan(map.get("clan"), &mut errors);
    let rank = parse_required_enum::<Rank>(
        map.get("rank"),
        "rank",
        "The rank is required",
        "Invalid rank",
        &mut errors,
    );
    let element =
        parse_optional_enum::<Element>(map.get("element"), "element", "Invalid element", &mut errors);
    let techniques = parse_techniques(map.get("techniques"), &mut errors);
    let bloodline = parse_optional_text(
        map.get("bloodline"),
        "bloodline",
        "The bloodline must be a string",
        &mut errors,
    );
    let beast = parse_optional_text(
        map.get("beast"),
        "beast",
        "The beast must be a string",
        &mut errors,
    );
    let status = parse_required_enum::<Status>(
        map.get("status"),
        "status",
        "The status is required",
        "Invalid status",
        &mut errors,
    );
    let gender = parse_required_enum::<Gender>(
        map.get("gender"),
        "gender",
        "The gender is required",
        "The gender must be Male or Female",
        &mut errors,
    );
    let team = parse_optional_text(
        map.get("team"),
        "team",
        "The team must be a string",
        &mut errors,
    );
    let mentor = parse_optional_text(
        map.get("mentor"),
        "mentor",
        "The mentor must be a string",
        &mut errors,
    );
    let image = parse_image(map.get("image"), &mut errors);
    let description = parse_optional_text(
        map.get("description"),
        "description",
        "The description must be a string",
        &mut errors,
    );
    let birth_date = parse_optional_text(
        map.get("birthDate"),
        "birthDate",
        "The birth date must be a string",
        &mut errors,
    );
    let specialty = parse_optional_text(
        map.get("specialty"),
        "specialty",
        "The specialty must be a string",
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    let (
        Some(name),
        Some(surname),
        Some(age),
        Some(village),
        Some(clan),
        Some(rank),
        Some(techniques),
        Some(status),
        Some(gender),
    ) = (name, surname, age, village, clan, rank, techniques, status, gender)
    else {
        unreachable!("required-field parser yielded no value and no violation");
    };

    Ok(CharacterDraft {
        name,
        surname,
        age,
        village,
        clan,
        rank,
        element,
        techniques,
        bloodline,
        beast,
        status,
        gender,
        team,
        mentor,
        image,
        description,
        birth_date,
        specialty,
    })
}

/// Check a partial-update body.
///
/// Every field is optional but a present field obeys the same rule as in
/// create. Keys outside the updatable whitelist are violations. `null` is a
/// violation for required fields and clears nullable ones.
pub fn parse_patch(body: &Value) -> Result<CharacterPatch, Vec<FieldError>> {
    let empty = Map::new();
    let map = body.as_object().unwrap_or(&empty);
    let mut errors = Vec::new();
    let mut patch = CharacterPatch::default();

    for key in map.keys() {
        if !UPDATABLE_FIELDS.contains(&key.as_str()) {
            errors.push(FieldError::new(key.clone(), "Unknown field"));
        }
    }

    if map.contains_key("name") {
        patch.name = parse_name(map.get("name"), &mut errors);
    }
    if map.contains_key("surname") {
        patch.surname = parse_surname(map.get("surname"), &mut errors);
    }
    if map.contains_key("age") {
        patch.age = parse_age(map.get("age"), &mut errors);
    }
    if map.contains_key("village") {
        patch.village = parse_required_enum::<Village>(
            map.get("village"),
            "village",
            "The village is required",
            "Invalid village",
            &mut errors,
        );
    }
    if map.contains_key("clan") {
        patch.clan = parse_clan(map.get("clan"), &mut errors);
    }
    if map.contains_key("rank") {
        patch.rank = parse_required_enum::<Rank>(
            map.get("rank"),
            "rank",
            "The rank is required",
            "Invalid rank",
            &mut errors,
        );
    }
    if let Some(value) = map.get("element") {
        patch.element = if value.is_null() {
            Some(None)
        } else {
            parse_optional_enum::<Element>(Some(value), "element", "Invalid element", &mut errors)
                .map(Some)
        };
    }
    if let Some(value) = map.get("techniques") {
        if value.is_null() {
            errors.push(FieldError::new(
                "techniques",
                "The techniques must be an array of strings",
            ));
        } else {
            patch.techniques = parse_techniques(Some(value), &mut errors);
        }
    }
    patch.bloodline = patch_nullable_text(map, "bloodline", "The bloodline must be a string", &mut errors);
    patch.beast = patch_nullable_text(map, "beast", "The beast must be a string", &mut errors);
    if map.contains_key("status") {
        patch.status = parse_required_enum::<Status>(
            map.get("status"),
            "status",
            "The status is required",
            "Invalid status",
            &mut errors,
        );
    }
    if map.contains_key("gender") {
        patch.gender = parse_required_enum::<Gender>(
            map.get("gender"),
            "gender",
            "The gender is required",
            "The gender must be Male or Female",
            &mut errors,
        );
    }
    patch.team = patch_nullable_text(map, "team", "The team must be a string", &mut errors);
    patch.mentor = patch_nullable_text(map, "mentor", "The mentor must be a string", &mut errors);
    if let Some(value) = map.get("image") {
        patch.image = if value.is_null() {
            Some(None)
        } else {
            parse_image(Some(value), &mut errors).map(Some)
        };
    }
    patch.description =
        patch_nullable_text(map, "description", "The description must be a string", &mut errors);
    patch.birth_date =
        patch_nullable_text(map, "birthDate", "The birth date must be a string", &mut errors);
    patch.specialty =
        patch_nullable_text(map, "specialty", "The specialty must be a string", &mut errors);

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Parse an `{id}` path segment. Non-numeric or non-positive values get the
/// same violation shape as body rules.
pub fn parse_id(raw: &str) -> Result<CharacterId, FieldError> {
    match raw.parse::<CharacterId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(FieldError::new("id", "The id must be a positive integer")),
    }
}

fn parse_name(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(value) = value else {
        errors.push(FieldError::new("name", "The name is required"));
        return None;
    };
    if value.is_null() {
        errors.push(FieldError::new("name", "The name is required"));
        return None;
    }
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new("name", "The name must be a string"));
        return None;
    };
    let length = raw.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&length) {
        errors.push(FieldError::new(
            "name",
            "The name must be between 2 and 50 characters",
        ));
        return None;
    }
    if !raw.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        errors.push(FieldError::new(
            "name",
            "The name can only contain letters and spaces",
        ));
        return None;
    }
    Some(raw.trim().to_string())
}

fn parse_surname(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(value) = value else {
        return Some(String::new());
    };
    if value.is_null() {
        return Some(String::new());
    }
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new("surname", "The surname must be a string"));
        return None;
    };
    if raw.chars().count() > SURNAME_MAX {
        errors.push(FieldError::new(
            "surname",
            "The surname cannot exceed 50 characters",
        ));
        return None;
    }
    Some(raw.trim().to_string())
}

fn parse_age(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<u32> {
    match value.and_then(Value::as_u64) {
        Some(age) if (AGE_MIN..=AGE_MAX).contains(&age) => Some(age as u32),
        _ => {
            errors.push(FieldError::new(
                "age",
                "The age must be an integer between 1 and 200",
            ));
            None
        }
    }
}

fn parse_clan(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(value) = value else {
        errors.push(FieldError::new("clan", "The clan is required"));
        return None;
    };
    if value.is_null() {
        errors.push(FieldError::new("clan", "The clan is required"));
        return None;
    }
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new("clan", "The clan must be a string"));
        return None;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("clan", "The clan is required"));
        return None;
    }
    Some(trimmed.to_string())
}

fn parse_required_enum<T: FromStr>(
    value: Option<&Value>,
    field: &'static str,
    required: &'static str,
    invalid: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let Some(value) = value else {
        errors.push(FieldError::new(field, required));
        return None;
    };
    if value.is_null() {
        errors.push(FieldError::new(field, required));
        return None;
    }
    match value.as_str().and_then(|s| s.parse::<T>().ok()) {
        Some(parsed) => Some(parsed),
        None => {
            errors.push(FieldError::new(field, invalid));
            None
        }
    }
}

/// Optional enum field: absent and `null` mean "no value"; a present value
/// must parse.
fn parse_optional_enum<T: FromStr>(
    value: Option<&Value>,
    field: &'static str,
    invalid: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match value.as_str().and_then(|s| s.parse::<T>().ok()) {
        Some(parsed) => Some(parsed),
        None => {
            errors.push(FieldError::new(field, invalid));
            None
        }
    }
}

fn parse_techniques(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<Vec<String>> {
    let Some(value) = value else {
        return Some(Vec::new());
    };
    if value.is_null() {
        return Some(Vec::new());
    }
    let Some(items) = value.as_array() else {
        errors.push(FieldError::new(
            "techniques",
            "The techniques must be an array of strings",
        ));
        return None;
    };
    let mut techniques = Vec::with_capacity(items.len());
    for item in items {
        let Some(technique) = item.as_str() else {
            errors.push(FieldError::new(
                "techniques",
                "The techniques must be an array of strings",
            ));
            return None;
        };
        techniques.push(technique.to_string());
    }
    Some(techniques)
}

fn parse_image(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match value.as_str() {
        Some(raw) if Url::parse(raw).is_ok() => Some(raw.to_string()),
        _ => {
            errors.push(FieldError::new("image", "The image must be a valid URL"));
            None
        }
    }
}

fn parse_optional_text(
    value: Option<&Value>,
    field: &'static str,
    message: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match value.as_str() {
        Some(raw) => Some(raw.to_string()),
        None => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

/// Patch handling for nullable free-text fields: absent leaves the field
/// untouched, `null` clears it, a string replaces it.
fn patch_nullable_text(
    map: &Map<String, Value>,
    field: &'static str,
    message: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<Option<String>> {
    let value = map.get(field)?;
    if value.is_null() {
        return Some(None);
    }
    match value.as_str() {
        Some(raw) => Some(Some(raw.to_string())),
        None => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "name": "Kakashi",
            "age": 29,
            "village": "Konohagakure",
            "clan": "Hatake",
            "rank": "Jonin",
            "gender": "Male",
            "status": "Alive"
        })
    }

    #[test]
    fn create_accepts_minimal_body() {
        let draft = parse_create(&valid_body()).unwrap();
        assert_eq!(draft.name, "Kakashi");
        assert_eq!(draft.surname, "");
        assert_eq!(draft.age, 29);
        assert_eq!(draft.village, Village::Konohagakure);
        assert_eq!(draft.rank, Rank::Jonin);
        assert_eq!(draft.gender, Gender::Male);
        assert_eq!(draft.status, Status::Alive);
        assert!(draft.element.is_none());
        assert!(draft.techniques.is_empty());
        assert!(draft.image.is_none());
    }

    #[test]
    fn create_collects_every_missing_required_field() {
        let errors = parse_create(&json!({})).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["name", "age", "village", "clan", "rank", "status", "gender"]
        );
    }

    #[test]
    fn create_treats_non_object_body_as_empty() {
        let errors = parse_create(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn create_rejects_short_name() {
        let mut body = valid_body();
        body["name"] = json!("K");
        let errors = parse_create(&body).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "The name must be between 2 and 50 characters");
    }

    #[test]
    fn create_rejects_digits_in_name() {
        let mut body = valid_body();
        body["name"] = json!("Naruto 99");
        let errors = parse_create(&body).unwrap_err();
        assert_eq!(errors[0].message, "The name can only contain letters and spaces");
    }

    #[test]
    fn create_accepts_accented_name_and_trims_it() {
        let mut body = valid_body();
        body["name"] = json!("  José María ");
        let draft = parse_create(&body).unwrap();
        assert_eq!(draft.name, "José María");
    }

    #[test]
    fn create_normalizes_legacy_spanish_values() {
        let mut body = valid_body();
        body["gender"] = json!("Masculino");
        body["status"] = json!("Vivo");
        body["element"] = json!("Fuego");
        let draft = parse_create(&body).unwrap();
        assert_eq!(draft.gender, Gender::Male);
        assert_eq!(draft.status, Status::Alive);
        assert_eq!(draft.element, Some(Element::Fire));
    }

    #[test]
    fn create_rejects_age_out_of_range() {
        for bad in [json!(0), json!(201), json!(-4), json!("29"), json!(29.5)] {
            let mut body = valid_body();
            body["age"] = bad;
            let errors = parse_create(&body).unwrap_err();
            assert_eq!(errors[0].field, "age");
            assert_eq!(errors[0].message, "The age must be an integer between 1 and 200");
        }
    }

    #[test]
    fn create_rejects_unknown_village() {
        let mut body = valid_body();
        body["village"] = json!("Atlantis");
        let errors = parse_create(&body).unwrap_err();
        assert_eq!(errors[0].message, "Invalid village");
    }

    #[test]
    fn create_rejects_blank_clan() {
        let mut body = valid_body();
        body["clan"] = json!("   ");
        let errors = parse_create(&body).unwrap_err();
        assert_eq!(errors[0].field, "clan");
        assert_eq!(errors[0].message, "The clan is required");
    }

    #[test]
    fn create_rejects_invalid_image_url() {
        let mut body = valid_body();
        body["image"] = json!("not a url");
        let errors = parse_create(&body).unwrap_err();
        assert_eq!(errors[0].message, "The image must be a valid URL");
    }

    #[test]
    fn create_accepts_full_optional_set() {
        let mut body = valid_body();
        body["surname"] = json!("Hatake");
        body["element"] = json!("Lightning");
        body["techniques"] = json!(["Chidori", "Raikiri"]);
        body["image"] = json!("https://example.com/kakashi.png");
        body["team"] = json!("Team 7");
        body["birthDate"] = json!("September 15");
        let draft = parse_create(&body).unwrap();
        assert_eq!(draft.surname, "Hatake");
        assert_eq!(draft.element, Some(Element::Lightning));
        assert_eq!(draft.techniques, vec!["Chidori", "Raikiri"]);
        assert_eq!(draft.team.as_deref(), Some("Team 7"));
        assert_eq!(draft.birth_date.as_deref(), Some("September 15"));
    }

    #[test]
    fn create_rejects_non_string_techniques() {
        let mut body = valid_body();
        body["techniques"] = json!(["Rasengan", 9]);
        let errors = parse_create(&body).unwrap_err();
        assert_eq!(errors[0].field, "techniques");
    }

    #[test]
    fn patch_empty_body_is_a_noop() {
        let patch = parse_patch(&json!({})).unwrap();
        assert!(!patch.touches_identity());
        assert!(patch.age.is_none());
    }

    #[test]
    fn patch_rejects_unknown_field() {
        let errors = parse_patch(&json!({ "favoriteFood": "ramen" })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "favoriteFood");
        assert_eq!(errors[0].message, "Unknown field");
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let patch = parse_patch(&json!({ "element": null, "team": null })).unwrap();
        assert_eq!(patch.element, Some(None));
        assert_eq!(patch.team, Some(None));
    }

    #[test]
    fn patch_rejects_null_for_required_fields() {
        let errors = parse_patch(&json!({ "name": null, "age": null })).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "age"]);
    }

    #[test]
    fn patch_applies_field_rules() {
        let errors = parse_patch(&json!({ "age": 999 })).unwrap_err();
        assert_eq!(errors[0].field, "age");

        let patch = parse_patch(&json!({ "age": 30, "rank": "Kage" })).unwrap();
        assert_eq!(patch.age, Some(30));
        assert_eq!(patch.rank, Some(Rank::Kage));
    }

    #[test]
    fn path_id_must_be_a_positive_integer() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("1.5").is_err());
    }
}
