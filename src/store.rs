use std::sync::RwLock;

use chrono::Utc;
use thiserror::Error;

use crate::models::{
    Character, CharacterDraft, CharacterId, CharacterPatch, Element, Gender, Rank, Status, Village,
};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("character {0} not found")]
    NotFound(CharacterId),
    #[error("a character named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("store lock poisoned")]
    Poisoned,
}

/// In-memory character store: the ordered record collection plus the id
/// counter, both behind a single lock.
///
/// Each mutation runs as one compound operation under the write guard, so
/// the duplicate check, id allocation, and the write itself cannot
/// interleave with another request. Reads hand out snapshot clones.
pub struct CharacterStore {
    inner: RwLock<Inner>,
}

struct Inner {
    records: Vec<Character>,
    next_id: CharacterId,
}

impl Inner {
    fn find_index(&self, id: CharacterId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Case-insensitive (name, surname) scan, skipping `exclude` when given.
    fn name_taken(&self, name: &str, surname: &str, exclude: Option<CharacterId>) -> bool {
        self.records
            .iter()
            .filter(|record| Some(record.id) != exclude)
            .any(|record| record.same_identity(name, surname))
    }
}

impl CharacterStore {
    /// An empty store. The first created record gets id 1.
    pub fn new() -> Self {
        CharacterStore {
            inner: RwLock::new(Inner {
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// A store preloaded with the three Team 7 records the service ships
    /// with. Their timestamps are the construction time.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let records = vec![
            Character {
                id: 1,
                name: "Naruto Uzumaki".to_string(),
                surname: "Uzumaki".to_string(),
                age: 17,
                village: Village::Konohagakure,
                clan: "Uzumaki".to_string(),
                rank: Rank::Genin,
                element: Some(Element::Wind),
                techniques: vec![
                    "Rasengan".to_string(),
                    "Kage Bunshin no Jutsu".to_string(),
                    "Tajuu Kage Bunshin no Jutsu".to_string(),
                ],
                bloodline: None,
                beast: Some("Kurama (Nine-Tails)".to_string()),
                status: Status::Alive,
                gender: Gender::Male,
                team: Some("Team 7".to_string()),
                mentor: Some("Kakashi Hatake".to_string()),
                image: Some("https://example.com/naruto.jpg".to_string()),
                description: Some(
                    "Main protagonist, a Konoha ninja who dreams of becoming Hokage".to_string(),
                ),
                birth_date: Some("1987-10-10".to_string()),
                specialty: None,
                created_at: now,
                updated_at: now,
            },
            Character {
                id: 2,
                name: "Sasuke Uchiha".to_string(),
                surname: "Uchiha".to_string(),
                age: 17,
                village: Village::Konohagakure,
                clan: "Uchiha".to_string(),
                rank: Rank::Genin,
                element: Some(Element::Fire),
                techniques: vec![
                    "Chidori".to_string(),
                    "Katon: Gokakyu no Jutsu".to_string(),
                    "Amaterasu".to_string(),
                ],
                bloodline: Some("Sharingan".to_string()),
                beast: None,
                status: Status::Alive,
                gender: Gender::Male,
                team: Some("Team 7".to_string()),
                mentor: Some("Kakashi Hatake".to_string()),
                image: Some("https://example.com/sasuke.jpg".to_string()),
                description: Some(
                    "Last survivor of the Uchiha clan, seeking revenge".to_string(),
                ),
                birth_date: Some("1987-07-23".to_string()),
                specialty: None,
                created_at: now,
                updated_at: now,
            },
            Character {
                id: 3,
                name: "Sakura Haruno".to_string(),
                surname: "Haruno".to_string(),
                age: 17,
                village: Village::Konohagakure,
                clan: "Haruno".to_string(),
                rank: Rank::Genin,
                element: Some(Element::Earth),
                techniques: vec![
                    "Oukashou".to_string(),
                    "Byakugou no Jutsu".to_string(),
                    "Shosen Jutsu".to_string(),
                ],
                bloodline: None,
                beast: None,
                status: Status::Alive,
                gender: Gender::Female,
                team: Some("Team 7".to_string()),
                mentor: Some("Kakashi Hatake".to_string()),
                image: Some("https://example.com/sakura.jpg".to_string()),
                description: Some("Kunoichi with exceptional medical skills".to_string()),
                birth_date: Some("1987-03-28".to_string()),
                specialty: Some("Medical Ninjutsu".to_string()),
                created_at: now,
                updated_at: now,
            },
        ];
        CharacterStore {
            inner: RwLock::new(Inner { records, next_id: 4 }),
        }
    }

    /// Snapshot copy of every record, in collection order.
    pub fn list_all(&self) -> Result<Vec<Character>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.clone())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.len())
    }

    pub fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.iter().find(|record| record.id == id).cloned())
    }

    /// Create a record from a validated draft: duplicate check, id
    /// allocation, and append under one guard.
    pub fn create(&self, draft: CharacterDraft) -> Result<Character, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if inner.name_taken(&draft.name, &draft.surname, None) {
            return Err(StoreError::DuplicateName(draft.name));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let record = Character::from_draft(id, draft, Utc::now());
        inner.records.push(record.clone());
        Ok(record)
    }

    /// Full replace: every field except `id` and `createdAt` is rewritten
    /// from the draft.
    pub fn replace(&self, id: CharacterId, draft: CharacterDraft) -> Result<Character, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let index = inner.find_index(id).ok_or(StoreError::NotFound(id))?;
        if inner.name_taken(&draft.name, &draft.surname, Some(id)) {
            return Err(StoreError::DuplicateName(draft.name));
        }
        let record = &mut inner.records[index];
        record.apply_replace(draft, Utc::now());
        Ok(record.clone())
    }

    /// Partial update. The duplicate check only runs when the patch touches
    /// the name or surname, and then compares the merged identity (new value
    /// for the touched field, stored value for the other).
    ///
    /// Returns the updated record and the touched wire field names.
    pub fn update(
        &self,
        id: CharacterId,
        patch: &CharacterPatch,
    ) -> Result<(Character, Vec<&'static str>), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let index = inner.find_index(id).ok_or(StoreError::NotFound(id))?;
        if patch.touches_identity() {
            let current = &inner.records[index];
            let name = patch.name.as_deref().unwrap_or(&current.name);
            let surname = patch.surname.as_deref().unwrap_or(&current.surname);
            if inner.name_taken(name, surname, Some(id)) {
                return Err(StoreError::DuplicateName(name.to_string()));
            }
        }
        let record = &mut inner.records[index];
        let updated_fields = record.apply_patch(patch, Utc::now());
        Ok((record.clone(), updated_fields))
    }

    /// Remove a record in place (collection order preserved). Freed ids are
    /// never reused.
    pub fn delete(&self, id: CharacterId) -> Result<Character, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let index = inner.find_index(id).ok_or(StoreError::NotFound(id))?;
        Ok(inner.records.remove(index))
    }
}

impl Default for CharacterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, surname: &str) -> CharacterDraft {
        CharacterDraft {
            name: name.to_string(),
            surname: surname.to_string(),
            age: 20,
            village: Village::Konohagakure,
            clan: "Test".to_string(),
            rank: Rank::Genin,
            element: None,
            techniques: Vec::new(),
            bloodline: None,
            beast: None,
            status: Status::Alive,
            gender: Gender::Male,
            team: None,
            mentor: None,
            image: None,
            description: None,
            birth_date: None,
            specialty: None,
        }
    }

    #[test]
    fn seeded_store_holds_team_seven() {
        let store = CharacterStore::seeded();
        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Naruto Uzumaki");
        assert_eq!(records[1].name, "Sasuke Uchiha");
        assert_eq!(records[2].name, "Sakura Haruno");

        let created = store.create(draft("Kakashi", "Hatake")).unwrap();
        assert_eq!(created.id, 4);
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let store = CharacterStore::new();
        let first = store.create(draft("Ino", "Yamanaka")).unwrap();
        let second = store.create(draft("Shikamaru", "Nara")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn create_rejects_case_insensitive_duplicates() {
        let store = CharacterStore::new();
        store.create(draft("Ino", "Yamanaka")).unwrap();

        let err = store.create(draft("INO", "yamanaka")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn duplicate_check_normalizes_missing_surname() {
        let store = CharacterStore::new();
        store.create(draft("Gaara", "")).unwrap();
        let err = store.create(draft("Gaara", "")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));

        // Different surname is a different identity.
        store.create(draft("Gaara", "Sabaku")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn find_by_id_returns_none_for_missing() {
        let store = CharacterStore::new();
        let created = store.create(draft("Rock", "Lee")).unwrap();
        assert_eq!(store.find_by_id(created.id).unwrap().unwrap().name, "Rock");
        assert!(store.find_by_id(99).unwrap().is_none());
    }

    #[test]
    fn replace_preserves_id_and_created_at() {
        let store = CharacterStore::new();
        let created = store.create(draft("Neji", "Hyuga")).unwrap();

        let mut incoming = draft("Hinata", "Hyuga");
        incoming.team = Some("Team 8".to_string());
        let replaced = store.replace(created.id, incoming).unwrap();

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.created_at, created.created_at);
        assert_eq!(replaced.name, "Hinata");
        assert_eq!(replaced.team.as_deref(), Some("Team 8"));
        assert!(replaced.updated_at >= replaced.created_at);

        // A second replace without the optional field clears it.
        let replaced = store.replace(created.id, draft("Hinata", "Hyuga")).unwrap();
        assert!(replaced.team.is_none());
    }

    #[test]
    fn replace_keeps_own_name_without_conflict() {
        let store = CharacterStore::new();
        let created = store.create(draft("Tenten", "")).unwrap();
        let replaced = store.replace(created.id, draft("Tenten", "")).unwrap();
        assert_eq!(replaced.name, "Tenten");
    }

    #[test]
    fn replace_rejects_rename_onto_existing_identity() {
        let store = CharacterStore::new();
        store.create(draft("Ino", "Yamanaka")).unwrap();
        let other = store.create(draft("Shikamaru", "Nara")).unwrap();

        let err = store.replace(other.id, draft("Ino", "Yamanaka")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
    }

    #[test]
    fn replace_missing_id_is_not_found() {
        let store = CharacterStore::new();
        let err = store.replace(42, draft("Ino", "Yamanaka")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn update_touches_only_patched_fields() {
        let store = CharacterStore::new();
        let created = store.create(draft("Choji", "Akimichi")).unwrap();

        let patch = CharacterPatch {
            age: Some(21),
            ..CharacterPatch::default()
        };
        let (updated, fields) = store.update(created.id, &patch).unwrap();

        assert_eq!(updated.age, 21);
        assert_eq!(updated.name, "Choji");
        assert_eq!(fields, vec!["age", "updatedAt"]);
    }

    #[test]
    fn update_preserves_id_and_created_at() {
        let store = CharacterStore::new();
        let created = store.create(draft("Temari", "Sabaku")).unwrap();

        let patch = CharacterPatch {
            rank: Some(Rank::Jonin),
            ..CharacterPatch::default()
        };
        let (updated, _) = store.update(created.id, &patch).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn update_merges_identity_for_duplicate_check() {
        let store = CharacterStore::new();
        store.create(draft("Ino", "Yamanaka")).unwrap();
        let other = store.create(draft("Ino", "Nara")).unwrap();

        // Only the surname changes, but the merged pair collides.
        let patch = CharacterPatch {
            surname: Some("Yamanaka".to_string()),
            ..CharacterPatch::default()
        };
        let err = store.update(other.id, &patch).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
    }

    #[test]
    fn update_without_rename_skips_duplicate_check() {
        let store = CharacterStore::new();
        let created = store.create(draft("Kiba", "Inuzuka")).unwrap();
        let patch = CharacterPatch {
            age: Some(18),
            ..CharacterPatch::default()
        };
        assert!(store.update(created.id, &patch).is_ok());
    }

    #[test]
    fn delete_removes_in_place_and_keeps_order() {
        let store = CharacterStore::new();
        store.create(draft("Ino", "Yamanaka")).unwrap();
        let middle = store.create(draft("Shikamaru", "Nara")).unwrap();
        store.create(draft("Choji", "Akimichi")).unwrap();

        let removed = store.delete(middle.id).unwrap();
        assert_eq!(removed.id, middle.id);

        let ids: Vec<_> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn delete_missing_id_is_not_found() {
        let store = CharacterStore::new();
        let err = store.delete(7).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
    }

    #[test]
    fn freed_ids_are_never_reused() {
        let store = CharacterStore::new();
        store.create(draft("Ino", "Yamanaka")).unwrap();
        let last = store.create(draft("Shikamaru", "Nara")).unwrap();
        store.delete(last.id).unwrap();

        let next = store.create(draft("Choji", "Akimichi")).unwrap();
        assert_eq!(next.id, 3);
    }
}
