use std::collections::BTreeMap;

use crate::models::{CatalogStats, Character};

/// Compute aggregate statistics over a snapshot.
///
/// Group counts use ordered maps so the JSON key order is deterministic.
/// The average age is rounded to the nearest integer and reported as 0 for
/// an empty catalog.
pub fn summarize(records: &[Character]) -> CatalogStats {
    let mut by_village = BTreeMap::new();
    let mut by_rank = BTreeMap::new();
    let mut by_gender = BTreeMap::new();
    let mut by_status = BTreeMap::new();

    for record in records {
        *by_village.entry(record.village.to_string()).or_insert(0) += 1;
        *by_rank.entry(record.rank.to_string()).or_insert(0) += 1;
        *by_gender.entry(record.gender.to_string()).or_insert(0) += 1;
        *by_status.entry(record.status.to_string()).or_insert(0) += 1;
    }

    let average_age = if records.is_empty() {
        0
    } else {
        let sum: u64 = records.iter().map(|record| u64::from(record.age)).sum();
        (sum as f64 / records.len() as f64).round() as u32
    };

    CatalogStats {
        total_characters: records.len(),
        by_village,
        by_rank,
        by_gender,
        by_status,
        average_age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Rank, Status, Village};
    use chrono::Utc;

    fn character(id: u64, age: u32, village: Village, rank: Rank, gender: Gender) -> Character {
        let now = Utc::now();
        Character {
            id,
            name: format!("Character {id}"),
            surname: String::new(),
            age,
            village,
            clan: "Clan".to_string(),
            rank,
            element: None,
            techniques: Vec::new(),
            bloodline: None,
            beast: None,
            status: Status::Alive,
            gender,
            team: None,
            mentor: None,
            image: None,
            description: None,
            birth_date: None,
            specialty: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_catalog_reports_zero_average() {
        let stats = summarize(&[]);
        assert_eq!(stats.total_characters, 0);
        assert_eq!(stats.average_age, 0);
        assert!(stats.by_village.is_empty());
    }

    #[test]
    fn groups_by_every_dimension() {
        let records = vec![
            character(1, 17, Village::Konohagakure, Rank::Genin, Gender::Male),
            character(2, 17, Village::Konohagakure, Rank::Genin, Gender::Female),
            character(3, 55, Village::Sunagakure, Rank::Kage, Gender::Female),
        ];
        let stats = summarize(&records);

        assert_eq!(stats.total_characters, 3);
        assert_eq!(stats.by_village["Konohagakure"], 2);
        assert_eq!(stats.by_village["Sunagakure"], 1);
        assert_eq!(stats.by_rank["Genin"], 2);
        assert_eq!(stats.by_rank["Kage"], 1);
        assert_eq!(stats.by_gender["Female"], 2);
        assert_eq!(stats.by_status["Alive"], 3);
        // (17 + 17 + 55) / 3 = 29.67, rounded to 30.
        assert_eq!(stats.average_age, 30);
    }

    #[test]
    fn average_rounds_half_up() {
        let records = vec![
            character(1, 20, Village::Kirigakure, Rank::Chunin, Gender::Male),
            character(2, 21, Village::Kirigakure, Rank::Chunin, Gender::Male),
        ];
        assert_eq!(summarize(&records).average_age, 21);
    }
}
