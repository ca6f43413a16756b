use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::models::{AppliedFilters, Character, PageMeta, UnknownValue};
use crate::validation::FieldError;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Raw query-string parameters for the listing endpoint. Everything arrives
/// as an optional string so violations can be collected into the standard
/// 400 envelope instead of a framework rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub village: Option<String>,
    pub clan: Option<String>,
    pub rank: Option<String>,
    pub element: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Query-string parameters for the free-text search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// The keys a listing can sort on. Anything else is a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
    Surname,
    Age,
    Village,
    Clan,
    Rank,
    Element,
    Gender,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Surname => "surname",
            SortKey::Age => "age",
            SortKey::Village => "village",
            SortKey::Clan => "clan",
            SortKey::Rank => "rank",
            SortKey::Element => "element",
            SortKey::Gender => "gender",
            SortKey::Status => "status",
            SortKey::CreatedAt => "createdAt",
            SortKey::UpdatedAt => "updatedAt",
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            "surname" => Ok(SortKey::Surname),
            "age" => Ok(SortKey::Age),
            "village" => Ok(SortKey::Village),
            "clan" => Ok(SortKey::Clan),
            "rank" => Ok(SortKey::Rank),
            "element" => Ok(SortKey::Element),
            "gender" => Ok(SortKey::Gender),
            "status" => Ok(SortKey::Status),
            "createdAt" => Ok(SortKey::CreatedAt),
            "updatedAt" => Ok(SortKey::UpdatedAt),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

/// A validated listing query with defaults filled in.
#[derive(Debug)]
pub struct ListQuery {
    pub village: Option<String>,
    pub clan: Option<String>,
    pub rank: Option<String>,
    pub element: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub sort: SortKey,
    pub order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl ListQuery {
    /// Validate raw parameters, collecting every violation. Empty strings
    /// count as absent, mirroring how clients send blank form fields.
    pub fn parse(params: ListParams) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let page = match clean(params.page) {
            None => DEFAULT_PAGE,
            Some(raw) => match raw.parse::<usize>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    errors.push(FieldError::new(
                        "page",
                        "The page must be an integer greater than or equal to 1",
                    ));
                    DEFAULT_PAGE
                }
            },
        };
        let limit = match clean(params.limit) {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
                _ => {
                    errors.push(FieldError::new(
                        "limit",
                        "The limit must be an integer between 1 and 100",
                    ));
                    DEFAULT_LIMIT
                }
            },
        };
        let min_age = parse_age_bound(
            params.min_age,
            "min_age",
            "The minimum age must be a non-negative integer",
            &mut errors,
        );
        let max_age = parse_age_bound(
            params.max_age,
            "max_age",
            "The maximum age must be a non-negative integer",
            &mut errors,
        );
        let sort = match clean(params.sort) {
            None => SortKey::Id,
            Some(raw) => match raw.parse::<SortKey>() {
                Ok(key) => key,
                Err(_) => {
                    errors.push(FieldError::new("sort", "Invalid sort key"));
                    SortKey::Id
                }
            },
        };
        let order = match clean(params.order) {
            None => SortOrder::Asc,
            Some(raw) => match raw.parse::<SortOrder>() {
                Ok(order) => order,
                Err(_) => {
                    errors.push(FieldError::new("order", "The order must be asc or desc"));
                    SortOrder::Asc
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ListQuery {
            village: clean(params.village),
            clan: clean(params.clan),
            rank: clean(params.rank),
            element: clean(params.element),
            gender: clean(params.gender),
            status: clean(params.status),
            search: clean(params.search),
            min_age,
            max_age,
            sort,
            order,
            page,
            limit,
        })
    }
}

/// Run the filter → search → sort → paginate pipeline over a snapshot.
///
/// Sorting is unstable; ties between equal keys may reorder.
pub fn apply(
    mut records: Vec<Character>,
    query: &ListQuery,
) -> (Vec<Character>, PageMeta, AppliedFilters) {
    records.retain(|record| matches_filters(record, query));

    if let Some(term) = &query.search {
        let term = term.to_lowercase();
        records.retain(|record| matches_listing_search(record, &term));
    }

    sort_records(&mut records, query.sort, query.order);

    let total = records.len();
    let start = (query.page - 1).saturating_mul(query.limit);
    let page: Vec<Character> = records.into_iter().skip(start).take(query.limit).collect();

    let meta = PageMeta {
        total,
        page: query.page,
        limit: query.limit,
        total_pages: total.div_ceil(query.limit),
        has_next_page: start.saturating_add(query.limit) < total,
        has_prev_page: query.page > 1,
    };
    (page, meta, applied_filters(query))
}

/// Filter a snapshot by a free-text term. This is the search endpoint's
/// matcher, which also scans the technique list; the listing `search`
/// parameter does not.
pub fn search(records: Vec<Character>, term: &str) -> Vec<Character> {
    let term = term.to_lowercase();
    records
        .into_iter()
        .filter(|record| {
            matches_listing_search(record, &term)
                || record
                    .techniques
                    .iter()
                    .any(|technique| technique.to_lowercase().contains(&term))
        })
        .collect()
}

fn clean(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_age_bound(
    raw: Option<String>,
    field: &'static str,
    message: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    let raw = clean(raw)?;
    match raw.parse::<u32>() {
        Ok(age) => Some(age),
        Err(_) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn matches_filters(record: &Character, query: &ListQuery) -> bool {
    // rank/gender/status are equality matches; village/clan/element are
    // substring containment. All case-insensitive.
    if let Some(village) = &query.village {
        if !contains_ci(record.village.as_str(), village) {
            return false;
        }
    }
    if let Some(clan) = &query.clan {
        if !contains_ci(&record.clan, clan) {
            return false;
        }
    }
    if let Some(rank) = &query.rank {
        if record.rank.as_str().to_lowercase() != rank.to_lowercase() {
            return false;
        }
    }
    if let Some(element) = &query.element {
        match record.element {
            Some(value) if contains_ci(value.as_str(), element) => {}
            _ => return false,
        }
    }
    if let Some(gender) = &query.gender {
        if record.gender.as_str().to_lowercase() != gender.to_lowercase() {
            return false;
        }
    }
    if let Some(status) = &query.status {
        if record.status.as_str().to_lowercase() != status.to_lowercase() {
            return false;
        }
    }
    if let Some(min_age) = query.min_age {
        if record.age < min_age {
            return false;
        }
    }
    if let Some(max_age) = query.max_age {
        if record.age > max_age {
            return false;
        }
    }
    true
}

/// `term` must already be lowercased.
fn matches_listing_search(record: &Character, term: &str) -> bool {
    record.name.to_lowercase().contains(term)
        || record.surname.to_lowercase().contains(term)
        || record.clan.to_lowercase().contains(term)
        || record.village.as_str().to_lowercase().contains(term)
        || record
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(term))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn sort_records(records: &mut [Character], key: SortKey, order: SortOrder) {
    records.sort_unstable_by(|a, b| {
        let ordering = compare_by(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &Character, b: &Character, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Surname => a.surname.to_lowercase().cmp(&b.surname.to_lowercase()),
        SortKey::Age => a.age.cmp(&b.age),
        SortKey::Village => a.village.as_str().cmp(b.village.as_str()),
        SortKey::Clan => a.clan.to_lowercase().cmp(&b.clan.to_lowercase()),
        SortKey::Rank => a.rank.as_str().cmp(b.rank.as_str()),
        // A record without an element sorts before any record with one.
        SortKey::Element => a
            .element
            .map(|e| e.as_str())
            .cmp(&b.element.map(|e| e.as_str())),
        SortKey::Gender => a.gender.as_str().cmp(b.gender.as_str()),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

fn applied_filters(query: &ListQuery) -> AppliedFilters {
    AppliedFilters {
        village: query.village.clone(),
        clan: query.clan.clone(),
        rank: query.rank.clone(),
        element: query.element.clone(),
        gender: query.gender.clone(),
        status: query.status.clone(),
        search: query.search.clone(),
        min_age: query.min_age,
        max_age: query.max_age,
        sort: query.sort.as_str(),
        order: query.order.as_str(),
    }
}
