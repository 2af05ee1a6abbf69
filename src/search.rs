// src/search.rs

use std::cmp::Ordering;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::entity::{EntityKind, SearchableEntity};
use crate::error::WayfindError;
use crate::geo::{distance_meters, is_valid_point};
use crate::location::LocationFix;

/// Which collections a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Kind(EntityKind),
}

impl FromStr for TypeFilter {
    type Err = WayfindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TypeFilter::All),
            "edificio" => Ok(TypeFilter::Kind(EntityKind::Building)),
            "sala" => Ok(TypeFilter::Kind(EntityKind::Room)),
            "bano" | "baño" => Ok(TypeFilter::Kind(EntityKind::Bathroom)),
            "facultad" => Ok(TypeFilter::Kind(EntityKind::Faculty)),
            other => Err(WayfindError::InvalidQueryType(other.to_string())),
        }
    }
}

/// A search hit, with its distance from the visitor when known.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub entity: SearchableEntity,
    pub distance_meters: Option<f64>,
}

/// Searches the catalog with a filter given by name.
///
/// An unrecognized filter is a caller bug and is the only error this returns.
/// See [`search_typed`] for the ranking rules.
pub fn search(
    catalog: &Catalog,
    query: &str,
    type_filter: &str,
    origin: Option<&LocationFix>,
) -> Result<Vec<RankedResult>, WayfindError> {
    let filter = type_filter.parse::<TypeFilter>()?;
    Ok(search_typed(catalog, query, filter, origin))
}

/// Searches the catalog and ranks the hits.
///
/// - `All` with an empty query returns nothing; there is no browse-everything mode.
/// - A single kind with an empty query browses that whole kind, alphabetically.
/// - Otherwise names (and acronyms, for buildings and rooms) are matched by
///   case-insensitive substring.
///
/// With a valid origin every hit that has a location gets a distance, and
/// hits are ordered nearest first with unknown distances last. Without any
/// distances the order is alphabetical. Both sorts are stable.
pub fn search_typed(
    catalog: &Catalog,
    query: &str,
    filter: TypeFilter,
    origin: Option<&LocationFix>,
) -> Vec<RankedResult> {
    let query = query.trim();
    let origin = origin.map(|fix| fix.point).filter(is_valid_point);

    let mut results: Vec<RankedResult> = match (filter, query.is_empty()) {
        (TypeFilter::All, true) => return Vec::new(),
        (TypeFilter::Kind(kind), true) => catalog.of_kind(kind).iter().map(unranked).collect(),
        (filter, false) => {
            let Some(matcher) = build_matcher(query) else {
                return Vec::new();
            };
            let kinds: &[EntityKind] = match filter {
                TypeFilter::All => &EntityKind::ALL,
                TypeFilter::Kind(ref kind) => std::slice::from_ref(kind),
            };
            kinds
                .iter()
                .flat_map(|kind| catalog.of_kind(*kind))
                .filter(|entity| matches_entity(&matcher, entity))
                .map(unranked)
                .collect()
        }
    };

    if let Some(origin) = origin {
        for result in results.iter_mut() {
            result.distance_meters = catalog
                .resolve_location(&result.entity)
                .map(|location| distance_meters(&origin, &location));
        }
    }

    let browsing = query.is_empty();
    let has_distances = results.iter().any(|r| r.distance_meters.is_some());
    if has_distances && !browsing {
        results.sort_by(|a, b| compare_distance(a.distance_meters, b.distance_meters));
    } else {
        results.sort_by_cached_key(|r| r.entity.display_name().to_lowercase());
    }

    log::debug!(
        "Search {:?} ({:?}) returned {} results",
        query,
        filter,
        results.len()
    );
    results
}

fn unranked(entity: &SearchableEntity) -> RankedResult {
    RankedResult {
        entity: entity.clone(),
        distance_meters: None,
    }
}

fn build_matcher(query: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Unusable search query {:?}: {}", query, e);
            None
        }
    }
}

fn matches_entity(matcher: &Regex, entity: &SearchableEntity) -> bool {
    matcher.is_match(entity.display_name())
        || entity.acronym().is_some_and(|acronym| matcher.is_match(acronym))
}

/// Nearest first; a missing distance sorts after every known one.
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
