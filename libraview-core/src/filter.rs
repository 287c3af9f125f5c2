//! Spot filtering for the floor map.
//!
//! A filter id names a zone, a feature, or the dominant `all` sentinel. A spot is
//! visible when any selected filter matches it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::spot::{Feature, Spot, Zone};
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterId {
    All,
    Zone(Zone),
    Feature(Feature),
}

impl FilterId {
    pub fn matches(&self, spot: &Spot) -> bool {
        match self {
            FilterId::All => true,
            FilterId::Zone(zone) => spot.zone == *zone,
            FilterId::Feature(feature) => spot.has_feature(*feature),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterId::All => "all",
            FilterId::Zone(zone) => zone.as_str(),
            FilterId::Feature(feature) => feature.as_str(),
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(FilterId::All);
        }
        if let Ok(zone) = s.parse::<Zone>() {
            return Ok(FilterId::Zone(zone));
        }
        s.parse::<Feature>()
            .map(FilterId::Feature)
            .map_err(|_| CoreError::UnknownFilter(s.to_string()))
    }
}

impl Serialize for FilterId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The active display filters. Never empty; defaults to `{all}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FilterId>", into = "Vec<FilterId>")]
pub struct FilterSet(BTreeSet<FilterId>);

impl FilterSet {
    pub fn all() -> Self {
        Self(BTreeSet::from([FilterId::All]))
    }

    pub fn is_all(&self) -> bool {
        self.0.contains(&FilterId::All)
    }

    pub fn contains(&self, id: &FilterId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterId> {
        self.0.iter()
    }

    /// Parses string ids, e.g. from a saved view state.
    pub fn parse<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<Self, CoreError> {
        ids.into_iter()
            .map(str::parse)
            .collect::<Result<Vec<FilterId>, _>>()
            .map(Self::from)
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<FilterId> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterId>>(iter: I) -> Self {
        let set: BTreeSet<FilterId> = iter.into_iter().collect();
        if set.is_empty() {
            Self::all()
        } else {
            Self(set)
        }
    }
}

impl From<Vec<FilterId>> for FilterSet {
    fn from(ids: Vec<FilterId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<FilterSet> for Vec<FilterId> {
    fn from(set: FilterSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// Visible subset of `spots`, in floor order.
///
/// `all` dominates any other selection. Otherwise a spot is kept when at least one
/// filter equals its zone or names one of its features.
pub fn apply_filter<'a>(spots: &'a [Spot], filters: &FilterSet) -> Vec<&'a Spot> {
    if filters.is_all() {
        return spots.iter().collect();
    }
    spots
        .iter()
        .filter(|spot| filters.iter().any(|f| f.matches(spot)))
        .collect()
}

/// Selection after the user taps `id`.
pub fn toggle_filter(current: &FilterSet, id: FilterId) -> FilterSet {
    if id == FilterId::All {
        return FilterSet::all();
    }

    let mut next: BTreeSet<FilterId> = current
        .iter()
        .copied()
        .filter(|f| *f != FilterId::All)
        .collect();

    if !next.remove(&id) {
        next.insert(id);
    }

    // An emptied selection falls back to `{all}`
    next.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::Position;

    fn spots() -> Vec<Spot> {
        let at = Position { x: 0.0, y: 0.0 };
        vec![
            Spot::new("1A", "1A", at, Zone::Silent, [Feature::PowerOutlet]),
            Spot::new("1B", "1B", at, Zone::Silent, [Feature::PowerOutlet, Feature::Window]),
            Spot::new("1K", "1K", at, Zone::Group, [Feature::Whiteboard]),
            Spot::new("1O", "1O", at, Zone::Collaborative, [Feature::Window]),
        ]
    }

    fn ids(visible: &[&Spot]) -> Vec<String> {
        visible.iter().map(|s| s.desk_number.clone()).collect()
    }

    fn set(ids: &[&str]) -> FilterSet {
        FilterSet::parse(ids.iter().copied()).unwrap()
    }

    #[test]
    fn test_all_is_identity() {
        let spots = spots();
        let visible = apply_filter(&spots, &FilterSet::all());
        assert_eq!(visible.len(), spots.len());
        assert!(visible.iter().zip(spots.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_all_dominates_other_filters() {
        let spots = spots();
        let visible = apply_filter(&spots, &set(&["all", "group"]));
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn test_zone_filter_preserves_order() {
        let spots = spots();
        let visible = apply_filter(&spots, &set(&["silent"]));
        assert_eq!(ids(&visible), vec!["1A", "1B"]);
    }

    #[test]
    fn test_filters_are_or_combined() {
        let spots = spots();
        let visible = apply_filter(&spots, &set(&["window", "group"]));
        assert_eq!(ids(&visible), vec!["1B", "1K", "1O"]);
    }

    #[test]
    fn test_toggle_semantics() {
        let silent: FilterId = "silent".parse().unwrap();
        let window: FilterId = "window".parse().unwrap();

        let next = toggle_filter(&FilterSet::all(), silent);
        assert_eq!(next, set(&["silent"]));

        let next = toggle_filter(&next, window);
        assert_eq!(next, set(&["silent", "window"]));

        let next = toggle_filter(&next, window);
        assert_eq!(next, set(&["silent"]));

        let next = toggle_filter(&next, silent);
        assert_eq!(next, FilterSet::all());

        let next = toggle_filter(&set(&["silent", "window"]), FilterId::All);
        assert_eq!(next, FilterSet::all());
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let err = "sofa".parse::<FilterId>().unwrap_err();
        assert_eq!(err, CoreError::UnknownFilter("sofa".to_string()));
    }

    #[test]
    fn test_empty_set_collapses_to_all() {
        let empty: FilterSet = Vec::new().into();
        assert!(empty.is_all());
        assert!(!empty.is_empty());
    }
}
