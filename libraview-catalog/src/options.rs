use libraview_core::{Feature, FilterId, Zone};
use serde::Serialize;

/// A chip in the filter bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub id: FilterId,
    pub label: &'static str,
}

/// Filter bar contents, in display order.
pub fn filter_options() -> Vec<FilterOption> {
    vec![
        FilterOption { id: FilterId::All, label: "All Spots" },
        FilterOption { id: FilterId::Zone(Zone::Silent), label: Zone::Silent.label() },
        FilterOption { id: FilterId::Zone(Zone::Group), label: Zone::Group.label() },
        FilterOption { id: FilterId::Feature(Feature::PowerOutlet), label: Feature::PowerOutlet.label() },
        FilterOption { id: FilterId::Feature(Feature::Window), label: Feature::Window.label() },
        FilterOption { id: FilterId::Feature(Feature::Whiteboard), label: Feature::Whiteboard.label() },
    ]
}
