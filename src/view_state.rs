//! Sort / filter / selection state behind the location list
//!
//! Everything here is synchronous; loading the locations is the caller's job.

use reqwest::Url;
use serde::Serialize;
use std::cmp::Ordering;

use crate::error::ValidationError;
use crate::location::{LatLng, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Rate,
    #[value(name = "created")]
    CreatedAt,
    #[value(name = "updated")]
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Name,
        SortField::Rate,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Rate => "rate",
            SortField::CreatedAt => "created",
            SortField::UpdatedAt => "updated",
        }
    }

    /// Next field in [`SortField::ALL`], wrapping around
    pub fn next(&self) -> SortField {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn compare(&self, a: &Location, b: &Location) -> Ordering {
        match self {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Rate => a.rate.cmp(&b.rate),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Ascending = 1,
    Descending = -1,
}

impl SortDirection {
    pub fn reversed(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// The single active sort property and its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, descending: bool) -> Self {
        Self {
            field,
            direction: if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }

    pub fn compare(&self, a: &Location, b: &Location) -> Ordering {
        let ord = self.field.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Name substring + minimum rate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub txt: String,
    /// Always finite and `>= 0`
    pub min_rate: f64,
}

impl FilterSpec {
    /// Coerce raw user input into a usable minimum rate
    ///
    /// Anything that is not a finite, non-negative number becomes 0 instead of
    /// silently disabling the rate filter.
    pub fn coerce_min_rate(raw: &str) -> f64 {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return 0.0;
        }
        sanitize_min_rate(trimmed.parse::<f64>().unwrap_or(0.0))
    }

    pub fn matches(&self, loc: &Location) -> bool {
        let txt = self.txt.trim().to_lowercase();
        let name_matches = txt.is_empty() || loc.name.to_lowercase().contains(&txt);
        name_matches && f64::from(loc.rate) >= self.min_rate
    }
}

fn sanitize_min_rate(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Partial filter change; `None` fields keep their current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub txt: Option<String>,
    pub min_rate: Option<f64>,
}

impl FilterUpdate {
    pub fn txt(txt: impl Into<String>) -> Self {
        Self {
            txt: Some(txt.into()),
            min_rate: None,
        }
    }

    pub fn min_rate(min_rate: f64) -> Self {
        Self {
            txt: None,
            min_rate: Some(min_rate),
        }
    }

    /// Build from raw form input, coercing the rate
    pub fn from_raw(txt: Option<&str>, min_rate: Option<&str>) -> Self {
        Self {
            txt: txt.map(str::to_string),
            min_rate: min_rate.map(FilterSpec::coerce_min_rate),
        }
    }
}

/// Owned view state for one session
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    sort_by: Option<SortSpec>,
    filter_by: FilterSpec,
    selected_id: Option<String>,
    user_pos: Option<LatLng>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(&self) -> Option<&SortSpec> {
        self.sort_by.as_ref()
    }

    pub fn filter_by(&self) -> &FilterSpec {
        &self.filter_by
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn user_position(&self) -> Option<LatLng> {
        self.user_pos
    }

    /// Replace the sort entirely
    pub fn set_sort_by(&mut self, sort_by: Option<SortSpec>) {
        self.sort_by = sort_by;
    }

    /// Merge `update` into the filter and return the resulting spec
    pub fn set_filter_by(&mut self, update: FilterUpdate) -> FilterSpec {
        if let Some(txt) = update.txt {
            self.filter_by.txt = txt;
        }
        if let Some(min_rate) = update.min_rate {
            self.filter_by.min_rate = sanitize_min_rate(min_rate);
        }
        self.filter_by.clone()
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected_id = id.filter(|id| !id.is_empty());
    }

    /// Record the user's position; only the first fix of a session is kept
    pub fn set_user_position(&mut self, pos: LatLng) -> bool {
        if self.user_pos.is_some() {
            return false;
        }
        self.user_pos = Some(pos);
        true
    }

    /// Filter then stable-sort a fresh copy of `all`
    pub fn derive_visible_list(&self, all: &[Location]) -> Vec<Location> {
        let mut visible: Vec<Location> = all
            .iter()
            .filter(|loc| self.filter_by.matches(loc))
            .cloned()
            .collect();
        if let Some(sort_by) = &self.sort_by {
            visible.sort_by(|a, b| sort_by.compare(a, b));
        }
        visible
    }

    /// The selected id, but only if it is part of `visible`
    pub fn active_id<'a>(&'a self, visible: &[Location]) -> Option<&'a str> {
        let selected = self.selected_id.as_deref()?;
        visible
            .iter()
            .any(|loc| loc.id == selected)
            .then_some(selected)
    }

    /// Shareable view state as URL query parameters
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("txt", self.filter_by.txt.clone()),
            ("minRate", self.filter_by.min_rate.to_string()),
        ];
        if let Some(id) = &self.selected_id {
            params.push(("locId", id.clone()));
        }
        params
    }

    /// `base` with the query parameters appended
    pub fn share_url(&self, base: &str) -> Result<Url, ValidationError> {
        Url::parse_with_params(base, self.query_params())
            .map_err(|e| ValidationError::InvalidShareBase(format!("{}: {}", base, e)))
    }
}
