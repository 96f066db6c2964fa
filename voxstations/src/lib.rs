//! # VoxStations
//!
//! Built-in internet radio station directory. Stations are embedded as
//! YAML at compile time and resolved by name (exact first, then
//! case-insensitive); raw stream URLs pass straight through. The
//! directory implements [`voxsource::TrackResolver`], so it plugs into
//! the same seam as any other source.
//!
//! Stations are live streams: resolved tracks carry no duration and the
//! playback core never auto-advances them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use voxmodel::Track;
use voxsource::{async_trait, ResolveError, TrackResolver};

/// Embedded station catalog
const DEFAULT_STATIONS: &str = include_str!("stations.yaml");

/// Stations shown per page in chat menus
pub const MENU_PAGE_SIZE: usize = 6;

static BUILTIN: Lazy<StationDirectory> = Lazy::new(|| {
    StationDirectory::from_yaml(DEFAULT_STATIONS).expect("embedded station catalog is valid YAML")
});

/// One named radio station.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
}

impl Station {
    /// The live-stream track for this station (no duration).
    pub fn to_track(&self) -> Track {
        Track::stream(self.name.clone(), self.url.clone())
    }
}

/// Named catalog of radio stations with menu paging.
///
/// Paging operates on names sorted alphabetically so pages are stable
/// regardless of catalog order.
#[derive(Clone, Debug)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    /// The compiled-in public station catalog.
    pub fn builtin() -> &'static StationDirectory {
        &BUILTIN
    }

    /// Parses a catalog from a YAML sequence of `{name, url}` entries.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let mut stations: Vec<Station> = serde_yaml::from_str(yaml)?;
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { stations })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Looks a station up by name, exact match first, then
    /// case-insensitive.
    pub fn find(&self, name: &str) -> Option<&Station> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .or_else(|| {
                self.stations
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(name))
            })
    }

    /// One page of stations for menu display.
    pub fn page(&self, page: usize, per_page: usize) -> &[Station] {
        let start = page.saturating_mul(per_page).min(self.stations.len());
        let end = (start + per_page).min(self.stations.len());
        &self.stations[start..end]
    }

    /// Number of menu pages at the given page size.
    pub fn page_count(&self, per_page: usize) -> usize {
        if self.stations.is_empty() || per_page == 0 {
            return 0;
        }
        (self.stations.len() - 1) / per_page + 1
    }

    /// Resolves a query to a live-stream track: a known station name, or
    /// a raw stream URL passed through as-is.
    pub fn resolve_query(&self, query: &str) -> Option<Track> {
        let query = query.trim();
        if let Some(station) = self.find(query) {
            return Some(station.to_track());
        }
        if looks_like_url(query) {
            return Some(Track::stream(query, query));
        }
        None
    }
}

#[async_trait]
impl TrackResolver for StationDirectory {
    async fn resolve(&self, query: &str) -> voxsource::Result<Track> {
        self.resolve_query(query)
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))
    }
}

/// True when the text parses as an absolute URL with a scheme and host.
pub fn looks_like_url(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once("://") else {
        return false;
    };
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return false;
    }
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    !host.is_empty()
}
