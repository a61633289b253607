//! Data structures and types for WilTV
//!
//! Contains the domain records returned by the WilTV API:
//! - **Media**: movies, TV shows, seasons and episodes
//! - **Browse**: catalogs, genres and streaming providers
//! - **Account**: the signed-in customer profile

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Media Type
// =============================================================================

/// Media type discriminator used by catalog, genre and search endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    /// Value sent in the `type` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Switch between movies and TV
    pub fn toggle(&self) -> Self {
        match self {
            MediaType::Movie => MediaType::Tv,
            MediaType::Tv => MediaType::Movie,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movies"),
            MediaType::Tv => write!(f, "TV Shows"),
        }
    }
}

// =============================================================================
// Browse Models
// =============================================================================

/// A named grouping of movies or shows defined by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Streaming provider shown in the first row of the browse screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingProvider {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl fmt::Display for StreamingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.name, self.id)
    }
}

// =============================================================================
// Media Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    /// Runtime in minutes
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl Movie {
    /// Human readable runtime, e.g. "2h 15m"
    pub fn format_duration(&self) -> Option<String> {
        self.duration.map(format_minutes)
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{}", self.title, year_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShow {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

impl TvShow {
    /// First playable episode, used when the show itself is "played"
    pub fn first_episode(&self) -> Option<&Episode> {
        self.seasons
            .iter()
            .flat_map(|s| s.episodes.iter())
            .find(|e| e.video_url.is_some())
    }
}

impl fmt::Display for TvShow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{} - {} seasons", self.title, year_str, self.seasons.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub number: u16,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub number: u16,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:02} - {}", self.number, self.title)
    }
}

/// Either kind of browsable title, as shown in rows and search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum MediaItem {
    Movie(Movie),
    Tv(TvShow),
}

impl MediaItem {
    pub fn id(&self) -> u64 {
        match self {
            MediaItem::Movie(m) => m.id,
            MediaItem::Tv(s) => s.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaItem::Movie(m) => &m.title,
            MediaItem::Tv(s) => &s.title,
        }
    }

    pub fn year(&self) -> Option<u16> {
        match self {
            MediaItem::Movie(m) => m.year,
            MediaItem::Tv(s) => s.year,
        }
    }

    pub fn rating(&self) -> Option<f32> {
        match self {
            MediaItem::Movie(m) => m.rating,
            MediaItem::Tv(s) => s.rating,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            MediaItem::Movie(m) => m.description.as_deref(),
            MediaItem::Tv(s) => s.description.as_deref(),
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            MediaItem::Movie(_) => MediaType::Movie,
            MediaItem::Tv(_) => MediaType::Tv,
        }
    }
}

impl From<Movie> for MediaItem {
    fn from(movie: Movie) -> Self {
        MediaItem::Movie(movie)
    }
}

impl From<TvShow> for MediaItem {
    fn from(show: TvShow) -> Self {
        MediaItem::Tv(show)
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// Customer profile returned by login and `/customer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("Customer");
        match &self.email {
            Some(email) => write!(f, "{} <{}>", name, email),
            None => write!(f, "{} #{}", name, self.id),
        }
    }
}

/// Format minutes as "1h 05m" / "45m"
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
