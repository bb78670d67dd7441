//! Unsplash background photos
//!
//! Looks up a landscape photo of a city that matches the current weather and
//! time of day. Queries are tried from most to least specific until one
//! returns results.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::PhotosConfig;
use crate::http::fetch_json;

/// Results requested per search
const PER_PAGE: u8 = 10;

/// Sizing appended to the full-resolution photo URL
const PHOTO_SIZING: &str = "&w=1920&q=80";

/// What the frontend knows about the scene it needs a photo for
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoRequest {
    /// Frontend weather category (`clear`, `partlyCloudy`, `snow`, `rain`, ...)
    pub weather: Option<String>,
    #[serde(default)]
    pub is_night: bool,
    /// Per-request access key, overriding the configured one
    pub api_key: Option<String>,
}

/// Outcome of a photo lookup; failures are reported in-band
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PhotoLookup {
    Found(Box<Photo>),
    Missing {
        error: String,
        photo_url: Option<String>,
    },
}

impl PhotoLookup {
    fn missing(error: impl Into<String>) -> Self {
        Self::Missing {
            error: error.into(),
            photo_url: None,
        }
    }
}

/// Photo details handed to the frontend
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Photo {
    pub photo_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub search_query: String,
    pub attribution: Vec<Attribution>,
    pub download_location: String,
    pub source: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    pub display_name: String,
    pub uri: String,
    pub photo_uri: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    width: Option<u32>,
    height: Option<u32>,
    description: Option<String>,
    alt_description: Option<String>,
    location: Option<UnsplashLocation>,
    urls: UnsplashUrls,
    user: UnsplashUser,
    links: UnsplashLinks,
}

#[derive(Debug, Deserialize)]
struct UnsplashLocation {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    full: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashUser {
    name: String,
    links: UnsplashUserLinks,
    profile_image: UnsplashProfileImage,
}

#[derive(Debug, Deserialize)]
struct UnsplashUserLinks {
    html: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashProfileImage {
    small: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashLinks {
    download_location: String,
}

impl UnsplashPhoto {
    fn into_photo(self, search_query: String) -> Photo {
        Photo {
            photo_url: format!("{}{}", self.urls.full, PHOTO_SIZING),
            width: self.width,
            height: self.height,
            description: self.description.or(self.alt_description),
            location: self.location.and_then(|l| l.name),
            search_query,
            attribution: vec![Attribution {
                display_name: self.user.name,
                uri: self.user.links.html,
                photo_uri: self.user.profile_image.small,
            }],
            download_location: self.links.download_location,
            source: "unsplash",
        }
    }
}

/// Search term describing the weather, if the category has one
#[must_use]
pub fn weather_term(weather: Option<&str>, is_night: bool) -> Option<&'static str> {
    match (weather?, is_night) {
        ("clear", false) => Some("sunny"),
        ("clear", true) => Some("night skyline"),
        ("partlyCloudy", false) => Some("cloudy sky"),
        ("partlyCloudy", true) => Some("night clouds"),
        ("snow", _) => Some("winter snow"),
        ("rain", _) => Some("rainy"),
        _ => None,
    }
}

/// Queries to try in order, most specific first
#[must_use]
pub fn search_strategies(city: &str, weather: Option<&str>, is_night: bool) -> Vec<String> {
    let primary = if is_night {
        format!("{city} night city")
    } else if let Some(term) = weather_term(weather, is_night) {
        format!("{city} {term}")
    } else {
        format!("{city} city skyline")
    };

    vec![primary, format!("{city} city"), city.to_string()]
}

/// Unsplash search client
#[derive(Debug, Clone)]
pub struct PhotoSearch {
    client: Client,
    base_url: String,
    access_key: Option<String>,
}

impl PhotoSearch {
    #[must_use]
    pub fn new(client: Client, config: &PhotosConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
        }
    }

    /// Find a photo for `city`; never fails, problems are returned as [`PhotoLookup::Missing`]
    #[instrument(skip(self, request), fields(weather = ?request.weather, is_night = request.is_night))]
    pub async fn photo_for_city(&self, city: &str, request: &PhotoRequest) -> PhotoLookup {
        let Some(key) = request
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or(self.access_key.as_deref())
        else {
            return PhotoLookup::missing("Unsplash API key required");
        };

        match self.search(city, request, key).await {
            Ok(Some(photo)) => PhotoLookup::Found(Box::new(photo)),
            Ok(None) => PhotoLookup::missing("No photos found for this location"),
            Err(e) => {
                warn!("Unsplash photo error: {}", e);
                PhotoLookup::missing(e.to_string())
            }
        }
    }

    async fn search(&self, city: &str, request: &PhotoRequest, key: &str) -> Result<Option<Photo>> {
        for query in search_strategies(city, request.weather.as_deref(), request.is_night) {
            let results = self.search_page(&query, key).await?;
            debug!("{} photos for {:?}", results.len(), query);

            if let Some(first) = results.into_iter().next() {
                info!("Using Unsplash photo for query {:?}", query);
                return Ok(Some(first.into_photo(query)));
            }
        }
        Ok(None)
    }

    async fn search_page(&self, query: &str, key: &str) -> Result<Vec<UnsplashPhoto>> {
        let url = format!(
            "{}/search/photos?query={}&per_page={}&orientation=landscape&content_filter=high",
            self.base_url,
            urlencoding::encode(query),
            PER_PAGE
        );

        let request = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {key}"))
            .header("Accept-Version", "v1");

        let response: SearchResponse = fetch_json(request).await?;
        Ok(response.results)
    }
}
