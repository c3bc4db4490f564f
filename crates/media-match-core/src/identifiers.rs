// Canonical GUID handling shared by the PVR and Plex sides

use media_match_models::{ExternalIds, LibraryType};
use std::fmt::Display;

/// Query parameter Plex's legacy agents use for the metadata language
pub const LOCALE_PARAM: &str = "lang";

/// Characters that may follow a bare GUID inside a longer one
const GUID_DELIMITERS: [char; 4] = ['?', '/', '&', '#'];

/// External metadata authorities Plex can match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authority {
    Tvdb,
    Tmdb,
    Imdb,
}

impl Authority {
    pub const ALL: [Authority; 3] = [Authority::Tvdb, Authority::Tmdb, Authority::Imdb];

    /// Scheme of the legacy agent GUID, e.g. `com.plexapp.agents.thetvdb`
    pub fn scheme(self) -> &'static str {
        match self {
            Authority::Tvdb => "com.plexapp.agents.thetvdb",
            Authority::Tmdb => "com.plexapp.agents.themoviedb",
            Authority::Imdb => "com.plexapp.agents.imdb",
        }
    }

    /// Short scheme Plex uses in its external GUID tags, e.g. `tvdb`
    pub fn tag(self) -> &'static str {
        match self {
            Authority::Tvdb => "tvdb",
            Authority::Tmdb => "tmdb",
            Authority::Imdb => "imdb",
        }
    }

    pub fn guid(self, id: impl Display) -> String {
        format!("{}://{}", self.scheme(), id)
    }

    /// Authority assumed for bare ids in a library of this type
    pub fn dominant_for(library_type: LibraryType) -> Authority {
        match library_type {
            LibraryType::Tv => Authority::Tvdb,
            _ => Authority::Imdb,
        }
    }

    /// Authority of a canonical or short-form GUID
    pub fn of(guid: &str) -> Option<Authority> {
        let (scheme, _) = guid.split_once("://")?;
        Authority::ALL
            .into_iter()
            .find(|a| a.scheme() == scheme || a.tag() == scheme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("internal guid {0} has no external guids")]
    MissingExternal(String),

    #[error("external guids for {0} are empty")]
    Empty(String),
}

/// Canonical GUIDs for every id a PVR reported
///
/// Zero ids, empty strings and whitespace are not ids. The order is IMDB,
/// TMDB, TVDB; callers pick a preferred candidate with [`select_preferred`].
pub fn normalize_external_id(ids: &ExternalIds) -> Vec<String> {
    let mut guids = Vec::new();

    if let Some(imdb) = ids.imdb_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        guids.push(Authority::Imdb.guid(imdb));
    }
    if let Some(tmdb) = ids.tmdb_id.filter(|id| *id != 0) {
        guids.push(Authority::Tmdb.guid(tmdb));
    }
    if let Some(tvdb) = ids.tvdb_id.filter(|id| *id != 0) {
        guids.push(Authority::Tvdb.guid(tvdb));
    }

    guids
}

/// Comparable GUIDs for a Plex catalog row
///
/// Items matched by Plex's newer agents carry an internal `plex://` GUID;
/// their external tags (`tvdb://1,imdb://tt2`) are expanded into canonical
/// form instead. Bare ids take the `dominant` authority.
pub fn expand_catalog_guid(
    guid: &str,
    external_guids: Option<&str>,
    dominant: Authority,
) -> Result<Vec<String>, IdentifierError> {
    if !guid.starts_with(media_match_sources::plex::INTERNAL_GUID_PREFIX) {
        return Ok(vec![guid.to_string()]);
    }

    let bundle = external_guids.ok_or_else(|| IdentifierError::MissingExternal(guid.to_string()))?;
    let guids: Vec<String> = bundle
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| canonical_entry(entry, dominant))
        .collect();

    if guids.is_empty() {
        return Err(IdentifierError::Empty(guid.to_string()));
    }
    Ok(guids)
}

fn canonical_entry(entry: &str, dominant: Authority) -> String {
    match entry.split_once("://") {
        Some((scheme, id)) => match Authority::ALL.into_iter().find(|a| a.tag() == scheme) {
            Some(authority) => authority.guid(id),
            None => entry.to_string(),
        },
        None => dominant.guid(entry),
    }
}

/// The GUID offered back to Plex: TVDB, else IMDB, else the first candidate
pub fn select_preferred(candidates: &[String]) -> Option<&str> {
    let find = |wanted: Authority| {
        candidates
            .iter()
            .find(|guid| Authority::of(guid) == Some(wanted))
    };

    find(Authority::Tvdb)
        .or_else(|| find(Authority::Imdb))
        .or_else(|| candidates.first())
        .map(String::as_str)
}

pub fn with_locale(guid: &str, locale: &str) -> String {
    let separator = if guid.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", guid, separator, LOCALE_PARAM, locale)
}

/// Whether `media_guid` names the same title as the bare `candidate`
///
/// Plex GUIDs may carry a suffix (`?lang=en`) the PVR's GUID lacks, so the
/// candidate only has to be a prefix, ending at a delimiter.
pub fn guid_matches(media_guid: &str, candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }

    match media_guid.strip_prefix(candidate) {
        Some(rest) => rest.is_empty() || rest.starts_with(GUID_DELIMITERS),
        None => false,
    }
}

/// True when any media GUID matches any candidate
pub fn any_match(media_guids: &[String], candidates: &[String]) -> bool {
    media_guids
        .iter()
        .any(|guid| candidates.iter().any(|candidate| guid_matches(guid, candidate)))
}
