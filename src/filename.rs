//! Sequential episode filename derivation.
//!
//! The sequencer is stateless: the next episode number is recomputed from
//! the files already present in a show's download folder, never from an
//! internal counter. That keeps it tolerant of manual file management
//! between runs — the filesystem is the ground truth. The tradeoff is that
//! lexicographic ordering must match numeric ordering, which holds only
//! while episode numbers stay within two digits per season; the 100th
//! episode of a season is rejected rather than silently wrapped.

use crate::config::DownloadConfig;
use crate::error::{Error, FilenameError, Result};
use regex::Regex;
use std::path::Path;

/// File extensions that count as media files when scanning a folder
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "m4v"];

/// A derived episode name: the shared stem of the media file and its sidecars
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpisodeName {
    /// Filename stem, `"{prefix} S{yy}E{nn}"` (no extension)
    pub stem: String,
    /// Season number parsed from the season token
    pub season: u32,
    /// Episode number within the season, starting at 1
    pub episode: u32,
}

/// Two-digit season token for the current year
pub fn current_season_token() -> String {
    chrono::Local::now().format("%y").to_string()
}

/// Derive the next episode name for a show's download folder
///
/// Lists files in the folder whose name contains the show's prefix and a
/// media extension, sorted lexicographically. With no matching files the
/// season starts at episode 1; otherwise the lexicographically-last
/// filename is parsed and the episode number incremented, resetting to 1
/// when the season token has rolled over to a new year.
///
/// # Errors
/// - [`Error::Io`] if the folder cannot be listed
/// - [`Error::Filename`] if the newest matching filename does not follow
///   the `"{prefix} S{yy}E{nn}"` pattern (state corruption — refusing to
///   guess avoids overwriting an existing episode), or if the season
///   already holds 99 episodes
pub fn next_name(download: &DownloadConfig, season_token: &str) -> Result<EpisodeName> {
    let season: u32 = season_token
        .parse()
        .map_err(|_| Error::Other(format!("invalid season token {:?}", season_token)))?;

    let mut episode_files = list_episode_files(&download.folder, &download.filename_prefix)?;
    episode_files.sort();

    let episode = match episode_files.last() {
        None => 1,
        Some(newest) => {
            let stem = Path::new(newest)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(newest.as_str());

            let (file_season, file_episode) =
                parse_episode_stem(stem).ok_or_else(|| FilenameError::Unparseable {
                    filename: stem.to_string(),
                    folder: download.folder.clone(),
                })?;

            if file_season == season_token {
                if file_episode >= 99 {
                    return Err(Error::Filename(FilenameError::EpisodeOverflow {
                        season: season_token.to_string(),
                        folder: download.folder.clone(),
                    }));
                }
                file_episode + 1
            } else {
                // Season rollover: a new year restarts numbering
                1
            }
        }
    };

    Ok(EpisodeName {
        stem: format!(
            "{} S{}E{:02}",
            download.filename_prefix, season_token, episode
        ),
        season,
        episode,
    })
}

/// Parse a `"{prefix} S{yy}E{nn}"` stem into its season token and episode number
///
/// Returns `None` if the stem does not follow the pattern.
pub fn parse_episode_stem(stem: &str) -> Option<(String, u32)> {
    // Compiled per call; folder scans happen a handful of times per poll
    let pattern = Regex::new(r"^.* S(\d{2})E(\d{2})$").ok()?;

    let captures = pattern.captures(stem)?;
    let season = captures.get(1)?.as_str().to_string();
    let episode: u32 = captures.get(2)?.as_str().parse().ok()?;

    Some((season, episode))
}

/// List filenames in `folder` that carry the show's prefix and a media extension
fn list_episode_files(folder: &Path, prefix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for dir_entry in std::fs::read_dir(folder)? {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }

        let name = dir_entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if name.contains(prefix) && is_media_file(name) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// Whether a filename carries one of the recognized media extensions
fn is_media_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MEDIA_EXTENSIONS
                .iter()
                .any(|media| ext.eq_ignore_ascii_case(media))
        })
}
