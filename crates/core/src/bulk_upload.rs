//! Bulk upload grouping.
//!
//! Turns a flat set of uploaded files into poster records. Files are matched
//! to a group by the `<basename>_<role>.<ext>` naming convention, where role is
//! `poster`, `logo` or `info`. A group needs a poster image and an info text
//! file; the logo is optional and falls back to a placeholder.
//!
//! Pure functions only. Persisting the resulting [`NewPoster`]s is up to the
//! caller.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::image_fit;
use crate::poster::{NewPoster, UPLOAD_PLACEHOLDER_LOGO_URL};

// ── File classification ──────────────────────────────────────────────

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)_(poster|logo|info)\.\w+$").expect("file name pattern is valid")
});

/// Which slot of a group an uploaded file fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Poster,
    Logo,
    Info,
}

/// One file as received from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }
}

/// Split a file name into its group basename and role.
///
/// Directory components are ignored. Returns `None` for names that do not
/// follow the `<basename>_<role>.<ext>` convention.
pub fn classify_file_name(file_name: &str) -> Option<(String, FileRole)> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let caps = FILE_NAME_RE.captures(name)?;
    let role = match &caps[2] {
        "poster" => FileRole::Poster,
        "logo" => FileRole::Logo,
        _ => FileRole::Info,
    };
    Some((caps[1].to_string(), role))
}

/// Files sharing a basename.
#[derive(Debug, Clone, Default)]
pub struct FileGroup {
    pub poster: Option<UploadedFile>,
    pub logo: Option<UploadedFile>,
    pub info: Option<UploadedFile>,
}

impl FileGroup {
    /// Required roles absent from this group.
    pub fn missing(&self) -> Vec<FileRole> {
        let mut missing = Vec::new();
        if self.poster.is_none() {
            missing.push(FileRole::Poster);
        }
        if self.info.is_none() {
            missing.push(FileRole::Info);
        }
        missing
    }
}

/// Group files by basename, ordered by basename.
///
/// Returns the groups plus the names of files that matched no group. A later
/// file with the same basename and role replaces an earlier one.
pub fn group_files(files: Vec<UploadedFile>) -> (BTreeMap<String, FileGroup>, Vec<String>) {
    let mut groups: BTreeMap<String, FileGroup> = BTreeMap::new();
    let mut unmatched = Vec::new();

    for file in files {
        let Some((basename, role)) = classify_file_name(&file.file_name) else {
            unmatched.push(file.file_name);
            continue;
        };
        let group = groups.entry(basename).or_default();
        let slot = match role {
            FileRole::Poster => &mut group.poster,
            FileRole::Logo => &mut group.logo,
            FileRole::Info => &mut group.info,
        };
        *slot = Some(file);
    }

    (groups, unmatched)
}

// ── Info file parsing ────────────────────────────────────────────────

/// Fields extracted from an info text file. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub starring: Option<String>,
    pub director: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoKey {
    Name,
    Description,
    Starring,
    Director,
    Runtime,
    Genre,
    Rating,
}

impl InfoKey {
    fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "starring" => Some(Self::Starring),
            "director" => Some(Self::Director),
            "runtime" => Some(Self::Runtime),
            "genre" => Some(Self::Genre),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }
}

/// Parse `Key: value` lines.
///
/// Keys are case-insensitive and ignore whitespace. The value is everything
/// after the first colon, trimmed, so values may themselves contain colons.
/// Description text accumulates across lines (including any lines before the
/// first recognised key) until the next recognised key. Interior blank lines
/// are kept and leading or trailing ones dropped. A description line starting
/// with `\` is taken literally without the backslash, which is how
/// [`crate::info_file::render_info_file`] escapes lines that would otherwise
/// read as a key. Unrecognised lines outside the description are ignored.
pub fn parse_info(text: &str) -> InfoFields {
    let mut fields = InfoFields::default();
    let mut description: Vec<String> = Vec::new();
    let mut in_description = true;

    for line in text.lines() {
        let keyed = line
            .split_once(':')
            .and_then(|(k, v)| InfoKey::parse(k).map(|key| (key, v.trim().to_string())));

        match keyed {
            Some((InfoKey::Description, value)) => {
                in_description = true;
                description.push(value);
            }
            Some((key, value)) => {
                in_description = false;
                let slot = match key {
                    InfoKey::Name => &mut fields.name,
                    InfoKey::Starring => &mut fields.starring,
                    InfoKey::Director => &mut fields.director,
                    InfoKey::Runtime => &mut fields.runtime,
                    InfoKey::Genre => &mut fields.genre,
                    InfoKey::Rating => &mut fields.rating,
                    InfoKey::Description => unreachable!("handled above"),
                };
                *slot = Some(value);
            }
            None if in_description => {
                let trimmed = line.trim();
                let literal = trimmed.strip_prefix(DESCRIPTION_ESCAPE).unwrap_or(trimmed);
                description.push(literal.to_string());
            }
            None => {}
        }
    }

    let first = description.iter().position(|l| !l.is_empty());
    let last = description.iter().rposition(|l| !l.is_empty());
    if let (Some(first), Some(last)) = (first, last) {
        fields.description = Some(description[first..=last].join("\n"));
    }
    fields
}

/// Prefix marking a description line that must not be read as a key.
pub(crate) const DESCRIPTION_ESCAPE: char = '\\';

/// Whether a description line needs [`DESCRIPTION_ESCAPE`] to survive parsing.
pub(crate) fn needs_escape(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with(DESCRIPTION_ESCAPE)
        || trimmed
            .split_once(':')
            .is_some_and(|(key, _)| InfoKey::parse(key).is_some())
}

// ── Record building ──────────────────────────────────────────────────

/// What to do with groups that lack a poster or an info file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFilePolicy {
    /// Drop them silently.
    Discard,
    /// Drop them and list them in the outcome.
    #[default]
    Report,
}

impl std::str::FromStr for MissingFilePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(Self::Discard),
            "report" => Ok(Self::Report),
            other => Err(CoreError::Validation(format!(
                "Unknown missing file policy '{other}'"
            ))),
        }
    }
}

/// A group that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedGroup {
    pub basename: String,
    pub missing: Vec<FileRole>,
    pub reason: String,
}

/// Result of grouping an upload batch.
#[derive(Debug, Clone, Default)]
pub struct GroupingOutcome {
    /// Records ready to add, ordered by basename.
    pub posters: Vec<NewPoster>,
    pub rejected: Vec<RejectedGroup>,
    /// Files whose names follow no known convention.
    pub ignored_files: Vec<String>,
}

/// Build a record from a complete group.
///
/// The name comes from the info file, falling back to the basename with
/// underscores turned into spaces. The poster image is fitted and embedded as
/// a data URL; a missing logo gets the upload placeholder.
pub fn build_poster(basename: &str, group: &FileGroup) -> Result<NewPoster, CoreError> {
    let (Some(poster), Some(info)) = (&group.poster, &group.info) else {
        return Err(CoreError::Validation(format!(
            "Group '{basename}' needs both a poster and an info file"
        )));
    };

    let fields = parse_info(&String::from_utf8_lossy(&info.bytes));

    let poster_mime = image_fit::mime_for(&poster.file_name, poster.content_type.as_deref());
    let poster_url = image_fit::poster_data_url(&poster.bytes, &poster_mime)?;

    let logo_url = match &group.logo {
        Some(logo) => {
            let mime = image_fit::mime_for(&logo.file_name, logo.content_type.as_deref());
            image_fit::to_data_url(&logo.bytes, &mime)
        }
        None => UPLOAD_PLACEHOLDER_LOGO_URL.to_string(),
    };

    let name = fields
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| basename.replace('_', " "));

    Ok(NewPoster {
        id: None,
        poster_ai_hint: format!("movie poster for {name}"),
        name,
        poster_url,
        logo_url,
        description: fields.description.unwrap_or_default(),
        starring: fields.starring.unwrap_or_default(),
        director: fields.director.unwrap_or_default(),
        runtime: fields.runtime.unwrap_or_default(),
        genre: fields.genre.unwrap_or_default(),
        rating: fields.rating.unwrap_or_default(),
    })
}

/// Group a batch of files and build a record for every complete group.
///
/// Incomplete groups are handled per `policy`. Groups whose poster image
/// cannot be decoded are always reported.
pub fn group_uploads(files: Vec<UploadedFile>, policy: MissingFilePolicy) -> GroupingOutcome {
    let (groups, ignored_files) = group_files(files);
    let mut outcome = GroupingOutcome {
        ignored_files,
        ..Default::default()
    };

    for (basename, group) in groups {
        let missing = group.missing();
        if !missing.is_empty() {
            tracing::debug!(basename = %basename, ?missing, "Skipping incomplete upload group");
            if policy == MissingFilePolicy::Report {
                outcome.rejected.push(RejectedGroup {
                    reason: "Missing required file".to_string(),
                    basename,
                    missing,
                });
            }
            continue;
        }

        match build_poster(&basename, &group) {
            Ok(poster) => outcome.posters.push(poster),
            Err(e) => {
                tracing::warn!(basename = %basename, error = %e, "Upload group rejected");
                outcome.rejected.push(RejectedGroup {
                    basename,
                    missing: Vec::new(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 3))
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    // -- classify_file_name --

    #[test]
    fn classifies_by_role_suffix() {
        assert_eq!(
            classify_file_name("dune_poster.jpg"),
            Some(("dune".to_string(), FileRole::Poster))
        );
        assert_eq!(
            classify_file_name("blade_runner_logo.png"),
            Some(("blade_runner".to_string(), FileRole::Logo))
        );
        assert_eq!(
            classify_file_name("uploads/heat_info.txt"),
            Some(("heat".to_string(), FileRole::Info))
        );
    }

    #[test]
    fn unconventional_names_are_not_classified() {
        assert_eq!(classify_file_name("dune.jpg"), None);
        assert_eq!(classify_file_name("dune_trailer.mp4"), None);
        assert_eq!(classify_file_name("_poster.jpg"), None);
        assert_eq!(classify_file_name("dune_poster"), None);
    }

    // -- parse_info --

    #[test]
    fn parses_known_keys_case_insensitively() {
        let fields = parse_info(
            "NAME: Heat\nStarring: Al Pacino, Robert De Niro\nDirector : Michael Mann\n\
             Run Time: 2h 50m\ngenre: Crime\nRating: R",
        );
        assert_eq!(fields.name.as_deref(), Some("Heat"));
        assert_eq!(fields.starring.as_deref(), Some("Al Pacino, Robert De Niro"));
        assert_eq!(fields.director.as_deref(), Some("Michael Mann"));
        assert_eq!(fields.runtime.as_deref(), Some("2h 50m"));
        assert_eq!(fields.genre.as_deref(), Some("Crime"));
        assert_eq!(fields.rating.as_deref(), Some("R"));
        assert_eq!(fields.description, None);
    }

    #[test]
    fn values_keep_inner_colons() {
        let fields = parse_info("Runtime: 1:45:00");
        assert_eq!(fields.runtime.as_deref(), Some("1:45:00"));
    }

    #[test]
    fn description_spans_lines_until_next_key() {
        let fields = parse_info(
            "Name: Alien\nDescription: A crew answers a distress call.\n\
             Something follows them back.\n\nRating: R",
        );
        assert_eq!(
            fields.description.as_deref(),
            Some("A crew answers a distress call.\nSomething follows them back.")
        );
        assert_eq!(fields.rating.as_deref(), Some("R"));
    }

    #[test]
    fn description_keeps_paragraph_breaks() {
        let fields = parse_info(
            "Description:\n\nPara one.\n\nPara two.\n\\Rating: a must-see\n\nGenre: Drama",
        );
        assert_eq!(
            fields.description.as_deref(),
            Some("Para one.\n\nPara two.\nRating: a must-see")
        );
        assert_eq!(fields.rating, None);
        assert_eq!(fields.genre.as_deref(), Some("Drama"));
    }

    #[test]
    fn lines_before_first_key_are_description() {
        let fields = parse_info("In space no one can hear you scream.\nName: Alien");
        assert_eq!(
            fields.description.as_deref(),
            Some("In space no one can hear you scream.")
        );
        assert_eq!(fields.name.as_deref(), Some("Alien"));
    }

    #[test]
    fn unknown_keys_outside_description_are_ignored() {
        let fields = parse_info("Name: Alien\nBudget: $11M\nGenre: Horror");
        assert_eq!(fields.description, None);
        assert_eq!(fields.genre.as_deref(), Some("Horror"));
    }

    // -- group_uploads --

    #[test]
    fn complete_group_becomes_a_record() {
        let files = vec![
            UploadedFile::new("heat_poster.png", png()),
            UploadedFile::new("heat_logo.png", b"logo".to_vec()),
            UploadedFile::new("heat_info.txt", b"Name: Heat\nRating: R".to_vec()),
        ];

        let outcome = group_uploads(files, MissingFilePolicy::Report);

        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.posters.len(), 1);
        let poster = &outcome.posters[0];
        assert_eq!(poster.name, "Heat");
        assert_eq!(poster.rating, "R");
        assert!(poster.poster_url.starts_with("data:image/png;base64,"));
        assert_eq!(poster.logo_url, "data:image/png;base64,bG9nbw==");
        assert_eq!(poster.poster_ai_hint, "movie poster for Heat");
    }

    #[test]
    fn missing_logo_gets_placeholder_and_name_falls_back_to_basename() {
        let files = vec![
            UploadedFile::new("the_thing_poster.png", png()),
            UploadedFile::new("the_thing_info.txt", b"Genre: Horror".to_vec()),
        ];

        let outcome = group_uploads(files, MissingFilePolicy::Report);

        assert_eq!(outcome.posters.len(), 1);
        assert_eq!(outcome.posters[0].name, "the thing");
        assert_eq!(outcome.posters[0].logo_url, UPLOAD_PLACEHOLDER_LOGO_URL);
    }

    #[test]
    fn incomplete_groups_follow_policy() {
        let files = || {
            vec![
                UploadedFile::new("a_poster.png", png()),
                UploadedFile::new("a_info.txt", b"Name: A".to_vec()),
                UploadedFile::new("b_poster.png", png()),
                UploadedFile::new("c_logo.png", b"x".to_vec()),
            ]
        };

        let reported = group_uploads(files(), MissingFilePolicy::Report);
        assert_eq!(reported.posters.len(), 1);
        assert_eq!(reported.rejected.len(), 2);
        assert_eq!(reported.rejected[0].basename, "b");
        assert_eq!(reported.rejected[0].missing, vec![FileRole::Info]);
        assert_eq!(
            reported.rejected[1].missing,
            vec![FileRole::Poster, FileRole::Info]
        );

        let discarded = group_uploads(files(), MissingFilePolicy::Discard);
        assert_eq!(discarded.posters.len(), 1);
        assert!(discarded.rejected.is_empty());
    }

    #[test]
    fn undecodable_poster_is_reported_regardless_of_policy() {
        let files = vec![
            UploadedFile::new("x_poster.png", b"nope".to_vec()),
            UploadedFile::new("x_info.txt", b"Name: X".to_vec()),
        ];

        let outcome = group_uploads(files, MissingFilePolicy::Discard);

        assert!(outcome.posters.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert!(outcome.rejected[0].missing.is_empty());
    }

    #[test]
    fn stray_files_are_listed_and_groups_are_ordered() {
        let files = vec![
            UploadedFile::new("readme.md", b"hi".to_vec()),
            UploadedFile::new("zulu_poster.png", png()),
            UploadedFile::new("zulu_info.txt", b"".to_vec()),
            UploadedFile::new("alpha_poster.png", png()),
            UploadedFile::new("alpha_info.txt", b"".to_vec()),
        ];

        let outcome = group_uploads(files, MissingFilePolicy::Report);

        assert_eq!(outcome.ignored_files, vec!["readme.md".to_string()]);
        let names: Vec<_> = outcome.posters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zulu"]);
    }

    #[test]
    fn missing_file_policy_parses() {
        assert_eq!(
            "Discard".parse::<MissingFilePolicy>().unwrap(),
            MissingFilePolicy::Discard
        );
        assert!("ignore".parse::<MissingFilePolicy>().is_err());
    }
}
