//! Field-to-tag mapping supplied by the mapping provider.
//!
//! Exporters put the same semantic field under different RIS codes (titles
//! under `TI` or `T1`, abstracts under `AB` or `N2`, ...). A [`TagMapping`]
//! says which code a given file uses for each of the six fields this crate
//! understands. How the mapping was produced is none of the parser's
//! business; it is validated once, here, and then trusted.
//!
//! # Example
//!
//! ```
//! use risdedupe::TagMapping;
//!
//! let json = r#"{
//!     "title": "TI",
//!     "author": "AU",
//!     "journal_name": "T2",
//!     "publication_year": "PY",
//!     "keywords": null,
//!     "abstract": "AB"
//! }"#;
//!
//! let mapping = TagMapping::from_json(json).unwrap();
//! assert_eq!(mapping.title.as_ref().map(|t| t.as_str()), Some("TI"));
//! assert!(mapping.keywords.is_none());
//! ```

use crate::error::MappingError;
use crate::ris::RisTag;
use serde::{Deserialize, Serialize};

/// The six semantic fields a mapping covers, in the provider's key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticField {
    Title,
    Author,
    JournalName,
    PublicationYear,
    Keywords,
    Abstract,
}

impl SemanticField {
    pub const ALL: [SemanticField; 6] = [
        SemanticField::Title,
        SemanticField::Author,
        SemanticField::JournalName,
        SemanticField::PublicationYear,
        SemanticField::Keywords,
        SemanticField::Abstract,
    ];

    /// Key used for this field in the provider's JSON object.
    pub fn key(self) -> &'static str {
        match self {
            SemanticField::Title => "title",
            SemanticField::Author => "author",
            SemanticField::JournalName => "journal_name",
            SemanticField::PublicationYear => "publication_year",
            SemanticField::Keywords => "keywords",
            SemanticField::Abstract => "abstract",
        }
    }
}

/// Validated mapping from semantic fields to RIS tag codes.
///
/// Every field is optional. Two fields may share a tag; such mappings are
/// passed through as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagMapping {
    pub title: Option<RisTag>,
    pub author: Option<RisTag>,
    pub journal_name: Option<RisTag>,
    pub publication_year: Option<RisTag>,
    pub keywords: Option<RisTag>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<RisTag>,
}

/// Wire shape of the provider's answer: exactly six keys, string or null.
/// A missing key is an error, not an implicit `None`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTagMapping {
    #[serde(deserialize_with = "Option::deserialize")]
    title: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    author: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    journal_name: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    publication_year: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    keywords: Option<String>,
    #[serde(rename = "abstract", deserialize_with = "Option::deserialize")]
    abstract_text: Option<String>,
}

impl TagMapping {
    /// Parses and validates the JSON object returned by the mapping provider.
    ///
    /// All six keys must be present; each value is a two character tag code,
    /// `null`, or a blank string (read as `null`).
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] for invalid JSON, missing or unknown keys, and
    /// tag values that are not two characters long.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let raw: RawTagMapping = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// The tag mapped to `field`, if any.
    pub fn tag_for(&self, field: SemanticField) -> Option<&RisTag> {
        match field {
            SemanticField::Title => self.title.as_ref(),
            SemanticField::Author => self.author.as_ref(),
            SemanticField::JournalName => self.journal_name.as_ref(),
            SemanticField::PublicationYear => self.publication_year.as_ref(),
            SemanticField::Keywords => self.keywords.as_ref(),
            SemanticField::Abstract => self.abstract_text.as_ref(),
        }
    }

    /// Sets the tag for `field`. Returns `None` if `code` is not a valid tag.
    #[must_use]
    pub fn with(mut self, field: SemanticField, code: &str) -> Option<Self> {
        let tag = Some(RisTag::new(code)?);
        match field {
            SemanticField::Title => self.title = tag,
            SemanticField::Author => self.author = tag,
            SemanticField::JournalName => self.journal_name = tag,
            SemanticField::PublicationYear => self.publication_year = tag,
            SemanticField::Keywords => self.keywords = tag,
            SemanticField::Abstract => self.abstract_text = tag,
        }
        Some(self)
    }

    /// Every tag referenced by at least one field. Tags outside this set are
    /// ignored by the extractor.
    pub fn tracked_tags(&self) -> impl Iterator<Item = &RisTag> {
        SemanticField::ALL
            .into_iter()
            .filter_map(|field| self.tag_for(field))
    }
}

impl TryFrom<RawTagMapping> for TagMapping {
    type Error = MappingError;

    fn try_from(raw: RawTagMapping) -> Result<Self, Self::Error> {
        Ok(Self {
            title: validate_tag(SemanticField::Title, raw.title)?,
            author: validate_tag(SemanticField::Author, raw.author)?,
            journal_name: validate_tag(SemanticField::JournalName, raw.journal_name)?,
            publication_year: validate_tag(SemanticField::PublicationYear, raw.publication_year)?,
            keywords: validate_tag(SemanticField::Keywords, raw.keywords)?,
            abstract_text: validate_tag(SemanticField::Abstract, raw.abstract_text)?,
        })
    }
}

fn validate_tag(
    field: SemanticField,
    value: Option<String>,
) -> Result<Option<RisTag>, MappingError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let code = value.trim();
    if code.is_empty() {
        return Ok(None);
    }
    RisTag::new(code).map(Some).ok_or(MappingError::InvalidTag {
        field: field.key(),
        tag: value,
    })
}
