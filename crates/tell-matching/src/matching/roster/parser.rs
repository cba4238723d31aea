use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::super::domain::{CareerFieldId, ExperienceLevel, LearningStyle, Mentor, MentorId};

const LIST_SEPARATOR: char = ';';

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("mentor id is blank")]
    MissingId,
    #[error("{style} affinity must be between 1 and 10 (found {value})")]
    AffinityOutOfRange { style: &'static str, value: u8 },
    #[error("unrecognised active flag '{0}'")]
    ActiveFlag(String),
}

pub(crate) fn parse_rows<R: Read>(
    reader: R,
) -> Result<Vec<(usize, Result<Mentor, RowError>)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = record?;
        // Header occupies line 1.
        rows.push((index + 2, row.into_mentor()));
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Mentor ID")]
    mentor_id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Headline", default)]
    headline: String,
    #[serde(rename = "Career Fields", default)]
    career_fields: String,
    #[serde(
        rename = "Experience Level",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    experience_level: Option<String>,
    #[serde(rename = "Skills", default)]
    skills: String,
    #[serde(rename = "Visual", default, deserialize_with = "blank_as_none")]
    visual: Option<u8>,
    #[serde(rename = "Auditory", default, deserialize_with = "blank_as_none")]
    auditory: Option<u8>,
    #[serde(rename = "Reading", default, deserialize_with = "blank_as_none")]
    reading: Option<u8>,
    #[serde(rename = "Kinesthetic", default, deserialize_with = "blank_as_none")]
    kinesthetic: Option<u8>,
    #[serde(rename = "Active", default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
}

impl RosterRow {
    fn into_mentor(self) -> Result<Mentor, RowError> {
        let mentor_id = self.mentor_id.trim().to_string();
        if mentor_id.is_empty() {
            return Err(RowError::MissingId);
        }

        let learning_style_compatibility = self.compatibility()?;
        let is_active = match self.active.as_deref() {
            None => true,
            Some(flag) => parse_flag(flag).ok_or_else(|| RowError::ActiveFlag(flag.to_string()))?,
        };

        Ok(Mentor {
            mentor_id: MentorId(mentor_id),
            name: self.name,
            headline: self.headline,
            career_fields: split_list(&self.career_fields)
                .map(CareerFieldId)
                .collect::<BTreeSet<_>>(),
            experience_level: self.experience_level.as_deref().and_then(ExperienceLevel::parse),
            skills: split_list(&self.skills).collect(),
            learning_style_compatibility,
            is_active,
        })
    }

    fn compatibility(&self) -> Result<Option<BTreeMap<LearningStyle, u8>>, RowError> {
        let columns = [
            (LearningStyle::Visual, self.visual),
            (LearningStyle::Auditory, self.auditory),
            (LearningStyle::Reading, self.reading),
            (LearningStyle::Kinesthetic, self.kinesthetic),
        ];

        let mut map = BTreeMap::new();
        for (style, value) in columns {
            if let Some(value) = value {
                if !(1..=10).contains(&value) {
                    return Err(RowError::AffinityOutOfRange {
                        style: style.label(),
                        value,
                    });
                }
                map.insert(style, value);
            }
        }

        Ok(if map.is_empty() { None } else { Some(map) })
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(LIST_SEPARATOR)
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|item| !item.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none(deserializer)? {
        Some(raw) => raw
            .trim()
            .parse::<u8>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
