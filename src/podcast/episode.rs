use super::sections::{section_heading, EpisodeSection, STANDARD_SECTION_IDS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const SAFETY_TERMS: &[&str] = &[
    "suicide",
    "self-harm",
    "bomb",
    "explosive",
    "gun",
    "weapon",
    "poison",
    "cocaine",
    "heroin",
    "meth",
    "sexual",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub sections: Vec<EpisodeSection>,
}

impl Episode {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title is required".into()));
        }
        if self.sections.is_empty() {
            return Err(Error::Validation("sections are required".into()));
        }
        for section in &self.sections {
            if section.section_id.trim().is_empty() {
                return Err(Error::Validation("section_id is required".into()));
            }
            if section.text.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "section {:?} is empty",
                    section.section_id
                )));
            }
        }
        for required in STANDARD_SECTION_IDS {
            if self.section(required).is_none() {
                return Err(Error::MissingSection(required.to_string()));
            }
        }
        Ok(())
    }

    pub fn section(&self, section_id: &str) -> Option<&EpisodeSection> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    /// Sections in canonical order, followed by any unrecognized ones in generation order.
    pub fn ordered_sections(&self) -> Vec<&EpisodeSection> {
        let mut ordered: Vec<&EpisodeSection> = STANDARD_SECTION_IDS
            .iter()
            .filter_map(|id| self.section(id))
            .collect();
        ordered.extend(
            self.sections
                .iter()
                .filter(|s| !STANDARD_SECTION_IDS.contains(&s.section_id.as_str())),
        );
        ordered
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::from("# ");
        out.push_str(self.title.trim());
        for section in self.ordered_sections() {
            out.push_str("\n\n## ");
            out.push_str(&section_heading(&section.section_id));
            out.push_str("\n\n");
            out.push_str(section.text.trim());
        }
        out.push('\n');
        out
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive substring scan against the blocklist.
pub fn safety_check(text: &str) -> Result<()> {
    let lower = text.to_lowercase();
    match SAFETY_TERMS.iter().find(|term| lower.contains(*term)) {
        Some(term) => Err(Error::Safety {
            term: (*term).to_string(),
        }),
        None => Ok(()),
    }
}
