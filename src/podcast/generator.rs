use super::sections::{build_continuity_anchor, build_section_prompt, EpisodeSection, SectionSpec};
use crate::ai::{TextGenerator, TextRequest, TokenUsage};
use crate::error::Result;

/// Unmodified model output per section, kept for postmortems.
#[derive(Debug, Clone, Default)]
pub struct RawTranscript {
    entries: Vec<(String, String)>,
}

impl RawTranscript {
    pub fn push(&mut self, label: impl Into<String>, raw: impl Into<String>) {
        self.entries.push((label.into(), raw.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (label, raw) in &self.entries {
            out.push_str(&format!("<!-- {label} -->\n"));
            out.push_str(raw);
            if !raw.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneratedSections {
    pub sections: Vec<EpisodeSection>,
    pub usage: TokenUsage,
}

/// Drafts sections one at a time; each prompt carries the anchor of the section before it.
pub struct SectionGenerator<'a> {
    pub generator: &'a dyn TextGenerator,
    pub model: &'a str,
    pub system: &'a str,
    pub base_prompt: &'a str,
}

impl SectionGenerator<'_> {
    pub fn generate(&self, specs: &[SectionSpec], raw: &mut RawTranscript) -> Result<GeneratedSections> {
        let mut out = GeneratedSections::default();
        let mut anchor: Option<String> = None;

        for spec in specs {
            let mut spec = spec.clone();
            if let Some(anchor) = anchor.take() {
                spec.continuity_context = anchor;
            }
            let prompt = build_section_prompt(self.base_prompt, &spec);
            tracing::info!(section = %spec.section_id, "generating section");

            let generation = self
                .generator
                .generate(&TextRequest {
                    model: self.model,
                    system: Some(self.system),
                    prompt: &prompt,
                })
                .map_err(|err| err.at_stage(format!("section {}", spec.section_id)))?;
            raw.push(format!("section {}", spec.section_id), generation.text.as_str());
            out.usage += generation.usage;

            let text = generation.text.trim().to_string();
            tracing::debug!(section = %spec.section_id, words = text.split_whitespace().count(), "section generated");
            anchor = Some(build_continuity_anchor(&text, &spec.section_id));
            out.sections.push(EpisodeSection::new(spec.section_id, text));
        }

        Ok(out)
    }
}
