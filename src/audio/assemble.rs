use super::clips::PauseClips;
use super::segment::{referenced_pauses, split_on_pauses, PauseKind};
use crate::ai::{SpeechRequest, SpeechSynthesizer};
use crate::error::{Error, IoContext, Result};
use crate::paths::{self, OutputLayout};
use crate::podcast::sections::STANDARD_SECTION_IDS;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// What was concatenated, in order, to produce `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    pub output: PathBuf,
    pub parts: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    Sections,
    WholeScript,
}

#[derive(Debug, Clone)]
pub struct EpisodeAudio {
    pub output: PathBuf,
    pub mode: AudioMode,
    pub sections: Vec<(String, AssemblyReport)>,
}

pub struct AudioAssembler<'a> {
    pub synthesizer: &'a dyn SpeechSynthesizer,
    pub model: &'a str,
    pub voice: &'a str,
    pub clips: &'a PauseClips,
}

impl AudioAssembler<'_> {
    /// Synthesizes `text` to `out`, splicing in pause clips where markers appear.
    pub fn synthesize_with_pauses(&self, text: &str, out: &Path) -> Result<AssemblyReport> {
        let segments = split_on_pauses(text);
        self.clips.ensure_present(&referenced_pauses(&segments))?;

        let mut list = Vec::new();
        let mut generated = Vec::new();
        for segment in &segments {
            let spoken = segment.text.trim();
            if !spoken.is_empty() {
                let part = part_path(out, generated.len() + 1);
                let audio = self.synthesizer.synthesize(&SpeechRequest {
                    model: self.model,
                    voice: self.voice,
                    text: spoken,
                })?;
                paths::write_atomic(&part, &audio)?;
                tracing::debug!(
                    provider = self.synthesizer.name(),
                    part = %part.display(),
                    bytes = audio.len(),
                    "segment synthesized"
                );
                generated.push(part.clone());
                list.push(part);
            }
            if let Some(clip) = self.clips.path_for(segment.pause) {
                list.push(clip.to_path_buf());
            }
        }

        if list.is_empty() {
            return Err(Error::Validation(format!(
                "no speakable text for {}",
                out.display()
            )));
        }

        concat_files(&list, out)?;
        remove_parts(&generated);
        tracing::info!(output = %out.display(), parts = list.len(), "audio assembled");
        Ok(AssemblyReport {
            output: out.to_path_buf(),
            parts: list,
        })
    }

    /// Builds `episode.mp3` for `layout`.
    ///
    /// When every per-section script exists, each section gets its own
    /// `episode.<id>.mp3` and those are joined in canonical order. Otherwise
    /// the whole `episode.md` is narrated in one pass.
    pub fn render_episode(&self, layout: &OutputLayout, overwrite: bool) -> Result<EpisodeAudio> {
        let output = layout.episode_audio();
        let section_scripts: Vec<(&str, PathBuf)> = STANDARD_SECTION_IDS
            .iter()
            .map(|id| (*id, layout.section_markdown(id)))
            .collect();

        if section_scripts.iter().all(|(_, path)| path.is_file()) {
            self.render_sections(layout, &section_scripts, overwrite)
        } else {
            let script_path = layout.episode_markdown();
            if !script_path.is_file() {
                return Err(Error::Validation(format!(
                    "missing script {}; run `script` first",
                    script_path.display()
                )));
            }
            paths::check_overwrite(&[&output], overwrite)?;
            let markdown = fs::read_to_string(&script_path)
                .io_context(|| format!("read {}", script_path.display()))?;
            tracing::info!(script = %script_path.display(), "narrating whole script");
            self.synthesize_with_pauses(&spoken_text(&markdown), &output)?;
            Ok(EpisodeAudio {
                output,
                mode: AudioMode::WholeScript,
                sections: Vec::new(),
            })
        }
    }

    fn render_sections(
        &self,
        layout: &OutputLayout,
        section_scripts: &[(&str, PathBuf)],
        overwrite: bool,
    ) -> Result<EpisodeAudio> {
        let output = layout.episode_audio();
        let mut targets = vec![output.clone()];
        targets.extend(section_scripts.iter().map(|(id, _)| layout.section_audio(id)));
        paths::check_overwrite(&targets, overwrite)?;

        let mut texts = Vec::with_capacity(section_scripts.len());
        for (id, path) in section_scripts {
            let text = fs::read_to_string(path).io_context(|| format!("read {}", path.display()))?;
            texts.push((*id, text));
        }

        let mut kinds: Vec<PauseKind> = Vec::new();
        for (_, text) in &texts {
            for kind in referenced_pauses(&split_on_pauses(text)) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        self.clips.ensure_present(&kinds)?;

        let mut reports = Vec::with_capacity(texts.len());
        for (id, text) in &texts {
            tracing::info!(section = %id, "narrating section");
            let report = self.synthesize_with_pauses(text, &layout.section_audio(id))?;
            reports.push((id.to_string(), report));
        }

        let section_audio: Vec<PathBuf> = reports.iter().map(|(_, r)| r.output.clone()).collect();
        concat_files(&section_audio, &output)?;
        tracing::info!(output = %output.display(), sections = reports.len(), "episode audio written");
        Ok(EpisodeAudio {
            output,
            mode: AudioMode::Sections,
            sections: reports,
        })
    }
}

/// `<out>.part.NN.mp3`, numbered from 1.
pub fn part_path(out: &Path, index: usize) -> PathBuf {
    let mut name = out
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".part.{index:02}.mp3"));
    out.with_file_name(name)
}

/// Byte-for-byte concatenation of `inputs` into `out`, replaced atomically.
pub fn concat_files(inputs: &[PathBuf], out: &Path) -> Result<()> {
    let dir = out
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).io_context(|| format!("create dir {}", dir.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .io_context(|| format!("create temp file in {}", dir.display()))?;
    for input in inputs {
        let mut file = File::open(input).io_context(|| format!("open {}", input.display()))?;
        io::copy(&mut file, temp.as_file_mut())
            .io_context(|| format!("append {}", input.display()))?;
    }
    temp.persist(out)
        .map_err(|err| Error::io(format!("persist {}", out.display()), err.error))?;
    Ok(())
}

fn remove_parts(parts: &[PathBuf]) {
    for part in parts {
        if let Err(err) = fs::remove_file(part) {
            tracing::warn!(part = %part.display(), error = %err, "failed to remove temporary part");
        }
    }
}

/// Drops Markdown heading markers so they are not read aloud.
pub fn spoken_text(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| line.trim_start_matches('#').trim_start())
        .collect::<Vec<_>>()
        .join("\n")
}
