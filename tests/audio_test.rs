mod common;

use chrono::NaiveDate;
use common::FakeSynthesizer;
use curious_cast::audio::assemble::{concat_files, part_path, spoken_text, AudioMode};
use curious_cast::audio::segment::referenced_pauses;
use curious_cast::audio::{split_on_pauses, AudioAssembler, PauseClips, PauseKind, PauseSegment};
use curious_cast::error::Error;
use curious_cast::paths::OutputLayout;
use std::fs;
use std::path::Path;

fn write_clips(dir: &Path) -> PauseClips {
    fs::create_dir_all(dir).unwrap();
    let clips = PauseClips::resolve(dir);
    fs::write(&clips.short, b"SHORT").unwrap();
    fs::write(&clips.long, b"LONG").unwrap();
    clips
}

fn assembler<'a>(synth: &'a FakeSynthesizer, clips: &'a PauseClips) -> AudioAssembler<'a> {
    AudioAssembler {
        synthesizer: synth,
        model: "tts-model",
        voice: "alloy",
        clips,
    }
}

#[test]
fn splits_question_and_answer() {
    let segments = split_on_pauses("Question time. [long pause] Answer!");
    assert_eq!(
        segments,
        vec![
            PauseSegment {
                text: "Question time. ".into(),
                pause: PauseKind::Long
            },
            PauseSegment {
                text: " Answer!".into(),
                pause: PauseKind::None
            },
        ]
    );
}

#[test]
fn segments_round_trip_without_markers() {
    let text = "Ready? [short pause] Go! [long pause][short pause] Done. [long pause]";
    let segments = split_on_pauses(text);
    let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(joined, "Ready?  Go!  Done. ");
    assert_eq!(segments.last().unwrap().pause, PauseKind::Long);
    assert_eq!(segments.len(), 4);
    assert_eq!(
        referenced_pauses(&segments),
        vec![PauseKind::Short, PauseKind::Long]
    );
}

#[test]
fn text_without_markers_is_one_segment() {
    let segments = split_on_pauses("Just talking.");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].pause, PauseKind::None);
    assert!(split_on_pauses("").is_empty());
}

#[test]
fn pauses_are_spliced_between_parts() {
    let dir = tempfile::tempdir().unwrap();
    let clips = write_clips(&dir.path().join("assets"));
    let synth = FakeSynthesizer::default();
    let out = dir.path().join("out.mp3");

    let report = assembler(&synth, &clips)
        .synthesize_with_pauses("Question time. [long pause] Answer!", &out)
        .unwrap();

    assert_eq!(synth.calls(), vec!["Question time.", "Answer!"]);
    assert_eq!(
        report.parts,
        vec![part_path(&out, 1), clips.long.clone(), part_path(&out, 2)]
    );
    assert_eq!(fs::read(&out).unwrap(), b"<Question time.>LONG<Answer!>");
    assert!(!part_path(&out, 1).exists());
    assert!(!part_path(&out, 2).exists());
    assert!(clips.long.exists());
}

#[test]
fn missing_clip_fails_before_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let clips = PauseClips::resolve(&dir.path().join("nowhere"));
    let synth = FakeSynthesizer::default();
    let out = dir.path().join("out.mp3");

    let err = assembler(&synth, &clips)
        .synthesize_with_pauses("Guess! [short pause] Yes.", &out)
        .unwrap_err();

    assert!(matches!(err, Error::AssetMissing { ref path } if path == &clips.short));
    assert!(synth.calls().is_empty());
    assert!(!out.exists());
}

#[test]
fn unreferenced_clips_are_not_required() {
    let dir = tempfile::tempdir().unwrap();
    let clips = PauseClips::resolve(&dir.path().join("nowhere"));
    let synth = FakeSynthesizer::default();
    let out = dir.path().join("out.mp3");

    assembler(&synth, &clips)
        .synthesize_with_pauses("No pauses here.", &out)
        .unwrap();
    assert_eq!(fs::read(&out).unwrap(), b"<No pauses here.>");
}

#[test]
fn synthesis_failure_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let clips = write_clips(&dir.path().join("assets"));
    let synth = FakeSynthesizer::failing();
    let out = dir.path().join("out.mp3");

    let err = assembler(&synth, &clips)
        .synthesize_with_pauses("Hello there.", &out)
        .unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
    assert!(!out.exists());
}

#[test]
fn concat_is_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    fs::write(&a, [0u8, 1, 2]).unwrap();
    fs::write(&b, [255u8, 254]).unwrap();
    let out = dir.path().join("nested").join("out.bin");

    concat_files(&[a, b], &out).unwrap();
    assert_eq!(fs::read(&out).unwrap(), vec![0u8, 1, 2, 255, 254]);
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
}

#[test]
fn episode_uses_section_files_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let clips = write_clips(&dir.path().join("assets"));
    let layout = OutputLayout::new(dir.path().join("out"), date());
    layout.ensure_out_dir().unwrap();
    for (id, text) in [
        ("intro", "Hi."),
        ("topic", "Facts."),
        ("game", "Guess? [long pause] Yes."),
        ("outro", "Bye."),
    ] {
        fs::write(layout.section_markdown(id), format!("{text}\n")).unwrap();
    }
    let synth = FakeSynthesizer::default();

    let episode = assembler(&synth, &clips).render_episode(&layout, false).unwrap();

    assert_eq!(episode.mode, AudioMode::Sections);
    assert_eq!(episode.sections.len(), 4);
    assert_eq!(
        fs::read(layout.episode_audio()).unwrap(),
        b"<Hi.><Facts.><Guess?>LONG<Yes.><Bye.>"
    );
    assert_eq!(fs::read(layout.section_audio("game")).unwrap(), b"<Guess?>LONG<Yes.>");
}

#[test]
fn episode_falls_back_to_whole_script() {
    let dir = tempfile::tempdir().unwrap();
    let clips = write_clips(&dir.path().join("assets"));
    let layout = OutputLayout::new(dir.path().join("out"), date());
    layout.ensure_out_dir().unwrap();
    fs::write(layout.episode_markdown(), "# Title\n\n## Intro\n\nHello.\n").unwrap();
    let synth = FakeSynthesizer::default();

    let episode = assembler(&synth, &clips).render_episode(&layout, false).unwrap();

    assert_eq!(episode.mode, AudioMode::WholeScript);
    assert_eq!(synth.calls(), vec!["Title\n\nIntro\n\nHello."]);
    assert!(layout.episode_audio().is_file());
}

#[test]
fn existing_audio_is_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let clips = write_clips(&dir.path().join("assets"));
    let layout = OutputLayout::new(dir.path().join("out"), date());
    layout.ensure_out_dir().unwrap();
    fs::write(layout.episode_markdown(), "Hello.\n").unwrap();
    fs::write(layout.episode_audio(), b"old").unwrap();
    let synth = FakeSynthesizer::default();

    let err = assembler(&synth, &clips).render_episode(&layout, false).unwrap_err();
    assert!(matches!(err, Error::OverwriteRefused { .. }));
    assert!(synth.calls().is_empty());

    assembler(&synth, &clips).render_episode(&layout, true).unwrap();
    assert_eq!(fs::read(layout.episode_audio()).unwrap(), b"<Hello.>");
}

#[test]
fn missing_script_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let clips = write_clips(&dir.path().join("assets"));
    let layout = OutputLayout::new(dir.path().join("out"), date());
    let synth = FakeSynthesizer::default();
    assert!(matches!(
        assembler(&synth, &clips).render_episode(&layout, false),
        Err(Error::Validation(_))
    ));
}

#[test]
fn headings_lose_their_hashes() {
    assert_eq!(spoken_text("# A\n## B\ntext"), "A\nB\ntext");
}
