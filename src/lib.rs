pub mod ai;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
pub mod podcast;
pub mod storage;

pub use error::{Error, Result};

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use cli::{Cli, Commands, CommonArgs};
use config::{Config, Overrides};
use paths::OutputLayout;
use podcast::history::{FileHistoryStore, HistoryStore, NullHistoryStore, ObjectHistoryStore};
use storage::{DirectoryStore, ObjectStore, S3Store};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    setup_tracing(cli.verbose, cli.log_level.as_deref());

    match cli.command {
        Commands::Topic(args) => topic(args),
        Commands::Script(args) => script(args),
        Commands::Audio(args) => audio(args),
        Commands::Publish(args) => publish(args),
        Commands::All(args) => all(args),
        Commands::Config(args) => config_cmd(args),
    }
}

fn setup_tracing(verbose: bool, log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => level,
        None if verbose => "debug",
        None => "info",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(common: &CommonArgs, overrides: Overrides) -> anyhow::Result<Config> {
    let mut config = Config::load(common.config.as_deref()).context("load config")?;
    config.apply_overrides(overrides);
    Ok(config)
}

fn episode_date(common: &CommonArgs) -> NaiveDate {
    common.date.unwrap_or_else(|| Local::now().date_naive())
}

/// The configured history location: explicit file first, then the object store.
fn history_store<'a>(
    config: &Config,
    store: Option<&'a dyn ObjectStore>,
) -> Box<dyn HistoryStore + 'a> {
    match (&config.history.path, store) {
        (Some(path), _) => Box::new(FileHistoryStore::new(path)),
        (None, Some(store)) => Box::new(ObjectHistoryStore::new(store)),
        (None, None) => Box::new(NullHistoryStore),
    }
}

/// The S3 bucket when one is configured, else the local storage root.
fn object_store(config: &Config) -> anyhow::Result<Option<Box<dyn ObjectStore>>> {
    let storage = &config.storage;
    if let Some(bucket) = &storage.bucket {
        let store = S3Store::connect(bucket, &storage.prefix, storage.region.as_deref())
            .context("connect to s3")?;
        return Ok(Some(Box::new(store)));
    }
    Ok(storage
        .root
        .as_ref()
        .map(|root| Box::new(DirectoryStore::new(root, &storage.prefix)) as Box<dyn ObjectStore>))
}

fn topic(args: cli::TopicArgs) -> anyhow::Result<()> {
    let config = load_config(
        &args.common,
        Overrides {
            topic: args.topic,
            ..Overrides::default()
        },
    )?;
    config.validate()?;

    let store = object_store(&config)?;
    let history = history_store(&config, store.as_deref())
        .load()
        .context("load topic history")?;

    let choice = if config.configured_topic().is_some() {
        podcast::select_topic(&config, None, &history)?
    } else {
        config.validate_for_script()?;
        let client = ai::text_client(&config)?;
        podcast::select_topic(&config, Some(&client as &dyn ai::TextGenerator), &history)?
    };

    println!("{}", choice.topic);
    Ok(())
}

fn script(args: cli::ScriptArgs) -> anyhow::Result<()> {
    let config = load_config(
        &args.common,
        Overrides {
            topic: args.topic,
            overwrite: args.overwrite.then_some(true),
            ..Overrides::default()
        },
    )?;
    run_script(&config, episode_date(&args.common))
}

fn run_script(config: &Config, date: NaiveDate) -> anyhow::Result<()> {
    config.validate_for_script()?;

    let games = podcast::load_game_rules(&config.games_dir).context("load game rules")?;
    let client = ai::text_client(config)?;
    let store = object_store(config)?;
    let history = history_store(config, store.as_deref());
    let layout = OutputLayout::new(&config.out_dir, date);

    let report = podcast::ScriptJob {
        config,
        layout: &layout,
        games: &games,
        generator: &client,
        history: history.as_ref(),
        now: Utc::now(),
    }
    .run()
    .context("generate script")?;

    println!("Topic: {}", report.topic);
    println!("Words: {}", report.word_count);
    for path in &report.written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn audio(args: cli::AudioArgs) -> anyhow::Result<()> {
    let config = load_config(
        &args.common,
        Overrides {
            voice: args.voice,
            tts_provider: args.provider,
            overwrite: args.overwrite.then_some(true),
            ..Overrides::default()
        },
    )?;
    run_audio(&config, episode_date(&args.common))
}

fn run_audio(config: &Config, date: NaiveDate) -> anyhow::Result<()> {
    config.validate_for_audio()?;

    let backend = ai::SpeechBackend::from_config(config)?;
    let clips = audio::PauseClips::resolve(&config.assets_dir);
    let layout = OutputLayout::new(&config.out_dir, date);

    let assembler = audio::AudioAssembler {
        synthesizer: &backend,
        model: config.tts_model(),
        voice: config.tts_voice(),
        clips: &clips,
    };
    let episode = assembler
        .render_episode(&layout, config.overwrite)
        .context("render episode audio")?;

    println!("Wrote {}", episode.output.display());
    Ok(())
}

fn publish(args: cli::PublishArgs) -> anyhow::Result<()> {
    let config = load_config(&args.common, Overrides::default())?;
    run_publish(&config, episode_date(&args.common), args.include_script)
}

fn run_publish(config: &Config, date: NaiveDate, include_script: bool) -> anyhow::Result<()> {
    config.validate_for_publish()?;
    let store = object_store(config)?.context("no storage configured")?;
    let layout = OutputLayout::new(&config.out_dir, date);

    let published =
        storage::publish_episode(&*store, &layout, include_script).context("publish episode")?;
    for object in published {
        println!("Published {} (latest: {})", object.key, object.latest_key);
    }
    Ok(())
}

fn all(args: cli::AllArgs) -> anyhow::Result<()> {
    let config = load_config(
        &args.common,
        Overrides {
            topic: args.topic,
            voice: args.voice,
            tts_provider: args.provider,
            overwrite: args.overwrite.then_some(true),
        },
    )?;
    let date = episode_date(&args.common);

    run_script(&config, date)?;
    run_audio(&config, date)?;
    if config.publish_configured() {
        run_publish(&config, date, args.include_script)?;
    } else {
        tracing::info!("storage not configured; skipping publish");
    }
    Ok(())
}

fn config_cmd(args: cli::ConfigArgs) -> anyhow::Result<()> {
    if args.init {
        let path = Config::init_default()?;
        println!("Initialized config at {}", path.display());
        return Ok(());
    }

    if args.show {
        let config = Config::load(args.config.as_deref())?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.validate {
        let config = Config::load(args.config.as_deref())?;
        config.validate()?;
        println!("Config OK");
        return Ok(());
    }

    let path = Config::default_path()?;
    println!("{}", path.display());
    Ok(())
}
