use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use heic_core::{update, AppState, IntakeRules, Msg, Notice, SourceFile, StatusKind};
use heic_engine::{EngineConfig, EngineHandle, QueueSettings, HEIF_SUPPORT};
use queue_logging::{queue_debug, queue_info, queue_warn};

use super::cli::Args;
use super::effects::{map_event, EffectRunner};
use super::{logging, render};

const EVENT_POLL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log, queue_logging::default_level());

    let rules = intake_rules(&args.extensions);
    if !HEIF_SUPPORT {
        queue_warn!("Built without the `heif` feature; HEIC inputs will fail to decode");
    }
    let files = args
        .inputs
        .iter()
        .map(|path| read_source(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut config = EngineConfig::default_with_output(args.out.clone());
    config.settings = QueueSettings {
        settle_delay: Duration::from_millis(args.settle_ms),
        ..QueueSettings::default()
    };
    let engine = EngineHandle::new(config).context("starting conversion engine")?;
    let mut session = Session::new(AppState::with_rules(rules), EffectRunner::new(engine));

    session.dispatch(Msg::FilesSelected(files));
    if let Some(Notice::NoValidFiles) = session.state.notice() {
        bail!(render::notice_text(&Notice::NoValidFiles));
    }
    session.pump_until(AppState::is_idle)?;

    let view = session.state.view();
    if args.zip && view.archive_offered {
        session.dispatch(Msg::DownloadAllClicked);
        session.pump_until(|state| !state.is_packaging())?;
    } else {
        for row in view.items.iter().filter(|row| row.status == StatusKind::Completed) {
            session.dispatch(Msg::DownloadClicked(row.item_id));
        }
    }
    session.print();

    let failed = view
        .items
        .iter()
        .filter(|row| row.status == StatusKind::Error)
        .count();
    let packaging_error = match session.state.notice() {
        Some(notice @ Notice::PackagingFailed(_)) => Some(render::notice_text(notice)),
        _ => None,
    };
    session.dispatch(Msg::Shutdown);

    if let Some(message) = packaging_error {
        bail!(message);
    }
    if failed > 0 {
        bail!("{failed} of {} files failed to convert", view.item_count);
    }
    queue_info!("Wrote results to {:?}", args.out);
    Ok(())
}

/// Owns the state and the effect runner; every message goes through `update`.
struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self { state, runner }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            queue_debug!("{}", render::render(&state.view()).join("\n"));
        }
        self.state = state;
        self.runner.run(effects);
    }

    fn pump_until(&mut self, done: impl Fn(&AppState) -> bool) -> anyhow::Result<()> {
        while !done(&self.state) {
            if let Some(event) = self.runner.engine().recv_timeout(EVENT_POLL)? {
                self.dispatch(map_event(event));
            }
        }
        Ok(())
    }

    fn print(&self) {
        for line in render::render(&self.state.view()) {
            println!("{line}");
        }
    }
}

fn intake_rules(extensions: &[String]) -> IntakeRules {
    if extensions.is_empty() {
        return IntakeRules::default();
    }
    IntakeRules {
        extensions: extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect(),
        ..IntakeRules::default()
    }
}

fn read_source(path: &Path) -> anyhow::Result<SourceFile> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFile::new(name, bytes))
}
