use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};
use tracing::info;

use brutyf_core::{
    stats::format_eta, Attack as AttackRun, AttackConfig, AttackConfigBuilder, AttackReport, Event,
};

use crate::Attack;

/// The minimum delay between two progress lines.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Renders the progress of the current target on a single line.
struct Progress {
    hash: String,
    started: Instant,
    last_render: Option<Instant>,
}

impl Progress {
    fn new() -> Self {
        Self {
            hash: String::new(),
            started: Instant::now(),
            last_render: None,
        }
    }

    fn start(&mut self, hash: String) {
        self.hash = hash;
        self.started = Instant::now();
        self.last_render = None;
    }

    fn render(&mut self, current: u64, total: Option<u64>) {
        if self
            .last_render
            .is_some_and(|last| last.elapsed() < PROGRESS_INTERVAL)
        {
            return;
        }
        self.last_render = Some(Instant::now());

        let line = match total {
            Some(total) if total != 0 => {
                let elapsed = self.started.elapsed().as_secs_f64();
                let eta = (elapsed > 0. && current != 0).then(|| {
                    let speed = current as f64 / elapsed;
                    Duration::from_secs_f64(total.saturating_sub(current) as f64 / speed)
                });

                format!(
                    "{}: {current}/{total} ({:.1}%), ETA {}",
                    self.hash,
                    current as f64 * 100. / total as f64,
                    format_eta(eta)
                )
            }
            _ => format!("{}: {current} candidates", self.hash),
        };

        eprint!("\r\x1b[2K{line}");
    }

    fn clear(&mut self) {
        if self.last_render.take().is_some() {
            eprint!("\r\x1b[2K");
        }
    }
}

/// Prints a table of the targets and their passwords.
fn summary(report: &AttackReport) {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Username", "Hash", "Type", "Password"]);

    for target in &report.targets {
        let username = Cell::new(target.username.as_deref().unwrap_or_default());
        let hash = Cell::new(&target.hash);
        let hash_type = Cell::new(target.hash_type);

        let password = target
            .password
            .as_ref()
            .map(|password| Cell::new(password).fg(Color::Green))
            .unwrap_or_else(|| Cell::new("No password found").fg(Color::Red));

        display_table.add_row(vec![username, hash, hash_type, password]);
    }

    eprintln!("{display_table}");
    eprintln!("{}", report.stats);
}

pub fn attack(atk: Attack, file_config: AttackConfig, quiet: bool) -> Result<()> {
    let mut builder = atk
        .source
        .apply(AttackConfigBuilder::from_config(file_config))
        .hash_file(atk.hash_file);

    if let Some(threads) = atk.threads {
        builder = builder.threads(threads as usize);
    }
    if let Some(hash_type) = atk.hash_type {
        builder = builder.hash_type(hash_type);
    }
    if let Some(input_format) = atk.input_format {
        builder = builder.input_format(input_format);
    }
    if atk.no_potfile {
        builder = builder.potfile(false);
    }
    if let Some(potfile) = atk.potfile {
        builder = builder.potfile_path(potfile);
    }
    if atk.resume {
        builder = builder.resume(true);
    }
    if let Some(dir) = atk.session_dir {
        builder = builder.session_dir(dir);
    }
    if let Some(format) = atk.format {
        builder = builder.output_format(format);
    }

    let config = builder.build();
    let format = config.output_format;

    let handle = AttackRun::run_nonblocking(config);
    let mut progress = Progress::new();

    while let Some(event) = handle.recv() {
        match event {
            Event::TargetStarted { hash } => progress.start(hash),
            Event::Progress { current, total } if !quiet => progress.render(current, total),
            Event::Found { .. } | Event::Exhausted { .. } => progress.clear(),
            _ => (),
        }
    }
    progress.clear();

    let report = handle.join().context("The attack failed")?;

    if !quiet {
        summary(&report);
    }

    let results = report.results();
    match &atk.output {
        Some(path) => {
            format
                .export(&results, path)
                .context("Unable to write the results")?;
            info!("Results written to {}", path.display());
        }
        None => {
            let rendered = format.render(&results)?;
            io::stdout().lock().write_all(rendered.as_bytes())?;
        }
    }

    Ok(())
}
