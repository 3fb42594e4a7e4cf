use std::io::{self, BufWriter, ErrorKind, Write};

use anyhow::Result;
use tracing::debug;

use brutyf_core::{AttackConfig, AttackConfigBuilder, CandidateSource, RuleEngine};

use crate::Candidates;

/// Writes `candidate` and its mutations.
/// Returns false when the reader went away.
fn emit(out: &mut impl Write, rules: &RuleEngine, candidate: String) -> Result<bool> {
    let variants = if rules.is_empty() {
        vec![candidate]
    } else {
        rules.apply(&candidate)
    };

    for variant in variants {
        match writeln!(out, "{variant}") {
            Ok(()) => (),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(false),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(true)
}

pub fn candidates(cand: Candidates, file_config: AttackConfig) -> Result<()> {
    let config = cand
        .source
        .apply(AttackConfigBuilder::from_config(file_config))
        .build();

    let mode = config.resolve_mode();
    let source = CandidateSource::from_config(&config, mode)?;
    let range = source.range(config.skip, config.limit);
    let rules = RuleEngine::new(&config.rules);

    debug!("Printing the {mode} candidates {range:?}");

    let mut generator = source.generator(range.start)?;
    generator.seek(range.start);

    let mut out = BufWriter::new(io::stdout().lock());

    for candidate in generator.take((range.end - range.start).try_into().unwrap_or(usize::MAX)) {
        if !emit(&mut out, &rules, candidate)? {
            return Ok(());
        }
    }

    match out.flush() {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e.into()),
        _ => Ok(()),
    }
}
