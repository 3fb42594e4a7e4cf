use anyhow::{bail, Context, Result};
use tracing::info;

use brutyf_core::MarkovModel;

use crate::Train;

pub fn train(tr: Train) -> Result<()> {
    let mut model = MarkovModel::new(tr.order as usize);

    let count = model
        .train_from_file(&tr.wordlist, tr.limit)
        .with_context(|| format!("Unable to train on {}", tr.wordlist.display()))?;

    if model.is_empty() {
        bail!(
            "No password of {} is long enough for chains of order {}",
            tr.wordlist.display(),
            tr.order
        );
    }

    model
        .store(&tr.model)
        .with_context(|| format!("Unable to store the model to {}", tr.model.display()))?;

    info!(
        "Trained on {count} passwords: {} states, {} starting states, stored to {}",
        model.chain_count(),
        model.start_count(),
        tr.model.display()
    );

    Ok(())
}
