//! Fetch command implementation.
use log::*;
use std::rc::Rc;

use crate::{
    Result,
    cli::Args,
    config::Config,
    forge::traits::Forge,
    patch::naming::NamingScheme,
    pipeline::{Pipeline, RunSummary},
    provenance::{closure::ClosingStrategy, guard::RepositoryGuard},
};

pub async fn execute(
    args: &Args,
    milestone: u64,
    no_verify: bool,
    closing_strategy: ClosingStrategy,
    naming: NamingScheme,
) -> Result<()> {
    let config = Config::load(&args.config).await?;
    let remote = args.get_remote(&config)?;
    let output_dir = args.output_dir(&config);

    let forge: Rc<dyn Forge> = Rc::from(remote.get_forge()?);

    info!(
        "fetching milestone {milestone} of {} into {}",
        forge.repo_name(),
        output_dir.display()
    );

    let pipeline = Pipeline::builder()
        .forge(forge)
        .guard(RepositoryGuard::new(&remote))
        .output_dir(output_dir)
        .naming(naming)
        .closing_strategy(closing_strategy)
        .verify(!no_verify)
        .build()?;

    let summary = pipeline.run(milestone).await?;

    report(&summary);

    Ok(())
}

fn report(summary: &RunSummary) {
    for failed in summary.failed.iter() {
        match &failed.url {
            Some(url) => {
                error!(
                    "PR #{} not written: {} ({url})",
                    failed.pr, failed.reason
                )
            }
            None => error!("PR #{} not written: {}", failed.pr, failed.reason),
        }
    }

    if !summary.warnings.is_empty() {
        warn!("{} warnings need manual follow-up:", summary.warnings.len());
        for warning in summary.warnings.iter() {
            warn!("  {warning}");
        }
    }

    info!(
        "{} written, {} skipped, {} failed",
        summary.written.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
}
