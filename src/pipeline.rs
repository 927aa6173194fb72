//! Drives a full `fetch` run: load the milestone, verify issue coverage and
//! write one patch file per merged pull request.
use derive_builder::Builder;
use log::*;
use std::{path::PathBuf, rc::Rc};

use crate::{
    PatchesError, Result,
    coverage::{CoverageReport, CoverageVerifier},
    forge::{
        traits::Forge,
        types::{Issue, PullRequest},
    },
    milestone::{MilestonePull, load_milestone},
    patch::{
        ledger::PatchDir,
        materializer::{MaterializeOutcome, PatchMaterializer},
        naming::NamingScheme,
    },
    provenance::{
        closure::ClosingStrategy, guard::RepositoryGuard, merge::MergeResolver,
    },
    warning::Warning,
};

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct PipelineParams {
    pub forge: Rc<dyn Forge>,
    pub guard: RepositoryGuard,
    pub output_dir: PathBuf,
    #[builder(default)]
    pub naming: NamingScheme,
    #[builder(default)]
    pub closing_strategy: ClosingStrategy,
    #[builder(default = "true")]
    pub verify: bool,
}

impl PipelineParamsBuilder {
    pub fn build(&self) -> Result<Pipeline> {
        let params = self._build().map_err(|e| {
            PatchesError::invalid_config(format!(
                "Failed to build pipeline: {}",
                e
            ))
        })?;
        Ok(Pipeline::new(params))
    }
}

/// A pull request that produced no patch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPull {
    pub pr: u64,
    /// Patch URL to retry by hand, when a download failed.
    pub url: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedPull>,
    pub warnings: Vec<Warning>,
}

pub struct Pipeline {
    forge: Rc<dyn Forge>,
    guard: RepositoryGuard,
    dir: PatchDir,
    naming: NamingScheme,
    closing_strategy: ClosingStrategy,
    verify: bool,
}

impl Pipeline {
    pub fn builder() -> PipelineParamsBuilder {
        PipelineParamsBuilder::default()
    }

    pub fn new(params: PipelineParams) -> Self {
        Self {
            forge: params.forge,
            guard: params.guard,
            dir: PatchDir::new(params.output_dir),
            naming: params.naming,
            closing_strategy: params.closing_strategy,
            verify: params.verify,
        }
    }

    pub async fn run(&self, milestone: u64) -> Result<RunSummary> {
        let forge = self.forge.as_ref();
        let contents = load_milestone(forge, milestone).await?;

        self.dir.ensure().await?;

        let mut summary = RunSummary::default();

        let report = if self.verify && !contents.issues.is_empty() {
            let report = self
                .verify_coverage(&contents.issues, &contents.pull_requests())
                .await?;
            summary.warnings.extend(report.warnings.iter().cloned());
            Some(report)
        } else {
            if !self.verify {
                info!("skipping issue coverage verification");
            }
            None
        };

        let materializer = PatchMaterializer::new(
            forge,
            &self.guard,
            self.dir.clone(),
            self.naming,
        );

        for (index, pull) in contents.pulls.iter().enumerate() {
            if let Some(path) = materializer.existing(pull, index + 1).await? {
                info!("{} already exists, skipping", path.display());
                summary.skipped.push(path);
                continue;
            }

            let shas = match self
                .landed_shas(pull, report.as_ref(), &mut summary)
                .await
            {
                Ok(shas) => shas,
                Err(PatchesError::Integrity(err)) => {
                    error!("PR #{}: {err}", pull.pr.number);
                    summary.failed.push(FailedPull {
                        pr: pull.pr.number,
                        url: None,
                        reason: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            match materializer.materialize(pull, index + 1, &shas).await {
                Ok(MaterializeOutcome::Written(path)) => {
                    summary.written.push(path)
                }
                Ok(MaterializeOutcome::Skipped(path)) => {
                    summary.skipped.push(path)
                }
                Ok(MaterializeOutcome::Failed { url, reason }) => {
                    summary.failed.push(FailedPull {
                        pr: pull.pr.number,
                        url: Some(url),
                        reason,
                    })
                }
                Err(PatchesError::Integrity(err)) => {
                    error!("PR #{}: {err}", pull.pr.number);
                    summary.failed.push(FailedPull {
                        pr: pull.pr.number,
                        url: None,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }

    async fn verify_coverage(
        &self,
        issues: &[Issue],
        pulls: &[PullRequest],
    ) -> Result<CoverageReport> {
        info!(
            "verifying that {} closed issues are covered by {} pull requests",
            issues.len(),
            pulls.len()
        );
        let verifier = CoverageVerifier::new(
            self.forge.as_ref(),
            &self.guard,
            self.closing_strategy,
        );
        verifier.verify(issues, pulls).await
    }

    /// Landed SHAs of `pull`, reusing the verification pass when it ran.
    async fn landed_shas(
        &self,
        pull: &MilestonePull,
        report: Option<&CoverageReport>,
        summary: &mut RunSummary,
    ) -> Result<Vec<String>> {
        if let Some(resolved) =
            report.and_then(|r| r.resolved_for(pull.pr.number))
        {
            return Ok(resolved.shas.clone());
        }

        let resolved = MergeResolver::new(self.forge.as_ref(), &self.guard)
            .resolve(&pull.pr)
            .await?;
        summary.warnings.extend(resolved.warnings);

        Ok(resolved.shas)
    }
}
