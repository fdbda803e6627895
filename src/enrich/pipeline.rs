//! Batch enrichment over the personal and reference stores

use crate::config::Config;
use crate::crawler::CheckpointHook;
use crate::enrich::classifier::EnrichmentClassifier;
use crate::model::{EnrichedRecord, Orientation};
use crate::storage::{save_results, AnnotationSource, GenotypeSource, PersonalStore, ReferenceStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Counts gathered during one enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Personal calls considered
    pub total_calls: usize,
    pub enriched: usize,
    /// Calls with no reference record
    pub missing_reference: usize,
    /// Calls skipped because no genotype was called
    pub no_calls: usize,
    pub legacy_records: usize,
    pub unknown_orientation: usize,
}

/// Drives the classifier across the full personal variant set
#[derive(Debug, Clone, Default)]
pub struct EnrichmentPipeline {
    classifier: EnrichmentClassifier,
}

impl EnrichmentPipeline {
    pub fn new(classifier: EnrichmentClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(EnrichmentClassifier::new(&config.classifier))
    }

    pub fn classifier(&self) -> &EnrichmentClassifier {
        &self.classifier
    }

    /// Enriches every call that has a reference record
    ///
    /// Records come out in the personal source's order.
    pub fn run<G, A>(&self, personal: &G, reference: &A) -> (Vec<EnrichedRecord>, EnrichmentReport)
    where
        G: GenotypeSource + ?Sized,
        A: AnnotationSource + ?Sized,
    {
        let mut report = EnrichmentReport::default();
        let mut records = Vec::new();
        let total = personal.call_count();

        for call in personal.calls() {
            report.total_calls += 1;

            let Some(annotation) = reference.annotation(&call.rsid) else {
                report.missing_reference += 1;
                tracing::trace!("No reference data for {}", call.rsid);
                continue;
            };

            let Some(enriched) = self.classifier.classify(&call, annotation) else {
                report.no_calls += 1;
                continue;
            };

            match annotation.orientation {
                Orientation::Legacy => {
                    if report.legacy_records == 0 {
                        tracing::warn!(
                            "Old data detected ({}): variations will not be flip-corrected for records stored without orientation",
                            call.rsid
                        );
                    }
                    report.legacy_records += 1;
                }
                Orientation::Unknown => {
                    if report.unknown_orientation == 0 {
                        tracing::warn!(
                            "No orientation found for {}: bolding may be wrong for records without orientation",
                            call.rsid
                        );
                    }
                    report.unknown_orientation += 1;
                }
                Orientation::Plus | Orientation::Minus => {}
            }

            records.push(enriched);
            report.enriched += 1;

            if report.total_calls % 100 == 0 {
                tracing::debug!("Enrichment progress: {}/{}", report.total_calls, total);
            }
        }

        tracing::info!(
            "Enriched {} of {} calls ({} without reference data, {} no-calls)",
            report.enriched,
            report.total_calls,
            report.missing_reference,
            report.no_calls
        );
        if report.legacy_records > 0 || report.unknown_orientation > 0 {
            tracing::warn!(
                "{} records in old format, {} without orientation",
                report.legacy_records,
                report.unknown_orientation
            );
        }

        (records, report)
    }

    /// Runs the enrichment and replaces the dataset file with the result
    pub fn run_and_save<G, A>(
        &self,
        personal: &G,
        reference: &A,
        path: &Path,
    ) -> crate::Result<(Vec<EnrichedRecord>, EnrichmentReport)>
    where
        G: GenotypeSource + ?Sized,
        A: AnnotationSource + ?Sized,
    {
        let (records, report) = self.run(personal, reference);
        save_results(path, &records)?;
        tracing::info!("Saved {} enriched records to {}", records.len(), path.display());
        Ok((records, report))
    }
}

/// Rebuilds the dataset file whenever the crawler checkpoints
///
/// Lets the dataset grow while a long crawl is still running. A failed rebuild is
/// logged and the crawl carries on; the next checkpoint tries again.
pub struct DatasetRefresh {
    pipeline: EnrichmentPipeline,
    personal: Arc<PersonalStore>,
    path: PathBuf,
}

impl DatasetRefresh {
    pub fn new(pipeline: EnrichmentPipeline, personal: Arc<PersonalStore>, path: PathBuf) -> Self {
        Self {
            pipeline,
            personal,
            path,
        }
    }

    pub fn from_config(config: &Config, personal: Arc<PersonalStore>) -> Self {
        Self::new(
            EnrichmentPipeline::from_config(config),
            personal,
            config.data.results_path(),
        )
    }
}

impl CheckpointHook for DatasetRefresh {
    fn after_checkpoint(&self, store: &ReferenceStore) {
        if let Err(e) = self.pipeline.run_and_save(self.personal.as_ref(), store, &self.path) {
            tracing::error!("Could not refresh {}: {}", self.path.display(), e);
        }
    }
}
