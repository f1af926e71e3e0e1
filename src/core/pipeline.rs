use crate::core::{ConfigProvider, PageSource, Pipeline, Storage};
use crate::domain::model::{Extraction, RunReport, TargetStationSet, TransformResult, YearbookTiming};
use crate::extract::assembler::{year_from_file_name, RecordAssembler, StationPageParser, YearbookExtraction};
use crate::extract::csv_codec::to_csv_string;
use crate::transform::post_process;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A yearbook file selected for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Yearbook {
    pub year: i32,
    pub path: PathBuf,
}

impl Yearbook {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// `dsi_<year>.pdf` / `dsi_<year>.txt` files directly under `dir`, one per
/// year, PDF preferred over text.
pub fn discover_yearbooks(dir: &Path) -> Result<Vec<Yearbook>> {
    if !dir.is_dir() {
        return Err(EtlError::InputNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut by_year: BTreeMap<i32, PathBuf> = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !name.to_ascii_lowercase().starts_with("dsi_")
            || !matches!(extension.as_deref(), Some("pdf") | Some("txt"))
        {
            continue;
        }
        let Ok(year) = year_from_file_name(name) else {
            tracing::debug!("Ignoring {}: no year in file name", name);
            continue;
        };

        let is_pdf = extension.as_deref() == Some("pdf");
        match by_year.get(&year) {
            Some(existing) if !is_pdf || existing.extension().is_some_and(|e| e == "pdf") => {}
            _ => {
                by_year.insert(year, path);
            }
        }
    }

    Ok(by_year
        .into_iter()
        .map(|(year, path)| Yearbook { year, path })
        .collect())
}

/// Extracts station records from DSİ yearbooks, post-processes them and
/// writes the CSV plus a JSON run report.
pub struct DsiPipeline<S: Storage, C: ConfigProvider, P: PageSource> {
    storage: S,
    config: C,
    source: Arc<P>,
    parser: Arc<StationPageParser>,
    targets: Arc<TargetStationSet>,
}

impl<S: Storage, C: ConfigProvider, P: PageSource + 'static> DsiPipeline<S, C, P> {
    pub fn new(storage: S, config: C, source: P) -> Result<Self> {
        let targets = if config.target_stations().is_empty() {
            TargetStationSet::default()
        } else {
            TargetStationSet::from_codes(config.target_stations())?
        };
        let parser = StationPageParser::new(config.header_window())?;

        Ok(Self {
            storage,
            config,
            source: Arc::new(source),
            parser: Arc::new(parser),
            targets: Arc::new(targets),
        })
    }

    pub fn targets(&self) -> &TargetStationSet {
        &self.targets
    }

    /// Explicit years map to the first existing candidate file; otherwise the
    /// input directory is scanned.
    pub fn resolve_yearbooks(&self) -> Result<Vec<Yearbook>> {
        let years = self.config.years();
        if years.is_empty() {
            let found = discover_yearbooks(self.config.input_dir())?;
            if found.is_empty() {
                return Err(EtlError::InputNotFound {
                    path: self.config.input_dir().join("dsi_<year>.pdf").display().to_string(),
                });
            }
            return Ok(found);
        }

        let mut yearbooks = Vec::with_capacity(years.len());
        for &year in years {
            let candidates = self.config.yearbook_candidates(year);
            match candidates.iter().find(|p| p.is_file()) {
                Some(path) => yearbooks.push(Yearbook {
                    year,
                    path: path.clone(),
                }),
                None => {
                    let path = candidates
                        .first()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| format!("dsi_{}.pdf", year));
                    return Err(EtlError::InputNotFound { path });
                }
            }
        }
        yearbooks.sort_by_key(|y| y.year);
        yearbooks.dedup_by_key(|y| y.year);
        Ok(yearbooks)
    }

    fn csv_file_name(&self) -> &str {
        self.config.output_file()
    }

    fn report_file_name(&self) -> String {
        let output = self.config.output_file();
        let stem = Path::new(output)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| output.to_string());
        format!("{}_report.json", stem)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, P: PageSource + 'static> Pipeline for DsiPipeline<S, C, P> {
    async fn extract(&self) -> Result<Extraction> {
        let yearbooks = self.resolve_yearbooks()?;
        let permits = self.config.concurrent_files().max(1);
        tracing::info!(
            "📚 {} yearbooks to scan for {} target stations ({} at a time)",
            yearbooks.len(),
            self.targets.len(),
            permits
        );

        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for yearbook in yearbooks.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let source = Arc::clone(&self.source);
            let parser = Arc::clone(&self.parser);
            let targets = Arc::clone(&self.targets);

            tasks.spawn(async move {
                let file_name = yearbook.file_name();
                let result = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let task_yearbook = yearbook.clone();
                        tokio::task::spawn_blocking(
                            move || -> Result<(YearbookExtraction, Duration)> {
                                let _permit = permit;
                                let started = Instant::now();
                                let pages = source.load_pages(&task_yearbook.path)?;
                                let extraction = parser.parse_yearbook(
                                    &pages,
                                    task_yearbook.year,
                                    &task_yearbook.file_name(),
                                    &targets,
                                );
                                Ok((extraction, started.elapsed()))
                            },
                        )
                        .await
                        .map_err(EtlError::from)
                        .and_then(|extraction| extraction)
                    }
                    Err(e) => Err(EtlError::processing(format!("file limiter closed: {}", e))),
                };
                (yearbook, file_name, result)
            });
        }

        let mut report = RunReport::default();
        let mut assembler = RecordAssembler::new();
        let mut processed_years = Vec::new();
        let mut failures: Vec<(i32, EtlError)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (yearbook, file_name, result) = joined?;
            match result {
                Ok((extraction, elapsed)) => {
                    tracing::debug!(
                        "{}: {} pages, {} records in {:?}",
                        file_name,
                        extraction.pages_scanned,
                        extraction.records.len(),
                        elapsed
                    );
                    report.yearbook_timings.insert(
                        file_name.clone(),
                        YearbookTiming {
                            pages: extraction.pages_scanned,
                            records: extraction.records.len(),
                            elapsed_ms: elapsed.as_millis() as u64,
                        },
                    );
                    report.pages_scanned += extraction.pages_scanned;
                    report.files_processed.push(file_name);
                    processed_years.push(yearbook.year);
                    for record in extraction.records {
                        assembler.push(record);
                    }
                }
                Err(e @ EtlError::InputNotFound { .. }) => return Err(e),
                Err(e) => {
                    tracing::error!("❌ {}: {}", file_name, e);
                    report.files_failed.insert(file_name, e.to_string());
                    failures.push((yearbook.year, e));
                }
            }
        }

        // Nothing could be read at all: surface the earliest yearbook's error
        // instead of an empty run.
        if report.files_processed.is_empty() && !failures.is_empty() {
            tracing::error!(
                "❌ All {} yearbook(s) failed to load: {}",
                failures.len(),
                report.files_failed.keys().cloned().collect::<Vec<_>>().join(", ")
            );
            failures.sort_by_key(|(year, _)| *year);
            let (_, first) = failures.remove(0);
            return Err(first);
        }
        report.files_processed.sort();
        processed_years.sort_unstable();

        for year in processed_years {
            let found = assembler.stations_for_year(year);
            report.records_per_year.insert(year, found.len());
            let missing: Vec<String> = self
                .targets
                .iter()
                .filter(|code| !found.contains(code.as_str()))
                .map(|code| code.to_string())
                .collect();
            if !missing.is_empty() {
                tracing::info!("🔎 {}: {} target stations not found", year, missing.len());
                tracing::debug!("{}: missing {}", year, missing.join(", "));
                report.missing_stations.insert(year, missing);
            }
        }
        report.duplicates_dropped = assembler.duplicates_dropped();

        let records = assembler.into_records();
        tracing::info!(
            "📊 Extracted {} station records from {} pages ({} duplicates dropped)",
            records.len(),
            report.pages_scanned,
            report.duplicates_dropped
        );
        Ok(Extraction { records, report })
    }

    async fn transform(&self, data: Extraction) -> Result<TransformResult> {
        let Extraction {
            mut records,
            mut report,
        } = data;

        if records.is_empty() {
            return Err(EtlError::NoRecords {
                message: format!(
                    "no target station pages in {} yearbook(s)",
                    report.files_processed.len()
                ),
            });
        }

        let options = self.config.post_process();
        if options.any() {
            let summary = post_process(&mut records, &options);
            report.outlier_corrections = summary.corrections;
            report.filled_per_station = summary.filled_per_station;
        }

        let csv_output = to_csv_string(&records)?;
        Ok(TransformResult {
            records,
            csv_output,
            report,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut report = result.report;
        report.generated_at = Some(chrono::Utc::now());

        tracing::debug!(
            "Writing {} records ({} bytes) to {}",
            result.records.len(),
            result.csv_output.len(),
            self.csv_file_name()
        );
        self.storage
            .write_file(self.csv_file_name(), result.csv_output.as_bytes())
            .await?;

        let report_json = serde_json::to_string_pretty(&report)?;
        self.storage
            .write_file(&self.report_file_name(), report_json.as_bytes())
            .await?;

        Ok(Path::new(self.config.output_path())
            .join(self.csv_file_name())
            .display()
            .to_string())
    }
}
