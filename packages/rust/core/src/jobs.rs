//! CSV-driven jobs: one presentation per student, one report per company.

use tracing::{info, instrument};

use deckgen_prompts::{NAME_COLUMN, sales_prompt, student_prompt};
use deckgen_shared::{GenerationRequest, JobSettings, Result, ServiceConfig};
use deckgen_sources::{SALES_REQUIRED_COLUMNS, read_table, summarize_sales};

use crate::download::ArtifactNaming;
use crate::pipeline::{BatchItem, BatchProgress, BatchRunner, BatchSummary};

/// Request for `prompt` with the job's slide count, language, theme, and format.
pub(crate) fn request_for(job: &JobSettings, prompt: String) -> GenerationRequest {
    GenerationRequest {
        prompt,
        n_slides: job.n_slides,
        language: job.language.clone(),
        theme: job.theme,
        export_as: job.export_as,
    }
}

/// Generate one presentation per row of the student CSV.
///
/// A missing file or a missing `Name` column stops the job before any request
/// is sent. Per-student failures are recorded in the summary.
#[instrument(skip_all, fields(input = %job.input.display(), output_dir = %job.output_dir.display()))]
pub async fn run_student_presentations(
    job: &JobSettings,
    service: &ServiceConfig,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary> {
    progress.phase("Reading student records");
    let table = read_table(&job.input)?;
    table.require_columns(&[NAME_COLUMN])?;
    let runner = BatchRunner::new(service, &job.output_dir)?;

    let items = table
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let name = match record.text(NAME_COLUMN) {
                "" => format!("row {}", i + 1),
                name => name.to_string(),
            };
            let request = request_for(job, student_prompt(record, job.n_slides));
            BatchItem::new(
                name.clone(),
                request,
                ArtifactNaming::ResultFileName {
                    fallback_stem: name,
                },
            )
        })
        .collect::<Result<Vec<_>>>()?;

    info!(students = items.len(), "student records loaded");
    Ok(runner.run(items, progress).await)
}

/// Generate one sales report per company in the sales CSV.
#[instrument(skip_all, fields(input = %job.input.display(), output_dir = %job.output_dir.display()))]
pub async fn run_sales_reports(
    job: &JobSettings,
    service: &ServiceConfig,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary> {
    progress.phase("Reading sales data");
    let table = read_table(&job.input)?;
    table.require_columns(&SALES_REQUIRED_COLUMNS)?;

    progress.phase("Summarizing sales");
    let summaries = summarize_sales(&table.records)?;
    let runner = BatchRunner::new(service, &job.output_dir)?;

    let items = summaries
        .iter()
        .map(|summary| {
            BatchItem::new(
                summary.company.clone(),
                request_for(job, sales_prompt(summary)),
                ArtifactNaming::Stem(format!("{}_Sales_Report", summary.company)),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        rows = table.records.len(),
        companies = items.len(),
        "sales data summarized"
    );
    Ok(runner.run(items, progress).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GENERATE_PATH;
    use crate::pipeline::SilentProgress;
    use deckgen_shared::{DeckgenError, SalesConfig, StudentsConfig};
    use std::path::{Path, PathBuf};
    use uuid::Uuid;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn workdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dg-jobs-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn service(server: &MockServer) -> ServiceConfig {
        ServiceConfig {
            base_url: server.uri(),
            ..Default::default()
        }
    }

    fn students_job(dir: &Path, csv: &str) -> JobSettings {
        let input = dir.join("students.csv");
        std::fs::write(&input, csv).unwrap();
        JobSettings {
            input,
            output_dir: dir.join("presentations"),
            ..JobSettings::from(&StudentsConfig::default())
        }
    }

    fn sales_job(dir: &Path, csv: &str) -> JobSettings {
        let input = dir.join("sales_data.csv");
        std::fs::write(&input, csv).unwrap();
        JobSettings {
            input,
            output_dir: dir.join("reports"),
            ..JobSettings::from(&SalesConfig::default())
        }
    }

    async fn mount_download(server: &MockServer, file: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/app_data/exports/{file}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(file.as_bytes().to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn one_presentation_per_student() {
        let server = MockServer::start().await;
        for name in ["Alice", "Bob"] {
            Mock::given(method("POST"))
                .and(path(GENERATE_PATH))
                .and(body_string_contains("n_slides=8"))
                .and(body_string_contains(format!("Student+Name%3A+{name}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "path": format!("/app_data/exports/{name}_Progress.pdf"),
                    "edit_path": "/presentation?id=1",
                    "presentation_id": "1",
                })))
                .expect(1)
                .mount(&server)
                .await;
            mount_download(&server, &format!("{name}_Progress.pdf")).await;
        }

        let dir = workdir();
        let job = students_job(
            &dir,
            "Name,Final Grade,Comment\nAlice,A,Great work\nBob,B+,Keeps trying\n",
        );
        let summary = run_student_presentations(&job, &service(&server), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.saved(), 2);
        assert!(job.output_dir.join("Alice_Progress.pdf").exists());
        assert!(job.output_dir.join("Bob_Progress.pdf").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_name_column_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = workdir();
        let job = students_job(&dir, "Student,Final Grade\nAlice,A\n");
        let err = run_student_presentations(&job, &service(&server), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DeckgenError::Validation { .. }));
        assert!(err.to_string().contains("Name"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_input_file_is_fatal() {
        let server = MockServer::start().await;
        let dir = workdir();
        let job = JobSettings {
            input: dir.join("nope.csv"),
            output_dir: dir.join("out"),
            ..JobSettings::from(&StudentsConfig::default())
        };
        let err = run_student_presentations(&job, &service(&server), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DeckgenError::Io { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn one_report_per_company() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("n_slides=5"))
            .and(body_string_contains("theme=light_red"))
            .and(body_string_contains("Sales+Report+for+Acme"))
            .and(body_string_contains("%7C+East+%7C+%242%2C500+%7C"))
            .and(body_string_contains("%7C+West+%7C+%242%2C000+%7C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "path": "/app_data/exports/acme.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("Sales+Report+for+Beta"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "path": "/app_data/exports/beta.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_download(&server, "acme.pdf").await;
        mount_download(&server, "beta.pdf").await;

        let dir = workdir();
        let job = sales_job(
            &dir,
            "Company,Region,Total Sales\n\
             Beta,North,100\n\
             Acme,East,1000\n\
             Acme,West,2000\n\
             Acme,East,1500\n",
        );
        let summary = run_sales_reports(&job, &service(&server), &SilentProgress)
            .await
            .unwrap();

        let companies: Vec<_> = summary.outcomes.iter().map(|o| o.identity.as_str()).collect();
        assert_eq!(companies, ["Acme", "Beta"]);
        assert_eq!(summary.saved(), 2);
        assert!(job.output_dir.join("Acme_Sales_Report.pdf").exists());
        assert!(job.output_dir.join("Beta_Sales_Report.pdf").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn colliding_company_names_keep_both_reports() {
        let server = MockServer::start().await;
        for (needle, file) in [("Sales+Report+for+A%2FB", "slash.pdf"), ("Sales+Report+for+A_B", "under.pdf")] {
            Mock::given(method("POST"))
                .and(path(GENERATE_PATH))
                .and(body_string_contains(needle))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "path": format!("/app_data/exports/{file}")
                })))
                .expect(1)
                .mount(&server)
                .await;
            mount_download(&server, file).await;
        }

        let dir = workdir();
        let job = sales_job(&dir, "Company,Region,Total Sales\nA/B,East,10\nA_B,West,20\n");
        let summary = run_sales_reports(&job, &service(&server), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.saved(), 2);
        let first = job.output_dir.join("A_B_Sales_Report.pdf");
        let second = job.output_dir.join("A_B_Sales_Report_2.pdf");
        assert_eq!(summary.outcomes[0].saved_to.as_deref(), Some(first.as_path()));
        assert_eq!(summary.outcomes[1].saved_to.as_deref(), Some(second.as_path()));
        assert_eq!(std::fs::read(&first).unwrap(), b"slash.pdf");
        assert_eq!(std::fs::read(&second).unwrap(), b"under.pdf");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn sales_requires_region() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = workdir();
        let job = sales_job(&dir, "Company,Total Sales\nAcme,10\n");
        let err = run_sales_reports(&job, &service(&server), &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Region"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
