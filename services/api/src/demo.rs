use crate::infra::{InMemoryAuthGateway, InMemoryWillRepository};
use chrono::{Local, NaiveDate};
use clap::Args;
use milegado::error::AppError;
use milegado::workflows::testament::auth::{SessionManager, SignUpOutcome, SignUpRequest};
use milegado::workflows::testament::composer::{self, OutputMode};
use milegado::workflows::testament::domain::{
    AssetCategory, AssetItem, Beneficiary, Relationship, WillContent,
};
use milegado::workflows::testament::format::thousands;
use milegado::workflows::testament::import::BeneficiaryCsvImporter;
use milegado::workflows::testament::inheritance::DistributionResult;
use milegado::workflows::testament::service::{WillService, WillServiceError};
use milegado::workflows::testament::validation::{ValidationErrors, WillGuard, WillSubmission};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Document date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Write the preview and printable documents into this directory.
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// JSON file holding a will submission (wizard payload).
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Output format: pdf or html.
    #[arg(long, default_value = "pdf", value_parser = parse_mode)]
    pub(crate) format: OutputMode,
    /// Destination path. Defaults to the download name in the current directory.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Document date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DistributionArgs {
    /// CSV with columns nombre,rut,relacion,porcentaje[,heredero_forzoso].
    #[arg(long)]
    pub(crate) beneficiaries: PathBuf,
    /// Total estate value in pesos.
    #[arg(long)]
    pub(crate) estate: f64,
}

fn parse_mode(raw: &str) -> Result<OutputMode, String> {
    OutputMode::parse(raw).ok_or_else(|| format!("unsupported format '{raw}' (use pdf or html)"))
}

pub(crate) fn sample_submission() -> WillSubmission {
    WillSubmission {
        given_names: "María José".to_string(),
        surnames: "Muñoz Soto".to_string(),
        national_id: "12.345.678-5".to_string(),
        birth_date: "1962-08-14".to_string(),
        marital_status: "viudo".to_string(),
        address: "Los Aromos 455, depto. 32".to_string(),
        city: "Viña del Mar".to_string(),
        asset_items: vec![
            AssetItem {
                category: AssetCategory::RealEstate,
                description: "Departamento en Viña del Mar, rol 1234-56".to_string(),
                estimated_value: Some(85_000_000.0),
            },
            AssetItem {
                category: AssetCategory::Vehicle,
                description: "Automóvil Hyundai Tucson 2021".to_string(),
                estimated_value: Some(9_500_000.0),
            },
            AssetItem {
                category: AssetCategory::BankAccount,
                description: "Cuenta de ahorro BancoEstado".to_string(),
                estimated_value: Some(5_500_000.0),
            },
        ],
        beneficiary_list: vec![
            Beneficiary::new("Ana Muñoz", "11.111.111-1", Relationship::Child, 40.0),
            Beneficiary::new("Luis Muñoz", "22.222.222-2", Relationship::Child, 30.0),
            Beneficiary::new("Rosa Soto", "33.333.333-3", Relationship::Sibling, 30.0),
        ],
        special_instructions: Some(
            "Nombro albacea a mi hija Ana Muñoz.\nDeseo que mis restos sean cremados.".to_string(),
        ),
        ..WillSubmission::default()
    }
}

pub(crate) fn sample_content(today: NaiveDate) -> Result<WillContent, ValidationErrors> {
    WillGuard::new().validate(&sample_submission(), today)
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let RenderArgs {
        input,
        format,
        output,
        today,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let raw = std::fs::read_to_string(&input)?;
    let submission: WillSubmission = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    let content = WillGuard::new()
        .validate(&submission, today)
        .map_err(WillServiceError::from)?;

    let rendered = composer::render(&content.document(today), format);
    let path = output.unwrap_or_else(|| PathBuf::from(&rendered.filename));
    std::fs::write(&path, &rendered.bytes)?;

    println!(
        "Wrote {} ({} bytes, {})",
        path.display(),
        rendered.bytes.len(),
        rendered.content_type
    );
    Ok(())
}

pub(crate) fn run_distribution(args: DistributionArgs) -> Result<(), AppError> {
    let beneficiaries = BeneficiaryCsvImporter::from_path(&args.beneficiaries)?;
    let service = WillService::new(Arc::new(InMemoryWillRepository::default()));
    let report = service.distribution(&beneficiaries, args.estate)?;

    render_distribution(&report.distribution);
    if report.messages.is_empty() {
        println!("Distribution respects the legitime rules.");
    } else {
        println!("Warnings:");
        for message in &report.messages {
            println!("  - {message}");
        }
    }
    Ok(())
}

fn render_distribution(distribution: &DistributionResult) {
    println!(
        "Estate ${} | legítima ${} | libre disposición ${}",
        thousands(distribution.total_estate_value.round() as u64),
        thousands(distribution.legitime_share),
        thousands(distribution.free_disposal_share)
    );
    for share in &distribution.shares {
        println!(
            "  - {:<24} {:>6}% of {:<18} ${}",
            share.name,
            share.percentage,
            share.pool.label(),
            thousands(share.amount)
        );
    }
    for pool in &distribution.unclaimed {
        println!(
            "  ! {} unclaimed: ${}",
            pool.pool.label(),
            thousands(pool.amount)
        );
    }
}

fn write_document(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, output_dir } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("MiLegado end-to-end demo ({today})");

    let gateway = Arc::new(InMemoryAuthGateway::default());
    let sessions = SessionManager::new(Arc::clone(&gateway));
    let mut subscription = sessions.subscribe();

    let outcome = sessions
        .sign_up(&SignUpRequest {
            email: "maria.jose@example.cl".to_string(),
            password: "secreto123".to_string(),
            password_confirmation: "secreto123".to_string(),
        })
        .await?;
    if let SignUpOutcome::SignedIn(session) = &outcome {
        println!("Signed up {} ({})", session.user.email, session.user.id);
    }
    let session = subscription.changed().await.unwrap_or_default();

    let content = sample_content(today).map_err(WillServiceError::from)?;
    println!("Beneficiaries derived from the structured list:");
    for line in content.beneficiaries.lines() {
        println!("  - {line}");
    }

    let service = WillService::new(Arc::new(InMemoryWillRepository::default()));
    let submission = sample_submission();

    let submitted = service.submit(&session, &submission, today).await?;
    let Some(record) = submitted.record else {
        return Err(std::io::Error::other("demo session was not authenticated").into());
    };
    println!(
        "Stored will {} for {} {}",
        record.id, record.testator.given_names, record.testator.surnames
    );
    println!(
        "Printable document: {} ({} bytes)",
        submitted.document.filename,
        submitted.document.bytes.len()
    );

    let estate: f64 = submission
        .asset_items
        .iter()
        .filter_map(|item| item.estimated_value)
        .sum();
    let report = service.distribution(&submission.beneficiary_list, estate)?;
    println!("\nInheritance distribution");
    render_distribution(&report.distribution);

    let stored = service.list(&session).await?;
    println!("\n{} stored will(s) for this account", stored.len());

    if let Some(dir) = output_dir {
        for mode in [OutputMode::Preview, OutputMode::Printable] {
            let document = service
                .render_record(&session, record.id, mode, today)
                .await?;
            let path = write_document(&dir, &document.filename, &document.bytes)?;
            println!("Wrote {}", path.display());
        }
    }

    sessions.sign_out().await?;
    println!("Signed out");
    Ok(())
}
