//! reel - SkillReel command line driver
//!
//! Describe a project, analyze it, persist it and verify its skills against
//! an evidence video. Every command prints JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_core::{
    EvidenceMeta, EvidenceUpload, FunctionEndpointConfig, ModelEndpointConfig, PipelineConfig,
    ProjectDraft, ProjectId, SkillId, SkillReelPipeline, SkillStatus, VerificationReport,
};
use reel_providers::{providers_from_settings, LocalEvidenceStore};

#[derive(Debug, Parser)]
#[command(name = "reel", version, about = "SkillReel analysis and verification pipeline")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "REEL_CONFIG")]
    config: Option<PathBuf>,

    /// Project collection file (overrides configuration)
    #[arg(long, global = true, env = "REEL_STORE")]
    store: Option<PathBuf>,

    /// Evidence directory (overrides configuration)
    #[arg(long, global = true, env = "REEL_EVIDENCE_ROOT")]
    evidence_root: Option<PathBuf>,

    /// Ask the function endpoint before the model endpoint
    #[arg(long, global = true)]
    prefer_secondary: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    endpoints: EndpointArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Endpoint settings that usually come from the environment
#[derive(Debug, Args)]
struct EndpointArgs {
    #[arg(long, global = true, env = "REEL_MODEL_ENDPOINT", hide_env_values = true)]
    model_endpoint: Option<String>,

    #[arg(long, global = true, env = "REEL_MODEL_API_KEY", hide_env_values = true)]
    model_api_key: Option<String>,

    #[arg(long, global = true, env = "REEL_FUNCTIONS_URL", hide_env_values = true)]
    functions_url: Option<String>,

    #[arg(long, global = true, env = "REEL_FUNCTIONS_KEY", hide_env_values = true)]
    functions_key: Option<String>,
}

/// Project draft fields
#[derive(Debug, Args)]
struct DraftArgs {
    /// Project name
    #[arg(long, default_value = "Untitled project")]
    name: String,

    /// Project description
    #[arg(long)]
    description: String,

    /// Project goals
    #[arg(long)]
    goals: Option<String>,

    /// Target skill (repeatable)
    #[arg(long = "skill")]
    skills: Vec<String>,
}

impl DraftArgs {
    fn draft(&self) -> ProjectDraft {
        let mut draft = ProjectDraft::new(&self.name, &self.description)
            .with_skills(self.skills.iter().map(String::as_str));
        if let Some(goals) = &self.goals {
            draft = draft.with_goals(goals);
        }
        draft
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Suggest skills for a description
    Suggest(DraftArgs),
    /// Analyze a draft's scope
    Analyze(DraftArgs),
    /// Analyze a draft and persist it as a project
    Create(DraftArgs),
    /// List stored projects
    List,
    /// Show one project with its progress
    Show { project: String },
    /// Re-run analysis for a stored project
    Reanalyze { project: String },
    /// Set the status of one skill (planned, in-progress, completed)
    Status {
        project: String,
        skill: String,
        status: SkillStatus,
    },
    /// Verify every skill against an evidence URL
    Verify {
        project: String,
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "video/mp4")]
        content_type: String,
    },
    /// Store an evidence file, then verify every skill against it
    Submit {
        project: String,
        file: PathBuf,
        #[arg(long, default_value = "video/mp4")]
        content_type: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "warn,reel_core=info,reel_providers=info",
        1 => "info,reel_core=debug,reel_providers=debug",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Configuration file plus command line and environment overrides
fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(store) = &cli.store {
        config = config.with_store_path(store);
    }
    if let Some(root) = &cli.evidence_root {
        config.evidence.root.clone_from(root);
    }
    if cli.prefer_secondary {
        config = config.with_prefer_primary(false);
    }

    let endpoints = &cli.endpoints;
    if let Some(endpoint) = &endpoints.model_endpoint {
        let model = config
            .providers
            .model
            .get_or_insert_with(|| ModelEndpointConfig::new(endpoint));
        model.endpoint.clone_from(endpoint);
    }
    if let (Some(model), Some(key)) = (config.providers.model.as_mut(), &endpoints.model_api_key) {
        model.api_key = Some(key.clone());
    }
    if let Some(url) = &endpoints.functions_url {
        let functions = config
            .providers
            .functions
            .get_or_insert_with(|| FunctionEndpointConfig::new(url));
        functions.base_url.clone_from(url);
    }
    if let (Some(functions), Some(key)) = (config.providers.functions.as_mut(), &endpoints.functions_key) {
        functions.api_key = Some(key.clone());
    }

    Ok(config)
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let providers = providers_from_settings(&config.providers).context("configuring providers")?;
    let evidence = LocalEvidenceStore::new(&config.evidence.root);
    let pipeline = SkillReelPipeline::from_config(config, &providers)
        .with_evidence_store(Arc::new(evidence));

    let output = match &cli.command {
        Commands::Suggest(args) => serde_json::to_value(pipeline.suggest(&args.draft()).await)?,
        Commands::Analyze(args) => serde_json::to_value(pipeline.analyze(&args.draft()).await?)?,
        Commands::Create(args) => {
            let draft = args.draft();
            let analysis = pipeline.analyze(&draft).await?;
            serde_json::to_value(pipeline.create_project(&draft, Some(&analysis))?)?
        }
        Commands::List => serde_json::to_value(pipeline.projects()?)?,
        Commands::Show { project } => {
            let id = ProjectId::from(project.as_str());
            json!({
                "project": pipeline.project(&id)?,
                "progress": pipeline.progress(&id)?,
            })
        }
        Commands::Reanalyze { project } => {
            serde_json::to_value(pipeline.reanalyze(&ProjectId::from(project.as_str())).await?)?
        }
        Commands::Status {
            project,
            skill,
            status,
        } => serde_json::to_value(pipeline.set_skill_status(
            &ProjectId::from(project.as_str()),
            &SkillId::from(skill.as_str()),
            *status,
        )?)?,
        Commands::Verify {
            project,
            url,
            content_type,
        } => {
            let meta = EvidenceMeta {
                content_type: content_type.clone(),
                ..EvidenceMeta::default()
            };
            let report = pipeline
                .verify_evidence(&ProjectId::from(project.as_str()), url, &meta)
                .await?;
            report_json(&report)?
        }
        Commands::Submit {
            project,
            file,
            content_type,
        } => {
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("evidence")
                .to_string();
            let upload = EvidenceUpload::video(file_name, bytes).with_content_type(content_type);
            let report = pipeline
                .submit_evidence(&ProjectId::from(project.as_str()), &upload)
                .await?;
            report_json(&report)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn report_json(report: &VerificationReport) -> Result<serde_json::Value> {
    if let Some(partial) = report.partial_failure() {
        tracing::warn!("{}", partial);
    }
    let checks: Vec<_> = report
        .checks
        .iter()
        .map(|check| match &check.outcome {
            Ok(verdict) => json!({
                "skillId": check.skill_id,
                "skillName": check.skill_name,
                "rating": verdict.rating,
                "feedback": verdict.feedback,
            }),
            Err(error) => json!({
                "skillId": check.skill_id,
                "skillName": check.skill_name,
                "error": error.to_string(),
            }),
        })
        .collect();

    Ok(json!({
        "mode": format!("{:?}", report.mode).to_lowercase(),
        "failed": report.failed(),
        "checks": checks,
        "project": serde_json::to_value(&report.project)?,
    }))
}
