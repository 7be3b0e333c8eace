// ─── Command Handlers ───
// Wire the core together for each subcommand and print user-facing summaries.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::cli::{CheckArgs, DownloadArgs, ValidateArgs};
use crate::core::config::{ConfigValidator, ModSourceKind, ServerConfig, SourceMappings};
use crate::core::downloader::{self, Downloader, PlanBuilder, PlanCache, PlanOrigin};
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::http::build_http_client;
use crate::core::loaders::LoaderRegistry;
use crate::core::report::{write_json, CompatibilityReport, UpdateReport};
use crate::core::resolver::{
    check_engine, check_loader, check_mods, AxisUpdate, CompatibilityResolver, RemoteAxes,
    SearchOutcome,
};
use crate::core::sources::{ModQuery, ModSources};

/// Paths and credentials shared by every command.
pub struct CommandContext {
    pub config_path: PathBuf,
    pub mappings_path: PathBuf,
    pub curseforge_api_key: Option<String>,
}

/// Everything a command needs to talk to the registries.
struct Session {
    client: reqwest::Client,
    config: ServerConfig,
    mappings: SourceMappings,
    axes: RemoteAxes,
    sources: ModSources,
}

impl Session {
    async fn open(ctx: &CommandContext, mappings_required: bool) -> UpdaterResult<Self> {
        let config = ServerConfig::load(&ctx.config_path).await?;
        let mappings = if mappings_required {
            SourceMappings::load(&ctx.mappings_path).await?
        } else {
            SourceMappings::load_or_default(&ctx.mappings_path).await?
        };
        let client = build_http_client()?;

        let kind = config.loader.source;
        let loaders = LoaderRegistry::new(
            kind,
            client.clone(),
            mappings.loader_versions_url(kind).as_deref(),
        );
        let axes = RemoteAxes::new(client.clone(), mappings.engine_manifest_url(), loaders);
        let sources = ModSources::new(client.clone(), &mappings, ctx.curseforge_api_key.clone());

        if !sources.curseforge().has_credential()
            && config.mods.iter().any(|m| m.source == ModSourceKind::Curseforge)
        {
            warn!("CURSEFORGE_API_KEY not set; CurseForge mods cannot be resolved");
        }

        Ok(Self {
            client,
            config,
            mappings,
            axes,
            sources,
        })
    }
}

// ── check ───────────────────────────────────────────────

pub async fn check(ctx: &CommandContext, args: &CheckArgs) -> UpdaterResult<()> {
    let session = Session::open(ctx, args.save_plan.is_some()).await?;

    if args.full_check {
        return full_check(&session, args).await;
    }

    let config = &session.config;
    let target_mc = args.mc_version.as_deref().unwrap_or(&config.minecraft.version);
    let check_all = args.check_all();

    let minecraft = if check_all || args.mc {
        let update = check_engine(
            &session.client,
            &session.mappings.engine_manifest_url(),
            &config.minecraft.version,
        )
        .await
        .unwrap_or_else(|e| {
            warn!("Minecraft update check failed: {}", e);
            AxisUpdate {
                current: config.minecraft.version.clone(),
                ..AxisUpdate::default()
            }
        });
        Some(update)
    } else {
        None
    };

    let loader = if check_all || args.loader {
        let update = check_loader(&session.axes, target_mc, &config.loader.version)
            .await
            .unwrap_or_else(|e| {
                warn!("{} update check failed: {}", config.loader.source, e);
                AxisUpdate {
                    current: config.loader.version.clone(),
                    ..AxisUpdate::default()
                }
            });
        Some(update)
    } else {
        None
    };

    let mods = if check_all || args.mods || (args.loader && args.mc_version.is_some()) {
        let query = ModQuery::latest(target_mc, config.loader.source, &config.loader.version);
        info!("Checking {} mod(s) against Minecraft {}", config.mods.len(), target_mc);
        Some(check_mods(&session.sources, &config.mods, query).await)
    } else {
        None
    };

    if let Some(update) = &minecraft {
        print_axis("Minecraft", update);
    }
    if let Some(update) = &loader {
        print_axis(&config.loader.source.to_string(), update);
    }
    if let Some(report) = &mods {
        println!(
            "Mods: {} up-to-date | {} updates available | {} errors | {} skipped",
            report.up_to_date,
            report.updates.len(),
            report.errors.len(),
            report.skipped.len()
        );
        for (name, update) in &report.updates {
            println!("  • {}: {} → {}", name, update.current, update.latest);
        }
    }

    let document = UpdateReport::new(minecraft.as_ref(), loader.as_ref(), mods.as_ref());
    write_json(&args.output, &document).await?;
    println!(
        "Update information saved to {} ({} component(s) with updates)",
        args.output.display(),
        document.total_updates()
    );
    Ok(())
}

fn print_axis(label: &str, update: &AxisUpdate) {
    if update.has_update() {
        println!(
            "{}: {} newer version(s) available (current {}, latest {})",
            label,
            update.newer.len(),
            update.current,
            update.latest.as_deref().unwrap_or("?")
        );
    } else {
        println!("{}: up to date ({})", label, update.current);
    }
}

async fn full_check(session: &Session, args: &CheckArgs) -> UpdaterResult<()> {
    let config = &session.config;
    let outcome = CompatibilityResolver::new(
        &session.axes,
        &session.sources,
        &config.mods,
        &config.minecraft.version,
    )
    .run()
    .await;

    match &outcome {
        SearchOutcome::None => println!("Already running the latest Minecraft release"),
        SearchOutcome::Fail {
            reason,
            engines_tried,
            loaders_tried,
        } => println!(
            "No compatible update found after {} Minecraft and {} loader version(s): {}",
            engines_tried, loaders_tried, reason
        ),
        SearchOutcome::Success(result) => {
            println!(
                "Compatible update: Minecraft {} → {}, {} {} → {}",
                config.minecraft.version,
                result.engine_version,
                config.loader.source,
                config.loader.version,
                result.loader_version
            );
            for (name, resolution) in &result.mods {
                println!("  • {}: {}", name, resolution.version);
            }
        }
    }

    let report = CompatibilityReport::from_outcome(&outcome, &config.minecraft.version, &config.loader.version);
    write_json(&args.compat_output, &report).await?;
    println!("Compatibility report saved to {}", args.compat_output.display());

    if let Some(plan_file) = &args.save_plan {
        match &outcome {
            SearchOutcome::Success(result) => {
                let builder = PlanBuilder::new(&session.client, &session.mappings, &session.sources);
                let cache = PlanCache::new(plan_file);
                let items = downloader::capture_target(config, result, &builder, &cache).await?;
                println!(
                    "Upgrade plan with {} item(s) saved to {} (replay with: download --cache-file {})",
                    items,
                    plan_file.display(),
                    plan_file.display()
                );
            }
            _ => warn!("No compatible target found; {} not written", plan_file.display()),
        }
    }
    Ok(())
}

// ── download ────────────────────────────────────────────

pub async fn download(ctx: &CommandContext, args: &DownloadArgs) -> UpdaterResult<()> {
    let session = Session::open(ctx, true).await?;
    let builder = PlanBuilder::new(&session.client, &session.mappings, &session.sources);
    let fetcher = Downloader::new(session.client.clone());
    let cache = PlanCache::new(&args.cache_file);

    let run = downloader::sync(&session.config, &builder, &fetcher, &cache, args.rebuild_cache).await?;

    match run.origin {
        PlanOrigin::Built => println!("Built download plan with {} item(s)", run.items),
        PlanOrigin::Replayed { stale } => {
            println!("Replayed cached plan with {} item(s)", run.items);
            if stale {
                println!("Warning: cached plan targets a different Minecraft version; consider --rebuild-cache");
            }
        }
    }
    println!(
        "Download summary: {} downloaded, {} already present, {} failed",
        run.summary.downloaded, run.summary.skipped, run.summary.failed
    );
    Ok(())
}

// ── validate ────────────────────────────────────────────

pub async fn validate(ctx: &CommandContext, args: &ValidateArgs) -> UpdaterResult<()> {
    let mut session = Session::open(ctx, true).await?;
    let validator = ConfigValidator::new(&session.axes, &session.sources, &session.mappings, args.auto_fix);
    let report = validator.run(&mut session.config).await;

    if report.modified() {
        println!("{} modification(s) made:", report.changes.len());
        for change in &report.changes {
            println!("  • {}", change);
        }
        session.config.save(&ctx.config_path).await?;
        println!("Config rewritten: {}", ctx.config_path.display());
    }

    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }

    if report.passed() {
        println!("Validation passed");
        Ok(())
    } else {
        for error in &report.errors {
            println!("  ✗ {}", error);
        }
        Err(UpdaterError::ValidationFailed(report.errors.len()))
    }
}
