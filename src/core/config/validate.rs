// ─── Config Validation ───
// Structure checks against the source mappings, then remote checks of every
// declared version. Missing mod versions are filled in; wrong ones are
// replaced only in auto-fix mode.

use tracing::{debug, info, warn};

use super::model::{Environment, ModSourceKind, ModSpec, ServerConfig};
use super::mappings::SourceMappings;
use crate::core::resolver::VersionAxes;
use crate::core::sources::{ModProvider, ModQuery, ModResolution, UnresolvedReason};

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Human-readable list of edits applied to the config.
    pub changes: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn modified(&self) -> bool {
        !self.changes.is_empty()
    }

    fn error(&mut self, msg: String) {
        warn!("{}", msg);
        self.errors.push(msg);
    }

    fn warning(&mut self, msg: String) {
        warn!("{}", msg);
        self.warnings.push(msg);
    }

    fn change(&mut self, msg: String) {
        info!("{}", msg);
        self.changes.push(msg);
    }
}

pub struct ConfigValidator<'a, A: VersionAxes, M: ModProvider> {
    axes: &'a A,
    provider: &'a M,
    mappings: &'a SourceMappings,
    auto_fix: bool,
}

impl<'a, A: VersionAxes, M: ModProvider> ConfigValidator<'a, A, M> {
    pub fn new(axes: &'a A, provider: &'a M, mappings: &'a SourceMappings, auto_fix: bool) -> Self {
        Self {
            axes,
            provider,
            mappings,
            auto_fix,
        }
    }

    /// Validate `config` in place. Remote checks are skipped when the
    /// structure is already broken.
    pub async fn run(&self, config: &mut ServerConfig) -> ValidationReport {
        let mut report = ValidationReport::default();

        self.check_structure(config, &mut report);
        if !report.passed() {
            return report;
        }

        self.check_engine(config, &mut report).await;
        self.check_loader(config, &mut report).await;

        let mc = config.minecraft.version.clone();
        let loader_version = config.loader.version.clone();
        let query = ModQuery::latest(&mc, config.loader.source, &loader_version);
        for spec in &mut config.mods {
            self.check_mod(spec, query, &mut report).await;
        }

        report
    }

    // ── Structure ───────────────────────────────────────

    pub fn check_structure(&self, config: &ServerConfig, report: &mut ValidationReport) {
        if config.minecraft.version.trim().is_empty() {
            report.error("'minecraft.version' is empty".to_string());
        }
        if !self.mappings.contains(&config.minecraft.source) {
            report.error(format!("Invalid source '{}' for minecraft", config.minecraft.source));
        }
        if config.loader.version.trim().is_empty() {
            report.error("'loader.version' is empty".to_string());
        }
        if !self.mappings.contains(config.loader.source.id()) {
            report.error(format!("Invalid source '{}' for loader", config.loader.source.id()));
        }
        if config.mods.is_empty() {
            report.warning("No mods configured".to_string());
        }

        for (i, spec) in config.mods.iter().enumerate() {
            if spec.name.trim().is_empty() {
                report.error(format!("Mod at index {} has an empty name", i));
                continue;
            }
            if !self.mappings.contains(spec.source.id()) {
                report.error(format!("Mod '{}' has invalid source: '{}'", spec.name, spec.source));
            }
            match spec.source {
                ModSourceKind::Custom if spec.download_url.is_none() => report.error(format!(
                    "Mod '{}' with source 'custom' missing required field: 'download_url'",
                    spec.name
                )),
                ModSourceKind::Curseforge if spec.project_id.is_none() => report.error(format!(
                    "Mod '{}' with source 'curseforge' missing required field: 'project_id'",
                    spec.name
                )),
                _ => {}
            }
        }
    }

    // ── Remote checks ───────────────────────────────────

    async fn check_engine(&self, config: &ServerConfig, report: &mut ValidationReport) {
        let version = &config.minecraft.version;
        match self.axes.engine_exists(version).await {
            Ok(true) => info!("Minecraft {} found", version),
            Ok(false) => report.error(format!("Minecraft version '{}' not found on Mojang servers", version)),
            Err(e) => report.error(format!("Failed to fetch Minecraft version manifest: {}", e)),
        }
    }

    async fn check_loader(&self, config: &ServerConfig, report: &mut ValidationReport) {
        let kind = self.axes.loader_kind();
        let (mc, version) = (&config.minecraft.version, &config.loader.version);

        match self.axes.loader_candidates(mc).await {
            Ok(versions) if versions.iter().any(|v| v == version) => {
                info!("{} {} found for Minecraft {}", kind, version, mc)
            }
            Ok(_) => report.error(format!(
                "{} version '{}' not found for Minecraft {}",
                kind, version, mc
            )),
            Err(e) => report.warning(format!("Could not verify {} version: {}", kind, e)),
        }
    }

    async fn check_mod(&self, spec: &mut ModSpec, query: ModQuery<'_>, report: &mut ValidationReport) {
        if spec.source == ModSourceKind::Custom {
            debug!("{}: custom URL provided", spec.name);
            return;
        }

        let Some(declared) = spec.version.clone() else {
            match self.provider.resolve(spec, &query).await {
                Ok(latest) => {
                    let msg = format!("{}: resolved to latest version {}", spec.name, latest.version);
                    apply(spec, latest);
                    report.change(msg);
                }
                Err(reason) => report.error(unresolved_message(spec, None, &reason)),
            }
            return;
        };

        match self.provider.project_exists(spec).await {
            Ok(true) => {}
            Ok(false) => {
                report.error(format!("Mod '{}' not found on {}", spec.name, spec.source));
                return;
            }
            Err(reason) => {
                report.error(unresolved_message(spec, Some(&declared), &reason));
                return;
            }
        }

        match self.provider.resolve(spec, &query.pinned(Some(declared.as_str()))).await {
            Ok(found) => {
                debug!("{}: version {} found", spec.name, declared);
                let filled = fill_missing(spec, &found);
                if !filled.is_empty() {
                    report.change(format!("{}: added {}", spec.name, filled.join(", ")));
                }
            }
            Err(reason @ (UnresolvedReason::NotFound | UnresolvedReason::NoCompatibleVersion)) if self.auto_fix => {
                match self.provider.resolve(spec, &query).await {
                    Ok(latest) => {
                        let msg = format!("{}: {} -> {}", spec.name, declared, latest.version);
                        apply(spec, latest);
                        report.change(msg);
                    }
                    Err(_) => report.error(unresolved_message(spec, Some(&declared), &reason)),
                }
            }
            Err(reason) => report.error(unresolved_message(spec, Some(&declared), &reason)),
        }
    }
}

/// Write a resolution's version, side support and file id into `spec`.
fn apply(spec: &mut ModSpec, resolution: ModResolution) {
    spec.version = Some(resolution.version);
    spec.environment = Some(resolution.environment.unwrap_or(Environment::Both));
    if let Some(file_id) = resolution.file_id {
        spec.file_id = Some(file_id);
    }
}

/// Fill `environment` and `file_id` when the config leaves them out.
fn fill_missing(spec: &mut ModSpec, found: &ModResolution) -> Vec<String> {
    let mut filled = Vec::new();
    if spec.environment.is_none() {
        let env = found.environment.unwrap_or(Environment::Both);
        spec.environment = Some(env);
        filled.push(format!("environment={}", env));
    }
    if let (None, Some(file_id)) = (spec.file_id, found.file_id) {
        spec.file_id = Some(file_id);
        filled.push(format!("file_id={}", file_id));
    }
    filled
}

fn unresolved_message(spec: &ModSpec, declared: Option<&str>, reason: &UnresolvedReason) -> String {
    match (declared, reason) {
        (_, UnresolvedReason::CredentialMissing) => format!(
            "Mod '{}': CurseForge API key not set. Set CURSEFORGE_API_KEY.",
            spec.name
        ),
        (Some(v), UnresolvedReason::NoCompatibleVersion) => format!(
            "Mod '{}': version '{}' not available for this Minecraft and loader version",
            spec.name, v
        ),
        (Some(v), other) => format!("Mod '{}' version '{}': {}", spec.name, v, other),
        (None, other) => format!("Mod '{}': {}", spec.name, other),
    }
}
