// ─── Download Orchestrator ───
// Build or replay a plan, fetch it sequentially, persist fresh plans.

pub mod cache;
pub mod client;
pub mod plan;

use tracing::{info, warn};

use crate::core::config::ServerConfig;
use crate::core::error::UpdaterResult;
use crate::core::resolver::CompatibilityResult;
use crate::core::sources::ModProvider;

pub use cache::{CacheEntry, PlanCache, DEFAULT_CACHE_FILE};
pub use client::Downloader;
pub use plan::{execute, DownloadItem, DownloadPlan, DownloadSummary, ItemKind, PlanBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOrigin {
    Built,
    /// Replayed from cache; `stale` when it was captured for another engine version.
    Replayed { stale: bool },
}

#[derive(Debug)]
pub struct DownloadRun {
    pub origin: PlanOrigin,
    pub items: usize,
    pub summary: DownloadSummary,
}

/// Download everything `config` needs.
///
/// Without `rebuild` a cached plan is replayed as-is, even when stale. A plan
/// built here is saved as the new cache after execution.
pub async fn sync<M: ModProvider>(
    config: &ServerConfig,
    builder: &PlanBuilder<'_, M>,
    downloader: &Downloader,
    cache: &PlanCache,
    rebuild: bool,
) -> UpdaterResult<DownloadRun> {
    let live_engine = &config.minecraft.version;

    let cached = if rebuild { None } else { cache.load().await };

    if let Some(entry) = cached {
        let stale = entry.is_stale(live_engine);
        if stale {
            warn!(
                "Cached plan was built for Minecraft {} but config says {}; consider --rebuild-cache",
                entry.minecraft_version, live_engine
            );
        }
        info!("Replaying cached plan ({} item(s))", entry.downloads.len());
        let summary = execute(&entry.downloads, downloader).await;
        return Ok(DownloadRun {
            origin: PlanOrigin::Replayed { stale },
            items: entry.downloads.len(),
            summary,
        });
    }

    let plan = builder.build_from_config(config).await?;
    let summary = execute(&plan, downloader).await;
    let items = plan.len();

    cache
        .save(&CacheEntry {
            minecraft_version: live_engine.clone(),
            downloads: plan,
        })
        .await?;

    Ok(DownloadRun {
        origin: PlanOrigin::Built,
        items,
        summary,
    })
}

/// Plan the upgrade target a compatibility search found and store it as a
/// cache entry captured for the target engine version. Nothing is downloaded.
pub async fn capture_target<M: ModProvider>(
    config: &ServerConfig,
    result: &CompatibilityResult,
    builder: &PlanBuilder<'_, M>,
    cache: &PlanCache,
) -> UpdaterResult<usize> {
    let plan = builder.build_from_result(config, result).await?;
    let items = plan.len();
    info!(
        "Saving upgrade plan for Minecraft {} ({} item(s)) to {}",
        result.engine_version,
        items,
        cache.path().display()
    );
    cache
        .save(&CacheEntry {
            minecraft_version: result.engine_version.clone(),
            downloads: plan,
        })
        .await?;
    Ok(items)
}
