// ─── Compatibility Search ───
// Finds the newest (engine, loader) pair every configured mod resolves for.
//
// The walk is strictly ordered and never backtracks:
//   Start ─▶ Engine(i) ─▶ Pair(i, j) ─▶ Pair(i, j+1) ─▶ …
// The first engine candidate without loader support, or whose loader
// candidates are all exhausted, ends the search.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use super::axes::VersionAxes;
use crate::core::config::ModSpec;
use crate::core::sources::{ModProvider, ModQuery, ModResolution};

/// One mutually consistent upgrade target.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityResult {
    pub engine_version: String,
    pub loader_version: String,
    pub mods: IndexMap<String, ModResolution>,
    /// 1-based position of the chosen engine candidate.
    pub engines_tried: usize,
    /// 1-based position of the chosen loader candidate for that engine.
    pub loaders_tried: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// The loader registry lists nothing for this engine version.
    NoLoaderSupport { engine_version: String },
    /// Every loader candidate left at least one mod unresolved.
    LoadersExhausted {
        engine_version: String,
        /// Mods unresolved at the last loader candidate tried.
        missing: Vec<String>,
    },
    /// An engine or loader candidate list could not be fetched.
    RegistryUnavailable(String),
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailReason::NoLoaderSupport { engine_version } => {
                write!(f, "no loader support for Minecraft {}", engine_version)
            }
            FailReason::LoadersExhausted {
                engine_version,
                missing,
            } => write!(
                f,
                "no loader version for Minecraft {} satisfies all mods (missing: {})",
                engine_version,
                missing.join(", ")
            ),
            FailReason::RegistryUnavailable(msg) => write!(f, "registry unavailable: {}", msg),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Nothing newer than the running engine.
    None,
    Fail {
        reason: FailReason,
        engines_tried: usize,
        loaders_tried: usize,
    },
    Success(CompatibilityResult),
}

enum SearchState {
    Start,
    Engine(usize),
    Pair { engine: usize, loader: usize },
    Finished(SearchOutcome),
}

/// Candidate lists and counters owned by one run.
#[derive(Default)]
struct SearchContext {
    engines: Vec<String>,
    loaders: Vec<String>,
    engines_tried: usize,
    loaders_tried: usize,
}

impl SearchContext {
    fn fail(&self, reason: FailReason) -> SearchState {
        SearchState::Finished(SearchOutcome::Fail {
            reason,
            engines_tried: self.engines_tried,
            loaders_tried: self.loaders_tried,
        })
    }
}

pub struct CompatibilityResolver<'a, A: VersionAxes, M: ModProvider> {
    axes: &'a A,
    provider: &'a M,
    mods: &'a [ModSpec],
    current_engine: &'a str,
}

impl<'a, A: VersionAxes, M: ModProvider> CompatibilityResolver<'a, A, M> {
    pub fn new(axes: &'a A, provider: &'a M, mods: &'a [ModSpec], current_engine: &'a str) -> Self {
        Self {
            axes,
            provider,
            mods,
            current_engine,
        }
    }

    pub async fn run(&self) -> SearchOutcome {
        let mut ctx = SearchContext::default();
        let mut state = SearchState::Start;

        loop {
            state = match state {
                SearchState::Start => self.fetch_engines(&mut ctx).await,
                SearchState::Engine(i) => self.fetch_loaders(&mut ctx, i).await,
                SearchState::Pair { engine, loader } => self.try_pair(&mut ctx, engine, loader).await,
                SearchState::Finished(outcome) => return outcome,
            };
        }
    }

    async fn fetch_engines(&self, ctx: &mut SearchContext) -> SearchState {
        match self.axes.engine_candidates(self.current_engine).await {
            Err(e) => ctx.fail(FailReason::RegistryUnavailable(e.to_string())),
            Ok(engines) if engines.is_empty() => {
                info!("Already on the newest Minecraft release ({})", self.current_engine);
                SearchState::Finished(SearchOutcome::None)
            }
            Ok(engines) => {
                info!("Found {} newer Minecraft version(s) to test", engines.len());
                ctx.engines = engines;
                SearchState::Engine(0)
            }
        }
    }

    async fn fetch_loaders(&self, ctx: &mut SearchContext, i: usize) -> SearchState {
        let engine = ctx.engines[i].clone();
        ctx.engines_tried = i + 1;
        ctx.loaders_tried = 0;
        info!("Testing Minecraft {}...", engine);

        match self.axes.loader_candidates(&engine).await {
            Err(e) => ctx.fail(FailReason::RegistryUnavailable(e.to_string())),
            Ok(loaders) if loaders.is_empty() => {
                // A gap at this version is taken to mean older candidates are
                // no better supported, so older engines are never tried.
                warn!("No {} support for Minecraft {}, stopping here", self.axes.loader_kind(), engine);
                ctx.fail(FailReason::NoLoaderSupport {
                    engine_version: engine,
                })
            }
            Ok(loaders) => {
                info!("  Found {} {} version(s)", loaders.len(), self.axes.loader_kind());
                ctx.loaders = loaders;
                SearchState::Pair { engine: i, loader: 0 }
            }
        }
    }

    async fn try_pair(&self, ctx: &mut SearchContext, e: usize, l: usize) -> SearchState {
        let engine = ctx.engines[e].clone();
        let loader = ctx.loaders[l].clone();
        ctx.loaders_tried = l + 1;
        info!("    Testing {} {}...", self.axes.loader_kind(), loader);

        let query = ModQuery::latest(&engine, self.axes.loader_kind(), &loader);
        let mut resolved = IndexMap::new();
        let mut missing = Vec::new();

        for spec in self.mods {
            match self.provider.resolve(spec, &query).await {
                Ok(resolution) => {
                    resolved.insert(spec.name.clone(), resolution);
                }
                Err(reason) => {
                    info!("      {}: {}", spec.name, reason);
                    missing.push(spec.name.clone());
                }
            }
        }

        if missing.is_empty() {
            info!("      All {} mod(s) compatible", self.mods.len());
            return SearchState::Finished(SearchOutcome::Success(CompatibilityResult {
                engine_version: engine,
                loader_version: loader,
                mods: resolved,
                engines_tried: ctx.engines_tried,
                loaders_tried: ctx.loaders_tried,
            }));
        }

        info!("      {} mod(s) incompatible", missing.len());
        if l + 1 < ctx.loaders.len() {
            return SearchState::Pair {
                engine: e,
                loader: l + 1,
            };
        }

        warn!("No compatible {} version for Minecraft {}, stopping here", self.axes.loader_kind(), engine);
        ctx.fail(FailReason::LoadersExhausted {
            engine_version: engine,
            missing,
        })
    }
}
