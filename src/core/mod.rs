// ─── Server Updater Core ───
// Upgrade planning for a modded Minecraft server across three version axes.
//
// Architecture:
//   core/
//     version/    — Mojang manifest, version ordering, server jar lookup
//     loaders/    — Fabric / Quilt loader registries
//     sources/    — Mod providers: Modrinth, CurseForge, direct links
//     resolver/   — Cross-axis compatibility search + single-axis checks
//     downloader/ — Download plans, plan cache, sequential downloads
//     config/     — config.yaml, source mappings, .env, validation
//     report      — JSON update and compatibility reports
//     http        — Shared client + registry fetch classification

pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod loaders;
pub mod report;
pub mod resolver;
pub mod sources;
pub mod version;
