use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use semver::Version;
use workband_history::{
    HistoryLog, WorkloadHistoryRecord, WorkloadHistoryRecorder, WorkloadHistoryState,
};
use workband_resolver::{PackSet, ResolverContext, ResolverScope};
use workband_store::{
    default_dotnet_root, read_workload_set_version, DirectoryManifestProvider,
    InstalledWorkloadStore, ManifestStore, StateLayout,
};

use crate::render::{current_output_style, render_status_line, render_warning_line};
use crate::{Cli, Commands};

#[derive(Debug)]
pub(crate) struct CommandEnv {
    pub(crate) layout: StateLayout,
    pub(crate) scope: ResolverScope,
}

pub(crate) fn command_env(
    dotnet_root: Option<PathBuf>,
    sdk_version: Option<String>,
) -> Result<CommandEnv> {
    let dotnet_root = match dotnet_root {
        Some(root) => root,
        None => default_dotnet_root()?,
    };
    let raw_version = match sdk_version {
        Some(version) => version,
        None => std::env::var("WORKBAND_SDK_VERSION").map_err(|_| {
            anyhow!("no SDK version given; pass --sdk-version or set WORKBAND_SDK_VERSION")
        })?,
    };
    let sdk_version = Version::parse(&raw_version)
        .with_context(|| format!("invalid SDK version '{raw_version}'"))?;

    let layout = StateLayout::new(&dotnet_root);
    let scope = ResolverScope::new(dotnet_root, sdk_version);
    Ok(CommandEnv { layout, scope })
}

fn manifest_store(env: &CommandEnv) -> ManifestStore<DirectoryManifestProvider> {
    ManifestStore::new(
        DirectoryManifestProvider::new(env.layout.clone()),
        env.scope.feature_band,
    )
}

fn capture_state(env: &CommandEnv) -> Result<WorkloadHistoryState> {
    let manifest_versions = manifest_store(env)
        .installed_manifests()?
        .into_iter()
        .map(|manifest| (manifest.id, manifest.version.to_string()))
        .collect();
    let installed_workloads =
        InstalledWorkloadStore::new(env.layout.clone()).read(env.scope.feature_band)?;
    let workload_set_version = read_workload_set_version(&env.layout, env.scope.feature_band)?;
    Ok(WorkloadHistoryState {
        manifest_versions,
        installed_workloads,
        workload_set_version,
    })
}

pub(crate) fn format_pack_lines(packs: &PackSet, rid: Option<&str>) -> Vec<String> {
    if packs.is_empty() {
        return vec!["No packs required".to_string()];
    }
    packs
        .values()
        .map(|pack| {
            let mut line = format!(
                "{} {} {} (manifest {})",
                pack.id,
                pack.version,
                pack.kind.as_str(),
                pack.manifest_id
            );
            if let Some(rid) = rid {
                match pack.path_for_rid(rid) {
                    Some(path) => line.push_str(&format!(" [{rid}: {path}]")),
                    None => line.push_str(&format!(" [{rid}: no path]")),
                }
            }
            line
        })
        .collect()
}

pub(crate) fn format_history_lines(records: &[WorkloadHistoryRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let status = if record.succeeded { "ok" } else { "failed" };
            let mut line = format!(
                "{}  {:<6}  {}",
                record.time_started_unix_ms,
                status,
                record.command_line.join(" ")
            );
            if let Some(error) = &record.error_message {
                line.push_str(&format!(" ({error})"));
            }
            line
        })
        .collect()
}

pub(crate) fn run_resolve(
    env: &CommandEnv,
    workload_ids: &[String],
    rid: Option<&str>,
) -> Result<Vec<String>> {
    let mut context = ResolverContext::new();
    let packs = context.resolve(&env.scope, workload_ids, || manifest_store(env).manifests())?;
    Ok(format_pack_lines(&packs, rid))
}

pub(crate) fn run_install(
    env: &CommandEnv,
    workload_ids: &[String],
    command_line: Vec<String>,
) -> Result<Vec<String>> {
    let log = HistoryLog::new(env.layout.history_log_path(env.scope.feature_band));
    let capture = || -> Result<WorkloadHistoryState> { capture_state(env) };
    let recorder = WorkloadHistoryRecorder::new(&log, command_line, &capture);

    recorder.run(|| -> Result<Vec<String>> {
        // Resolve before touching any state so a conflict or unknown workload
        // aborts with nothing recorded.
        let mut context = ResolverContext::new();
        let packs =
            context.resolve(&env.scope, workload_ids, || manifest_store(env).manifests())?;

        let recorded = InstalledWorkloadStore::new(env.layout.clone())
            .add(env.scope.feature_band, workload_ids)?;

        let mut lines = vec![format!(
            "recorded {} installed workload(s) for feature band {}",
            recorded.len(),
            env.scope.feature_band
        )];
        lines.push("packs required:".to_string());
        lines.extend(format_pack_lines(&packs, None));
        Ok(lines)
    })
}

pub(crate) fn run_uninstall(
    env: &CommandEnv,
    workload_ids: &[String],
    command_line: Vec<String>,
) -> Result<Vec<String>> {
    let log = HistoryLog::new(env.layout.history_log_path(env.scope.feature_band));
    let capture = || -> Result<WorkloadHistoryState> { capture_state(env) };
    let recorder = WorkloadHistoryRecorder::new(&log, command_line, &capture);

    recorder.run(|| -> Result<Vec<String>> {
        let remaining = InstalledWorkloadStore::new(env.layout.clone())
            .remove(env.scope.feature_band, workload_ids)?;
        Ok(vec![format!(
            "removed {} workload(s); {} remain installed for feature band {}",
            workload_ids.len(),
            remaining.len(),
            env.scope.feature_band
        )])
    })
}

pub(crate) fn run_list(env: &CommandEnv) -> Result<Vec<String>> {
    let installed =
        InstalledWorkloadStore::new(env.layout.clone()).read(env.scope.feature_band)?;
    if installed.is_empty() {
        return Ok(vec![format!(
            "No workloads installed for feature band {}",
            env.scope.feature_band
        )]);
    }
    Ok(installed)
}

pub(crate) fn run_history(env: &CommandEnv) -> Result<(Vec<String>, bool)> {
    let log = HistoryLog::new(env.layout.history_log_path(env.scope.feature_band));
    let (records, unknown_records) = log.read()?;
    if records.is_empty() {
        return Ok((
            vec![format!(
                "No workload history for feature band {}",
                env.scope.feature_band
            )],
            unknown_records,
        ));
    }
    Ok((format_history_lines(&records), unknown_records))
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let style = current_output_style();
    let env = command_env(cli.dotnet_root, cli.sdk_version)?;
    let command_line: Vec<String> = std::env::args().collect();

    match cli.command {
        Commands::Resolve { workload_ids, rid } => {
            for line in run_resolve(&env, &workload_ids, rid.as_deref())? {
                println!("{line}");
            }
        }
        Commands::Install { workload_ids } => {
            for line in run_install(&env, &workload_ids, command_line)? {
                println!("{line}");
            }
            println!(
                "{}",
                render_status_line(style, "install", "workload state updated")
            );
        }
        Commands::Uninstall { workload_ids } => {
            for line in run_uninstall(&env, &workload_ids, command_line)? {
                println!("{line}");
            }
            println!(
                "{}",
                render_status_line(style, "uninstall", "workload state updated")
            );
        }
        Commands::List => {
            for line in run_list(&env)? {
                println!("{line}");
            }
        }
        Commands::History => {
            let (lines, unknown_records) = run_history(&env)?;
            if unknown_records {
                eprintln!(
                    "{}",
                    render_warning_line(
                        style,
                        "history contains unrecognized records written by another CLI version"
                    )
                );
            }
            for line in lines {
                println!("{line}");
            }
        }
        Commands::Band => {
            println!("{}", env.scope.feature_band);
        }
    }

    Ok(())
}
