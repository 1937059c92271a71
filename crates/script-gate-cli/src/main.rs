// crates/script-gate-cli/src/main.rs
// ============================================================================
// Module: Script Gate CLI Entry Point
// Description: Command dispatcher for catalog, rule, and render workflows.
// Purpose: Provide a safe, localized operator CLI over the Script Gate core.
// Dependencies: clap, script-gate-{core,config,predicates,store-sqlite}, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The Script Gate CLI manages the discovered, removed, and manual catalogs,
//! edits and checks activation rules, and simulates a page render against a
//! queue snapshot. All user-facing strings are routed through the message
//! catalog. Inputs are untrusted: JSON files are read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use script_gate_cli::t;
use script_gate_config::CONFIG_ENV_VAR;
use script_gate_config::DEFAULT_CONFIG_NAME;
use script_gate_config::ScriptGateConfig;
use script_gate_core::AbsentRulesVerdict;
use script_gate_core::ActivationPipeline;
use script_gate_core::AuditSink;
use script_gate_core::CatalogAdmin;
use script_gate_core::Dependencies;
use script_gate_core::DiscoveryRecorder;
use script_gate_core::FileAuditSink;
use script_gate_core::InMemoryAssetQueue;
use script_gate_core::InMemoryCatalogStore;
use script_gate_core::LoadStrategy;
use script_gate_core::ManagedCatalog;
use script_gate_core::ManualScriptInput;
use script_gate_core::MetadataResolver;
use script_gate_core::NoMetadataResolver;
use script_gate_core::NoopAuditSink;
use script_gate_core::PredicateRegistry;
use script_gate_core::RuleMatcher;
use script_gate_core::RuleSet;
use script_gate_core::RuleShape;
use script_gate_core::ScriptHandle;
use script_gate_core::SharedCatalogStore;
use script_gate_core::StderrAuditSink;
use script_gate_core::core::rules::rules_field;
use script_gate_core::unix_now;
use script_gate_predicates::RequestContext;
use script_gate_predicates::builtin_registry;
use script_gate_store_sqlite::SqliteCatalogStore;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a rule set JSON input.
const MAX_RULES_BYTES: usize = 256 * 1024;
/// Maximum size of a request context JSON input.
const MAX_CONTEXT_BYTES: usize = 256 * 1024;
/// Maximum size of a queue snapshot JSON input.
const MAX_QUEUE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "script-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to script-gate.toml or `SCRIPT_GATE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Predicate registry utilities.
    Predicates {
        /// Selected predicates subcommand.
        #[command(subcommand)]
        command: PredicatesCommand,
    },
    /// Rule evaluation and editing.
    Rules {
        /// Selected rules subcommand.
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Catalog inspection and transitions.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Manual script management.
    Manual {
        /// Selected manual subcommand.
        #[command(subcommand)]
        command: ManualCommand,
    },
    /// Simulate one page render against a queue snapshot.
    Render(RenderCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Script Gate configuration file.
    Validate,
}

/// Predicate subcommands.
#[derive(Subcommand, Debug)]
enum PredicatesCommand {
    /// List registered predicates with arity and policy status.
    List,
}

/// Rules subcommands.
#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Evaluate a rule set against a request context.
    Evaluate(RulesEvaluateCommand),
    /// Check a rule set against the predicate registry.
    Check(RulesCheckCommand),
    /// Show a managed script's stored rules.
    Show(RulesTarget),
    /// Replace a managed script's rules.
    Set(RulesSetCommand),
    /// Clear a managed script's rules so the catalog default applies.
    Clear(RulesTarget),
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print a catalog as JSON.
    List {
        /// Catalog to print.
        #[arg(value_enum)]
        catalog: CatalogArg,
    },
    /// Move a discovered script to the removed catalog.
    Dequeue(HandleArg),
    /// Drop a removed script so the next render rediscovers it.
    Restore(HandleArg),
    /// Drop a discovered script.
    Forget(HandleArg),
    /// Drop every discovered script.
    ClearDiscovered,
}

/// Manual script subcommands.
#[derive(Subcommand, Debug)]
enum ManualCommand {
    /// Register a new manual script.
    Add(ManualScriptArgs),
    /// Replace a manual script's metadata, keeping its rules.
    Update(ManualScriptArgs),
    /// Delete a manual script.
    Delete(HandleArg),
}

/// Positional script handle.
#[derive(Args, Debug)]
struct HandleArg {
    /// Script handle.
    #[arg(value_name = "HANDLE")]
    handle: String,
}

/// Rule set input source.
#[derive(Args, Debug, Clone)]
struct RulesInput {
    /// Rule set JSON string.
    #[arg(long, value_name = "JSON", conflicts_with = "rules_file")]
    rules: Option<String>,
    /// Path to a rule set JSON file.
    #[arg(long, value_name = "PATH", conflicts_with = "rules")]
    rules_file: Option<PathBuf>,
}

/// Request context input source.
#[derive(Args, Debug, Clone)]
struct ContextInput {
    /// Request context JSON string.
    #[arg(long, value_name = "JSON", conflicts_with = "context_file")]
    context: Option<String>,
    /// Path to a request context JSON file.
    #[arg(long, value_name = "PATH", conflicts_with = "context")]
    context_file: Option<PathBuf>,
}

/// Queue snapshot input source.
#[derive(Args, Debug, Clone)]
struct QueueInput {
    /// Queue snapshot JSON string.
    #[arg(long, value_name = "JSON", conflicts_with = "queue_file")]
    queue: Option<String>,
    /// Path to a queue snapshot JSON file.
    #[arg(long, value_name = "PATH", conflicts_with = "queue")]
    queue_file: Option<PathBuf>,
}

/// Arguments for `rules evaluate`.
#[derive(Args, Debug)]
struct RulesEvaluateCommand {
    /// Rule set source (`null` or `[]` mean absent rules).
    #[command(flatten)]
    rules: RulesInput,
    /// Request context source.
    #[command(flatten)]
    context: ContextInput,
    /// Verdict for absent rules.
    #[arg(long, value_enum, default_value_t = AbsentDefaultArg::Frontend)]
    absent_default: AbsentDefaultArg,
}

/// Arguments for `rules check`.
#[derive(Args, Debug)]
struct RulesCheckCommand {
    /// Rule set source.
    #[command(flatten)]
    rules: RulesInput,
}

/// Managed script addressed by catalog and handle.
#[derive(Args, Debug)]
struct RulesTarget {
    /// Managed catalog holding the script.
    #[arg(long, value_enum)]
    catalog: ManagedCatalogArg,
    /// Script handle.
    #[arg(long, value_name = "HANDLE")]
    handle: String,
}

/// Arguments for `rules set`.
#[derive(Args, Debug)]
struct RulesSetCommand {
    /// Target script.
    #[command(flatten)]
    target: RulesTarget,
    /// Rule set source.
    #[command(flatten)]
    rules: RulesInput,
}

/// Arguments for `manual add` and `manual update`.
#[derive(Args, Debug)]
struct ManualScriptArgs {
    /// Script handle.
    #[arg(long, value_name = "HANDLE")]
    handle: String,
    /// Absolute http(s) source URL.
    #[arg(long, value_name = "URL")]
    src: String,
    /// Version string.
    #[arg(long, value_name = "VERSION")]
    version: Option<String>,
    /// Comma-separated dependency handles.
    #[arg(long, value_name = "HANDLES", default_value = "")]
    deps: String,
    /// Load the script in the footer.
    #[arg(long, action = ArgAction::SetTrue)]
    footer: bool,
    /// Loading strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::None)]
    strategy: StrategyArg,
}

/// Arguments for `render`.
#[derive(Args, Debug)]
struct RenderCommand {
    /// Request context source.
    #[command(flatten)]
    context: ContextInput,
    /// Queue snapshot source.
    #[command(flatten)]
    queue: QueueInput,
    /// Include the activation report alongside the final queue.
    #[arg(long, action = ArgAction::SetTrue)]
    report: bool,
}

/// Catalog selection.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum CatalogArg {
    /// Scripts seen on renders.
    Discovered,
    /// Scripts removed by rules.
    Removed,
    /// Operator-registered scripts.
    Manual,
}

/// Managed catalog selection.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ManagedCatalogArg {
    /// Scripts removed by rules.
    Removed,
    /// Operator-registered scripts.
    Manual,
}

impl From<ManagedCatalogArg> for ManagedCatalog {
    fn from(value: ManagedCatalogArg) -> Self {
        match value {
            ManagedCatalogArg::Removed => Self::Removed,
            ManagedCatalogArg::Manual => Self::Manual,
        }
    }
}

/// Absent-rules verdict selection.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum AbsentDefaultArg {
    /// Absent rules match frontend requests (removal default).
    Frontend,
    /// Absent rules always match (manual addition default).
    Always,
}

impl From<AbsentDefaultArg> for AbsentRulesVerdict {
    fn from(value: AbsentDefaultArg) -> Self {
        match value {
            AbsentDefaultArg::Frontend => Self::FRONTEND_ONLY,
            AbsentDefaultArg::Always => Self::ALWAYS,
        }
    }
}

/// Loading strategy selection.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum StrategyArg {
    /// Blocking load.
    None,
    /// Asynchronous load.
    Async,
    /// Deferred load.
    Defer,
}

impl From<StrategyArg> for LoadStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::None => Self::None,
            StrategyArg::Async => Self::Async,
            StrategyArg::Defer => Self::Defer,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    let config_path = cli.config.as_deref();
    match command {
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(config_path),
        Commands::Predicates {
            command: PredicatesCommand::List,
        } => command_predicates_list(&Runtime::load(config_path)?),
        Commands::Rules {
            command,
        } => command_rules(command, &Runtime::load(config_path)?),
        Commands::Catalog {
            command,
        } => command_catalog(command, &Runtime::load(config_path)?),
        Commands::Manual {
            command,
        } => command_manual(command, &Runtime::load(config_path)?),
        Commands::Render(command) => command_render(&command, &Runtime::load(config_path)?),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Components built from configuration for one invocation.
struct Runtime {
    /// Loaded configuration.
    config: ScriptGateConfig,
    /// Catalog store selected by configuration.
    store: SharedCatalogStore,
    /// Audit sink selected by configuration.
    audit: Box<dyn AuditSink>,
    /// Built-in predicates under the configured access policy.
    registry: PredicateRegistry<RequestContext>,
}

impl Runtime {
    /// Loads configuration and builds the store, audit sink, and registry.
    fn load(path: Option<&Path>) -> CliResult<Self> {
        let config = load_config(path)?;
        let store = open_store(&config)?;
        let audit = open_audit_sink(&config)?;
        let registry = builtin_registry(config.predicates.policy())
            .map_err(|err| CliError::new(t!("registry.build_failed", error = err)))?;
        Ok(Self {
            config,
            store,
            audit,
            registry,
        })
    }

    /// Returns an admin facade over the store.
    fn admin(&self) -> CatalogAdmin<'_, SharedCatalogStore> {
        CatalogAdmin::new(&self.store, self.audit.as_ref())
    }
}

/// Loads configuration, falling back to defaults when no file is configured.
fn load_config(path: Option<&Path>) -> CliResult<ScriptGateConfig> {
    if path.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_none() && !Path::new(DEFAULT_CONFIG_NAME).exists() {
        return Ok(ScriptGateConfig::default());
    }
    ScriptGateConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the configured catalog store.
fn open_store(config: &ScriptGateConfig) -> CliResult<SharedCatalogStore> {
    match config.store.sqlite_config() {
        Some(sqlite) => {
            let store = SqliteCatalogStore::new(sqlite)
                .map_err(|err| CliError::new(t!("store.open_failed", error = err)))?;
            Ok(SharedCatalogStore::from_store(store))
        }
        None => Ok(SharedCatalogStore::from_store(InMemoryCatalogStore::new())),
    }
}

/// Opens the configured audit sink.
fn open_audit_sink(config: &ScriptGateConfig) -> CliResult<Box<dyn AuditSink>> {
    if !config.audit.enabled {
        return Ok(Box::new(NoopAuditSink));
    }
    match &config.audit.path {
        Some(path) => {
            let sink = FileAuditSink::new(path).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(path: Option<&Path>) -> CliResult<ExitCode> {
    let _config =
        ScriptGateConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Predicate Commands
// ============================================================================

/// Lists registered predicates as JSON.
fn command_predicates_list(runtime: &Runtime) -> CliResult<ExitCode> {
    write_json(&runtime.registry.describe())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rules Commands
// ============================================================================

/// Dispatches rules subcommands.
fn command_rules(command: RulesCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    match command {
        RulesCommand::Evaluate(command) => command_rules_evaluate(&command, runtime),
        RulesCommand::Check(command) => command_rules_check(&command, runtime),
        RulesCommand::Show(target) => command_rules_show(&target, runtime),
        RulesCommand::Set(command) => command_rules_set(&command, runtime),
        RulesCommand::Clear(target) => command_rules_clear(&target, runtime),
    }
}

/// Evaluates a rule set against a request context.
fn command_rules_evaluate(command: &RulesEvaluateCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    let raw_rules = read_rules_value(&command.rules)?;
    let rules = rules_field::deserialize(raw_rules)
        .map_err(|err| CliError::new(t!("rules.invalid", error = err)))?;
    let context = read_context(&command.context)?;
    let matcher = RuleMatcher::new(&runtime.registry);
    let matched = matcher.matches(rules.as_ref(), &context, command.absent_default.into());
    let shape = match RuleShape::of(rules.as_ref()) {
        RuleShape::Absent => "absent",
        RuleShape::Empty => "empty",
        RuleShape::NonEmpty(_) => "non_empty",
    };
    let issues = rules.as_ref().map(|rules| runtime.registry.lint(rules)).unwrap_or_default();
    write_json(&json!({
        "matched": matched,
        "shape": shape,
        "issues": issues,
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Checks a rule set for unknown predicates and arity problems.
fn command_rules_check(command: &RulesCheckCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    let rules = read_rule_set(&command.rules)?;
    let issues = runtime.registry.lint(&rules);
    if issues.is_empty() {
        write_stdout_line(&t!("rules.check.ok", conditions = rules.conditions().len()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    for issue in &issues {
        write_stderr_line(&t!("rules.check.issue", issue = issue))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(ExitCode::FAILURE)
}

/// Prints a managed script's rules, or `null` when absent.
fn command_rules_show(target: &RulesTarget, runtime: &Runtime) -> CliResult<ExitCode> {
    let handle = parse_handle(&target.handle)?;
    let rules = runtime
        .admin()
        .rules(target.catalog.into(), &handle)
        .map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
    write_json(&rules.map_or(Value::Null, |rules| rules.to_wire()))?;
    Ok(ExitCode::SUCCESS)
}

/// Replaces a managed script's rules, warning about lint findings.
fn command_rules_set(command: &RulesSetCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    let handle = parse_handle(&command.target.handle)?;
    let rules = read_rule_set(&command.rules)?;
    for issue in runtime.registry.lint(&rules) {
        write_stderr_line(&t!("rules.set.warning", issue = issue))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    let catalog: ManagedCatalog = command.target.catalog.into();
    runtime
        .admin()
        .replace_rules(catalog, &handle, rules, unix_now())
        .map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
    write_stdout_line(&t!("rules.set.ok", handle = handle, catalog = catalog.kind()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Clears a managed script's rules.
fn command_rules_clear(target: &RulesTarget, runtime: &Runtime) -> CliResult<ExitCode> {
    let handle = parse_handle(&target.handle)?;
    let catalog: ManagedCatalog = target.catalog.into();
    runtime
        .admin()
        .clear_rules(catalog, &handle, unix_now())
        .map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
    write_stdout_line(&t!("rules.clear.ok", handle = handle, catalog = catalog.kind()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Dispatches catalog subcommands.
fn command_catalog(command: CatalogCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    let admin = runtime.admin();
    let message = match command {
        CatalogCommand::List {
            catalog,
        } => {
            let encoded = match catalog {
                CatalogArg::Discovered => admin.discovered().map(|catalog| catalog.encode()),
                CatalogArg::Removed => admin.managed(ManagedCatalog::Removed).map(|catalog| catalog.encode()),
                CatalogArg::Manual => admin.managed(ManagedCatalog::Manual).map(|catalog| catalog.encode()),
            }
            .map_err(|err| CliError::new(t!("catalog.failed", error = err)))?
            .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
            write_json(&encoded)?;
            return Ok(ExitCode::SUCCESS);
        }
        CatalogCommand::Dequeue(arg) => {
            let handle = parse_handle(&arg.handle)?;
            admin.dequeue(&handle, unix_now()).map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("catalog.dequeue.ok", handle = handle)
        }
        CatalogCommand::Restore(arg) => {
            let handle = parse_handle(&arg.handle)?;
            admin.restore(&handle).map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("catalog.restore.ok", handle = handle)
        }
        CatalogCommand::Forget(arg) => {
            let handle = parse_handle(&arg.handle)?;
            admin.forget(&handle).map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("catalog.forget.ok", handle = handle)
        }
        CatalogCommand::ClearDiscovered => {
            let count = admin.clear_discovered().map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("catalog.clear_discovered.ok", count = count)
        }
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Manual Commands
// ============================================================================

/// Dispatches manual script subcommands.
fn command_manual(command: ManualCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    let admin = runtime.admin();
    let message = match command {
        ManualCommand::Add(args) => {
            let (handle, input) = manual_input(args)?;
            admin
                .register_manual(&handle, input, unix_now())
                .map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("manual.add.ok", handle = handle)
        }
        ManualCommand::Update(args) => {
            let (handle, input) = manual_input(args)?;
            admin
                .update_manual(&handle, input, unix_now())
                .map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("manual.update.ok", handle = handle)
        }
        ManualCommand::Delete(arg) => {
            let handle = parse_handle(&arg.handle)?;
            admin.delete_manual(&handle).map_err(|err| CliError::new(t!("catalog.failed", error = err)))?;
            t!("manual.delete.ok", handle = handle)
        }
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Converts manual script arguments into a handle and input.
fn manual_input(args: ManualScriptArgs) -> CliResult<(ScriptHandle, ManualScriptInput)> {
    let handle = parse_handle(&args.handle)?;
    Ok((
        handle,
        ManualScriptInput {
            src: args.src,
            version: args.version,
            deps: Dependencies::Csv(args.deps),
            in_footer: args.footer,
            strategy: args.strategy.into(),
        },
    ))
}

// ============================================================================
// SECTION: Render Command
// ============================================================================

/// Runs discovery, manual additions, and removals for one simulated render.
fn command_render(command: &RenderCommand, runtime: &Runtime) -> CliResult<ExitCode> {
    let context = read_context(&command.context)?;
    let queue_value = read_json_input(
        command.queue.queue.as_deref(),
        command.queue.queue_file.as_deref(),
        &t!("input.kind.queue"),
        MAX_QUEUE_BYTES,
    )?;
    let mut queue: InMemoryAssetQueue = serde_json::from_value(queue_value)
        .map_err(|err| CliError::new(t!("input.parse_failed", kind = t!("input.kind.queue"), error = err)))?;
    let now = unix_now();

    let mut discovered = Vec::new();
    if runtime.config.discovery.enabled {
        let resolver: Box<dyn MetadataResolver> = match runtime
            .config
            .metadata_resolver()
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?
        {
            Some(resolver) => Box::new(resolver),
            None => Box::new(NoMetadataResolver),
        };
        let recorder = DiscoveryRecorder::new(&runtime.store, &*resolver, runtime.audit.as_ref());
        let report = recorder
            .record_all(queue.observations(), now)
            .map_err(|err| CliError::new(t!("render.discovery_failed", error = err)))?;
        discovered = report.recorded;
    }

    let pipeline = ActivationPipeline::new(RuleMatcher::new(&runtime.registry), runtime.audit.as_ref());
    let report = pipeline
        .run(&runtime.store, &context, &mut queue)
        .map_err(|err| CliError::new(t!("render.failed", error = err)))?;

    if command.report {
        let skipped: Vec<Value> = report
            .skipped
            .iter()
            .map(|record| json!({"catalog": record.catalog, "key": record.key, "reason": record.reason}))
            .collect();
        write_json(&json!({
            "queue": queue,
            "report": {
                "discovered": discovered,
                "injected": report.injected,
                "removed": report.removed,
                "skipped": skipped,
            },
        }))?;
    } else {
        write_json(&queue)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a JSON value from an inline string or a size-limited file.
fn read_json_input(inline: Option<&str>, path: Option<&Path>, kind: &str, max_bytes: usize) -> CliResult<Value> {
    if let Some(json) = inline {
        if json.len() > max_bytes {
            return Err(CliError::new(t!(
                "input.read_too_large",
                kind = kind,
                path = "--inline",
                size = json.len(),
                limit = max_bytes
            )));
        }
        return serde_json::from_str(json)
            .map_err(|err| CliError::new(t!("input.parse_failed", kind = kind, error = err)));
    }
    let Some(path) = path else {
        return Err(CliError::new(t!("input.missing", kind = kind)));
    };
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!("input.read_too_large", kind = kind, path = path.display(), size = size, limit = limit)),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| CliError::new(t!("input.parse_failed", kind = kind, error = err)))
}

/// Reads raw rules JSON.
fn read_rules_value(input: &RulesInput) -> CliResult<Value> {
    read_json_input(input.rules.as_deref(), input.rules_file.as_deref(), &t!("input.kind.rules"), MAX_RULES_BYTES)
}

/// Reads a rule set that must be a JSON object.
fn read_rule_set(input: &RulesInput) -> CliResult<RuleSet> {
    let value = read_rules_value(input)?;
    RuleSet::from_wire(&value).map_err(|err| CliError::new(t!("rules.invalid", error = err)))
}

/// Reads a request context.
fn read_context(input: &ContextInput) -> CliResult<RequestContext> {
    let kind = t!("input.kind.context");
    let value = read_json_input(input.context.as_deref(), input.context_file.as_deref(), &kind, MAX_CONTEXT_BYTES)?;
    serde_json::from_value(value).map_err(|err| CliError::new(t!("input.parse_failed", kind = kind, error = err)))
}

/// Parses a script handle argument.
fn parse_handle(raw: &str) -> CliResult<ScriptHandle> {
    ScriptHandle::parse(raw).map_err(|err| CliError::new(t!("handle.invalid", handle = raw, error = err)))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
