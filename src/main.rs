use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use component_registry::error::EnhancedError;
use component_registry::registry::{
    ComponentList, ContractOutcome, PreflightOutcome, ProvenOutcome, RegisterOutcome,
    SandboxOutcome, StatusReport, ValidationOutcome,
};
use component_registry::server::{handlers, tools, McpServer};
use component_registry::{
    storage, ComponentSpec, ComponentStatus, IntegrationPlan, RegisterMode, Registry,
    RegistryConfig, RegistryError,
};

#[derive(Parser)]
#[command(name = "component-registry")]
#[command(
    about = "Component registry with namespace conflict detection, \
             dependency resolution and lifecycle tracking",
    version
)]
#[command(after_help = "Component Registry:
- Registers components with a unique CSS namespace each
- Validates integration into a target file (markers, collisions, dependencies)
- Tracks lifecycle: registered -> validated -> proven
- Runs pre-flight checks before integration
- Serves the same operations as MCP tools over stdio (default command)

Environment:
   COMPONENT_REGISTRY_ROOT, COMPONENT_REGISTRY_FILE, COMPONENT_REGISTRY_TARGET, RUST_LOG")]
struct Cli {
    /// Registry root directory
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Registry document path (overrides config)
    #[arg(long, global = true, value_name = "FILE")]
    registry_file: Option<PathBuf>,

    /// Print raw JSON results
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP tools over stdin/stdout
    Serve,

    /// Create the registry directories and an empty registry
    Init,

    /// List the MCP tools the server exposes
    Tools,

    #[command(flatten)]
    Registry(RegistryCommand),
}

/// Commands that operate on an opened registry
#[derive(Subcommand)]
enum RegistryCommand {
    /// Register a component
    Register {
        name: String,

        /// CSS namespace, e.g. .c-header
        namespace: String,

        #[arg(short, long)]
        filepath: Option<PathBuf>,

        /// Dependency (repeatable)
        #[arg(short = 'd', long = "dep", value_name = "NAME")]
        deps: Vec<String>,

        /// Replace an existing record with the same name
        #[arg(long)]
        upsert: bool,
    },

    /// List registered components
    List,

    /// Show one component
    Status { name: String },

    /// Validate integration into a target file
    Validate { name: String, target: PathBuf },

    /// Show the integration plan for a target file
    Plan { name: String, target: PathBuf },

    /// Validate a component contract document
    Contract {
        name: String,

        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Run all pre-flight checks
    Preflight {
        name: String,

        #[arg(short, long)]
        target: Option<PathBuf>,
    },

    /// Check for a sandbox test
    Sandbox { name: String },

    /// Mark a validated component as proven
    Prove { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol when serving, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "component_registry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = RegistryConfig::load(cli.root)?;
    if let Some(file) = cli.registry_file {
        config.registry_file = file;
    }

    let json = cli.json;
    let command = cli.command.unwrap_or(Commands::Serve);

    match run(command, config, json).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => match e.downcast_ref::<RegistryError>() {
            Some(err) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&handlers::failure(err))?);
                } else {
                    eprint!("{}", EnhancedError::new(err).display().red());
                }
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

/// Run one command. `Ok(false)` means the operation completed but did not pass.
async fn run(command: Commands, config: RegistryConfig, json: bool) -> Result<bool> {
    match command {
        Commands::Serve => {
            let registry = Registry::open(config).await?;
            McpServer::new(registry).run_stdio().await?;
            Ok(true)
        }

        Commands::Init => {
            println!("{}", "🚀 Initializing component registry...".cyan().bold());
            storage::init(&config).await?;
            println!(
                "{} Registry ready at {}",
                "✓".green(),
                config.registry_file.display().to_string().bright_white()
            );
            println!("\n{}", "Next steps:".yellow());
            println!(
                "  1. {} - Register a component",
                "component-registry register <name> <namespace>".bright_white()
            );
            println!(
                "  2. {} - Check it against a target",
                "component-registry validate <name> <target>".bright_white()
            );
            println!(
                "  3. {} - Serve the MCP tools",
                "component-registry serve".bright_white()
            );
            Ok(true)
        }

        Commands::Tools => {
            let tools = tools::get_tools();
            if json {
                println!("{}", serde_json::to_string_pretty(&tools)?);
            } else {
                for tool in &tools {
                    println!("{}  {}", tool.name.bright_yellow(), tool.description.dimmed());
                }
            }
            Ok(true)
        }

        Commands::Registry(command) => {
            let mut registry = Registry::open(config).await?;
            dispatch(&mut registry, command, json).await
        }
    }
}

async fn dispatch(registry: &mut Registry, command: RegistryCommand, json: bool) -> Result<bool> {
    match command {
        RegistryCommand::Register {
            name,
            namespace,
            filepath,
            deps,
            upsert,
        } => {
            let mut spec = ComponentSpec::new(name, namespace).with_dependencies(deps);
            spec.filepath = filepath;
            let mode = upsert.then_some(RegisterMode::Upsert);
            let out = registry.register_component(spec, mode).await?;
            emit(json, &out, print_register)
        }

        RegistryCommand::List => {
            let out = registry.list_components();
            emit(json, &out, print_list)
        }

        RegistryCommand::Status { name } => {
            let out = registry.component_status(&name).await?;
            emit(json, &out, print_status)
        }

        RegistryCommand::Validate { name, target } => {
            let out = registry.validate_integration(&name, &target).await?;
            emit(json, &out, print_validation)
        }

        RegistryCommand::Plan { name, target } => {
            let plan = registry.integration_plan(&name, &target).await?;
            emit(json, &plan, print_plan)
        }

        RegistryCommand::Contract { name, path } => {
            let out = registry.validate_contract(&name, path.as_deref()).await?;
            emit(json, &out, print_contract)
        }

        RegistryCommand::Preflight { name, target } => {
            let out = registry.run_preflight_checks(&name, target.as_deref()).await?;
            emit(json, &out, print_preflight)
        }

        RegistryCommand::Sandbox { name } => {
            let out = registry.test_in_sandbox(&name).await?;
            emit(json, &out, print_sandbox)
        }

        RegistryCommand::Prove { name } => {
            let out = registry.mark_as_proven(&name).await?;
            emit(json, &out, print_proven)
        }
    }
}

/// Print `value` as JSON or through `human`, returning whether it passed
fn emit<T: Serialize>(json: bool, value: &T, human: fn(&T) -> bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
        let v = serde_json::to_value(value)?;
        Ok(v.get("success").and_then(|s| s.as_bool()).unwrap_or(true))
    } else {
        Ok(human(value))
    }
}

fn status_label(status: ComponentStatus) -> ColoredString {
    match status {
        ComponentStatus::Registered => status.to_string().yellow(),
        ComponentStatus::Validated => status.to_string().blue(),
        ComponentStatus::Proven => status.to_string().green(),
    }
}

fn warn_persistence(warning: &Option<String>) {
    if let Some(w) = warning {
        println!("{} Registry not saved: {}", "⚠".yellow(), w);
    }
}

fn print_register(out: &RegisterOutcome) -> bool {
    println!("{} {}", "✓".green(), out.message);
    println!("  Namespace: {}", out.component.css_namespace.bright_yellow());
    println!(
        "  Path: {} {}",
        out.path.display(),
        if out.files_exist { "(exists)".green() } else { "(missing)".dimmed() }
    );
    if !out.component.dependencies.is_empty() {
        println!("  Depends on: {}", out.component.dependencies.join(", "));
    }
    warn_persistence(&out.persistence_warning);
    true
}

fn print_list(out: &ComponentList) -> bool {
    if out.components.is_empty() {
        println!("{}", "No components registered".dimmed());
        return true;
    }

    println!("{}", format!("📦 {} component(s)", out.total).cyan().bold());
    for c in &out.components {
        println!(
            "  {:<24} {:<24} {}",
            c.name.bright_white(),
            c.css_namespace.bright_yellow(),
            status_label(c.status)
        );
    }
    true
}

fn print_status(out: &StatusReport) -> bool {
    let c = &out.component;
    println!("{} {}", "📦".cyan(), c.name.bright_white().bold());
    println!("  Namespace:  {}", c.css_namespace.bright_yellow());
    println!("  Status:     {}", status_label(c.status));
    println!("  Validated:  {}", c.validated);
    println!("  Integrated: {}", c.integrated);
    println!(
        "  Path:       {} {}",
        c.filepath.display(),
        if out.files_exist { "(exists)".green() } else { "(missing)".dimmed() }
    );
    if !c.dependencies.is_empty() {
        println!("  Depends on: {}", c.dependencies.join(", "));
    }
    println!("  Registered: {}", c.registered_at.to_rfc3339());
    if let Some(at) = c.validated_at {
        println!("  Validated at:  {}", at.to_rfc3339());
    }
    if let Some(at) = c.integrated_at {
        println!("  Integrated at: {}", at.to_rfc3339());
    }
    true
}

fn print_validation(out: &ValidationOutcome) -> bool {
    if out.valid {
        println!("{} {}", "✓".green(), out.reason);
    } else {
        println!("{} {}", "✗".red(), "Integration is not safe".red().bold());
        for e in &out.errors {
            println!("  {} {}", "•".red(), e);
        }
    }
    for w in &out.warnings {
        println!("  {} {}", "⚠".yellow(), w);
    }
    if !out.injection_points.is_empty() {
        println!("  Injection points:");
        for m in &out.injection_points {
            println!("    {}", m.bright_blue());
        }
    }
    warn_persistence(&out.persistence_warning);
    out.valid
}

fn print_plan(plan: &IntegrationPlan) -> bool {
    println!(
        "{}",
        format!("🧭 Integration plan: {} → {}", plan.component_name, plan.target_file.display())
            .cyan()
            .bold()
    );
    println!("  Namespace: {}", plan.css_namespace.bright_yellow());
    if let Some(err) = &plan.target_error {
        println!("  {} {}", "⚠".yellow(), err);
    }
    println!("  Markers:");
    for m in &plan.injection_points {
        let mark = if plan.existing_markers.contains(m) { "✓".green() } else { "✗".red() };
        println!("    {} {}", mark, m);
    }
    if !plan.unresolved_dependencies.is_empty() {
        println!("  Unresolved: {}", plan.unresolved_dependencies.join(", ").red());
    }
    println!("  Steps:");
    for (i, step) in plan.integration_steps.iter().enumerate() {
        println!("    {}. {}", i + 1, step);
    }
    true
}

fn print_contract(out: &ContractOutcome) -> bool {
    let mark = if out.success { "✓".green() } else { "✗".red() };
    println!("{} {}", mark, out.reason);
    println!("  Contract: {}", out.contract_path.display());
    println!("  Sections: {}", out.sections);
    if let Some(ns) = &out.declared_namespace {
        println!("  Declared namespace: {}", ns.bright_yellow());
    }
    out.success
}

fn print_preflight(out: &PreflightOutcome) -> bool {
    let check = |passed: bool| if passed { "✓".green() } else { "✗".red() };
    println!("{}", "🔍 Pre-flight checks".cyan().bold());
    println!("  {} files exist", check(out.checks.exists));
    println!("  {} tests present", check(out.checks.tests));
    println!("  {} contract valid", check(out.checks.contract));
    println!(
        "  {} integration safe ({})",
        check(out.checks.integration),
        out.target_file.display()
    );
    println!();
    if out.success {
        println!("{} {}", "✓".green(), out.reason);
    } else {
        for e in &out.errors {
            println!("  {} {}", "•".red(), e);
        }
    }
    out.success
}

fn print_sandbox(out: &SandboxOutcome) -> bool {
    if out.success {
        if let Some(msg) = &out.message {
            println!("{} {}", "✓".green(), msg);
        }
        println!("  {}", out.path.display().to_string().bright_blue());
        for (i, step) in out.instructions.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    } else {
        if let Some(reason) = &out.reason {
            println!("{} {}", "✗".red(), reason);
        }
        if let Some(s) = &out.suggestion {
            println!("  {}", s.dimmed());
        }
    }
    out.success
}

fn print_proven(out: &ProvenOutcome) -> bool {
    println!("{} {}", "✓".green(), out.message);
    println!("  Status: {}", status_label(out.status));
    if let Some(path) = &out.metadata_path {
        println!("  Metadata: {}", path.display());
    }
    for w in &out.warnings {
        println!("  {} {}", "⚠".yellow(), w);
    }
    warn_persistence(&out.persistence_warning);
    true
}
