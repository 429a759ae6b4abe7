//! Minimal CLI: unify → (model | summary)
use std::path::{Path, PathBuf};

use anyhow::Context;
use api_unify::{Error, SourceFile, UnifiedInterface, UnifiedModel, UnifyConfig};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// unify mobile (UI) and desktop (NS) Objective-C headers into a platform-neutral (MAI) model
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// unify and print the model as JSON
    Model(ModelOut),
    /// unify and print a per-interface summary
    Summary(SummaryOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// Mobile headers. Literal paths, directories (every `*.h` inside) or quoted glob patterns
    #[arg(long, num_args = 1.., required = true)]
    mobile: Vec<String>,

    /// Desktop headers. Same forms as `--mobile`
    #[arg(long, num_args = 1.., required = true)]
    desktop: Vec<String>,

    /// JSON file overriding substitution tables
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ModelOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SummaryOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// list member names under each interface
    #[arg(long, default_value_t = false)]
    members: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_config(&self) -> anyhow::Result<UnifyConfig> {
        match self.config.as_ref() {
            Some(path) => Ok(UnifyConfig::load(path)?),
            None => Ok(UnifyConfig::default()),
        }
    }

    fn unify(&self) -> anyhow::Result<UnifiedModel> {
        let config = self.load_config()?;
        let mobile = load_sources(&self.mobile).context("failed to load mobile headers")?;
        let desktop = load_sources(&self.desktop).context("failed to load desktop headers")?;
        Ok(api_unify::unify_sources(mobile, desktop, &config))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Model(target) => {
                let model = target.input_settings.unify()?;
                let model_src = serde_json::to_string_pretty(&model)?;
                match target.out.as_ref() {
                    Some(out) => write_output(out, &model_src)?,
                    None => println!("{model_src}"),
                }
            }
            Command::Summary(target) => {
                let model = target.input_settings.unify()?;
                print_summary(&model, target.members);
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

fn load_sources(patterns: &[String]) -> api_unify::Result<Vec<SourceFile>> {
    resolve_file_path_patterns(patterns)?
        .into_iter()
        .map(|path| {
            let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            Ok(SourceFile::new(path.to_string_lossy(), text))
        })
        .collect()
}

fn resolve_file_path_patterns<I>(patterns: I) -> api_unify::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let raw = raw.as_ref();
        // a directory stands for the headers directly inside it
        let pattern = if Path::new(raw).is_dir() {
            format!("{}/*.h", raw.trim_end_matches('/'))
        } else {
            raw.to_string()
        };

        if has_glob_chars(&pattern) {
            let entries = glob::glob(&pattern).map_err(|e| Error::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            let mut matched_any = false;
            for entry in entries {
                let path = entry.map_err(|e| Error::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                return Err(Error::NoMatches(pattern));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

fn print_summary(model: &UnifiedModel, members: bool) {
    println!("{}", "classes".bold().underline());
    for (name, class) in &model.classes {
        print_interface(model, name, class, members);
    }
    println!("{}", "protocols".bold().underline());
    for (name, protocol) in &model.protocols {
        print_interface(model, name, protocol, members);
    }
    println!("{}", "enumerations".bold().underline());
    for (name, enumeration) in &model.enums {
        println!(
            "  {} {} {}",
            name.cyan().bold(),
            enumeration.underlying.to_string().dimmed(),
            format!("{} members", enumeration.members.len()).green()
        );
    }
    println!(
        "{} classes, {} protocols, {} enumerations",
        model.classes.len().to_string().bold(),
        model.protocols.len().to_string().bold(),
        model.enums.len().to_string().bold()
    );
}

fn print_interface(model: &UnifiedModel, name: &str, interface: &UnifiedInterface, members: bool) {
    let descriptor = &interface.descriptor;
    let origin = format!("{} / {}", interface.mobile_name, interface.desktop_name);
    let superclass = descriptor
        .superclass()
        .map(|s| format!(" : {s}"))
        .unwrap_or_default();
    println!(
        "  {}{} {} {}",
        name.cyan().bold(),
        superclass,
        origin.dimmed(),
        format!(
            "{} methods, {} properties, {} protocols",
            descriptor.methods.len(),
            descriptor.properties.len(),
            descriptor.protocols.len()
        )
        .green()
    );
    if !members {
        return;
    }
    for method in descriptor.methods.values() {
        println!("    {method}");
    }
    for property in descriptor.properties.values() {
        println!("    {property}");
    }
    let adopted = model.importable_protocols(descriptor);
    if !adopted.is_empty() {
        println!("    {}", format!("<{}>", adopted.join(", ")).yellow());
    }
}
