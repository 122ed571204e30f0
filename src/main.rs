use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use log::info;
use shader_forge::{container, glsl_template, repair::RepairOptions, validation};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Body,
    #[default]
    Fragment,
    Vertex,
}

#[derive(Debug, Default, Clone)]
struct Cli {
    shader_json: Option<PathBuf>,
    emit: Emit,
    validate: bool,
    output: Option<PathBuf>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--emit" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --emit"));
                };
                cli.emit = match v.as_str() {
                    "body" => Emit::Body,
                    "fragment" => Emit::Fragment,
                    "vertex" => Emit::Vertex,
                    other => {
                        return Err(anyhow!(
                            "unknown --emit value: {other} (supported: body, fragment, vertex)"
                        ));
                    }
                };
                i += 2;
            }
            "--validate" => {
                cli.validate = true;
                i += 1;
            }
            "--output" | "-o" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --output"));
                };
                cli.output = Some(PathBuf::from(v));
                i += 2;
            }
            other if other.starts_with('-') => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: [<shader.json>], --emit body|fragment|vertex, --validate, --output <path>)"
                ));
            }
            other => {
                if cli.shader_json.is_some() {
                    return Err(anyhow!("more than one shader container given: {other}"));
                }
                cli.shader_json = Some(PathBuf::from(other));
                i += 1;
            }
        }
    }
    Ok(cli)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,shader_forge=info"),
    )
    .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;

    let shader = match cli.shader_json.as_deref() {
        Some(path) => container::load_container_from_path(path)?,
        None => container::load_container_from_default_asset()?,
    };

    let prepared = glsl_template::prepare_container(&shader, &RepairOptions::default())?;
    info!(
        "repaired pass '{}' with {} rewrites",
        prepared.pass_name,
        prepared.report.total()
    );

    if cli.validate {
        validation::validate_repaired_body(&prepared.body)?;
        info!("repaired body passed offline validation");
    }

    let text = match cli.emit {
        Emit::Body => prepared.body,
        Emit::Fragment => prepared.sources.fragment,
        Emit::Vertex => prepared.sources.vertex,
    };

    match cli.output {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{text}"),
    }

    Ok(())
}
