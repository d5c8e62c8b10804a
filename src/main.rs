mod cli;

use prerollforge::config::{self, Config};
use prerollforge_av::{EncodingEngine, FfmpegEngine, MemoryEngine, ToolRegistry};
use prerollforge_timeline::{
    FontResource, GenerateOptions, OutputArtifact, PrerollGenerator, PrerollParameters,
    ProgressSender, RawPrerollInput,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, GenerateArgs};
use std::path::Path;
use std::sync::Arc;

/// Exit status for rejected preroll parameters, matching clap's usage errors.
const EXIT_INVALID_INPUT: i32 = 2;

/// Whether `err` was raised by parameter validation, before any encoder work.
fn is_invalid_input(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<prerollforge_common::Error>())
        .any(prerollforge_common::Error::is_validation)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "prerollforge=trace,prerollforge_timeline=trace,prerollforge_av=trace,prerollforge_common=debug".to_string()
        } else {
            "prerollforge=info,prerollforge_timeline=info,prerollforge_av=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(generate(args, cli.config.as_deref()));
            if let Err(ref e) = result {
                if is_invalid_input(e) {
                    eprintln!("Error: {e:#}");
                    std::process::exit(EXIT_INVALID_INPUT);
                }
            }
            result
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("prerollforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn generate(args: GenerateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let raw = RawPrerollInput {
        frame_rate: args
            .frame_rate
            .unwrap_or_else(|| config.defaults.frame_rate.clone()),
        resolution: args
            .resolution
            .unwrap_or_else(|| config.defaults.resolution.clone()),
        film_title: args.title,
        version: args.version_text,
        timecode: args
            .timecode
            .unwrap_or_else(|| config.defaults.timecode.clone()),
    };
    let params = PrerollParameters::validate(raw).context("Invalid preroll parameters")?;
    tracing::debug!("Parameters: {:?}", params);

    let mut options = GenerateOptions::default()
        .with_audio(config.render.include_audio && !args.no_audio)
        .with_profile(args.profile.unwrap_or(config.render.profile));

    match config::resolve_font(args.font.as_deref(), &config.render)? {
        Some(path) => {
            tracing::info!("Using font {:?}", path);
            let font = FontResource::load(&path)
                .await
                .with_context(|| format!("Failed to read font {:?}", path))?;
            options = options.with_font(font);
        }
        None => tracing::warn!("No font found, ffmpeg will use its default font"),
    }

    if !args.json {
        options = options.with_progress(ProgressSender::new(|pct, step| {
            eprintln!("[{:>3.0}%] {}", pct, step);
        }));
    }

    if args.dry_run {
        return dry_run(&params, &options, args.json).await;
    }

    let engine: Arc<dyn EncodingEngine> = Arc::new(FfmpegEngine::new(config.tools.clone()));
    let generator = PrerollGenerator::new(engine);
    generator
        .initialize()
        .await
        .context("Failed to initialize the ffmpeg engine")?;

    let artifact = generator
        .generate(&params, &options)
        .await
        .context("Preroll generation failed")?;

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.output.directory.clone());
    let path = artifact.write_to(&output_dir).await?;

    if args.json {
        print_json(&artifact, Some(path.as_path()), None)?;
    } else {
        println!("Preroll written: {}", path.display());
        println!("  Frame rate: {} fps", params.frame_rate);
        println!("  Resolution: {}", params.resolution);
        println!("  Timecode: {}", params.timecode);
        println!("  Size: {} bytes", artifact.len());
    }

    Ok(())
}

async fn dry_run(params: &PrerollParameters, options: &GenerateOptions, json: bool) -> Result<()> {
    let engine = Arc::new(MemoryEngine::new());
    let generator = PrerollGenerator::new(engine.clone());
    generator.initialize().await?;
    let artifact = generator.generate(params, options).await?;
    let commands = engine.operations();

    if json {
        print_json(&artifact, None, Some(commands.as_slice()))?;
    } else {
        println!("[DRY RUN] {} encoder operations:", commands.len());
        for (i, args) in commands.iter().enumerate() {
            println!("  {}. ffmpeg {}", i + 1, FfmpegEngine::command_line(args).join(" "));
        }
        println!("\nWould write: {}", artifact.suggested_file_name);
    }
    Ok(())
}

fn print_json(
    artifact: &OutputArtifact,
    path: Option<&Path>,
    commands: Option<&[Vec<String>]>,
) -> Result<()> {
    let value = serde_json::json!({
        "suggested_file_name": artifact.suggested_file_name,
        "media_type": artifact.media_type,
        "bytes": artifact.len(),
        "path": path,
        "dry_run": commands.is_some(),
        "commands": commands,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to render prerolls.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    print_config_summary(&config);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}

fn print_config_summary(config: &Config) {
    println!(
        "  ffmpeg: {}",
        config
            .tools
            .ffmpeg_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "PATH lookup".into())
    );
    println!("  Timeout: {}s", config.tools.timeout_secs);
    println!("  Profile: {}", config.render.profile);
    println!("  Audio: {}", config.render.include_audio);
    println!("  Output directory: {}", config.output.directory.display());
    println!(
        "  Defaults: {} fps, {}, timecode {}",
        config.defaults.frame_rate, config.defaults.resolution, config.defaults.timecode
    );
}
