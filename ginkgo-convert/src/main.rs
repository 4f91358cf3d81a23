//! ginkgo-convert CLI

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use ginkgo_convert::error::report_error;
use ginkgo_convert::{ConvertConfig, ConvertError, ScaffoldKind};
use std::path::Path;

#[derive(Parser)]
#[command(
    name = "ginkgo-convert",
    version,
    about = "Rewrite xUnit-style Go tests as Ginkgo specs"
)]
struct Cli {
    /// Package directory or import path to convert, including subpackages
    package: String,

    /// Overwrite test files in place instead of writing *_ginkgo_test.go files
    #[arg(long)]
    destructive: bool,

    /// Create a <package>_suite_test.go in every package that lacks one
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    create_suite: bool,

    /// How suite files are created
    #[arg(long, value_enum, default_value_t = ScaffoldKind::Ginkgo)]
    scaffold: ScaffoldKind,

    /// Parse the discovered test files and dump their trees as JSON
    #[arg(long)]
    dump_ast: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        "ginkgo_convert=info"
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Usage errors exit with 1 like every other failure; help and version
/// requests succeed.
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                eprintln!("{e}");
            }
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

fn main() {
    let cli = parse_args();
    init_tracing();

    let config = ConvertConfig::new()
        .destructive(cli.destructive)
        .create_suite(cli.create_suite)
        .scaffold(cli.scaffold);

    let result = if cli.dump_ast {
        dump_ast(&cli.package, &config)
    } else {
        convert(&cli.package, &config)
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

fn convert(package: &str, config: &ConvertConfig) -> Result<(), ConvertError> {
    let provisioner = ginkgo_convert::scaffold::provisioner_for(config.scaffold);
    let summary = ginkgo_convert::convert_package(package, config, provisioner.as_ref())?;
    for output in &summary.converted {
        println!("{}", output.display());
    }
    Ok(())
}

fn dump_ast(package: &str, config: &ConvertConfig) -> Result<(), ConvertError> {
    let root = ginkgo_convert::package::resolve_package(package)?;
    let config = config.clone().create_suite(false);
    let provisioner = ginkgo_convert::scaffold::provisioner_for(config.scaffold);
    let files = ginkgo_convert::package::PackageWalker::new(&config, provisioner.as_ref())
        .walk(&root)?;

    for path in files {
        let (_, file) = ginkgo_convert::convert::load_file(&path)?;
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| ConvertError::internal(format!("cannot serialize tree: {e}")))?;
        println!("// {}\n{json}", path.display());
    }
    Ok(())
}

/// Errors tied to a file are drawn against that file's source
fn report(error: &ConvertError) {
    match error {
        ConvertError::InFile { path, .. } => {
            let filename = path.display().to_string();
            match std::fs::read_to_string(Path::new(path)) {
                Ok(source) => report_error(&filename, &source, error),
                Err(_) => eprintln!("Error: {error}"),
            }
        }
        _ => eprintln!("Error: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_suite_defaults_to_true() {
        let cli = Cli::try_parse_from(["ginkgo-convert", "pkg"]).expect("parse");
        assert!(cli.create_suite);
        assert_eq!(cli.package, "pkg");
    }

    #[test]
    fn test_bare_create_suite_flag() {
        let cli = Cli::try_parse_from(["ginkgo-convert", "--create-suite", "pkg"]).expect("parse");
        assert!(cli.create_suite);
        assert_eq!(cli.package, "pkg");
    }

    #[test]
    fn test_create_suite_with_value() {
        let cli =
            Cli::try_parse_from(["ginkgo-convert", "--create-suite=false", "pkg"]).expect("parse");
        assert!(!cli.create_suite);
    }

    #[test]
    fn test_usage_errors() {
        let missing = Cli::try_parse_from(["ginkgo-convert"]).err().map(|e| e.kind());
        assert_eq!(missing, Some(ErrorKind::MissingRequiredArgument));

        assert!(Cli::try_parse_from(["ginkgo-convert", "a", "b"]).is_err());
    }
}
