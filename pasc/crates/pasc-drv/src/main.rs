use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Compilador de Pascal para a máquina virtual de pilha (SVM).
#[derive(Parser)]
#[command(name = "pasc", version, about)]
struct Cli {
    /// Ficheiro fonte Pascal a compilar.
    file: PathBuf,

    /// Ficheiro de saída (por omissão, o fonte com extensão `.vm`).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            // Diagnostics go to stdout, in Portuguese.
            println!("{message}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    if !cli.file.is_file() {
        return Err(format!(
            "Erro: o ficheiro '{}' não existe.",
            cli.file.display()
        ));
    }

    let source = fs::read_to_string(&cli.file).map_err(|e| {
        format!(
            "Erro: não foi possível ler o ficheiro '{}': {e}",
            cli.file.display()
        )
    })?;

    let code = pasc_drv::compile_source(&source).map_err(|e| e.to_string())?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| pasc_drv::default_output_path(&cli.file));
    pasc_drv::write_output(&output, &code).map_err(|e| {
        format!(
            "Erro: não foi possível escrever o ficheiro '{}': {e}",
            output.display()
        )
    })?;

    tracing::info!(output = %output.display(), "compilation finished");
    Ok(())
}
