use clap::Parser;
use std::path::Path;
use tidy_etl::core::session::upload_message;
use tidy_etl::core::Storage;
use tidy_etl::utils::logger;
use tidy_etl::{
    CleaningOperation, CleaningSession, EtlError, ExportFormat, InterpolationBoundary,
    LocalStorage,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "clean-shell")]
#[command(about = "Interactive data cleaning session: upload, inspect, clean, download")]
struct Args {
    /// Directory that receives downloaded files
    #[arg(long, default_value = "./output")]
    output_path: String,

    /// Repeat the last value over trailing gaps when interpolating
    #[arg(long)]
    fill_trailing: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Upload(String),
    Summary,
    Clean(CleaningOperation, ExportFormat),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err(String::new());
    };

    match head {
        "upload" => {
            let path: Vec<&str> = parts.collect();
            if path.is_empty() {
                Err("usage: upload <path>".to_string())
            } else {
                Ok(Command::Upload(path.join(" ")))
            }
        }
        "summary" => Ok(Command::Summary),
        "clean" => {
            let operation = parts
                .next()
                .ok_or_else(|| "usage: clean <operation> [csv|xlsx]".to_string())?
                .parse::<CleaningOperation>()
                .map_err(|e| e.to_string())?;
            let format = match parts.next() {
                Some(f) => f.parse::<ExportFormat>().map_err(|e| e.to_string())?,
                None => ExportFormat::Csv,
            };
            Ok(Command::Clean(operation, format))
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  upload <path>                    load a .csv or .xlsx file");
    println!("  summary                          show the basic summary again");
    println!("  clean <operation> [csv|xlsx]     clean and download the result");
    println!("      operations: remove-missing, handle-missing, remove-duplicates");
    println!("  help                             show this message");
    println!("  quit                             leave the session");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let boundary = if args.fill_trailing {
        InterpolationBoundary::CarryForward
    } else {
        InterpolationBoundary::LeaveMissing
    };
    let mut session = CleaningSession::with_boundary(boundary);
    let storage = LocalStorage::new(args.output_path.clone());

    println!("🧹 Data Cleaning Application");
    println!("{}", EtlError::NoDatasetError.user_friendly_message());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) if message.is_empty() => continue,
            Err(message) => {
                eprintln!("❌ {}", message);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Upload(path) => {
                let filename = Path::new(&path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(&path)
                    .to_string();
                let uploaded = match storage.read_file(&path).await {
                    Ok(bytes) => session.upload(&bytes, &filename),
                    Err(e) => Err(e),
                };
                match uploaded {
                    Ok(report) => {
                        println!("✅ {}", upload_message(&filename));
                        println!();
                        println!("{}", report);
                    }
                    Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
                }
            }
            Command::Summary => match session.summary() {
                Ok(report) => println!("{}", report),
                Err(e) => println!("{}", e.user_friendly_message()),
            },
            Command::Clean(operation, format) => {
                let file = match session.download(operation, format) {
                    Ok(file) => file,
                    Err(e) => {
                        eprintln!("❌ {}", e.user_friendly_message());
                        continue;
                    }
                };
                match storage.write_file(&file.filename, &file.bytes).await {
                    Ok(()) => {
                        println!("✅ {}", operation.success_message());
                        println!(
                            "📁 Download saved to: {}/{} ({})",
                            storage.base_path(),
                            file.filename,
                            file.content_type
                        );
                    }
                    Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
                }
            }
        }
    }

    Ok(())
}
