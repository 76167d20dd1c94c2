use std::env::args_os;
use std::process::ExitCode;

use huffman_compressor::{run, CLIParser};

fn main() -> ExitCode {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    let reports = match run(&arguments) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Processing failed because of: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut failures = 0;
    for report in reports {
        match report.result {
            Ok((output_file, info)) => {
                print!(
                    "{} -> {} ({} -> {} bytes",
                    report.input_file.display(),
                    output_file.display(),
                    info.input_size,
                    info.output_size
                );
                match (info.bit_count, info.padding_bits()) {
                    (Some(bits), Some(padding)) => {
                        println!(", {} payload bits, {} padding bits)", bits, padding)
                    }
                    _ => println!(")"),
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} failed because of: {}", report.input_file.display(), e);
            }
        }
    }
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
