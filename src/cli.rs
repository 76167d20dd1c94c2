use crate::container::Format;
use crate::huffman::SymbolSet;
use crate::Arguments;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_files_argument(command);
        let command = Self::register_output_directory_argument(command);
        let command = Self::register_staging_directory_argument(command);
        let command = Self::register_threads_argument(command);
        let command = Self::register_alphabet_argument(command);
        let command = Self::register_format_argument(command);
        Self::register_decompress_argument(command)
    }

    fn register_input_files_argument(command: Command) -> Command {
        command.arg(Self::create_input_files_argument())
    }

    fn register_output_directory_argument(command: Command) -> Command {
        command.arg(Self::create_output_directory_argument())
    }

    fn register_staging_directory_argument(command: Command) -> Command {
        command.arg(Self::create_staging_directory_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn register_alphabet_argument(command: Command) -> Command {
        command.arg(Self::create_alphabet_argument())
    }

    fn register_format_argument(command: Command) -> Command {
        command.arg(Self::create_format_argument())
    }

    fn register_decompress_argument(command: Command) -> Command {
        command.arg(Self::create_decompress_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_files_argument() -> Arg {
        Arg::new("input_files")
            .help("Paths of the files to process")
            .value_parser(value_parser!(PathBuf))
            .num_args(1..)
            .required(true)
    }

    fn create_output_directory_argument() -> Arg {
        arg!(output_directory: -o --output_directory <DIR> "Directory receiving the results")
            .default_value(".")
            .value_parser(value_parser!(PathBuf))
    }

    fn create_staging_directory_argument() -> Arg {
        arg!(staging_directory: -s --staging_directory <DIR> "Directory for staged uploads, wiped on start")
            .default_value("./staging")
            .value_parser(value_parser!(PathBuf))
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn create_alphabet_argument() -> Arg {
        arg!(alphabet: -a --alphabet <ALPHABET> "Symbols that become leaves of the huffman tree")
            .default_value("Full")
            .value_parser(value_parser!(SymbolSet))
    }

    fn create_format_argument() -> Arg {
        arg!(format: -f --format <FORMAT> "Layout of the compressed file")
            .default_value("Raw")
            .value_parser(value_parser!(Format))
    }

    fn create_decompress_argument() -> Arg {
        arg!(decompress: -d --decompress "Restore framed files instead of compressing")
            .action(ArgAction::SetTrue)
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_files: Self::extract_input_files_argument(matches),
            output_directory: Self::extract_output_directory_argument(matches),
            staging_directory: Self::extract_staging_directory_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
            symbol_set: Self::extract_alphabet_argument(matches),
            format: Self::extract_format_argument(matches),
            decompress: Self::extract_decompress_argument(matches),
        }
    }

    fn extract_input_files_argument(matches: &ArgMatches) -> Vec<PathBuf> {
        matches
            .get_many::<PathBuf>("input_files")
            .expect("Required argument input_files not provided")
            .cloned()
            .collect()
    }

    fn extract_output_directory_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("output_directory")
            .expect("Output directory must be provided, but was unset.")
            .clone()
    }

    fn extract_staging_directory_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("staging_directory")
            .expect("Staging directory must be provided, but was unset.")
            .clone()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }

    fn extract_alphabet_argument(matches: &ArgMatches) -> SymbolSet {
        matches
            .get_one::<SymbolSet>("alphabet")
            .expect("Alphabet must be provided, but was unset.")
            .to_owned()
    }

    fn extract_format_argument(matches: &ArgMatches) -> Format {
        matches
            .get_one::<Format>("format")
            .expect("Format must be provided, but was unset.")
            .to_owned()
    }

    fn extract_decompress_argument(matches: &ArgMatches) -> bool {
        matches.get_flag("decompress")
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}
