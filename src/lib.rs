use std::{
    collections::HashSet,
    ffi::{OsStr, OsString},
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    iter,
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
};

pub use cli::CLIParser;
use compressor::Compressor;
use container::Format;
pub use error::Error;
use huffman::SymbolSet;
use service::{CompressionInfo, CompressionService};
use storage::{DirectoryStorage, Storage};
use threadpool::ThreadPool;

pub mod binary_stream;
mod cli;
pub mod compressor;
pub mod container;
mod error;
pub mod huffman;
mod logger;
pub mod service;
pub mod storage;

pub type Result<T> = std::result::Result<T, error::Error>;

pub const COMPRESSED_EXTENSION: &str = "huff";
const RESTORED_EXTENSION: &str = "out";

pub struct Arguments {
    input_files: Vec<PathBuf>,
    output_directory: PathBuf,
    staging_directory: PathBuf,
    number_of_threads: usize,
    symbol_set: SymbolSet,
    format: Format,
    decompress: bool,
}

/// Outcome of one input file.
pub struct FileReport {
    pub input_file: PathBuf,
    pub result: Result<(PathBuf, CompressionInfo)>,
}

fn path_to_string(file_path: &Path) -> String {
    file_path.to_string_lossy().into_owned()
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path)
        .map_err(|e| Error::UnableToOpenInputFileForReading(path_to_string(file_path), e))
}

fn read_input_file(file_path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    open_input_file(file_path)?
        .read_to_end(&mut bytes)
        .map_err(|e| Error::UnableToOpenInputFileForReading(path_to_string(file_path), e))?;
    Ok(bytes)
}

/// `name.huff` when compressing. When restoring, a trailing `.huff` is
/// dropped and any other name gets `.out` appended.
fn output_file_name(input_file: &Path, decompress: bool) -> Result<OsString> {
    let name = input_file
        .file_name()
        .ok_or_else(|| Error::InputFileHasNoName(path_to_string(input_file)))?;
    if decompress && Path::new(name).extension() == Some(OsStr::new(COMPRESSED_EXTENSION)) {
        if let Some(stem) = Path::new(name).file_stem() {
            return Ok(stem.to_owned());
        }
    }
    let mut output_name = name.to_owned();
    output_name.push(".");
    output_name.push(if decompress {
        RESTORED_EXTENSION
    } else {
        COMPRESSED_EXTENSION
    });
    Ok(output_name)
}

/// Output path of every input, failing the whole run when two inputs would
/// end up in the same file.
fn output_files(arguments: &Arguments) -> Result<Vec<Result<PathBuf>>> {
    let mut seen = HashSet::new();
    let mut output_files = Vec::with_capacity(arguments.input_files.len());
    for input_file in &arguments.input_files {
        let output_file = output_file_name(input_file, arguments.decompress)
            .map(|name| arguments.output_directory.join(name));
        if let Ok(path) = &output_file {
            if !seen.insert(path.clone()) {
                return Err(Error::DuplicateOutputFile(path_to_string(path)));
            }
        }
        output_files.push(output_file);
    }
    Ok(output_files)
}

/// Staging init wipes its owned directory, so no input and not the output
/// directory may live below it.
fn ensure_outside_staging(arguments: &Arguments) -> Result<()> {
    let owned = DirectoryStorage::owned_directory(&arguments.staging_directory);
    let Ok(owned) = owned.canonicalize() else {
        return Ok(());
    };
    let paths = arguments
        .input_files
        .iter()
        .chain(iter::once(&arguments.output_directory));
    for path in paths {
        if path
            .canonicalize()
            .is_ok_and(|canonical| canonical.starts_with(&owned))
        {
            return Err(Error::PathInsideStagingDirectory(path_to_string(path)));
        }
    }
    Ok(())
}

/// Copies the artifact next to `output_file` and renames it into place, so
/// the path holds either the complete artifact or what it held before.
fn export<S: Storage>(
    service: &CompressionService<S>,
    info: &CompressionInfo,
    output_file: &Path,
) -> Result<()> {
    let mut artifact = service.download(&info.file_id)?;
    storage::replace_atomically(output_file, |file| {
        let mut writer = BufWriter::new(file);
        io::copy(&mut artifact, &mut writer)?;
        writer.flush()
    })
    .map_err(|e| Error::FailedToWriteOutputFile(path_to_string(output_file), e))
}

fn process_file<S: Storage>(
    service: &CompressionService<S>,
    input_file: &Path,
    output_file: Result<PathBuf>,
    decompress: bool,
) -> Result<(PathBuf, CompressionInfo)> {
    let output_file = output_file?;
    let bytes = read_input_file(input_file)?;
    let id = service.save(&bytes)?;
    let result = if decompress {
        service.decompress(&id)
    } else {
        service.compress(&id)
    }
    .and_then(|info| export(service, &info, &output_file).map(|_| info));
    if let Err(e) = service.cleanup(&id) {
        log::warn!("Cleanup of {} incomplete: {}", id, e);
    }
    let info = result?;
    log::info!(
        "{} ({} bytes) -> {} ({} bytes)",
        input_file.display(),
        info.input_size,
        output_file.display(),
        info.output_size
    );
    Ok((output_file, info))
}

/// Processes every input file on its own pool job. Setup failures abort the
/// run; failures of single files end up in their report.
pub fn run(arguments: &Arguments) -> Result<Vec<FileReport>> {
    let output_files = output_files(arguments)?;
    fs::create_dir_all(&arguments.output_directory).map_err(|e| {
        Error::UnableToOpenOutputFileForWriting(path_to_string(&arguments.output_directory), e)
    })?;
    ensure_outside_staging(arguments)?;
    let storage = DirectoryStorage::init(&arguments.staging_directory)?;
    let service = Arc::new(CompressionService::new(
        storage,
        Compressor::from(arguments),
    ));
    let threadpool = ThreadPool::new(arguments.number_of_threads.max(1));
    let (sender, receiver) = mpsc::channel();
    let jobs = arguments.input_files.iter().zip(output_files).enumerate();
    for (index, (input_file, output_file)) in jobs {
        let service = Arc::clone(&service);
        let sender = sender.clone();
        let input_file = input_file.clone();
        let decompress = arguments.decompress;
        threadpool.execute(move || {
            let result = process_file(service.as_ref(), &input_file, output_file, decompress);
            let _ = sender.send((index, result));
        });
    }
    drop(sender);

    let mut results: Vec<Option<Result<(PathBuf, CompressionInfo)>>> =
        arguments.input_files.iter().map(|_| None).collect();
    for (index, result) in receiver {
        results[index] = Some(result);
    }
    Ok(arguments
        .input_files
        .iter()
        .zip(results)
        .map(|(input_file, result)| FileReport {
            input_file: input_file.clone(),
            result: result.unwrap_or_else(|| {
                Err(Error::WorkerTerminatedUnexpectedly(path_to_string(
                    input_file,
                )))
            }),
        })
        .collect())
}
