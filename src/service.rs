use std::io::Read;

use crate::compressor::Compressor;
use crate::storage::{FileId, Stage, Storage};
use crate::{error::Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressionInfo {
    pub file_id: FileId,
    pub input_size: u64,
    pub output_size: u64,
    /// payload bits before padding, known right after compressing
    pub bit_count: Option<u64>,
}

impl CompressionInfo {
    /// zero bits appended to fill the last payload byte
    pub fn padding_bits(&self) -> Option<u64> {
        self.bit_count.map(|bits| bits.div_ceil(8) * 8 - bits)
    }
}

/// Stages uploads under fresh identifiers and turns them into artifacts.
pub struct CompressionService<S> {
    storage: S,
    compressor: Compressor,
}

impl<S: Storage> CompressionService<S> {
    pub fn new(storage: S, compressor: Compressor) -> Self {
        Self {
            storage,
            compressor,
        }
    }

    pub fn save(&self, bytes: &[u8]) -> Result<FileId> {
        let id = FileId::generate();
        self.storage.store(Stage::Input, &id, bytes)?;
        log::info!("Staged {} bytes as {}", bytes.len(), id);
        Ok(id)
    }

    pub fn compress(&self, id: &FileId) -> Result<CompressionInfo> {
        let artifact = self
            .compressor
            .compress(|| self.storage.open(Stage::Input, id))?;
        self.storage.store(Stage::Output, id, &artifact.bytes)?;
        Ok(CompressionInfo {
            file_id: id.clone(),
            input_size: artifact.input_size,
            output_size: artifact.bytes.len() as u64,
            bit_count: Some(artifact.bit_count),
        })
    }

    pub fn decompress(&self, id: &FileId) -> Result<CompressionInfo> {
        let mut artifact = Vec::new();
        self.storage
            .open(Stage::Input, id)?
            .read_to_end(&mut artifact)
            .map_err(Error::FailedToReadSource)?;
        let restored = Compressor::decompress(&artifact)?;
        self.storage.store(Stage::Output, id, &restored)?;
        Ok(CompressionInfo {
            file_id: id.clone(),
            input_size: artifact.len() as u64,
            output_size: restored.len() as u64,
            bit_count: None,
        })
    }

    /// Sizes of both staged files as they are stored right now. The bit
    /// count is not kept in storage and stays unknown.
    pub fn compression_info(&self, id: &FileId) -> Result<CompressionInfo> {
        Ok(CompressionInfo {
            file_id: id.clone(),
            input_size: self.storage.size(Stage::Input, id)?,
            output_size: self.storage.size(Stage::Output, id)?,
            bit_count: None,
        })
    }

    /// save, compress and report in one step
    pub fn accept(&self, bytes: &[u8]) -> Result<CompressionInfo> {
        let id = self.save(bytes)?;
        let compressed = self.compress(&id)?;
        Ok(CompressionInfo {
            bit_count: compressed.bit_count,
            ..self.compression_info(&id)?
        })
    }

    pub fn download(&self, id: &FileId) -> Result<S::Reader> {
        self.storage.open(Stage::Output, id)
    }

    /// Removes both staged files. The output is removed even if the input
    /// is already gone; the first failure is reported.
    pub fn cleanup(&self, id: &FileId) -> Result<()> {
        let input = self.storage.remove(Stage::Input, id);
        let output = self.storage.remove(Stage::Output, id);
        input.and(output)
    }
}

#[cfg(test)]
mod test {
    use std::io::Read;

    use super::CompressionService;
    use crate::compressor::Compressor;
    use crate::container::Format;
    use crate::error::Error;
    use crate::huffman::SymbolSet;
    use crate::storage::{MemoryStorage, Stage, Storage};

    fn service(format: Format) -> CompressionService<MemoryStorage> {
        CompressionService::new(
            MemoryStorage::new(),
            Compressor::new(SymbolSet::Full, format),
        )
    }

    #[test]
    fn test_accept_reports_sizes() {
        let service = service(Format::Raw);
        let input = vec![0x41u8; 1000];
        let info = service.accept(&input).unwrap();
        assert_eq!(info.input_size, 1000);
        assert_eq!(info.output_size, 125);
        assert_eq!(info.bit_count, Some(1000));
        assert_eq!(info.padding_bits(), Some(0));
        let stored = service.compression_info(&info.file_id).unwrap();
        assert_eq!(stored.input_size, info.input_size);
        assert_eq!(stored.output_size, info.output_size);
        assert_eq!(stored.bit_count, None);
    }

    #[test]
    fn test_raw_artifact_reports_padding() {
        let service = service(Format::Raw);
        // one bit per byte, 11 bits fill two bytes
        let info = service.accept(&vec![0x41u8; 11]).unwrap();
        assert_eq!(info.output_size, 2);
        assert_eq!(info.bit_count, Some(11));
        assert_eq!(info.padding_bits(), Some(5));
    }

    #[test]
    fn test_download_returns_artifact() {
        let service = service(Format::Raw);
        let info = service.accept(&vec![0x41u8; 16]).unwrap();
        let mut artifact = Vec::new();
        service
            .download(&info.file_id)
            .unwrap()
            .read_to_end(&mut artifact)
            .unwrap();
        assert_eq!(artifact, vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_each_upload_gets_its_own_id() {
        let service = service(Format::Raw);
        let first = service.accept(b"same").unwrap();
        let second = service.accept(b"same").unwrap();
        assert_ne!(first.file_id, second.file_id);
    }

    #[test]
    fn test_compress_unknown_id_fails() {
        let service = service(Format::Raw);
        let unknown = crate::storage::FileId::generate();
        assert!(matches!(
            service.compress(&unknown),
            Err(Error::FailedToReadFromStorage(_, _))
        ));
    }

    #[test]
    fn test_decompress_restores_framed_upload() {
        let compressing = service(Format::Framed);
        let input = b"round and round it goes";
        let info = compressing.accept(input).unwrap();
        let mut artifact = Vec::new();
        compressing
            .download(&info.file_id)
            .unwrap()
            .read_to_end(&mut artifact)
            .unwrap();

        let restoring = service(Format::Framed);
        let id = restoring.save(&artifact).unwrap();
        let restored_info = restoring.decompress(&id).unwrap();
        assert_eq!(restored_info.output_size, input.len() as u64);
        let mut restored = Vec::new();
        restoring
            .download(&id)
            .unwrap()
            .read_to_end(&mut restored)
            .unwrap();
        assert_eq!(restored, input);
    }

    #[test]
    fn test_cleanup_removes_both_stages() {
        let service = service(Format::Raw);
        let info = service.accept(b"temporary").unwrap();
        service.cleanup(&info.file_id).unwrap();
        assert!(service.storage.open(Stage::Input, &info.file_id).is_err());
        assert!(service.storage.open(Stage::Output, &info.file_id).is_err());
    }

    #[test]
    fn test_cleanup_without_output_still_removes_input() {
        let service = service(Format::Raw);
        let id = service.save(b"never compressed").unwrap();
        assert!(service.cleanup(&id).is_err());
        assert!(service.storage.open(Stage::Input, &id).is_err());
    }
}
