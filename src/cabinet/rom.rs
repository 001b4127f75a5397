// Copyright 2016 Walter Kuppens.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loads the four fixed-name 2KiB ROM chunks into a contiguous 8KiB image.

use std::fmt;
use std::fs;
use std::path::Path;

/// Each chunk's expected length and load offset, in load order.
const CHUNKS: [(&str, usize); 4] = [
    ("invaders.h", 0x0000),
    ("invaders.g", 0x0800),
    ("invaders.f", 0x1000),
    ("invaders.e", 0x1800),
];

const CHUNK_SIZE: usize = 0x0800;
pub const ROM_SIZE: usize = CHUNK_SIZE * 4;

#[derive(Debug)]
pub enum RomError {
    Missing { path: String, source: std::io::Error },
    WrongSize { path: String, expected: usize, actual: usize },
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RomError::Missing { path, source } => {
                write!(f, "cannot open {}: {}", path, source)
            }
            RomError::WrongSize { path, expected, actual } => {
                write!(f, "{} is {} bytes, expected exactly {}", path, actual, expected)
            }
        }
    }
}

impl std::error::Error for RomError {}

/// Reads `invaders.h/g/f/e` from `dir` and concatenates them into an 8KiB
/// image at their documented offsets. Each chunk must be exactly 2,048
/// bytes; a missing file or a wrong size is a loader failure, reported
/// before any CPU state is touched.
pub fn load_rom_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<u8>, RomError> {
    let mut rom = vec![0u8; ROM_SIZE];
    for (name, offset) in CHUNKS.iter() {
        let path = dir.as_ref().join(name);
        let display_path = path.display().to_string();
        let bytes = fs::read(&path).map_err(|source| RomError::Missing {
            path: display_path.clone(),
            source,
        })?;
        if bytes.len() != CHUNK_SIZE {
            return Err(RomError::WrongSize {
                path: display_path,
                expected: CHUNK_SIZE,
                actual: bytes.len(),
            });
        }
        rom[*offset..*offset + CHUNK_SIZE].copy_from_slice(&bytes);
    }
    Ok(rom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_chunk(dir: &Path, name: &str, size: usize, fill: u8) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(&vec![fill; size]).unwrap();
    }

    #[test]
    fn loads_four_chunks_at_documented_offsets() {
        let dir = std::env::temp_dir().join("invaders8080-rom-test-ok");
        fs::create_dir_all(&dir).unwrap();
        write_chunk(&dir, "invaders.h", CHUNK_SIZE, 0x11);
        write_chunk(&dir, "invaders.g", CHUNK_SIZE, 0x22);
        write_chunk(&dir, "invaders.f", CHUNK_SIZE, 0x33);
        write_chunk(&dir, "invaders.e", CHUNK_SIZE, 0x44);

        let rom = load_rom_dir(&dir).unwrap();
        assert_eq!(rom.len(), ROM_SIZE);
        assert_eq!(rom[0x0000], 0x11);
        assert_eq!(rom[0x0800], 0x22);
        assert_eq!(rom[0x1000], 0x33);
        assert_eq!(rom[0x1800], 0x44);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_chunk_is_reported_before_others_are_touched() {
        let dir = std::env::temp_dir().join("invaders8080-rom-test-missing");
        fs::create_dir_all(&dir).unwrap();
        write_chunk(&dir, "invaders.h", CHUNK_SIZE, 0x11);
        // invaders.g is absent.

        let err = load_rom_dir(&dir).unwrap_err();
        assert!(matches!(err, RomError::Missing { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn wrong_size_chunk_is_rejected() {
        let dir = std::env::temp_dir().join("invaders8080-rom-test-wrongsize");
        fs::create_dir_all(&dir).unwrap();
        write_chunk(&dir, "invaders.h", CHUNK_SIZE - 1, 0x11);

        let err = load_rom_dir(&dir).unwrap_err();
        assert!(matches!(err, RomError::WrongSize { .. }));

        fs::remove_dir_all(&dir).ok();
    }
}
