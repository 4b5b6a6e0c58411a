//! Byte stores backing a package.
//!
//! A store is a flat map from part paths to byte contents with three
//! backings: a zip archive, a directory tree, or nothing but memory. All
//! reads and writes go through the in-memory map; `save` flushes to the
//! backing medium. Zip saves are atomic: the archive is rewritten to a
//! temporary sibling and renamed over the original.

use crate::error::{Result, WordlensError};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

enum Backing {
    Zip(PathBuf),
    Filesystem(PathBuf),
    Memory,
}

pub struct Store {
    backing: Backing,
    entries: BTreeMap<String, Vec<u8>>,
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

impl Store {
    pub fn open_zip(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            entries.insert(normalize(&name), content);
        }
        Ok(Self { backing: Backing::Zip(path.to_path_buf()), entries })
    }

    pub fn create_zip(path: &Path) -> Self {
        Self { backing: Backing::Zip(path.to_path_buf()), entries: BTreeMap::new() }
    }

    pub fn open_filesystem(root: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();
        if root.is_dir() {
            collect_files(root, root, &mut entries)?;
        }
        Ok(Self { backing: Backing::Filesystem(root.to_path_buf()), entries })
    }

    pub fn open_memory() -> Self {
        Self { backing: Backing::Memory, entries: BTreeMap::new() }
    }

    pub fn read(&self, path: &str) -> Result<&[u8]> {
        self.entries
            .get(&normalize(path))
            .map(|v| v.as_slice())
            .ok_or_else(|| WordlensError::MissingPart { part_path: path.to_string() })
    }

    pub fn write(&mut self, path: &str, content: Vec<u8>) {
        self.entries.insert(normalize(path), content);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize(path))
    }

    pub fn delete(&mut self, path: &str) {
        self.entries.remove(&normalize(path));
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn save(&self) -> Result<()> {
        match &self.backing {
            Backing::Zip(path) => self.save_zip(path),
            Backing::Filesystem(root) => self.save_filesystem(root),
            Backing::Memory => Ok(()),
        }
    }

    fn save_zip(&self, path: &Path) -> Result<()> {
        let temp = path.with_extension("tmp");
        {
            let file = fs::File::create(&temp)?;
            let mut writer = ZipWriter::new(file);
            for (name, content) in &self.entries {
                let options: zip::write::FileOptions<'_, ()> =
                    zip::write::FileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file(name.as_str(), options)?;
                writer.write_all(content)?;
            }
            writer.finish()?;
        }
        fs::rename(&temp, path)?;
        Ok(())
    }

    fn save_filesystem(&self, root: &Path) -> Result<()> {
        for (name, content) in &self.entries {
            let full = root.join(name);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, content)?;
        }
        Ok(())
    }
}

fn collect_files(root: &Path, dir: &Path, entries: &mut BTreeMap<String, Vec<u8>>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, entries)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| WordlensError::InvalidPackage { message: e.to_string() })?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.insert(name, fs::read(&path)?);
        }
    }
    Ok(())
}
