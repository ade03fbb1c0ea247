//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Representation | Load | Save |
//! |--------|-----------|----------------|------|------|
//! | OpenVolumeMesh ASCII | `.ovm` | [`PolyhedralMesh`](crate::mesh::PolyhedralMesh) | ✓ | ✓ |
//! | MEDIT | `.mesh` | [`FlatMesh`](crate::mesh::FlatMesh) | ✓ | ✓ |
//!
//! The two formats carry different representations, so there is no single
//! `load`/`save` pair; [`convert_file`](crate::convert::convert_file) picks
//! the conversion direction from the two extensions.
//!
//! ```no_run
//! use volmesh_convert::io::{medit, ovm};
//! use volmesh_convert::mesh::PolyhedralMesh;
//!
//! let flat = medit::load("cube.mesh").unwrap();
//! let mesh: PolyhedralMesh = ovm::load("cube.ovm").unwrap();
//! ```

pub mod medit;
pub mod ovm;

use std::path::Path;

use crate::error::{MeshError, Result};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// OpenVolumeMesh ASCII format (half-face mesh).
    Ovm,
    /// MEDIT format (flat indexed mesh).
    Medit,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ovm" => Some(Format::Ovm),
            "mesh" => Some(Format::Medit),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Like [`Format::from_path`], but fails with
    /// [`MeshError::UnsupportedFormat`] for unknown extensions.
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Format> {
        let path = path.as_ref();
        Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }
}

/// Whitespace token stream over a text mesh file, with line numbers for
/// error messages. `#` starts a comment that runs to the end of the line.
pub(crate) struct Tokens<'a> {
    path: &'a Path,
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(path: &'a Path, text: &'a str) -> Self {
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(|(n, line)| {
                let line = line.split('#').next().unwrap_or("");
                line.split_whitespace().map(move |t| (n + 1, t))
            })
            .collect();
        Self { path, tokens, pos: 0 }
    }

    pub(crate) fn error<S: Into<String>>(&self, message: S) -> MeshError {
        let line = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(|&(n, _)| n)
            .unwrap_or(0);
        MeshError::LoadError {
            path: self.path.to_path_buf(),
            message: format!("line {}: {}", line, message.into()),
        }
    }

    pub(crate) fn take(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos).map(|&(_, t)| t);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|&(_, t)| t)
    }

    pub(crate) fn expect(&mut self, what: &str) -> Result<&'a str> {
        self.take()
            .ok_or_else(|| self.error(format!("unexpected end of file, expected {}", what)))
    }

    pub(crate) fn usize(&mut self, what: &str) -> Result<usize> {
        let token = self.expect(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected {}, found '{}'", what, token)))
    }

    /// Read an entry count of at least `tokens_per_entry` tokens each. Counts
    /// the rest of the file cannot hold are rejected, so callers may reserve
    /// for them.
    pub(crate) fn count(&mut self, what: &str, tokens_per_entry: usize) -> Result<usize> {
        let n = self.usize(what)?;
        let left = self.tokens.len() - self.pos;
        match n.checked_mul(tokens_per_entry) {
            Some(needed) if needed <= left => Ok(n),
            _ => Err(self.error(format!("{} {} exceeds the rest of the file", what, n))),
        }
    }

    pub(crate) fn f64(&mut self, what: &str) -> Result<f64> {
        let token = self.expect(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected {}, found '{}'", what, token)))
    }
}
