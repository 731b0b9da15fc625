// In: src/ffi/symbols.rs

//! Resolution of native routines by name.
//!
//! Routines live in the `GrB_` namespace, but some exist only as extensions
//! under `GxB_`. [`libget`] tries the primary name first and then the
//! extension alias.

use hashbrown::HashMap;
use libloading::Library;
use std::ffi::{c_void, OsStr};

use crate::error::{GrblasError, Result};

/// A source of native symbol addresses.
pub trait SymbolTable {
    fn lookup(&self, name: &str) -> Result<*const c_void>;
}

/// Looks up `name`, falling back to its `GxB_` extension alias.
///
/// The alias replaces the four-character namespace prefix, so
/// `GrB_Matrix_build` falls back to `GxB_Matrix_build`. If neither resolves,
/// the error from the primary lookup is returned.
pub fn libget<S: SymbolTable + ?Sized>(table: &S, name: &str) -> Result<*const c_void> {
    match table.lookup(name) {
        Ok(address) => {
            log::trace!("resolved native symbol {}", name);
            Ok(address)
        }
        Err(primary) => {
            let ext_name = format!("GxB_{}", name.get(4..).unwrap_or(""));
            match table.lookup(&ext_name) {
                Ok(address) => {
                    log::trace!("resolved native symbol {} as {}", name, ext_name);
                    Ok(address)
                }
                Err(_) => Err(primary),
            }
        }
    }
}

/// A native library opened with `libloading`.
pub struct NativeLibrary {
    library: Library,
}

impl NativeLibrary {
    /// Opens the shared library at `path`.
    ///
    /// # Safety
    /// Loading a library runs its initialisation routines. The caller must
    /// trust the library at `path`.
    pub unsafe fn open(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = path.as_ref();
        let library = Library::new(path).map_err(|e| GrblasError::SymbolLookup {
            name: path.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;
        log::debug!("opened native library {}", path.to_string_lossy());
        Ok(Self { library })
    }
}

impl SymbolTable for NativeLibrary {
    fn lookup(&self, name: &str) -> Result<*const c_void> {
        let mut symbol_name = Vec::with_capacity(name.len() + 1);
        symbol_name.extend_from_slice(name.as_bytes());
        symbol_name.push(0);
        // SAFETY: the symbol is only read as an address, never called here.
        let symbol = unsafe { self.library.get::<*const c_void>(&symbol_name) };
        symbol
            .map(|symbol| *symbol)
            .map_err(|e| GrblasError::SymbolLookup {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

/// An in-memory table, mainly for tests and statically linked builds.
impl SymbolTable for HashMap<&'static str, usize> {
    fn lookup(&self, name: &str) -> Result<*const c_void> {
        self.get(name)
            .map(|&address| address as *const c_void)
            .ok_or_else(|| GrblasError::SymbolLookup {
                name: name.to_string(),
                reason: "no such symbol".to_string(),
            })
    }
}
