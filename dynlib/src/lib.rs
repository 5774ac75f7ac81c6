use std::ffi::{CStr, c_char, c_void};
use std::mem::{size_of, transmute_copy};
use std::ptr::NonNull;

use anyhow::anyhow;
use libc::{RTLD_LAZY, RTLD_LOCAL, dlclose, dlerror, dlopen, dlsym};

/// takes the pending dlerror message, if any.
///
/// NOTE: the string returned by dlerror is owned by libc and must not be freed.
fn take_dlerror() -> Option<String> {
    let err: *const c_char = unsafe { dlerror() };
    if err.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned())
    }
}

pub struct DynLib {
    handle: NonNull<c_void>,
}

impl DynLib {
    pub fn open(filename: &CStr) -> anyhow::Result<Self> {
        let handle = unsafe { dlopen(filename.as_ptr(), RTLD_LAZY | RTLD_LOCAL) };
        match NonNull::new(handle) {
            Some(handle) => Ok(Self { handle }),
            None => Err(anyhow!(
                "could not open {filename:?}: {}",
                take_dlerror().unwrap_or_else(|| "unknown dlopen error".to_string())
            )),
        }
    }

    /// opens the first library from `filenames` that can be opened.
    pub fn open_any(filenames: &[&CStr]) -> anyhow::Result<Self> {
        let mut last_err = anyhow!("no library filenames were given");
        for filename in filenames {
            match Self::open(filename) {
                Ok(dl) => return Ok(dl),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }

    /// `F` must be a function pointer type matching the symbol's signature.
    pub fn lookup<F: Copy>(&self, name: &CStr) -> anyhow::Result<F> {
        assert_eq!(size_of::<F>(), size_of::<*mut c_void>());

        // NOTE: clear any stale error; null is a valid symbol value so dlerror is the only reliable
        // way to tell whether the lookup failed.
        _ = take_dlerror();
        let addr = unsafe { dlsym(self.handle.as_ptr(), name.as_ptr()) };
        if let Some(err) = take_dlerror() {
            return Err(anyhow!("could not look up {name:?}: {err}"));
        }
        if addr.is_null() {
            return Err(anyhow!("symbol {name:?} resolved to null"));
        }
        Ok(unsafe { transmute_copy(&addr) })
    }
}

impl Drop for DynLib {
    fn drop(&mut self) {
        unsafe { dlclose(self.handle.as_ptr()) };
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn test_lookup_libc_symbol() {
    let dl = DynLib::open_any(&[c"libc.so.6", c"libc.so"]).unwrap();
    let strlen: unsafe extern "C" fn(*const c_char) -> usize = dl.lookup(c"strlen").unwrap();
    assert_eq!(unsafe { strlen(c"shader".as_ptr()) }, 6);
    assert!(dl.lookup::<unsafe extern "C" fn()>(c"definitely_not_a_symbol").is_err());
}
