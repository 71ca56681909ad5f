use std::cell::Cell;
use thiserror::Error;

/// Raised when an allocator cannot satisfy a request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("out of memory (requested {requested} bytes)")]
pub struct AllocError {
    pub requested: usize,
}

/// Backing-memory capability used by every growable buffer in this crate.
///
/// A block is a boxed byte slice whose length is its capacity.
/// `resize` follows one contract for all three cases:
/// - an empty `block` requests a fresh allocation of `new_size` bytes,
/// - `new_size == 0` frees the block and leaves an empty one behind,
/// - anything else grows or shrinks the block, keeping the first
///   `min(old, new)` bytes intact.
///
/// On failure the block is left exactly as it was.
pub trait Allocator {
    fn resize(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError>;
}

impl<A> Allocator for &A
where
    A: Allocator + ?Sized,
{
    fn resize(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        (**self).resize(block, new_size)
    }
}

/// The default allocator, backed by the standard heap.
///
/// Growth uses fallible reservation, so exhaustion is reported as an
/// [`AllocError`] instead of aborting the process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    fn resize(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        if new_size == 0 {
            *block = Box::default();
            return Ok(());
        }
        let mut bytes = Vec::from(std::mem::take(block));
        if new_size > bytes.len() {
            if bytes.try_reserve_exact(new_size - bytes.len()).is_err() {
                *block = bytes.into_boxed_slice();
                return Err(AllocError {
                    requested: new_size,
                });
            }
            bytes.resize(new_size, 0);
        } else {
            bytes.truncate(new_size);
        }
        *block = bytes.into_boxed_slice();
        Ok(())
    }
}

/// An allocator with a fixed byte budget.
///
/// Every block handed out is accounted against `limit`; a resize that would
/// push the total past the limit fails and leaves the accounting untouched.
/// Share one budget between several buffers by passing `&BoundedAlloc`.
#[derive(Debug)]
pub struct BoundedAlloc {
    limit: usize,
    in_use: Cell<usize>,
}

impl BoundedAlloc {
    pub fn new(limit: usize) -> BoundedAlloc {
        BoundedAlloc {
            limit,
            in_use: Cell::new(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn in_use(&self) -> usize {
        self.in_use.get()
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.in_use.get()
    }
}

impl Allocator for BoundedAlloc {
    fn resize(&self, block: &mut Box<[u8]>, new_size: usize) -> Result<(), AllocError> {
        let in_use = self.in_use.get().saturating_sub(block.len());
        if in_use + new_size > self.limit {
            return Err(AllocError {
                requested: new_size,
            });
        }
        Global.resize(block, new_size)?;
        self.in_use.set(in_use + new_size);
        Ok(())
    }
}
