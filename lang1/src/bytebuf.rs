use crate::alloc::{AllocError, Allocator, Global};
use std::cmp;
use std::ffi::CStr;
use std::fmt::{Debug, Formatter};

/// Capacity used when appending to a buffer that owns no storage yet.
const MIN_GROWTH: usize = 8;

/// A growable byte sequence whose storage is obtained from an [`Allocator`].
///
/// `len() <= capacity()` holds at all times. Single-byte appends double the
/// capacity when the buffer is full; bulk appends grow to exactly the
/// required length.
pub struct ByteBuf<A = Global>
where
    A: Allocator,
{
    data: Box<[u8]>,
    len: usize,
    alloc: A,
}

impl ByteBuf<Global> {
    pub fn new() -> ByteBuf<Global> {
        ByteBuf::new_in(Global)
    }

    pub fn with_capacity(capacity: usize) -> Result<ByteBuf<Global>, AllocError> {
        ByteBuf::with_capacity_in(capacity, Global)
    }
}

impl Default for ByteBuf<Global> {
    fn default() -> Self {
        ByteBuf::new()
    }
}

impl<A> ByteBuf<A>
where
    A: Allocator,
{
    /// Creates an empty buffer without allocating.
    pub fn new_in(alloc: A) -> ByteBuf<A> {
        ByteBuf {
            data: Box::default(),
            len: 0,
            alloc,
        }
    }

    /// Creates a buffer with storage for exactly `capacity` bytes.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<ByteBuf<A>, AllocError> {
        let mut buf = ByteBuf::new_in(alloc);
        buf.ensure(capacity)?;
        Ok(buf)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The contents as text, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Forgets the contents but keeps the storage for reuse.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn grow_to(&mut self, capacity: usize) -> Result<(), AllocError> {
        self.alloc.resize(&mut self.data, capacity)
    }

    /// Grows the storage to hold at least `capacity` bytes. Never shrinks.
    pub fn ensure(&mut self, capacity: usize) -> Result<(), AllocError> {
        if self.capacity() < capacity {
            self.grow_to(capacity)?;
        }
        Ok(())
    }

    pub fn push(&mut self, byte: u8) -> Result<(), AllocError> {
        if self.len == self.capacity() {
            self.grow_to(cmp::max(self.capacity() * 2, MIN_GROWTH))?;
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        let start = self.len;
        let end = start + bytes.len();
        self.ensure(end)?;
        self.data[start..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    /// Appends a copy of the contents of `other`.
    pub fn append_buf<B>(&mut self, other: &ByteBuf<B>) -> Result<(), AllocError>
    where
        B: Allocator,
    {
        self.extend_from_slice(other.as_bytes())
    }

    /// Returns the contents as a NUL-terminated string, appending the
    /// terminator only if the last byte is not one already.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is empty.
    pub fn as_terminated(&mut self) -> Result<&CStr, AllocError> {
        assert!(
            !self.is_empty(),
            "cannot terminate an empty byte buffer"
        );
        if self.data[self.len - 1] != 0 {
            self.push(0)?;
        }
        Ok(CStr::from_bytes_until_nul(self.as_bytes()).expect("buffer ends with a NUL byte"))
    }

    /// Replaces the contents of `dest` with a copy of the contents of `self`.
    /// Only `len()` bytes are copied, not the whole capacity.
    pub fn copy_into<B>(&self, dest: &mut ByteBuf<B>) -> Result<(), AllocError>
    where
        B: Allocator,
    {
        dest.ensure(self.len)?;
        dest.data[..self.len].copy_from_slice(self.as_bytes());
        dest.len = self.len;
        Ok(())
    }

    /// Returns the storage to the allocator.
    /// Calling this on a buffer that was already freed does nothing.
    pub fn free(&mut self) {
        self.len = 0;
        if self.capacity() > 0 {
            // freeing cannot exceed any budget
            let _ = self.alloc.resize(&mut self.data, 0);
            self.data = Box::default();
        }
    }
}

impl<A> Drop for ByteBuf<A>
where
    A: Allocator,
{
    fn drop(&mut self) {
        self.free()
    }
}

impl<A> Debug for ByteBuf<A>
where
    A: Allocator,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuf")
            .field("data", &String::from_utf8_lossy(self.as_bytes()))
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
