//! In-memory resource handles for configuration loaded from a database.
//!
//! Protocol code consumes keystores and metadata as resources. Here they are
//! never backed by a file, so the path accessors always report `None`.

use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// Readable configuration resource
pub trait Resource: Send + Sync {
    /// Whether the resource has content
    fn exists(&self) -> bool;

    /// A fresh stream positioned at the start of the content
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Physical file backing the resource
    fn path(&self) -> Option<&Path>;

    /// Physical file name of the resource
    fn filename(&self) -> Option<&str>;
}

/// Resource wrapping a binary blob
#[derive(Clone)]
pub struct ByteArrayResource {
    data: Arc<[u8]>,
}

impl ByteArrayResource {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Resource for ByteArrayResource {
    fn exists(&self) -> bool {
        !self.data.is_empty()
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        if !self.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "The resource has no binary data and no input stream can be provided",
            ));
        }
        Ok(Box::new(Cursor::new(self.data.clone())))
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn filename(&self) -> Option<&str> {
        None
    }
}

impl fmt::Debug for ByteArrayResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteArrayResource(<{} bytes>)", self.data.len())
    }
}

/// Resource wrapping UTF-8 text
#[derive(Clone)]
pub struct StringResource {
    text: Arc<str>,
}

impl StringResource {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Resource for StringResource {
    fn exists(&self) -> bool {
        !self.text.trim().is_empty()
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        if !self.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "The resource has no text and no input stream can be provided",
            ));
        }
        Ok(Box::new(Cursor::new(self.text.as_bytes().to_vec())))
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn filename(&self) -> Option<&str> {
        None
    }
}

impl fmt::Debug for StringResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringResource(<{} chars>)", self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(resource: &dyn Resource) -> Vec<u8> {
        let mut buffer = Vec::new();
        resource
            .open()
            .unwrap()
            .read_to_end(&mut buffer)
            .unwrap();
        buffer
    }

    #[test]
    fn test_byte_resource_streams_are_independent() {
        let resource = ByteArrayResource::new(vec![1u8, 2, 3, 4]);
        assert!(resource.exists());
        assert!(resource.path().is_none());
        assert!(resource.filename().is_none());

        let mut partial = resource.open().unwrap();
        let mut first_two = [0u8; 2];
        partial.read_exact(&mut first_two).unwrap();

        assert_eq!(read_all(&resource), vec![1, 2, 3, 4]);
        assert_eq!(read_all(&resource), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_byte_resource_does_not_exist() {
        let resource = ByteArrayResource::new(Vec::<u8>::new());
        assert!(!resource.exists());
        assert_eq!(
            resource.open().err().map(|e| e.kind()),
            Some(io::ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_string_resource() {
        let resource = StringResource::new("<md:EntityDescriptor/>");
        assert!(resource.exists());
        assert!(resource.path().is_none());
        assert!(resource.filename().is_none());
        assert_eq!(read_all(&resource), b"<md:EntityDescriptor/>".to_vec());
    }

    #[test]
    fn test_blank_string_resource_does_not_exist() {
        for text in ["", "  \n\t"] {
            let resource = StringResource::new(text);
            assert!(!resource.exists());
            assert_eq!(
                resource.open().err().map(|e| e.kind()),
                Some(io::ErrorKind::NotFound)
            );
        }
    }
}
