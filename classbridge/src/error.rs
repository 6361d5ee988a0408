use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, covering every failure this library can return.
///
/// Decode errors ([`Error::Malformed`], [`Error::OutOfBounds`],
/// [`Error::ReferenceKind`]) are fatal to the single class file being
/// processed; a batch run reports them per file and continues with the rest.
///
/// # Examples
///
/// ```rust,no_run
/// use classbridge::{ClassFile, Error};
/// use std::path::Path;
///
/// match ClassFile::from_file(Path::new("Foo.class")) {
///     Ok(class) => println!("{} methods", class.methods.len()),
///     Err(Error::NotSupported) => eprintln!("class file version not supported"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("malformed: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// Includes the source location where the malformation was detected, for
    /// debugging via the `malformed_error!` macro.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The class file uses a major version this engine does not recognize.
    ///
    /// Such artifacts are rejected outright rather than best-effort patched.
    #[error("This class file version is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error while reading or replacing a class file.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// A constant pool index refers to an entry whose kind does not match the
    /// referencing context (e.g. an `invokevirtual` operand pointing at a
    /// `Fieldref`).
    ///
    /// Proceeding would risk emitting an invalid class file, so this is fatal
    /// for the artifact.
    #[error("Constant pool entry {index} is a {found}, expected {expected}")]
    ReferenceKind {
        /// The offending pool index
        index: u16,
        /// Tag name of the entry actually found there
        found: &'static str,
        /// What the referencing context required
        expected: &'static str,
    },

    /// The constant pool has no room left for an appended entry.
    ///
    /// Pool indices are `u16` and existing indices are never renumbered, so a
    /// rewrite that would push the pool past 65534 usable slots must fail.
    #[error("Constant pool is full, cannot append a new entry")]
    PoolFull,
}
