//! Constant pool model: the class file's symbol table.
//!
//! The pool is a 1-based table of tagged entries ([`ConstantEntry`]); slot 0
//! is never valid, and `Long`/`Double` entries occupy two slots, with the
//! second slot unusable (JVMS §4.4.5). Both quirks are modelled with an
//! explicit [`ConstantEntry::Reserved`] variant so entry indices in the model
//! line up exactly with indices in the file.
//!
//! During a rewrite the pool only ever grows, and only at the end: existing
//! indices are never renumbered, which is what keeps every untouched byte of
//! the class file stable across re-encoding. [`ConstantPool::find_or_add`]
//! implements the append-only growth.

use crate::{file::parser::Parser, Result};

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// One tagged constant pool entry.
///
/// Numeric entries keep their raw bit patterns (`u32`/`u64`) rather than
/// decoded values, so NaN payloads and negative zeros re-encode bit-exact.
/// `Utf8` keeps the raw modified-UTF-8 bytes for the same reason; the marker
/// sentinel is plain ASCII, so rewriting never needs to decode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantEntry {
    /// Slot 0, or the hidden second slot of a `Long`/`Double`.
    Reserved,
    /// Modified UTF-8 text, kept as raw bytes.
    Utf8(Vec<u8>),
    /// `int` constant, raw bits.
    Integer(u32),
    /// `float` constant, raw bits.
    Float(u32),
    /// `long` constant, raw bits. Occupies two pool slots.
    Long(u64),
    /// `double` constant, raw bits. Occupies two pool slots.
    Double(u64),
    /// A class or interface reference.
    Class {
        /// Pool index of the `Utf8` holding the internal class name.
        name_index: u16,
    },
    /// A `String` literal.
    String {
        /// Pool index of the `Utf8` holding the text.
        string_index: u16,
    },
    /// A field reference.
    FieldRef {
        /// Pool index of the owning `Class` entry.
        class_index: u16,
        /// Pool index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// A method reference.
    MethodRef {
        /// Pool index of the owning `Class` entry.
        class_index: u16,
        /// Pool index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// An interface method reference.
    InterfaceMethodRef {
        /// Pool index of the owning `Class` entry.
        class_index: u16,
        /// Pool index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// A member-signature pair: name plus type descriptor.
    NameAndType {
        /// Pool index of the `Utf8` holding the member name.
        name_index: u16,
        /// Pool index of the `Utf8` holding the type descriptor.
        descriptor_index: u16,
    },
    /// A method handle descriptor.
    MethodHandle {
        /// The handle kind (1..=9, JVMS §4.4.8).
        reference_kind: u8,
        /// Pool index of the referenced field/method entry.
        reference_index: u16,
    },
    /// A method type descriptor.
    MethodType {
        /// Pool index of the `Utf8` holding the descriptor.
        descriptor_index: u16,
    },
    /// A dynamically-computed constant descriptor.
    Dynamic {
        /// Index into the `BootstrapMethods` attribute.
        bootstrap_method_attr_index: u16,
        /// Pool index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// A dynamic-call-site descriptor.
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute.
        bootstrap_method_attr_index: u16,
        /// Pool index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// A module reference.
    Module {
        /// Pool index of the `Utf8` holding the module name.
        name_index: u16,
    },
    /// A package reference.
    Package {
        /// Pool index of the `Utf8` holding the package name.
        name_index: u16,
    },
}

impl ConstantEntry {
    /// Human-readable tag name, used in error reporting.
    #[must_use]
    pub fn tag_name(&self) -> &'static str {
        match self {
            ConstantEntry::Reserved => "Reserved",
            ConstantEntry::Utf8(_) => "Utf8",
            ConstantEntry::Integer(_) => "Integer",
            ConstantEntry::Float(_) => "Float",
            ConstantEntry::Long(_) => "Long",
            ConstantEntry::Double(_) => "Double",
            ConstantEntry::Class { .. } => "Class",
            ConstantEntry::String { .. } => "String",
            ConstantEntry::FieldRef { .. } => "Fieldref",
            ConstantEntry::MethodRef { .. } => "Methodref",
            ConstantEntry::InterfaceMethodRef { .. } => "InterfaceMethodref",
            ConstantEntry::NameAndType { .. } => "NameAndType",
            ConstantEntry::MethodHandle { .. } => "MethodHandle",
            ConstantEntry::MethodType { .. } => "MethodType",
            ConstantEntry::Dynamic { .. } => "Dynamic",
            ConstantEntry::InvokeDynamic { .. } => "InvokeDynamic",
            ConstantEntry::Module { .. } => "Module",
            ConstantEntry::Package { .. } => "Package",
        }
    }

    /// Returns `true` for entries that occupy two pool slots.
    #[must_use]
    fn is_wide(&self) -> bool {
        matches!(self, ConstantEntry::Long(_) | ConstantEntry::Double(_))
    }
}

/// The constant pool of one class file.
///
/// Indexing is 1-based to match the on-disk format; `entries[0]` is always
/// [`ConstantEntry::Reserved`]. The stored length equals the file's
/// `constant_pool_count`.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<ConstantEntry>,
}

impl ConstantPool {
    /// Create an empty pool (count 1, no usable entries).
    #[must_use]
    pub fn new() -> Self {
        ConstantPool {
            entries: vec![ConstantEntry::Reserved],
        }
    }

    /// Parse the pool from the decoder's cursor, positioned at
    /// `constant_pool_count`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on a zero count, an unrecognized
    /// tag, or a truncated entry.
    pub(crate) fn parse(parser: &mut Parser) -> Result<Self> {
        let count = parser.read_be::<u16>()?;
        if count == 0 {
            return Err(malformed_error!("constant pool count must be at least 1"));
        }

        let mut entries = Vec::with_capacity(count as usize);
        entries.push(ConstantEntry::Reserved);

        while entries.len() < count as usize {
            let tag = parser.read_be::<u8>()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let length = parser.read_be::<u16>()?;
                    let bytes = parser.read_bytes(length as usize)?;
                    ConstantEntry::Utf8(bytes.to_vec())
                }
                TAG_INTEGER => ConstantEntry::Integer(parser.read_be::<u32>()?),
                TAG_FLOAT => ConstantEntry::Float(parser.read_be::<u32>()?),
                TAG_LONG => ConstantEntry::Long(parser.read_be::<u64>()?),
                TAG_DOUBLE => ConstantEntry::Double(parser.read_be::<u64>()?),
                TAG_CLASS => ConstantEntry::Class {
                    name_index: parser.read_be::<u16>()?,
                },
                TAG_STRING => ConstantEntry::String {
                    string_index: parser.read_be::<u16>()?,
                },
                TAG_FIELDREF => ConstantEntry::FieldRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                TAG_METHODREF => ConstantEntry::MethodRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                TAG_INTERFACE_METHODREF => ConstantEntry::InterfaceMethodRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                TAG_NAME_AND_TYPE => ConstantEntry::NameAndType {
                    name_index: parser.read_be::<u16>()?,
                    descriptor_index: parser.read_be::<u16>()?,
                },
                TAG_METHOD_HANDLE => ConstantEntry::MethodHandle {
                    reference_kind: parser.read_be::<u8>()?,
                    reference_index: parser.read_be::<u16>()?,
                },
                TAG_METHOD_TYPE => ConstantEntry::MethodType {
                    descriptor_index: parser.read_be::<u16>()?,
                },
                TAG_DYNAMIC => ConstantEntry::Dynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                TAG_INVOKE_DYNAMIC => ConstantEntry::InvokeDynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                TAG_MODULE => ConstantEntry::Module {
                    name_index: parser.read_be::<u16>()?,
                },
                TAG_PACKAGE => ConstantEntry::Package {
                    name_index: parser.read_be::<u16>()?,
                },
                _ => {
                    return Err(malformed_error!(
                        "unrecognized constant pool tag {} at entry {}",
                        tag,
                        entries.len()
                    ))
                }
            };

            let wide = entry.is_wide();
            entries.push(entry);
            if wide {
                if entries.len() >= count as usize {
                    return Err(malformed_error!(
                        "wide constant at entry {} overruns the pool",
                        entries.len() - 1
                    ));
                }
                entries.push(ConstantEntry::Reserved);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Serialize the pool, including its leading count.
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count().to_be_bytes());

        for entry in &self.entries {
            match entry {
                ConstantEntry::Reserved => {}
                ConstantEntry::Utf8(bytes) => {
                    out.push(TAG_UTF8);
                    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                    out.extend_from_slice(bytes);
                }
                ConstantEntry::Integer(bits) => {
                    out.push(TAG_INTEGER);
                    out.extend_from_slice(&bits.to_be_bytes());
                }
                ConstantEntry::Float(bits) => {
                    out.push(TAG_FLOAT);
                    out.extend_from_slice(&bits.to_be_bytes());
                }
                ConstantEntry::Long(bits) => {
                    out.push(TAG_LONG);
                    out.extend_from_slice(&bits.to_be_bytes());
                }
                ConstantEntry::Double(bits) => {
                    out.push(TAG_DOUBLE);
                    out.extend_from_slice(&bits.to_be_bytes());
                }
                ConstantEntry::Class { name_index } => {
                    out.push(TAG_CLASS);
                    out.extend_from_slice(&name_index.to_be_bytes());
                }
                ConstantEntry::String { string_index } => {
                    out.push(TAG_STRING);
                    out.extend_from_slice(&string_index.to_be_bytes());
                }
                ConstantEntry::FieldRef {
                    class_index,
                    name_and_type_index,
                } => {
                    out.push(TAG_FIELDREF);
                    out.extend_from_slice(&class_index.to_be_bytes());
                    out.extend_from_slice(&name_and_type_index.to_be_bytes());
                }
                ConstantEntry::MethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    out.push(TAG_METHODREF);
                    out.extend_from_slice(&class_index.to_be_bytes());
                    out.extend_from_slice(&name_and_type_index.to_be_bytes());
                }
                ConstantEntry::InterfaceMethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    out.push(TAG_INTERFACE_METHODREF);
                    out.extend_from_slice(&class_index.to_be_bytes());
                    out.extend_from_slice(&name_and_type_index.to_be_bytes());
                }
                ConstantEntry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    out.push(TAG_NAME_AND_TYPE);
                    out.extend_from_slice(&name_index.to_be_bytes());
                    out.extend_from_slice(&descriptor_index.to_be_bytes());
                }
                ConstantEntry::MethodHandle {
                    reference_kind,
                    reference_index,
                } => {
                    out.push(TAG_METHOD_HANDLE);
                    out.push(*reference_kind);
                    out.extend_from_slice(&reference_index.to_be_bytes());
                }
                ConstantEntry::MethodType { descriptor_index } => {
                    out.push(TAG_METHOD_TYPE);
                    out.extend_from_slice(&descriptor_index.to_be_bytes());
                }
                ConstantEntry::Dynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                } => {
                    out.push(TAG_DYNAMIC);
                    out.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                    out.extend_from_slice(&name_and_type_index.to_be_bytes());
                }
                ConstantEntry::InvokeDynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                } => {
                    out.push(TAG_INVOKE_DYNAMIC);
                    out.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                    out.extend_from_slice(&name_and_type_index.to_be_bytes());
                }
                ConstantEntry::Module { name_index } => {
                    out.push(TAG_MODULE);
                    out.extend_from_slice(&name_index.to_be_bytes());
                }
                ConstantEntry::Package { name_index } => {
                    out.push(TAG_PACKAGE);
                    out.extend_from_slice(&name_index.to_be_bytes());
                }
            }
        }
    }

    /// The `constant_pool_count` value: number of slots including slot 0.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    /// Look up an entry by its 1-based pool index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for index 0, an out-of-range
    /// index, or the unusable slot after a `Long`/`Double`.
    pub fn get(&self, index: u16) -> Result<&ConstantEntry> {
        match self.entries.get(index as usize) {
            None => Err(malformed_error!(
                "constant pool index {} out of range (count {})",
                index,
                self.count()
            )),
            Some(ConstantEntry::Reserved) => Err(malformed_error!(
                "constant pool index {} is not a usable entry",
                index
            )),
            Some(entry) => Ok(entry),
        }
    }

    /// Look up a `Utf8` entry and return its raw bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReferenceKind`] if the entry is not `Utf8`,
    /// or [`crate::Error::Malformed`] for an invalid index.
    pub fn utf8(&self, index: u16) -> Result<&[u8]> {
        match self.get(index)? {
            ConstantEntry::Utf8(bytes) => Ok(bytes),
            other => Err(crate::Error::ReferenceKind {
                index,
                found: other.tag_name(),
                expected: "Utf8",
            }),
        }
    }

    /// Look up a `NameAndType` entry and return `(name_index,
    /// descriptor_index)`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReferenceKind`] if the entry is not
    /// `NameAndType`, or [`crate::Error::Malformed`] for an invalid index.
    pub fn name_and_type(&self, index: u16) -> Result<(u16, u16)> {
        match self.get(index)? {
            ConstantEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((*name_index, *descriptor_index)),
            other => Err(crate::Error::ReferenceKind {
                index,
                found: other.tag_name(),
                expected: "NameAndType",
            }),
        }
    }

    /// Append an entry, returning its new index.
    ///
    /// `Long`/`Double` entries claim the following slot as well.
    ///
    /// # Errors
    /// Returns [`crate::Error::PoolFull`] if the pool cannot grow without
    /// exceeding the `u16` index space.
    pub fn push(&mut self, entry: ConstantEntry) -> Result<u16> {
        let slots = if entry.is_wide() { 2 } else { 1 };
        if self.entries.len() + slots > u16::MAX as usize {
            return Err(crate::Error::PoolFull);
        }

        let index = self.entries.len() as u16;
        let wide = entry.is_wide();
        self.entries.push(entry);
        if wide {
            self.entries.push(ConstantEntry::Reserved);
        }
        Ok(index)
    }

    /// Return the index of an identical existing entry, or append the entry
    /// and return the new index.
    ///
    /// This is the only growth path used by the rewriters: entries are only
    /// appended at the end, so indices already referenced anywhere in the
    /// class stay valid.
    ///
    /// # Errors
    /// Returns [`crate::Error::PoolFull`] if an append would overflow the
    /// index space.
    pub fn find_or_add(&mut self, entry: ConstantEntry) -> Result<u16> {
        for (index, existing) in self.entries.iter().enumerate() {
            if *existing == entry {
                return Ok(index as u16);
            }
        }
        self.push(entry)
    }

    /// Find-or-append a `Utf8` entry holding `bytes`.
    ///
    /// # Errors
    /// Returns [`crate::Error::PoolFull`] if an append would overflow the
    /// index space.
    pub fn find_or_add_utf8(&mut self, bytes: &[u8]) -> Result<u16> {
        for (index, existing) in self.entries.iter().enumerate() {
            if let ConstantEntry::Utf8(existing_bytes) = existing {
                if existing_bytes == bytes {
                    return Ok(index as u16);
                }
            }
        }
        self.push(ConstantEntry::Utf8(bytes.to_vec()))
    }

    /// Iterate over `(index, entry)` pairs, skipping reserved slots.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !matches!(entry, ConstantEntry::Reserved))
            .map(|(index, entry)| (index as u16, entry))
    }

    /// Check every index stored inside the pool itself.
    ///
    /// Bootstrap-method indices are not checked here; the `BootstrapMethods`
    /// attribute is carried as an opaque range.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::ReferenceKind`]
    /// on the first dangling or kind-mismatched reference.
    pub(crate) fn validate(&self) -> Result<()> {
        for (_, entry) in self.iter() {
            match entry {
                ConstantEntry::Class { name_index }
                | ConstantEntry::Module { name_index }
                | ConstantEntry::Package { name_index } => {
                    self.utf8(*name_index)?;
                }
                ConstantEntry::String { string_index } => {
                    self.utf8(*string_index)?;
                }
                ConstantEntry::MethodType { descriptor_index } => {
                    self.utf8(*descriptor_index)?;
                }
                ConstantEntry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    self.utf8(*name_index)?;
                    self.utf8(*descriptor_index)?;
                }
                ConstantEntry::FieldRef {
                    class_index,
                    name_and_type_index,
                }
                | ConstantEntry::MethodRef {
                    class_index,
                    name_and_type_index,
                }
                | ConstantEntry::InterfaceMethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    self.expect_class(*class_index)?;
                    self.name_and_type(*name_and_type_index)?;
                }
                ConstantEntry::MethodHandle {
                    reference_kind,
                    reference_index,
                } => {
                    self.validate_method_handle(*reference_kind, *reference_index)?;
                }
                ConstantEntry::Dynamic {
                    name_and_type_index,
                    ..
                }
                | ConstantEntry::InvokeDynamic {
                    name_and_type_index,
                    ..
                } => {
                    self.name_and_type(*name_and_type_index)?;
                }
                ConstantEntry::Reserved
                | ConstantEntry::Utf8(_)
                | ConstantEntry::Integer(_)
                | ConstantEntry::Float(_)
                | ConstantEntry::Long(_)
                | ConstantEntry::Double(_) => {}
            }
        }
        Ok(())
    }

    /// Require the entry at `index` to be a `Class`.
    pub(crate) fn expect_class(&self, index: u16) -> Result<()> {
        match self.get(index)? {
            ConstantEntry::Class { .. } => Ok(()),
            other => Err(crate::Error::ReferenceKind {
                index,
                found: other.tag_name(),
                expected: "Class",
            }),
        }
    }

    fn validate_method_handle(&self, kind: u8, index: u16) -> Result<()> {
        let entry = self.get(index)?;
        let ok = match kind {
            // getField/getStatic/putField/putStatic
            1..=4 => matches!(entry, ConstantEntry::FieldRef { .. }),
            // invokeVirtual/newInvokeSpecial
            5 | 8 => matches!(entry, ConstantEntry::MethodRef { .. }),
            // invokeStatic/invokeSpecial: either kind since class file v52
            6 | 7 => matches!(
                entry,
                ConstantEntry::MethodRef { .. } | ConstantEntry::InterfaceMethodRef { .. }
            ),
            // invokeInterface
            9 => matches!(entry, ConstantEntry::InterfaceMethodRef { .. }),
            _ => {
                return Err(malformed_error!(
                    "method handle has invalid reference kind {}",
                    kind
                ))
            }
        };

        if ok {
            Ok(())
        } else {
            Err(crate::Error::ReferenceKind {
                index,
                found: entry.tag_name(),
                expected: "field or method reference",
            })
        }
    }
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}
