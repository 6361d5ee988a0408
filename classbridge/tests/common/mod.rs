//! Shared builder for integration tests.
//!
//! Assembles small, structurally valid class files through the public model
//! API, so tests exercise the full pipeline without binary fixtures.

#![allow(dead_code)]

use classbridge::prelude::*;

/// Builds a minimal valid class file through the public API.
pub struct ClassBuilder {
    class: ClassFile,
}

impl ClassBuilder {
    /// Start a public class named `name` extending `java/lang/Object`,
    /// class file version 52.0.
    pub fn new(name: &str) -> Self {
        let mut pool = ConstantPool::new();
        let class_name = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let this_class = pool
            .push(ConstantEntry::Class {
                name_index: class_name,
            })
            .unwrap();
        let object_name = pool.find_or_add_utf8(b"java/lang/Object").unwrap();
        let super_class = pool
            .push(ConstantEntry::Class {
                name_index: object_name,
            })
            .unwrap();

        ClassBuilder {
            class: ClassFile {
                minor_version: 0,
                major_version: 52,
                constant_pool: pool,
                access_flags: ClassFlags::PUBLIC | ClassFlags::SUPER,
                this_class,
                super_class,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                attributes: Vec::new(),
            },
        }
    }

    /// Add a public method with the given bytecode and no exception table.
    pub fn method(self, name: &str, descriptor: &str, code: &[u8]) -> Self {
        self.method_with_handlers(name, descriptor, code, Vec::new())
    }

    /// Add a public method with the given bytecode and exception table rows.
    pub fn method_with_handlers(
        mut self,
        name: &str,
        descriptor: &str,
        code: &[u8],
        exception_table: Vec<ExceptionTableEntry>,
    ) -> Self {
        let pool = &mut self.class.constant_pool;
        let name_index = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let descriptor_index = pool.find_or_add_utf8(descriptor.as_bytes()).unwrap();
        let code_name = pool.find_or_add_utf8(b"Code").unwrap();

        self.class.methods.push(MemberInfo {
            access_flags: MemberFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: vec![Attribute::Code(CodeAttribute {
                name_index: code_name,
                max_stack: 4,
                max_locals: 4,
                code: code.to_vec(),
                exception_table,
                attributes: Vec::new(),
            })],
        });
        self
    }

    /// Add a public field with no attributes.
    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let pool = &mut self.class.constant_pool;
        let name_index = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let descriptor_index = pool.find_or_add_utf8(descriptor.as_bytes()).unwrap();

        self.class.fields.push(MemberInfo {
            access_flags: MemberFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
        self
    }

    /// Add an opaque class-level attribute.
    pub fn raw_attribute(mut self, name: &str, info: &[u8]) -> Self {
        let name_index = self
            .class
            .constant_pool
            .find_or_add_utf8(name.as_bytes())
            .unwrap();
        self.class.attributes.push(Attribute::Raw(AttributeInfo {
            name_index,
            info: info.to_vec(),
        }));
        self
    }

    /// Add a `Long` constant (two pool slots).
    pub fn long_constant(mut self, bits: u64) -> Self {
        self.class
            .constant_pool
            .push(ConstantEntry::Long(bits))
            .unwrap();
        self
    }

    /// Add a `String` constant and its `Utf8` text.
    pub fn string_constant(mut self, text: &str) -> Self {
        let pool = &mut self.class.constant_pool;
        let string_index = pool.find_or_add_utf8(text.as_bytes()).unwrap();
        pool.push(ConstantEntry::String { string_index }).unwrap();
        self
    }

    fn class_entry(&mut self, owner: &str) -> u16 {
        let pool = &mut self.class.constant_pool;
        let owner_name = pool.find_or_add_utf8(owner.as_bytes()).unwrap();
        pool.find_or_add(ConstantEntry::Class {
            name_index: owner_name,
        })
        .unwrap()
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let pool = &mut self.class.constant_pool;
        let name_index = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let descriptor_index = pool.find_or_add_utf8(descriptor.as_bytes()).unwrap();
        pool.find_or_add(ConstantEntry::NameAndType {
            name_index,
            descriptor_index,
        })
        .unwrap()
    }

    /// Add a `Methodref` to the pool, returning its index.
    pub fn method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> (Self, u16) {
        let class_index = self.class_entry(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::MethodRef {
                class_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Add an `InterfaceMethodref` to the pool, returning its index.
    pub fn interface_method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> (Self, u16) {
        let class_index = self.class_entry(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Add a `Fieldref` to the pool, returning its index.
    pub fn field_ref(mut self, owner: &str, name: &str, descriptor: &str) -> (Self, u16) {
        let class_index = self.class_entry(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::FieldRef {
                class_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Add an `InvokeDynamic` descriptor to the pool, returning its index.
    pub fn invoke_dynamic_ref(
        mut self,
        bootstrap_index: u16,
        name: &str,
        descriptor: &str,
    ) -> (Self, u16) {
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::InvokeDynamic {
                bootstrap_method_attr_index: bootstrap_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Finish and return the model.
    pub fn build(self) -> ClassFile {
        self.class
    }

    /// Finish and serialize.
    pub fn build_bytes(self) -> Vec<u8> {
        self.class.to_bytes().unwrap()
    }
}

/// Resolve the name referenced by the call/field instruction whose u2
/// operand sits at `code[pc + 1]`.
pub fn resolve_operand_name(class: &ClassFile, code: &[u8], pc: usize) -> Vec<u8> {
    let index = u16::from_be_bytes([code[pc + 1], code[pc + 2]]);
    let nat = match class.constant_pool.get(index).unwrap() {
        ConstantEntry::MethodRef {
            name_and_type_index,
            ..
        }
        | ConstantEntry::InterfaceMethodRef {
            name_and_type_index,
            ..
        }
        | ConstantEntry::FieldRef {
            name_and_type_index,
            ..
        }
        | ConstantEntry::InvokeDynamic {
            name_and_type_index,
            ..
        } => *name_and_type_index,
        other => panic!("unexpected entry {}", other.tag_name()),
    };
    let (name_index, _) = class.constant_pool.name_and_type(nat).unwrap();
    class.constant_pool.utf8(name_index).unwrap().to_vec()
}

/// The code array of method `index` in the class.
pub fn code_of(class: &ClassFile, index: usize) -> Vec<u8> {
    class.methods[index]
        .attributes
        .iter()
        .find_map(|attr| match attr {
            Attribute::Code(code) => Some(code.code.clone()),
            Attribute::Raw(_) => None,
        })
        .unwrap()
}
